//! Feature engineering for the differenced log-price series
//!
//! Raw closes become a stationary feature table: log transform, first
//! difference, three lags of the difference, a trailing rolling mean, and
//! calendar fields. The inverse transform back to price scale lives here as
//! well.

use crate::data::PricePoint;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Number of lagged difference columns.
pub const LAG_COUNT: usize = 3;

/// Trailing window length of the rolling mean.
pub const ROLLING_WINDOW: usize = 5;

/// Leading input rows consumed before the first fully-populated feature row
/// (1 for the difference, 3 for the lags, 5 for the rolling window).
pub const FEATURE_WARMUP: usize = 1 + LAG_COUNT + ROLLING_WINDOW;

/// One fully-populated row of the feature table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub close: f64,
    pub close_log: f64,
    pub close_log_diff: f64,
    pub lag_1: f64,
    pub lag_2: f64,
    pub lag_3: f64,
    pub rolling_mean: f64,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl FeatureRow {
    /// Project this row onto its exogenous regressor columns.
    pub fn exog(&self) -> ExogRow {
        ExogRow {
            lag_1: self.lag_1,
            lag_2: self.lag_2,
            lag_3: self.lag_3,
            rolling_mean: self.rolling_mean,
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }
}

/// Exogenous regressor values for a single step: everything in the feature
/// table except the target columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExogRow {
    pub lag_1: f64,
    pub lag_2: f64,
    pub lag_3: f64,
    pub rolling_mean: f64,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl ExogRow {
    /// Number of regressor columns.
    pub const WIDTH: usize = 7;

    /// Flatten to the column order used by the model design matrix.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.lag_1,
            self.lag_2,
            self.lag_3,
            self.rolling_mean,
            f64::from(self.year),
            f64::from(self.month),
            f64::from(self.day),
        ]
    }

    /// Copy of this row with the calendar fields overwritten by `date`.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.year = date.year();
        self.month = date.month();
        self.day = date.day();
        self
    }
}

/// Ordered-by-date collection of feature rows with unique dates and no
/// missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    /// Build the feature table from raw chronological price history.
    ///
    /// Fails with `DomainError` on any non-positive close. Inputs of
    /// [`FEATURE_WARMUP`] rows or fewer produce an empty table; callers that
    /// need a populated table must treat that as insufficient data. For
    /// longer inputs the output length is exactly the input length minus
    /// [`FEATURE_WARMUP`].
    pub fn from_prices(prices: &[PricePoint]) -> Result<Self> {
        for point in prices {
            if point.close <= 0.0 {
                return Err(ForecastError::DomainError(format!(
                    "non-positive close {} on {} cannot be log-transformed",
                    point.close, point.date
                )));
            }
        }
        for pair in prices.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ForecastError::DataError(format!(
                    "price history must be strictly increasing by date ({} follows {})",
                    pair[1].date, pair[0].date
                )));
            }
        }

        let close_log: Vec<f64> = prices.iter().map(|p| p.close.ln()).collect();
        // diff[t] aligns with prices[t]; the first entry is never read.
        let mut diff = vec![0.0; prices.len()];
        for t in 1..prices.len() {
            diff[t] = close_log[t] - close_log[t - 1];
        }

        let mut rows = Vec::new();
        if prices.len() > FEATURE_WARMUP {
            for t in FEATURE_WARMUP..prices.len() {
                let window = &diff[t + 1 - ROLLING_WINDOW..=t];
                let rolling_mean = window.iter().sum::<f64>() / ROLLING_WINDOW as f64;
                let date = prices[t].date;
                rows.push(FeatureRow {
                    date,
                    close: prices[t].close,
                    close_log: close_log[t],
                    close_log_diff: diff[t],
                    lag_1: diff[t - 1],
                    lag_2: diff[t - 2],
                    lag_3: diff[t - 3],
                    rolling_mean,
                    year: date.year(),
                    month: date.month(),
                    day: date.day(),
                });
            }
        }

        Ok(Self { rows })
    }

    /// Construct from already-built rows, validating date ordering.
    pub(crate) fn from_rows(rows: Vec<FeatureRow>) -> Result<Self> {
        for pair in rows.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ForecastError::DataError(format!(
                    "feature rows must be strictly increasing by date ({} follows {})",
                    pair[1].date, pair[0].date
                )));
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Log close of the most recent row, the anchor for reconstruction.
    pub fn last_close_log(&self) -> Result<f64> {
        self.rows
            .last()
            .map(|r| r.close_log)
            .ok_or_else(|| ForecastError::InsufficientDataError("feature table is empty".into()))
    }

    /// Target series for model fitting.
    pub fn close_log_diffs(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close_log_diff).collect()
    }

    /// True close prices, for scoring on the original scale.
    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// Project the whole table onto its exogenous regressor columns.
    pub fn exog_frame(&self) -> ExogenousFrame {
        ExogenousFrame {
            dates: self.dates(),
            rows: self.rows.iter().map(FeatureRow::exog).collect(),
        }
    }

    /// Last `k` exogenous rows, the stand-in regressors for future steps.
    pub fn tail_exog(&self, k: usize) -> Result<Vec<ExogRow>> {
        if k > self.rows.len() {
            return Err(ForecastError::InsufficientHistoryError(format!(
                "requested {} future steps but only {} historical feature rows are available",
                k,
                self.rows.len()
            )));
        }
        Ok(self.rows[self.rows.len() - k..]
            .iter()
            .map(FeatureRow::exog)
            .collect())
    }

    /// Persist as a date-indexed CSV file.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_writer(File::create(path)?);
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Load a table previously written by [`FeatureTable::to_csv`].
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            ForecastError::DataError(format!(
                "cannot open feature table {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let mut reader = csv::Reader::from_reader(file);
        let mut rows = Vec::new();
        for record in reader.deserialize() {
            rows.push(record?);
        }
        Self::from_rows(rows)
    }
}

/// Exogenous regressor rows paired with the dates they stand for.
#[derive(Debug, Clone, PartialEq)]
pub struct ExogenousFrame {
    dates: Vec<NaiveDate>,
    rows: Vec<ExogRow>,
}

impl ExogenousFrame {
    pub fn new(dates: Vec<NaiveDate>, rows: Vec<ExogRow>) -> Result<Self> {
        if dates.len() != rows.len() {
            return Err(ForecastError::ShapeMismatchError(format!(
                "{} dates paired with {} exogenous rows",
                dates.len(),
                rows.len()
            )));
        }
        Ok(Self { dates, rows })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn rows(&self) -> &[ExogRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Persist as a date-indexed CSV file (write-only training artifact).
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_writer(File::create(path)?);
        writer.write_record([
            "date",
            "lag_1",
            "lag_2",
            "lag_3",
            "rolling_mean",
            "year",
            "month",
            "day",
        ])?;
        for (date, row) in self.dates.iter().zip(&self.rows) {
            writer.write_record([
                date.format("%Y-%m-%d").to_string(),
                row.lag_1.to_string(),
                row.lag_2.to_string(),
                row.lag_3.to_string(),
                row.rolling_mean.to_string(),
                row.year.to_string(),
                row.month.to_string(),
                row.day.to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Map forecasted log differences back to absolute prices.
///
/// `predicted_close[t] = exp(cumsum(diffs[0..=t]) + anchor_log)` where
/// `anchor_log` is the last known true log close before the forecast window.
pub fn reconstruct_close(diffs: &[f64], anchor_log: f64) -> Vec<f64> {
    let mut cumulative = anchor_log;
    diffs
        .iter()
        .map(|d| {
            cumulative += d;
            cumulative.exp()
        })
        .collect()
}
