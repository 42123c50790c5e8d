//! Forecast serving from persisted artifacts

use crate::config::Config;
use crate::error::{ForecastError, Result};
use crate::features::{reconstruct_close, ExogenousFrame, FeatureTable};
use crate::models::arimax::FittedArimax;
use crate::models::FittedModel;
use chrono::{Datelike, NaiveDate, Weekday};
use tracing::{debug, info};

/// Business days (weekdays) between `start` and `end`, inclusive.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(current);
        }
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    days
}

/// Long-lived serving object owning one fitted model and its paired feature
/// table.
///
/// Both artifacts are loaded once and never mutated afterwards, so concurrent
/// requests may read them without locking. A retrained model requires a
/// reload, not a hot swap.
#[derive(Debug)]
pub struct ForecastService {
    model: FittedArimax,
    features: FeatureTable,
}

impl ForecastService {
    pub fn new(model: FittedArimax, features: FeatureTable) -> Self {
        Self { model, features }
    }

    /// Load the persisted model and cleaned feature table.
    pub fn load(config: &Config) -> Result<Self> {
        let model = FittedArimax::load(config.model_path())?;
        let features = FeatureTable::from_csv(config.cleaned_table_path())?;
        if features.is_empty() {
            return Err(ForecastError::InsufficientDataError(
                "persisted feature table has no rows".to_string(),
            ));
        }
        info!(
            model = model.name(),
            feature_rows = features.len(),
            "forecast service loaded"
        );
        Ok(Self::new(model, features))
    }

    /// Predicted close price for each business day in `[start, end]`.
    ///
    /// The future regressor frame reuses the most recent historical feature
    /// vectors as a stand-in (the model has no true future exogenous data),
    /// with only the calendar columns rewritten to the requested dates.
    /// Reconstruction is anchored at the table's last known log close.
    pub fn predict_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<(NaiveDate, f64)>> {
        let days = business_days(start, end);
        if days.is_empty() {
            return Err(ForecastError::ValidationError(format!(
                "no business days between {} and {}",
                start, end
            )));
        }

        let steps = days.len();
        let carried = self.features.tail_exog(steps)?;
        let rows = carried
            .into_iter()
            .zip(&days)
            .map(|(row, date)| row.with_date(*date))
            .collect();
        let exog = ExogenousFrame::new(days.clone(), rows)?;

        debug!(steps, start = %start, end = %end, "forecasting");
        let diffs = self.model.forecast(steps, &exog)?;
        let anchor = self.features.last_close_log()?;
        let prices = reconstruct_close(&diffs, anchor);

        Ok(days.into_iter().zip(prices).collect())
    }
}
