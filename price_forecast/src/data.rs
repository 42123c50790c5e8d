//! Raw price history loading

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// A single closing-price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Loader for raw ticker CSV exports.
#[derive(Debug)]
pub struct PriceLoader;

impl PriceLoader {
    /// Read `{date, close}` rows from a raw CSV file.
    ///
    /// Header names are normalized to lowercase with underscores, so
    /// `Date` / `Adj Close` style headers match. Columns other than the
    /// date and close are ignored.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<PricePoint>> {
        Self::from_csv_between(path, None, None)
    }

    /// Like [`PriceLoader::from_csv`], restricted to an inclusive date range.
    pub fn from_csv_between<P: AsRef<Path>>(
        path: P,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>> {
        let file = File::open(path.as_ref()).map_err(|e| {
            ForecastError::DataError(format!(
                "cannot open price file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let mut reader = csv::Reader::from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(normalize_column_name)
            .collect();
        let date_idx = column_index(&headers, "date")?;
        let close_idx = column_index(&headers, "close")?;

        let mut points = Vec::new();
        for record in reader.records() {
            let record = record?;
            let date_field = record.get(date_idx).unwrap_or_default();
            let date = NaiveDate::parse_from_str(date_field, "%Y-%m-%d").map_err(|_| {
                ForecastError::DataError(format!("unparseable date '{}'", date_field))
            })?;

            if start.map_or(false, |s| date < s) || end.map_or(false, |e| date > e) {
                continue;
            }

            let close_field = record.get(close_idx).unwrap_or_default();
            let close: f64 = close_field.parse().map_err(|_| {
                ForecastError::DataError(format!("unparseable close '{}' on {}", close_field, date))
            })?;
            if !close.is_finite() {
                return Err(ForecastError::DataError(format!(
                    "non-finite close on {}",
                    date
                )));
            }

            points.push(PricePoint { date, close });
        }

        ensure_strictly_increasing(&points)?;
        Ok(points)
    }
}

/// Lowercase a header and replace whitespace with underscores.
fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

fn column_index(headers: &[String], wanted: &str) -> Result<usize> {
    // Exact match first so `close` wins over `adj_close`.
    if let Some(idx) = headers.iter().position(|h| h == wanted) {
        return Ok(idx);
    }
    headers
        .iter()
        .position(|h| h.contains(wanted))
        .ok_or_else(|| ForecastError::DataError(format!("no '{}' column found in data", wanted)))
}

fn ensure_strictly_increasing(points: &[PricePoint]) -> Result<()> {
    for pair in points.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(ForecastError::DataError(format!(
                "price history must be strictly increasing by date ({} follows {})",
                pair[1].date, pair[0].date
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_and_normalizes_headers() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Date,Open,High,Low,Close,Volume").unwrap();
        writeln!(file, "2023-01-02,99.0,101.0,98.5,100.0,1000").unwrap();
        writeln!(file, "2023-01-03,100.0,104.0,99.0,103.0,1200").unwrap();

        let points = PriceLoader::from_csv(file.path()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].close, 100.0);
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2023, 1, 3).unwrap());
    }

    #[test]
    fn filters_to_inclusive_range() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "date,close").unwrap();
        writeln!(file, "2023-01-02,100.0").unwrap();
        writeln!(file, "2023-01-03,101.0").unwrap();
        writeln!(file, "2023-01-04,102.0").unwrap();

        let start = NaiveDate::from_ymd_opt(2023, 1, 3).unwrap();
        let points = PriceLoader::from_csv_between(file.path(), Some(start), None).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, start);
    }

    #[test]
    fn rejects_out_of_order_dates() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "date,close").unwrap();
        writeln!(file, "2023-01-03,101.0").unwrap();
        writeln!(file, "2023-01-02,100.0").unwrap();

        let result = PriceLoader::from_csv(file.path());
        assert!(matches!(result, Err(ForecastError::DataError(_))));
    }

    #[test]
    fn rejects_missing_close_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "date,volume").unwrap();
        writeln!(file, "2023-01-02,1000").unwrap();

        let result = PriceLoader::from_csv(file.path());
        assert!(matches!(result, Err(ForecastError::DataError(_))));
    }
}
