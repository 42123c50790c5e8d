//! HTTP route handlers for the forecast API

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use price_forecast::ForecastService;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Default forecast window used when the query omits a bound.
pub const DEFAULT_START_DATE: &str = "2024-10-05";
pub const DEFAULT_END_DATE: &str = "2024-10-13";

/// Requests may only ask for dates after the end of the training data.
const LAST_TRAINING_DATE: (i32, u32, u32) = (2024, 10, 4);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ForecastService>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictionEntry {
    pub close_pred_original_scale: f64,
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "OK"
}

/// Forecast endpoint: predicted close price per business day in the range.
///
/// Validation failures come back as HTTP 200 with an `error` field (the
/// dashboard renders them inline); internal failures are HTTP 500 with the
/// same payload shape.
pub async fn forecast(
    State(state): State<AppState>,
    Query(params): Query<ForecastParams>,
) -> Response {
    // An explicitly empty parameter counts as absent.
    let start_str = params
        .start_date
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_START_DATE.to_string());
    let end_str = params
        .end_date
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_END_DATE.to_string());

    let (start, end) = match validate_range(&start_str, &end_str) {
        Ok(range) => range,
        Err(message) => {
            return Json(serde_json::json!({ "error": message })).into_response();
        }
    };

    match state.service.predict_range(start, end) {
        Ok(series) => {
            let body: BTreeMap<String, PredictionEntry> = series
                .into_iter()
                .map(|(date, price)| {
                    (
                        date.format("%Y-%m-%d").to_string(),
                        PredictionEntry {
                            close_pred_original_scale: price,
                        },
                    )
                })
                .collect();
            Json(body).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "forecast request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Parse and validate the requested date range.
///
/// The start must fall after the last training date and the end strictly
/// after the start.
fn validate_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), String> {
    let (y, m, d) = LAST_TRAINING_DATE;
    let last_known = NaiveDate::from_ymd_opt(y, m, d).expect("valid calendar date");

    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .map_err(|_| format!("Invalid start_date '{}', expected YYYY-MM-DD", start))?;
    let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")
        .map_err(|_| format!("Invalid end_date '{}', expected YYYY-MM-DD", end))?;

    if start <= last_known {
        return Err(format!(
            "Start Date must be greater than {}",
            last_known.format("%Y-%m-%d")
        ));
    }
    if end <= start {
        return Err("End Date must be greater than Start Date".to_string());
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use price_forecast::{ArimaxModel, ExogenousModel, FeatureTable, PricePoint};
    use pretty_assertions::assert_eq;

    fn next_weekday(mut date: NaiveDate) -> NaiveDate {
        use chrono::{Datelike, Weekday};
        loop {
            date = date.succ_opt().unwrap();
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                return date;
            }
        }
    }

    /// Service over 30 weekdays of constant growth ending Friday 2024-10-04,
    /// yielding a 21-row feature table.
    fn test_state() -> AppState {
        let mut date = NaiveDate::from_ymd_opt(2024, 8, 26).unwrap();
        let mut close = 100.0;
        let mut points = Vec::with_capacity(30);
        for _ in 0..30 {
            points.push(PricePoint { date, close });
            close *= 1.01;
            date = next_weekday(date);
        }
        let table = FeatureTable::from_prices(&points).unwrap();
        let fitted = ArimaxModel::new(1, 0, 1)
            .fit(&table.close_log_diffs(), &table.exog_frame())
            .unwrap();
        AppState {
            service: Arc::new(ForecastService::new(fitted, table)),
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_failure_is_http_200_with_error_field() {
        let response = forecast(
            State(test_state()),
            Query(ForecastParams {
                start_date: Some("2024-10-10".to_string()),
                end_date: Some("2024-10-08".to_string()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["error"], "End Date must be greater than Start Date");
    }

    #[tokio::test]
    async fn internal_failure_is_http_500_with_error_field() {
        // Far more business days than historical feature rows
        let response = forecast(
            State(test_state()),
            Query(ForecastParams {
                start_date: Some("2024-10-07".to_string()),
                end_date: Some("2025-03-31".to_string()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("Insufficient history"), "{}", message);
    }

    #[tokio::test]
    async fn empty_query_values_fall_back_to_defaults() {
        let response = forecast(
            State(test_state()),
            Query(ForecastParams {
                start_date: Some(String::new()),
                end_date: Some(String::new()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body.get("error").is_none());
        // Default window 2024-10-05..2024-10-13 holds five business days
        assert_eq!(body.as_object().unwrap().len(), 5);
        let monday = body["2024-10-07"]["close_pred_original_scale"]
            .as_f64()
            .unwrap();
        assert!(monday.is_finite() && monday > 0.0);
    }

    #[test]
    fn default_range_is_accepted() {
        let (start, end) = validate_range(DEFAULT_START_DATE, DEFAULT_END_DATE).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 10, 5).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 10, 13).unwrap());
    }

    #[test]
    fn start_before_training_end_is_rejected() {
        let err = validate_range("2024-10-04", "2024-10-13").unwrap_err();
        assert_eq!(err, "Start Date must be greater than 2024-10-04");

        let err = validate_range("2023-01-01", "2024-10-13").unwrap_err();
        assert_eq!(err, "Start Date must be greater than 2024-10-04");
    }

    #[test]
    fn end_not_after_start_is_rejected() {
        let err = validate_range("2024-10-07", "2024-10-07").unwrap_err();
        assert_eq!(err, "End Date must be greater than Start Date");

        let err = validate_range("2024-10-07", "2024-10-05").unwrap_err();
        assert_eq!(err, "End Date must be greater than Start Date");
    }

    #[test]
    fn malformed_dates_are_rejected() {
        assert!(validate_range("2024/10/07", "2024-10-13").is_err());
        assert!(validate_range("2024-10-07", "not-a-date").is_err());
    }
}
