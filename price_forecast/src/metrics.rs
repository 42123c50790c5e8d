//! Accuracy metrics for forecast evaluation

use crate::error::{ForecastError, Result};

/// Mean absolute error between forecast and actual values.
pub fn mean_absolute_error(forecast: &[f64], actual: &[f64]) -> Result<f64> {
    check_lengths(forecast, actual)?;
    let sum: f64 = forecast
        .iter()
        .zip(actual.iter())
        .map(|(f, a)| (f - a).abs())
        .sum();
    Ok(sum / forecast.len() as f64)
}

/// Mean squared error between forecast and actual values.
pub fn mean_squared_error(forecast: &[f64], actual: &[f64]) -> Result<f64> {
    check_lengths(forecast, actual)?;
    let sum: f64 = forecast
        .iter()
        .zip(actual.iter())
        .map(|(f, a)| (f - a).powi(2))
        .sum();
    Ok(sum / forecast.len() as f64)
}

/// Root mean squared error between forecast and actual values.
pub fn root_mean_squared_error(forecast: &[f64], actual: &[f64]) -> Result<f64> {
    Ok(mean_squared_error(forecast, actual)?.sqrt())
}

fn check_lengths(forecast: &[f64], actual: &[f64]) -> Result<()> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::ValidationError(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn rmse_of_constant_offset() {
        let forecast = vec![101.0, 102.0, 103.0];
        let actual = vec![100.0, 101.0, 102.0];
        assert_approx_eq!(
            root_mean_squared_error(&forecast, &actual).unwrap(),
            1.0,
            1e-12
        );
        assert_approx_eq!(mean_absolute_error(&forecast, &actual).unwrap(), 1.0, 1e-12);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let result = mean_squared_error(&[1.0, 2.0], &[1.0]);
        assert!(matches!(result, Err(ForecastError::ValidationError(_))));

        let result = root_mean_squared_error(&[], &[]);
        assert!(matches!(result, Err(ForecastError::ValidationError(_))));
    }
}
