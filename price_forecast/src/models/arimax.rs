//! ARIMAX model: ARMA errors plus exogenous regressors
//!
//! Estimation follows the two-stage Hannan-Rissanen procedure: a long
//! autoregression supplies residual proxies, then a single least-squares
//! pass regresses the target on its own lags, the lagged residuals, and the
//! exogenous columns. Least squares uses an SVD solve, so exactly collinear
//! regressor columns (calendar fields against the intercept, lag columns
//! against the AR terms) get a minimum-norm solution instead of aborting.

use crate::error::{ForecastError, Result};
use crate::features::{ExogRow, ExogenousFrame};
use crate::models::{ExogenousModel, FittedModel};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Untrained ARIMAX specification of fixed order (p, d, q).
#[derive(Debug, Clone)]
pub struct ArimaxModel {
    name: String,
    p: usize,
    d: usize,
    q: usize,
}

impl ArimaxModel {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            name: format!("ARIMAX({},{},{})", p, d, q),
            p,
            d,
            q,
        }
    }
}

/// Fitted ARIMAX artifact.
///
/// Owns the estimated coefficients and the training-window tail state needed
/// to continue forecasting from the end of its training window. Created once
/// by the trainer and read-only thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedArimax {
    pub(crate) name: String,
    pub(crate) p: usize,
    pub(crate) d: usize,
    pub(crate) q: usize,
    pub(crate) constant: f64,
    pub(crate) ar_coefficients: Vec<f64>,
    pub(crate) ma_coefficients: Vec<f64>,
    pub(crate) exog_weights: Vec<f64>,
    /// Last `p` observed values of the (differenced) training series
    pub(crate) tail_values: Vec<f64>,
    /// Last `q` in-sample residuals
    pub(crate) tail_residuals: Vec<f64>,
}

impl ExogenousModel for ArimaxModel {
    type Fitted = FittedArimax;

    fn fit(&self, series: &[f64], exog: &ExogenousFrame) -> Result<FittedArimax> {
        if series.len() != exog.len() {
            return Err(ForecastError::ShapeMismatchError(format!(
                "{} observations paired with {} exogenous rows",
                series.len(),
                exog.len()
            )));
        }

        if series.len() <= self.d {
            return Err(ForecastError::InsufficientDataError(format!(
                "{} observations cannot be differenced {} times",
                series.len(),
                self.d
            )));
        }
        let y = difference(series, self.d);
        // Differencing consumes the leading rows; keep exog aligned.
        let x_rows: Vec<Vec<f64>> = exog.rows()[self.d..].iter().map(ExogRow::to_vec).collect();
        let n = y.len();
        let w = ExogRow::WIDTH;

        // Long AR order for the residual-proxy stage
        let m = (self.p + self.q).max(5);
        let num_params = 1 + self.p + self.q + w;
        let needed = m + self.q + num_params + 1;
        if n < needed {
            return Err(ForecastError::InsufficientDataError(format!(
                "ARIMAX({},{},{}) with {} regressors needs at least {} observations, got {}",
                self.p, self.d, self.q, w, needed, n
            )));
        }

        // Stage 1: long autoregression to approximate the shock sequence
        let mut rows = Vec::with_capacity(n - m);
        let mut targets = Vec::with_capacity(n - m);
        for t in m..n {
            let mut row = Vec::with_capacity(1 + m + w);
            row.push(1.0);
            for i in 1..=m {
                row.push(y[t - i]);
            }
            row.extend_from_slice(&x_rows[t]);
            rows.push(row);
            targets.push(y[t]);
        }
        let beta_long = least_squares(&rows, &targets)?;

        let mut residuals = vec![0.0; n];
        for (idx, t) in (m..n).enumerate() {
            residuals[t] = targets[idx] - dot(&rows[idx], &beta_long);
        }

        // Stage 2: regression on AR lags, lagged residuals, and exog columns
        let start = (m + self.q).max(self.p);
        let mut rows = Vec::with_capacity(n - start);
        let mut targets = Vec::with_capacity(n - start);
        for t in start..n {
            let mut row = Vec::with_capacity(num_params);
            row.push(1.0);
            for i in 1..=self.p {
                row.push(y[t - i]);
            }
            for i in 1..=self.q {
                row.push(residuals[t - i]);
            }
            row.extend_from_slice(&x_rows[t]);
            rows.push(row);
            targets.push(y[t]);
        }
        let beta = least_squares(&rows, &targets)?;

        let constant = beta[0];
        let ar_coefficients = beta[1..1 + self.p].to_vec();
        let ma_coefficients = beta[1 + self.p..1 + self.p + self.q].to_vec();
        let exog_weights = beta[1 + self.p + self.q..].to_vec();

        let final_residuals: Vec<f64> = rows
            .iter()
            .zip(&targets)
            .map(|(row, target)| target - dot(row, &beta))
            .collect();

        let tail_values = y[n - self.p..].to_vec();
        let tail_residuals = final_residuals[final_residuals.len() - self.q..].to_vec();

        Ok(FittedArimax {
            name: self.name.clone(),
            p: self.p,
            d: self.d,
            q: self.q,
            constant,
            ar_coefficients,
            ma_coefficients,
            exog_weights,
            tail_values,
            tail_residuals,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedModel for FittedArimax {
    /// Forecast `steps` values of the (differenced) target series.
    ///
    /// Requires exactly one exogenous row per forecast step. Future shocks
    /// are taken at their expectation of zero.
    fn forecast(&self, steps: usize, exog: &ExogenousFrame) -> Result<Vec<f64>> {
        if exog.len() != steps {
            return Err(ForecastError::ShapeMismatchError(format!(
                "forecast horizon is {} steps but {} exogenous rows were supplied",
                steps,
                exog.len()
            )));
        }

        let mut history = self.tail_values.clone();
        let mut residuals = self.tail_residuals.clone();
        let mut forecasts = Vec::with_capacity(steps);

        for row in exog.rows() {
            let x = row.to_vec();
            let mut value = self.constant;
            for (i, coeff) in self.ar_coefficients.iter().enumerate() {
                value += coeff * history[history.len() - 1 - i];
            }
            for (i, coeff) in self.ma_coefficients.iter().enumerate() {
                value += coeff * residuals[residuals.len() - 1 - i];
            }
            for (weight, feature) in self.exog_weights.iter().zip(&x) {
                value += weight * feature;
            }

            history.push(value);
            residuals.push(0.0);
            forecasts.push(value);
        }

        Ok(forecasts)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedArimax {
    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    /// Persist the fitted model as a JSON artifact.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Restore a model previously written by [`FittedArimax::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            ForecastError::DataError(format!(
                "cannot open model artifact {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(serde_json::from_reader(file)?)
    }
}

/// Difference a series `d` times.
fn difference(data: &[f64], d: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..d {
        if result.len() < 2 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Least-squares solve via SVD; minimum-norm solution for rank-deficient
/// design matrices.
fn least_squares(rows: &[Vec<f64>], targets: &[f64]) -> Result<Vec<f64>> {
    let cols = rows.first().map_or(0, Vec::len);
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    let x = DMatrix::from_row_slice(rows.len(), cols, &flat);
    let y = DVector::from_column_slice(targets);

    let svd = x.try_svd(true, true, 1.0e-12, 1000).ok_or_else(|| {
        ForecastError::FitError("singular value decomposition did not converge".to_string())
    })?;
    let beta = svd
        .solve(&y, 1.0e-12)
        .map_err(|e| ForecastError::FitError(format!("least-squares solve failed: {}", e)))?;

    let beta: Vec<f64> = beta.iter().copied().collect();
    if beta.iter().any(|b| !b.is_finite()) {
        return Err(ForecastError::FitError(
            "estimated coefficients are not finite".to_string(),
        ));
    }
    Ok(beta)
}

fn dot(row: &[f64], beta: &[f64]) -> f64 {
    row.iter().zip(beta).map(|(a, b)| a * b).sum()
}
