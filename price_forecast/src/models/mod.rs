//! Forecasting models with exogenous regressors

use crate::error::Result;
use crate::features::ExogenousFrame;
use std::fmt::Debug;

/// Model that can be fitted to a target series with exogenous regressors.
pub trait ExogenousModel: Debug + Clone {
    /// The type of fitted model produced
    type Fitted: FittedModel;

    /// Fit to the target series, supplying one regressor row per observation.
    fn fit(&self, series: &[f64], exog: &ExogenousFrame) -> Result<Self::Fitted>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Fitted model able to continue forecasting from the end of its training
/// window. Never mutated after fitting; safe to share across readers.
pub trait FittedModel: Debug {
    /// Forecast `steps` values ahead, conditioned on one future regressor
    /// row per step.
    fn forecast(&self, steps: usize, exog: &ExogenousFrame) -> Result<Vec<f64>>;

    /// Name of the model
    fn name(&self) -> &str;
}

pub mod arimax;
