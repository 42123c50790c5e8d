//! Model training and out-of-sample evaluation

use crate::error::Result;
use crate::features::reconstruct_close;
use crate::metrics::{mean_absolute_error, root_mean_squared_error};
use crate::models::arimax::{ArimaxModel, FittedArimax};
use crate::models::{ExogenousModel, FittedModel};
use crate::split::Split;
use tracing::info;

/// Fixed model order used by the pipeline.
pub const MODEL_ORDER: (usize, usize, usize) = (1, 0, 1);

/// Fitted model together with its held-out error metrics.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: FittedArimax,
    /// RMSE on the differenced-log scale
    pub rmse_log_diff: f64,
    /// RMSE on the reconstructed price scale
    pub rmse_price: f64,
    /// MAE on the reconstructed price scale
    pub mae_price: f64,
}

/// Fit an ARIMAX model on the train block and score it on the test block.
///
/// The forecast over the test horizon is inverse-transformed to price scale
/// anchored at the train block's last true log close. Any fit or forecast
/// failure aborts the run; no partial model escapes.
pub fn train_and_evaluate(split: &Split) -> Result<TrainingOutcome> {
    let (p, d, q) = MODEL_ORDER;
    let model = ArimaxModel::new(p, d, q);
    info!(model = model.name(), train_rows = split.train.len(), "fitting model");

    let series = split.train.close_log_diffs();
    let train_exog = split.train.exog_frame();
    let fitted = model.fit(&series, &train_exog)?;

    let steps = split.test.len();
    let test_exog = split.test.exog_frame();
    let predicted_diffs = fitted.forecast(steps, &test_exog)?;

    let anchor = split.train.last_close_log()?;
    let predicted_close = reconstruct_close(&predicted_diffs, anchor);

    let rmse_log_diff = root_mean_squared_error(&predicted_diffs, &split.test.close_log_diffs())?;
    let rmse_price = root_mean_squared_error(&predicted_close, &split.test.closes())?;
    let mae_price = mean_absolute_error(&predicted_close, &split.test.closes())?;
    info!(rmse_log_diff, rmse_price, mae_price, "model evaluation complete");

    Ok(TrainingOutcome {
        model: fitted,
        rmse_log_diff,
        rmse_price,
        mae_price,
    })
}
