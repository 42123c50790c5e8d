//! End-to-end training pipeline orchestration
//!
//! Raw prices -> feature table -> train/test split -> fitted model, with all
//! artifacts persisted at the end. The pipeline halts on the first failing
//! stage; later stages never run against missing or partial inputs, and no
//! artifact is written unless every stage succeeded.

use crate::config::Config;
use crate::data::PriceLoader;
use crate::error::{ForecastError, Result};
use crate::features::{FeatureTable, FEATURE_WARMUP};
use crate::split::train_test_split;
use crate::trainer::train_and_evaluate;
use chrono::NaiveDate;
use std::fs;
use tracing::info;

/// Summary of one completed training run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub ticker: String,
    pub rows_loaded: usize,
    pub feature_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub rmse_log_diff: f64,
    pub rmse_price: f64,
    pub mae_price: f64,
}

/// Run the full training pipeline for one ticker over an inclusive date
/// range, persisting the cleaned table, the split tables, both exogenous
/// frames, and the fitted model.
pub fn run_training(
    config: &Config,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PipelineReport> {
    let raw_path = config.raw_prices_path(ticker);
    info!(ticker, path = %raw_path.display(), "loading raw price history");
    let prices = PriceLoader::from_csv_between(&raw_path, Some(start), Some(end))?;

    info!(rows = prices.len(), "building feature table");
    let table = FeatureTable::from_prices(&prices)?;
    if table.is_empty() {
        return Err(ForecastError::InsufficientDataError(format!(
            "{} usable rows after transform; need more than {} input rows",
            table.len(),
            FEATURE_WARMUP
        )));
    }

    let split = train_test_split(&table)?;
    info!(
        train_rows = split.train.len(),
        test_rows = split.test.len(),
        "partitioned feature table"
    );

    let outcome = train_and_evaluate(&split)?;

    // Every stage succeeded; persist the artifact set atomically from the
    // caller's point of view.
    fs::create_dir_all(config.processed_dir())?;
    fs::create_dir_all(config.models_dir())?;
    table.to_csv(config.cleaned_table_path())?;
    split.train.to_csv(config.train_table_path())?;
    split.test.to_csv(config.test_table_path())?;
    split.train.exog_frame().to_csv(config.train_exog_path())?;
    split.test.exog_frame().to_csv(config.test_exog_path())?;
    outcome.model.save(config.model_path())?;
    info!(model_path = %config.model_path().display(), "training artifacts persisted");

    Ok(PipelineReport {
        ticker: ticker.to_string(),
        rows_loaded: prices.len(),
        feature_rows: table.len(),
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        rmse_log_diff: outcome.rmse_log_diff,
        rmse_price: outcome.rmse_price,
        mae_price: outcome.mae_price,
    })
}
