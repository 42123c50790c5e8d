//! Offline training entry point
//!
//! Usage: `train_pipeline [TICKER] [START_DATE] [END_DATE]`
//! Defaults: NVDA, 2019-10-05, start plus five years.

use chrono::{Months, NaiveDate};
use price_forecast::config::Config;
use price_forecast::pipeline::run_training;
use std::env;
use std::process;
use tracing::{error, info};

const DEFAULT_TICKER: &str = "NVDA";
const DEFAULT_START: &str = "2019-10-05";

fn parse_date(arg: &str, name: &str) -> NaiveDate {
    match NaiveDate::parse_from_str(arg, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            eprintln!("invalid {} '{}', expected YYYY-MM-DD", name, arg);
            process::exit(2);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "price_forecast=info,train_pipeline=info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let ticker = args
        .get(1)
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TICKER.to_string());
    let start = args
        .get(2)
        .map(|s| parse_date(s, "start date"))
        .unwrap_or_else(|| parse_date(DEFAULT_START, "start date"));
    let end = args.get(3).map(|s| parse_date(s, "end date")).unwrap_or_else(|| {
        start
            .checked_add_months(Months::new(60))
            .expect("date range within calendar bounds")
    });

    let config = Config::from_env();
    info!(ticker, %start, %end, "starting training pipeline");

    match run_training(&config, &ticker, start, end) {
        Ok(report) => {
            info!(
                rows_loaded = report.rows_loaded,
                feature_rows = report.feature_rows,
                train_rows = report.train_rows,
                test_rows = report.test_rows,
                rmse_log_diff = report.rmse_log_diff,
                rmse_price = report.rmse_price,
                mae_price = report.mae_price,
                "training pipeline completed"
            );
            println!(
                "RMSE (log-diff scale): {:.6}\nRMSE (price scale): {:.4}\nMAE (price scale): {:.4}",
                report.rmse_log_diff, report.rmse_price, report.mae_price
            );
        }
        Err(e) => {
            error!(error = %e, "training pipeline failed");
            process::exit(1);
        }
    }
}
