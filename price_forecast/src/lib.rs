//! # Price Forecast
//!
//! A Rust library forecasting a single equity's closing price with a
//! seasonal exogenous-regressor ARIMAX model.
//!
//! ## Pipeline
//!
//! - Feature transform: log close, first difference, three lags of the
//!   difference, a trailing rolling mean, and calendar fields
//! - Chronological 85/15 train/test partition
//! - ARIMAX(1,0,1) fit with exogenous regressors, scored by RMSE on both the
//!   differenced-log and reconstructed price scales
//! - Forecast service answering arbitrary business-day ranges from the
//!   persisted model and feature table
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use price_forecast::{Config, ForecastService};
//!
//! fn main() -> price_forecast::Result<()> {
//!     let config = Config::from_env();
//!     let service = ForecastService::load(&config)?;
//!
//!     let start = NaiveDate::from_ymd_opt(2024, 10, 7).unwrap();
//!     let end = NaiveDate::from_ymd_opt(2024, 10, 11).unwrap();
//!     for (date, price) in service.predict_range(start, end)? {
//!         println!("{date}: {price:.2}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod service;
pub mod split;
pub mod trainer;

// Re-export commonly used types
pub use crate::config::Config;
pub use crate::data::{PriceLoader, PricePoint};
pub use crate::error::{ForecastError, Result};
pub use crate::features::{ExogRow, ExogenousFrame, FeatureRow, FeatureTable};
pub use crate::models::arimax::{ArimaxModel, FittedArimax};
pub use crate::models::{ExogenousModel, FittedModel};
pub use crate::service::ForecastService;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
