//! Runtime configuration for the pipeline and the forecast service

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the default data directory.
pub const DATA_DIR_ENV: &str = "FORECAST_DATA_DIR";

/// File-system layout of raw data and persisted artifacts.
///
/// Every component receives a `Config` at construction instead of reading
/// module-level paths, so tests can point the whole pipeline at a temporary
/// directory.
#[derive(Debug, Clone)]
pub struct Config {
    data_dir: PathBuf,
}

impl Config {
    /// Create a configuration rooted at the given data directory.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Build a configuration from the environment, falling back to `data/`.
    pub fn from_env() -> Self {
        let dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| "data".to_string());
        Self::new(dir)
    }

    /// Root data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Raw price history CSV for a ticker, e.g. `raw/nvda_stock_prices.csv`.
    ///
    /// Index tickers like `^GSPC` drop the caret, matching the ingestion
    /// naming scheme.
    pub fn raw_prices_path(&self, ticker: &str) -> PathBuf {
        let name = format!(
            "{}_stock_prices.csv",
            ticker.to_lowercase().replace('^', "")
        );
        self.data_dir.join("raw").join(name)
    }

    /// Directory holding the processed tabular artifacts.
    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("processed")
    }

    /// Cleaned feature table, the serving-time regressor source.
    pub fn cleaned_table_path(&self) -> PathBuf {
        self.processed_dir().join("df_cleaned.csv")
    }

    /// Training block of the feature table.
    pub fn train_table_path(&self) -> PathBuf {
        self.processed_dir().join("df_train.csv")
    }

    /// Held-out test block of the feature table.
    pub fn test_table_path(&self) -> PathBuf {
        self.processed_dir().join("df_test.csv")
    }

    /// Exogenous regressors of the training block.
    pub fn train_exog_path(&self) -> PathBuf {
        self.processed_dir().join("exog_train.csv")
    }

    /// Exogenous regressors of the test block.
    pub fn test_exog_path(&self) -> PathBuf {
        self.processed_dir().join("exog_test.csv")
    }

    /// Directory holding serialized model artifacts.
    pub fn models_dir(&self) -> PathBuf {
        self.data_dir.join("models")
    }

    /// Serialized fitted model artifact.
    pub fn model_path(&self) -> PathBuf {
        self.models_dir().join("arima_model.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_path_lowercases_and_strips_caret() {
        let config = Config::new("/tmp/data");
        let path = config.raw_prices_path("^GSPC");
        assert!(path.ends_with("raw/gspc_stock_prices.csv"));

        let path = config.raw_prices_path("NVDA");
        assert!(path.ends_with("raw/nvda_stock_prices.csv"));
    }

    #[test]
    fn artifact_paths_share_the_data_dir() {
        let config = Config::new("base");
        assert!(config.cleaned_table_path().starts_with("base"));
        assert!(config.model_path().starts_with("base"));
        assert_eq!(config.model_path().extension().unwrap(), "json");
    }
}
