//! Chronological train/test partitioning

use crate::error::{ForecastError, Result};
use crate::features::FeatureTable;

/// Fraction of rows assigned to the training block.
pub const TRAIN_FRACTION: f64 = 0.85;

/// Feature table partitioned into contiguous train and test blocks.
///
/// The test block is strictly chronologically after the train block, and the
/// two blocks concatenated in order reconstruct the original table exactly.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: FeatureTable,
    pub test: FeatureTable,
}

/// Partition at `floor(TRAIN_FRACTION * len)` rows.
///
/// Both blocks must come out non-empty; a table too small to hold out any
/// test rows (or any train rows) is an `InsufficientDataError` rather than a
/// silent zero-row evaluation.
pub fn train_test_split(table: &FeatureTable) -> Result<Split> {
    let n = table.len();
    let boundary = split_boundary(n);
    if boundary == 0 || boundary >= n {
        return Err(ForecastError::InsufficientDataError(format!(
            "cannot split {} rows into non-empty train and test blocks",
            n
        )));
    }

    let train = FeatureTable::from_rows(table.rows()[..boundary].to_vec())?;
    let test = FeatureTable::from_rows(table.rows()[boundary..].to_vec())?;
    Ok(Split { train, test })
}

/// Row-count index of the train/test boundary for a table of `n` rows.
pub fn split_boundary(n: usize) -> usize {
    (n as f64 * TRAIN_FRACTION).floor() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_floor_of_fraction() {
        assert_eq!(split_boundary(100), 85);
        assert_eq!(split_boundary(101), 85);
        assert_eq!(split_boundary(20), 17);
        assert_eq!(split_boundary(0), 0);
    }
}
