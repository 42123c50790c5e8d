use assert_approx_eq::assert_approx_eq;
use chrono::{Datelike, NaiveDate};
use pretty_assertions::assert_eq;
use price_forecast::features::{reconstruct_close, FEATURE_WARMUP};
use price_forecast::{ExogRow, FeatureTable, ForecastError, PricePoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;
use tempfile::tempdir;

fn next_weekday(mut date: NaiveDate) -> NaiveDate {
    loop {
        date = date.succ_opt().unwrap();
        if date.weekday().number_from_monday() <= 5 {
            return date;
        }
    }
}

/// Random-walk closes over consecutive weekdays.
fn random_walk(len: usize, seed: u64) -> Vec<PricePoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut close = 100.0;
    let mut points = Vec::with_capacity(len);
    for _ in 0..len {
        points.push(PricePoint { date, close });
        close *= (rng.gen_range(-0.02..0.02f64)).exp();
        date = next_weekday(date);
    }
    points
}

#[rstest]
#[case(10)]
#[case(25)]
#[case(100)]
fn output_rows_are_input_minus_warmup(#[case] len: usize) {
    let prices = random_walk(len, 7);
    let table = FeatureTable::from_prices(&prices).unwrap();
    assert_eq!(table.len(), len - FEATURE_WARMUP);

    // Output dates are the input tail, in order
    let expected: Vec<NaiveDate> = prices[FEATURE_WARMUP..].iter().map(|p| p.date).collect();
    assert_eq!(table.dates(), expected);
}

#[rstest]
#[case(0.0)]
#[case(-5.0)]
fn non_positive_close_is_a_domain_error(#[case] bad_close: f64) {
    let mut prices = random_walk(20, 11);
    prices[12].close = bad_close;

    let result = FeatureTable::from_prices(&prices);
    assert!(matches!(result, Err(ForecastError::DomainError(_))));
}

#[rstest]
#[case(0)]
#[case(5)]
#[case(9)]
fn too_short_input_yields_empty_table(#[case] len: usize) {
    let prices = random_walk(len, 3);
    let table = FeatureTable::from_prices(&prices).unwrap();
    assert!(table.is_empty());
}

#[test]
fn no_feature_value_is_missing_or_non_finite() {
    let prices = random_walk(60, 17);
    let table = FeatureTable::from_prices(&prices).unwrap();

    for row in table.rows() {
        assert!(row.close.is_finite());
        assert!(row.close_log.is_finite());
        assert!(row.close_log_diff.is_finite());
        assert!(row.lag_1.is_finite());
        assert!(row.lag_2.is_finite());
        assert!(row.lag_3.is_finite());
        assert!(row.rolling_mean.is_finite());
        assert_eq!(row.year, row.date.year());
        assert_eq!(row.month, row.date.month());
        assert_eq!(row.day, row.date.day());
    }
}

#[test]
fn true_diffs_reconstruct_true_prices() {
    let prices = random_walk(50, 23);
    let table = FeatureTable::from_prices(&prices).unwrap();
    let rows = table.rows();

    // Anchor at the first kept row and cumulate the true diffs of the rest
    let diffs: Vec<f64> = rows[1..].iter().map(|r| r.close_log_diff).collect();
    let reconstructed = reconstruct_close(&diffs, rows[0].close_log);

    assert_eq!(reconstructed.len(), rows.len() - 1);
    for (price, row) in reconstructed.iter().zip(&rows[1..]) {
        assert_approx_eq!(*price, row.close, 1e-9);
    }
}

#[test]
fn exog_frame_projects_feature_columns() {
    let prices = random_walk(40, 31);
    let table = FeatureTable::from_prices(&prices).unwrap();
    let frame = table.exog_frame();

    assert_eq!(frame.len(), table.len());
    assert_eq!(frame.dates(), table.dates());
    for (row, feature) in frame.rows().iter().zip(table.rows()) {
        assert_eq!(row.lag_1, feature.lag_1);
        assert_eq!(row.rolling_mean, feature.rolling_mean);
        assert_eq!(row.year, feature.year);
        assert_eq!(row.to_vec().len(), ExogRow::WIDTH);
    }
}

#[test]
fn csv_round_trip_preserves_the_table() {
    let prices = random_walk(30, 41);
    let table = FeatureTable::from_prices(&prices).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("df_cleaned.csv");
    table.to_csv(&path).unwrap();

    let restored = FeatureTable::from_csv(&path).unwrap();
    assert_eq!(restored, table);
}

#[test]
fn tail_exog_returns_the_most_recent_rows() {
    let prices = random_walk(30, 43);
    let table = FeatureTable::from_prices(&prices).unwrap();

    let tail = table.tail_exog(4).unwrap();
    assert_eq!(tail.len(), 4);
    let last = table.rows().last().unwrap();
    assert_eq!(tail[3], last.exog());

    let result = table.tail_exog(table.len() + 1);
    assert!(matches!(
        result,
        Err(ForecastError::InsufficientHistoryError(_))
    ));
}
