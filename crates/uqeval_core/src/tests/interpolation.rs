//! Interpolation of adaptive entries
//!
//! Tests for `create_interpolations` including:
//! - Splines attached to adaptive 1D entries and exact at the grid points
//! - Rejection of adaptive 0D and 2D entries
//! - Rejection of adaptive 1D entries without a usable grid
//! - Non-adaptive entries passing through untouched

use ndarray::{Array2, arr1};

use super::range;
use crate::error::{DimensionalityError, EvaluationError};
use crate::interpolation::create_interpolations;
use crate::model::{AdaptiveSet, FeatureResult, RawTrace, ResultSet};

/// Result set shaped like a typical sample: model plus 0D, 1D, 2D and
/// missing features
fn sample_results() -> ResultSet {
    let grid = [0.0, 0.7, 1.1, 2.5, 3.0, 4.2, 5.9, 6.0];
    let values: Vec<f64> = grid.iter().map(|x: &f64| x.cos() + 0.5 * x).collect();

    let features = FeatureResult::from([
        ("feature0d".to_string(), RawTrace::scalar(1.0)),
        (
            "feature1d".to_string(),
            RawTrace::from_slices(&grid, &values),
        ),
        (
            "feature2d".to_string(),
            RawTrace::new(
                Some(range(10)),
                Some(Array2::from_shape_fn((2, 10), |(_, j)| j as f64).into_dyn()),
            ),
        ),
        ("feature_invalid".to_string(), RawTrace::absent()),
    ]);
    let model = RawTrace::new(Some(range(10)), Some(range(10)));

    ResultSet::merge("model", model, features).unwrap()
}

#[test]
fn test_adaptive_1d_entries_get_exact_splines() {
    let results = sample_results();
    let adaptive: AdaptiveSet = ["model", "feature1d"].into_iter().collect();

    let results = create_interpolations(results, &adaptive).unwrap();

    for name in ["model", "feature1d"] {
        let entry = results.get(name).unwrap();
        let spline = entry
            .interpolation
            .as_ref()
            .unwrap_or_else(|| panic!("{name} should have an interpolation"));

        for (x, y) in entry.grid.iter().zip(entry.values.iter()) {
            assert!(
                (spline.evaluate(*x) - y).abs() < 1e-9,
                "{name} interpolation not exact at {x}"
            );
        }
    }
}

#[test]
fn test_non_adaptive_entries_are_untouched() {
    let before = sample_results();
    let adaptive: AdaptiveSet = ["model"].into_iter().collect();

    let after = create_interpolations(before.clone(), &adaptive).unwrap();

    for name in ["feature1d", "feature2d"] {
        assert_eq!(before.get(name), after.get(name), "{name} changed");
    }
    // NaN grids never compare equal, so check these entries field by field
    let scalar = after.get("feature0d").unwrap();
    assert_eq!(scalar.values, before.get("feature0d").unwrap().values);
    assert!(scalar.interpolation.is_none());

    let missing = after.get("feature_invalid").unwrap();
    assert!(missing.interpolation.is_none());
    assert_eq!(missing.values.ndim(), 0);
    assert!(after.get("model").unwrap().interpolation.is_some());
}

#[test]
fn test_empty_adaptive_set_changes_nothing() {
    let results = sample_results();
    let after = create_interpolations(results, &AdaptiveSet::new()).unwrap();
    assert!(after.iter().all(|(_, entry)| entry.interpolation.is_none()));
}

#[test]
fn test_adaptive_0d_feature_is_rejected() {
    let adaptive: AdaptiveSet = ["feature0d"].into_iter().collect();

    let err = create_interpolations(sample_results(), &adaptive).unwrap_err();

    match &err {
        EvaluationError::Dimensionality(DimensionalityError::ZeroDimensional { name }) => {
            assert_eq!(name, "feature0d");
        }
        other => panic!("expected a 0D dimensionality error, got {other:?}"),
    }
    assert!(err.to_string().contains("feature0d"));
}

#[test]
fn test_adaptive_missing_feature_is_rejected_as_0d() {
    let adaptive: AdaptiveSet = ["feature_invalid"].into_iter().collect();

    let err = create_interpolations(sample_results(), &adaptive).unwrap_err();

    assert!(matches!(
        err,
        EvaluationError::Dimensionality(DimensionalityError::ZeroDimensional { .. })
    ));
}

#[test]
fn test_adaptive_2d_feature_is_unsupported() {
    let adaptive: AdaptiveSet = ["feature2d"].into_iter().collect();

    let err = create_interpolations(sample_results(), &adaptive).unwrap_err();

    match err {
        EvaluationError::UnsupportedInterpolation(e) => {
            assert_eq!(e.name, "feature2d");
            assert_eq!(e.rank, 2);
        }
        other => panic!("expected unsupported interpolation, got {other:?}"),
    }
}

#[test]
fn test_adaptive_1d_without_grid_is_rejected() {
    let features = FeatureResult::from([(
        "no_grid".to_string(),
        RawTrace::new(None, Some(range(10))),
    )]);
    let results = ResultSet::merge("model", RawTrace::absent(), features).unwrap();
    let adaptive: AdaptiveSet = ["no_grid"].into_iter().collect();

    let err = create_interpolations(results, &adaptive).unwrap_err();

    assert_eq!(
        err.to_string(),
        "no_grid does not return any grid values, unable to perform interpolation"
    );
}

#[test]
fn test_adaptive_1d_with_partial_nan_grid_is_rejected() {
    let features = FeatureResult::from([(
        "gappy".to_string(),
        RawTrace::new(
            Some(arr1(&[0.0, f64::NAN, 2.0, 3.0]).into_dyn()),
            Some(arr1(&[0.0, 1.0, 2.0, 3.0]).into_dyn()),
        ),
    )]);
    let results = ResultSet::merge("model", RawTrace::absent(), features).unwrap();
    let adaptive: AdaptiveSet = ["gappy"].into_iter().collect();

    let err = create_interpolations(results, &adaptive).unwrap_err();

    assert!(matches!(
        err,
        EvaluationError::Dimensionality(DimensionalityError::MissingGrid { .. })
    ));
}

#[test]
fn test_spline_failure_names_the_entry() {
    let features = FeatureResult::from([(
        "short".to_string(),
        RawTrace::from_slices(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0]),
    )]);
    let results = ResultSet::merge("model", RawTrace::absent(), features).unwrap();
    let adaptive: AdaptiveSet = ["short"].into_iter().collect();

    let err = create_interpolations(results, &adaptive).unwrap_err();

    match err {
        EvaluationError::SplineFit { name, .. } => assert_eq!(name, "short"),
        other => panic!("expected a spline fit error, got {other:?}"),
    }
}

#[test]
fn test_adaptive_name_missing_from_results_is_ignored() {
    let adaptive: AdaptiveSet = ["not_computed"].into_iter().collect();
    let results = create_interpolations(sample_results(), &adaptive).unwrap();
    assert_eq!(results.len(), 5);
}

#[test]
fn test_adaptive_1d_with_short_grid_is_rejected() {
    let features = FeatureResult::from([(
        "misaligned".to_string(),
        RawTrace::from_slices(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0, 3.0, 4.0]),
    )]);
    let results = ResultSet::merge("model", RawTrace::absent(), features).unwrap();
    let adaptive: AdaptiveSet = ["misaligned"].into_iter().collect();

    let err = create_interpolations(results, &adaptive).unwrap_err();

    assert!(matches!(
        err,
        EvaluationError::Dimensionality(DimensionalityError::MissingGrid { .. })
    ));
}

#[test]
fn test_grid_problem_is_reported_before_unsupported_rank() {
    let features = FeatureResult::from([
        (
            "feature2d".to_string(),
            RawTrace::new(
                Some(range(10)),
                Some(Array2::from_shape_fn((2, 10), |(i, j)| (i + j) as f64).into_dyn()),
            ),
        ),
        (
            "gappy".to_string(),
            RawTrace::new(
                Some(arr1(&[0.0, 1.0, f64::NAN, 3.0]).into_dyn()),
                Some(arr1(&[0.0, 1.0, 2.0, 3.0]).into_dyn()),
            ),
        ),
    ]);
    let results = ResultSet::merge("model", RawTrace::absent(), features).unwrap();
    let adaptive: AdaptiveSet = ["feature2d", "gappy"].into_iter().collect();

    let err = create_interpolations(results, &adaptive).unwrap_err();

    match err {
        EvaluationError::Dimensionality(DimensionalityError::MissingGrid { name }) => {
            assert_eq!(name, "gappy");
        }
        other => panic!("expected a missing grid error, got {other:?}"),
    }
}
