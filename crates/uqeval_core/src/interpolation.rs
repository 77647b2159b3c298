//! Attach splines to adaptive entries of a result set

use tracing::debug;

use crate::classify::classify;
use crate::error::{DimensionalityError, EvaluationError, UnsupportedInterpolationError};
use crate::model::{AdaptiveSet, ResultSet};
use crate::spline::Spline;

/// Fit a spline for every adaptive 1D entry of `results`.
///
/// Checks run in this order, all before any spline is fitted:
///
/// 1. an adaptive 0D entry fails with [`DimensionalityError::ZeroDimensional`]
/// 2. an adaptive 1D entry whose grid holds NaN or does not line up with its
///    values fails with [`DimensionalityError::MissingGrid`]
/// 3. an adaptive entry of rank 2 or more fails with
///    [`UnsupportedInterpolationError`]
///
/// Entries outside `adaptive` are returned unchanged.
pub fn create_interpolations(
    mut results: ResultSet,
    adaptive: &AdaptiveSet,
) -> Result<ResultSet, EvaluationError> {
    let buckets = classify(&results);

    if let Some(name) = buckets.zero.iter().find(|name| adaptive.contains(name)) {
        return Err(DimensionalityError::ZeroDimensional { name: name.clone() }.into());
    }

    let targets: Vec<&String> = buckets
        .one
        .iter()
        .filter(|name| adaptive.contains(name))
        .collect();

    for name in &targets {
        let Some(entry) = results.get(name) else {
            continue;
        };
        let grid_usable = entry.grid.ndim() == 1
            && entry.grid.len() == entry.values.len()
            && !entry.grid.iter().any(|v| v.is_nan());
        if !grid_usable {
            return Err(DimensionalityError::MissingGrid {
                name: (*name).clone(),
            }
            .into());
        }
    }

    if let Some(name) = buckets.two.iter().find(|name| adaptive.contains(name)) {
        let rank = results.get(name).map_or(2, |entry| entry.values.ndim());
        return Err(UnsupportedInterpolationError {
            name: name.clone(),
            rank,
        }
        .into());
    }

    for name in targets {
        let Some(entry) = results.get_mut(name) else {
            continue;
        };
        let grid: Vec<f64> = entry.grid.iter().copied().collect();
        let values: Vec<f64> = entry.values.iter().copied().collect();

        let spline = Spline::fit(&grid, &values).map_err(|source| EvaluationError::SplineFit {
            name: name.clone(),
            source,
        })?;
        debug!(name = %name, points = spline.len(), "fitted interpolation");
        entry.interpolation = Some(spline);
    }

    Ok(results)
}
