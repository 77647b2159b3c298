//! Raw `(grid, values)` traces produced by models and features

use ndarray::{Array1, ArrayD, IxDyn};

use crate::error::ModelExecutionError;

/// Rank-0 array holding NaN, used wherever a grid or value is absent
#[must_use]
pub fn nan_scalar() -> ArrayD<f64> {
    ArrayD::from_elem(IxDyn(&[]), f64::NAN)
}

/// Rank-0 array holding `value`
#[must_use]
pub fn scalar(value: f64) -> ArrayD<f64> {
    ArrayD::from_elem(IxDyn(&[]), value)
}

/// One quantity over an independent variable.
///
/// `grid` is the independent variable (usually time) and `values` the
/// quantity itself: a scalar (rank 0), a sequence (rank 1) or a
/// multi-dimensional array. Either may be absent. When `values` is absent
/// the grid must be absent too.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTrace {
    pub grid: Option<ArrayD<f64>>,
    pub values: Option<ArrayD<f64>>,
}

impl RawTrace {
    #[must_use]
    pub fn new(grid: Option<ArrayD<f64>>, values: Option<ArrayD<f64>>) -> Self {
        Self { grid, values }
    }

    /// Trace with neither grid nor values
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    /// Trace that is a single number without a grid
    #[must_use]
    pub fn scalar(value: f64) -> Self {
        Self {
            grid: None,
            values: Some(scalar(value)),
        }
    }

    /// Build a 1D trace from plain slices
    #[must_use]
    pub fn from_slices(grid: &[f64], values: &[f64]) -> Self {
        Self {
            grid: Some(Array1::from_vec(grid.to_vec()).into_dyn()),
            values: Some(Array1::from_vec(values.to_vec()).into_dyn()),
        }
    }

    /// True when the grid is present and holds at least one non-NaN point
    #[must_use]
    pub fn has_grid(&self) -> bool {
        self.grid
            .as_ref()
            .is_some_and(|grid| !grid.iter().all(|v| v.is_nan()))
    }

    /// A grid without values is not a valid trace
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.values.is_some() || self.grid.is_none()
    }
}

/// What an in-process model run hands back, before it is unpacked into a trace
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelOutput(pub Vec<Option<ArrayD<f64>>>);

impl ModelOutput {
    /// The usual `(t, U)` return
    #[must_use]
    pub fn pair(t: Option<ArrayD<f64>>, u: Option<ArrayD<f64>>) -> Self {
        Self(vec![t, u])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<RawTrace> for ModelOutput {
    fn from(trace: RawTrace) -> Self {
        Self::pair(trace.grid, trace.values)
    }
}

impl From<ArrayD<f64>> for ModelOutput {
    fn from(values: ArrayD<f64>) -> Self {
        Self(vec![Some(values)])
    }
}

impl TryFrom<ModelOutput> for RawTrace {
    type Error = ModelExecutionError;

    fn try_from(output: ModelOutput) -> Result<Self, Self::Error> {
        let returned = output.len();
        let mut items = output.0.into_iter();
        match (items.next(), items.next(), items.next()) {
            (Some(grid), Some(values), None) => Ok(RawTrace { grid, values }),
            _ => Err(ModelExecutionError::MalformedReturn { returned }),
        }
    }
}
