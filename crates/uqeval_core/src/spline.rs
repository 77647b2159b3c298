//! Cubic interpolating splines for adaptive traces
//!
//! Adaptive models and features report their values on a grid that differs
//! from sample to sample. Each such trace gets a [`Spline`] so the aggregator
//! can later resample every sample onto one shared grid.
//!
//! The spline passes through every node and uses not-a-knot end conditions:
//! the third derivative is continuous across the second and second-to-last
//! nodes. This is the same interpolant as a degree-3 B-spline with knots at
//! the interior data points, so four points determine a single cubic.
//! Outside the grid the end polynomials are extended.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum number of nodes for a cubic fit
pub const MIN_POINTS: usize = 4;

/// Errors returned when a spline cannot be fitted
#[derive(Debug, Clone, PartialEq)]
pub enum SplineError {
    LengthMismatch { grid: usize, values: usize },
    TooFewPoints { points: usize },
    NotIncreasing { index: usize },
    NonFinite { index: usize },
    CurvatureMismatch { grid: usize, second_derivatives: usize },
}

impl fmt::Display for SplineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplineError::LengthMismatch { grid, values } => write!(
                f,
                "grid has {grid} point(s) but there are {values} value(s)"
            ),
            SplineError::TooFewPoints { points } => write!(
                f,
                "cubic spline needs at least {MIN_POINTS} points, got {points}"
            ),
            SplineError::NotIncreasing { index } => {
                write!(f, "grid must be strictly increasing (at index {index})")
            }
            SplineError::NonFinite { index } => {
                write!(f, "grid and values must be finite (at index {index})")
            }
            SplineError::CurvatureMismatch {
                grid,
                second_derivatives,
            } => write!(
                f,
                "grid has {grid} point(s) but there are {second_derivatives} second derivative(s)"
            ),
        }
    }
}

impl std::error::Error for SplineError {}

/// Fitted cubic spline, stored as nodes plus second derivatives at the nodes
///
/// Deserialized splines go through the same checks as [`Spline::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SplineParts")]
pub struct Spline {
    grid: Vec<f64>,
    values: Vec<f64>,
    second_derivatives: Vec<f64>,
}

/// Unchecked serialized form of [`Spline`]
#[derive(Deserialize)]
struct SplineParts {
    grid: Vec<f64>,
    values: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl TryFrom<SplineParts> for Spline {
    type Error = SplineError;

    fn try_from(parts: SplineParts) -> Result<Self, Self::Error> {
        validate(&parts.grid, &parts.values)?;
        if parts.second_derivatives.len() != parts.grid.len() {
            return Err(SplineError::CurvatureMismatch {
                grid: parts.grid.len(),
                second_derivatives: parts.second_derivatives.len(),
            });
        }

        Ok(Self {
            grid: parts.grid,
            values: parts.values,
            second_derivatives: parts.second_derivatives,
        })
    }
}

impl Spline {
    /// Fit an interpolating cubic spline through `(grid, values)`.
    pub fn fit(grid: &[f64], values: &[f64]) -> Result<Self, SplineError> {
        validate(grid, values)?;

        let second_derivatives = solve_second_derivatives(grid, values);

        Ok(Self {
            grid: grid.to_vec(),
            values: values.to_vec(),
            second_derivatives,
        })
    }

    /// Spline value at `x`
    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        let j = self.interval(x);
        let (x0, x1) = (self.grid[j], self.grid[j + 1]);
        let (y0, y1) = (self.values[j], self.values[j + 1]);
        let (m0, m1) = (self.second_derivatives[j], self.second_derivatives[j + 1]);
        let h = x1 - x0;

        let a = x1 - x;
        let b = x - x0;

        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }

    /// Evaluate at every point of `xs`
    #[must_use]
    pub fn evaluate_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }

    /// First derivative at `x`
    #[must_use]
    pub fn derivative(&self, x: f64) -> f64 {
        let j = self.interval(x);
        let (x0, x1) = (self.grid[j], self.grid[j + 1]);
        let (y0, y1) = (self.values[j], self.values[j + 1]);
        let (m0, m1) = (self.second_derivatives[j], self.second_derivatives[j + 1]);
        let h = x1 - x0;

        let a = x1 - x;
        let b = x - x0;

        -m0 * a * a / (2.0 * h) + m1 * b * b / (2.0 * h) + (y1 - y0) / h - (m1 - m0) * h / 6.0
    }

    #[must_use]
    pub fn grid(&self) -> &[f64] {
        &self.grid
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// First and last grid point
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        (self.grid[0], self.grid[self.grid.len() - 1])
    }

    /// Index `j` of the polynomial piece `[x_j, x_{j+1}]` used for `x`
    fn interval(&self, x: f64) -> usize {
        let last = self.grid.len() - 2;
        self.grid
            .partition_point(|&node| node <= x)
            .saturating_sub(1)
            .min(last)
    }
}

fn validate(grid: &[f64], values: &[f64]) -> Result<(), SplineError> {
    if grid.len() != values.len() {
        return Err(SplineError::LengthMismatch {
            grid: grid.len(),
            values: values.len(),
        });
    }
    if grid.len() < MIN_POINTS {
        return Err(SplineError::TooFewPoints { points: grid.len() });
    }
    if let Some(index) = grid
        .iter()
        .zip(values)
        .position(|(x, y)| !x.is_finite() || !y.is_finite())
    {
        return Err(SplineError::NonFinite { index });
    }
    if let Some(index) = grid.windows(2).position(|w| w[1] <= w[0]) {
        return Err(SplineError::NotIncreasing { index: index + 1 });
    }
    Ok(())
}

/// Solve for the second derivatives `M_0..M_{n-1}` under not-a-knot conditions.
///
/// The interior continuity equations form a tridiagonal system in
/// `M_1..M_{n-2}` once `M_0` and `M_{n-1}` are eliminated with the
/// not-a-knot conditions, so the Thomas algorithm applies.
fn solve_second_derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let slope: Vec<f64> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

    // Row r holds the equation centred on node i = r + 1
    let m = n - 2;
    let mut sub = vec![0.0; m];
    let mut diag = vec![0.0; m];
    let mut sup = vec![0.0; m];
    let mut rhs = vec![0.0; m];

    for r in 0..m {
        let i = r + 1;
        sub[r] = h[i - 1];
        diag[r] = 2.0 * (h[i - 1] + h[i]);
        sup[r] = h[i];
        rhs[r] = 6.0 * (slope[i] - slope[i - 1]);
    }

    // M_0 = M_1 (1 + h0/h1) - M_2 h0/h1
    let (h0, h1) = (h[0], h[1]);
    diag[0] = (h0 + h1) * (h0 + 2.0 * h1) / h1;
    sup[0] = (h1 * h1 - h0 * h0) / h1;

    // M_{n-1} = M_{n-2} (1 + b/a) - M_{n-3} b/a
    let (a, b) = (h[n - 3], h[n - 2]);
    diag[m - 1] = (2.0 * a + b) * (a + b) / a;
    sub[m - 1] = (a * a - b * b) / a;

    // Forward sweep
    for r in 1..m {
        let w = sub[r] / diag[r - 1];
        diag[r] -= w * sup[r - 1];
        rhs[r] -= w * rhs[r - 1];
    }

    // Back substitution
    let mut interior = vec![0.0; m];
    interior[m - 1] = rhs[m - 1] / diag[m - 1];
    for r in (0..m - 1).rev() {
        interior[r] = (rhs[r] - sup[r] * interior[r + 1]) / diag[r];
    }

    let mut second = Vec::with_capacity(n);
    second.push(interior[0] * (1.0 + h0 / h1) - interior[1] * h0 / h1);
    second.extend_from_slice(&interior);
    second.push(interior[m - 1] * (1.0 + b / a) - interior[m - 2] * b / a);
    second
}
