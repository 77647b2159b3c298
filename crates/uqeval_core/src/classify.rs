//! Partition a result set by the rank of each entry's values

use ndarray::ArrayD;

use crate::model::ResultSet;

/// Structural shape of one entry's values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    /// Scalar or rank-0 array
    Zero,
    /// Single sequence
    One,
    /// Rank 2 or higher
    Multi(usize),
}

impl Rank {
    #[must_use]
    pub fn of(values: &ArrayD<f64>) -> Self {
        match values.ndim() {
            0 => Rank::Zero,
            1 => Rank::One,
            n => Rank::Multi(n),
        }
    }
}

/// Names of a result set split into 0D, 1D and 2D-or-higher buckets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dimensionality {
    pub zero: Vec<String>,
    pub one: Vec<String>,
    pub two: Vec<String>,
}

impl Dimensionality {
    /// Total number of classified names
    #[must_use]
    pub fn len(&self) -> usize {
        self.zero.len() + self.one.len() + self.two.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classify every entry of `results` by the rank of its values.
///
/// Adaptivity plays no part here, and the partition is recomputed for every
/// result set since a malformed sample may change an entry's shape.
#[must_use]
pub fn classify(results: &ResultSet) -> Dimensionality {
    let mut buckets = Dimensionality::default();

    for (name, entry) in results.iter() {
        let bucket = match Rank::of(&entry.values) {
            Rank::Zero => &mut buckets.zero,
            Rank::One => &mut buckets.one,
            Rank::Multi(_) => &mut buckets.two,
        };
        bucket.push(name.to_string());
    }

    buckets
}
