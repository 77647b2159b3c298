use std::collections::BTreeMap;

use ndarray::ArrayD;
use serde::Serialize;

use super::trace::{RawTrace, nan_scalar};
use crate::error::FeatureComputationError;
use crate::spline::Spline;

/// Feature name to derived trace, from one feature-extraction invocation
pub type FeatureResult = BTreeMap<String, RawTrace>;

/// One named result of a sample: the model's own trace or a feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEntry {
    pub values: ArrayD<f64>,
    pub grid: ArrayD<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpolation: Option<Spline>,
}

impl ResultEntry {
    /// Normalise a raw trace, replacing absent parts with NaN
    #[must_use]
    pub fn from_trace(trace: RawTrace) -> Self {
        Self {
            values: trace.values.unwrap_or_else(nan_scalar),
            grid: trace.grid.unwrap_or_else(nan_scalar),
            interpolation: None,
        }
    }

    /// True when every grid point is NaN
    #[must_use]
    pub fn grid_is_absent(&self) -> bool {
        self.grid.iter().all(|v| v.is_nan())
    }
}

/// `(grid-or-absent, values, interpolation-or-absent)` result shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyRecord {
    pub grid: Option<ArrayD<f64>>,
    pub values: ArrayD<f64>,
    pub interpolation: Option<Spline>,
}

/// All named results of one sample: the model plus every feature
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    entries: BTreeMap<String, ResultEntry>,
}

impl ResultSet {
    /// Combine the model trace with all feature traces.
    ///
    /// The model is stored under `model_name` and each feature under its own
    /// name. A feature that reuses the model's name is rejected.
    pub fn merge(
        model_name: &str,
        model_trace: RawTrace,
        features: FeatureResult,
    ) -> Result<Self, FeatureComputationError> {
        let mut entries = BTreeMap::new();
        entries.insert(model_name.to_string(), ResultEntry::from_trace(model_trace));

        for (feature, trace) in features {
            if feature == model_name {
                return Err(FeatureComputationError::NameCollision { feature });
            }
            entries.insert(feature, ResultEntry::from_trace(trace));
        }

        Ok(Self { entries })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResultEntry> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ResultEntry> {
        self.entries.get_mut(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResultEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert to the legacy 3-element record shape
    #[must_use]
    pub fn into_legacy(self) -> BTreeMap<String, LegacyRecord> {
        self.entries
            .into_iter()
            .map(|(name, entry)| {
                let grid = (!entry.grid_is_absent()).then_some(entry.grid);
                let record = LegacyRecord {
                    grid,
                    values: entry.values,
                    interpolation: entry.interpolation,
                };
                (name, record)
            })
            .collect()
    }
}

impl IntoIterator for ResultSet {
    type Item = (String, ResultEntry);
    type IntoIter = std::collections::btree_map::IntoIter<String, ResultEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
