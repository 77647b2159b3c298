//! Sample points in parameter space

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::error::NodeError;

/// One sampled point: ordered values paired 1:1 with unique parameter names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterNode {
    names: Vec<String>,
    values: Vec<f64>,
}

impl ParameterNode {
    pub fn new<S: Into<String>>(
        names: impl IntoIterator<Item = S>,
        values: impl IntoIterator<Item = f64>,
    ) -> Result<Self, NodeError> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let values: Vec<f64> = values.into_iter().collect();

        if names.len() != values.len() {
            return Err(NodeError::LengthMismatch {
                names: names.len(),
                values: values.len(),
            });
        }

        let mut seen = FxHashSet::default();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(NodeError::DuplicateName(name.clone()));
            }
        }

        Ok(Self { names, values })
    }

    /// Node for a model with a single uncertain parameter
    #[must_use]
    pub fn single(name: impl Into<String>, value: f64) -> Self {
        Self {
            names: vec![name.into()],
            values: vec![value],
        }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value bound to `name`, if the node has that parameter
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }

    /// `(name, value)` pairs in node order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}
