use rustc_hash::FxHashMap;

use super::FeatureBridge;
use crate::error::FeatureComputationError;

/// Named feature capabilities, registered up front by the caller
#[derive(Debug, Clone, Default)]
pub struct FeatureRegistry {
    bridges: FxHashMap<String, FeatureBridge>,
}

impl FeatureRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bridge` under `name`, replacing any earlier registration
    pub fn register(&mut self, name: impl Into<String>, bridge: FeatureBridge) -> &mut Self {
        self.bridges.insert(name.into(), bridge);
        self
    }

    /// The bridge registered under `name`
    pub fn resolve(&self, name: &str) -> Result<FeatureBridge, FeatureComputationError> {
        self.bridges
            .get(name)
            .cloned()
            .ok_or_else(|| FeatureComputationError::UnknownCapability(name.to_string()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bridges.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bridges.keys().map(String::as_str)
    }
}
