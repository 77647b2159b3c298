//! Bridge to external feature-extraction capabilities
//!
//! A capability is handed the model's trace and computes derived traces
//! ("features") from it. Two contracts are supported:
//!
//! - [`FeatureFactory`] / [`FeatureSet`]: the set is built for one trace, then
//!   `preprocess` and `calculate_features` run and every feature comes back as
//!   a full [`RawTrace`].
//! - [`LegacyFeatureFactory`] / [`LegacyFeatureCalculator`]: the calculator is
//!   asked for a list of feature names and returns a bare value (or nothing)
//!   per name. Values are paired with the model's own grid.
//!
//! Capabilities are resolved once, when the bridge is built, usually through a
//! [`FeatureRegistry`]. Which features are adaptive is declared by the factory
//! and never decided here.

mod registry;

pub use registry::FeatureRegistry;

use std::collections::BTreeMap;
use std::sync::Arc;

use ndarray::ArrayD;

use crate::error::{BoxError, FeatureComputationError};
use crate::model::{FeatureResult, RawTrace};

/// Keyword options forwarded to a feature capability
pub type FeatureOptions = BTreeMap<String, serde_json::Value>;

/// Features computed over one model trace
pub trait FeatureSet {
    fn preprocess(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    fn calculate_features(&mut self) -> Result<FeatureResult, BoxError>;
}

/// Builds a [`FeatureSet`] for each model trace
pub trait FeatureFactory: Send + Sync {
    /// Features whose grid varies between samples
    fn adaptive_features(&self) -> Vec<String> {
        Vec::new()
    }

    fn create(
        &self,
        trace: &RawTrace,
        options: &FeatureOptions,
    ) -> Result<Box<dyn FeatureSet>, BoxError>;
}

/// Calculator that returns a bare value per requested feature
pub trait LegacyFeatureCalculator {
    fn calculate_features(
        &mut self,
        requested: &[String],
    ) -> Result<BTreeMap<String, Option<ArrayD<f64>>>, BoxError>;
}

/// Builds a [`LegacyFeatureCalculator`] for each model trace
pub trait LegacyFeatureFactory: Send + Sync {
    fn adaptive_features(&self) -> Vec<String> {
        Vec::new()
    }

    fn create(
        &self,
        trace: &RawTrace,
        options: &FeatureOptions,
    ) -> Result<Box<dyn LegacyFeatureCalculator>, BoxError>;
}

/// The feature capability used by an evaluator
#[derive(Clone, Default)]
pub enum FeatureBridge {
    /// The model's trace is the only result
    #[default]
    None,
    Standard {
        factory: Arc<dyn FeatureFactory>,
        options: FeatureOptions,
    },
    Legacy {
        factory: Arc<dyn LegacyFeatureFactory>,
        requested: Vec<String>,
        options: FeatureOptions,
    },
}

impl std::fmt::Debug for FeatureBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureBridge::None => f.write_str("FeatureBridge::None"),
            FeatureBridge::Standard { options, .. } => f
                .debug_struct("FeatureBridge::Standard")
                .field("options", options)
                .finish_non_exhaustive(),
            FeatureBridge::Legacy {
                requested, options, ..
            } => f
                .debug_struct("FeatureBridge::Legacy")
                .field("requested", requested)
                .field("options", options)
                .finish_non_exhaustive(),
        }
    }
}

impl FeatureBridge {
    pub fn standard(factory: impl FeatureFactory + 'static) -> Self {
        FeatureBridge::Standard {
            factory: Arc::new(factory),
            options: FeatureOptions::new(),
        }
    }

    pub fn legacy<S: Into<String>>(
        factory: impl LegacyFeatureFactory + 'static,
        requested: impl IntoIterator<Item = S>,
    ) -> Self {
        FeatureBridge::Legacy {
            factory: Arc::new(factory),
            requested: requested.into_iter().map(Into::into).collect(),
            options: FeatureOptions::new(),
        }
    }

    /// Replace the keyword options passed to the capability
    #[must_use]
    pub fn with_options(mut self, new_options: FeatureOptions) -> Self {
        match &mut self {
            FeatureBridge::None => {}
            FeatureBridge::Standard { options, .. } | FeatureBridge::Legacy { options, .. } => {
                *options = new_options;
            }
        }
        self
    }

    /// Adaptive features declared by the capability
    #[must_use]
    pub fn adaptive_features(&self) -> Vec<String> {
        match self {
            FeatureBridge::None => Vec::new(),
            FeatureBridge::Standard { factory, .. } => factory.adaptive_features(),
            FeatureBridge::Legacy { factory, .. } => factory.adaptive_features(),
        }
    }

    /// Compute all features over the model's trace
    pub fn compute(&self, trace: &RawTrace) -> Result<FeatureResult, FeatureComputationError> {
        let features = match self {
            FeatureBridge::None => FeatureResult::new(),
            FeatureBridge::Standard { factory, options } => {
                let mut set = factory
                    .create(trace, options)
                    .map_err(FeatureComputationError::Create)?;
                set.preprocess()
                    .map_err(FeatureComputationError::Preprocess)?;
                set.calculate_features()
                    .map_err(FeatureComputationError::Calculate)?
            }
            FeatureBridge::Legacy {
                factory,
                requested,
                options,
            } => {
                if requested.is_empty() {
                    return Ok(FeatureResult::new());
                }
                let mut calculator = factory
                    .create(trace, options)
                    .map_err(FeatureComputationError::Create)?;
                let values = calculator
                    .calculate_features(requested)
                    .map_err(FeatureComputationError::Calculate)?;
                pair_with_model_grid(trace, values)
            }
        };

        if let Some(feature) = features
            .iter()
            .find_map(|(name, trace)| (!trace.is_well_formed()).then(|| name.clone()))
        {
            return Err(FeatureComputationError::Malformed { feature });
        }

        Ok(features)
    }
}

/// Attach the model's grid to bare feature values.
///
/// A missing value becomes an absent trace. A value keeps the model's grid
/// only when that grid is not entirely NaN.
fn pair_with_model_grid(
    trace: &RawTrace,
    values: BTreeMap<String, Option<ArrayD<f64>>>,
) -> FeatureResult {
    let grid = if trace.has_grid() {
        trace.grid.clone()
    } else {
        None
    };

    values
        .into_iter()
        .map(|(name, value)| {
            let feature = match value {
                None => RawTrace::absent(),
                Some(value) => RawTrace::new(grid.clone(), Some(value)),
            };
            (name, feature)
        })
        .collect()
}
