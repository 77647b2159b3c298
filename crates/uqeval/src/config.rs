//! Run configuration loaded from YAML
//!
//! ```yaml
//! model:
//!   name: hodgkin_huxley
//!   command: [./run_model, --quiet]
//!   save_path: /tmp/uq
//!   adaptive: true
//! features:
//!   capability: spikes
//!   options:
//!     threshold: -30.0
//! parameters: [gbar_Na, gbar_K]
//! nodes:
//!   - [120.0, 36.0]
//!   - [110.0, 40.0]
//! threads: 4
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uqeval_core::ExternalModelConfig;
use uqeval_core::error::NodeError;
use uqeval_core::features::FeatureOptions;
use uqeval_core::model::ParameterNode;

/// Error types for loading a run configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse run configuration: {0}")]
    Parse(String),

    #[error("run configuration names no parameters")]
    NoParameters,

    #[error("model command is empty")]
    EmptyCommand,

    #[error("node {index}: {source}")]
    Node { index: usize, source: NodeError },

    #[error("threads must be at least 1")]
    ZeroThreads,
}

/// Feature capability to run over every model trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Name the capability is registered under
    pub capability: String,

    /// Keyword options forwarded to the capability
    #[serde(default, skip_serializing_if = "FeatureOptions::is_empty")]
    pub options: FeatureOptions,
}

/// Everything needed for one batch of evaluations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub model: ExternalModelConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureConfig>,

    /// Parameter names, in the order node values are given
    pub parameters: Vec<String>,

    /// One row of values per parameter node
    pub nodes: Vec<Vec<f64>>,

    /// Worker count; rayon's default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

impl RunConfig {
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: RunConfig =
            serde_saphyr::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parameters.is_empty() {
            return Err(ConfigError::NoParameters);
        }
        if self.model.command.is_empty() {
            return Err(ConfigError::EmptyCommand);
        }
        if self.threads == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        self.parameter_nodes().map(|_| ())
    }

    /// Bind every row of `nodes` to the parameter names
    pub fn parameter_nodes(&self) -> Result<Vec<ParameterNode>, ConfigError> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, values)| {
                ParameterNode::new(self.parameters.iter().cloned(), values.iter().copied())
                    .map_err(|source| ConfigError::Node { index, source })
            })
            .collect()
    }
}
