//! Configuration for out-of-process models
//!
//! ```ignore
//! use uqeval_core::config::ExternalModelConfig;
//!
//! let config = ExternalModelConfig::new("hodgkin_huxley", ["./run_model", "--quiet"], "/tmp/uq")
//!     .adaptive(true);
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// How to run a model executable and where it exchanges artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalModelConfig {
    /// Result name of the model's own trace
    pub name: String,

    /// Base command; the protocol arguments are appended to it
    pub command: Vec<String>,

    /// Directory the executable writes its `t` and `U` arrays to
    pub save_path: PathBuf,

    /// The model's grid varies between samples
    #[serde(default)]
    pub adaptive: bool,

    /// Discard whatever the executable prints on stdout
    #[serde(default = "default_true")]
    pub suppress_model_output: bool,
}

impl ExternalModelConfig {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        command: impl IntoIterator<Item = S>,
        save_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into_iter().map(Into::into).collect(),
            save_path: save_path.into(),
            adaptive: false,
            suppress_model_output: true,
        }
    }

    #[must_use]
    pub fn adaptive(mut self, adaptive: bool) -> Self {
        self.adaptive = adaptive;
        self
    }

    #[must_use]
    pub fn suppress_model_output(mut self, suppress: bool) -> Self {
        self.suppress_model_output = suppress;
        self
    }
}
