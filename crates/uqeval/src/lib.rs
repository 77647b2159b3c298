//! Batch runner for per-sample model evaluation
//!
//! Loads a YAML run configuration, evaluates the configured model executable
//! at every parameter node over a rayon pool, and produces a JSON report with
//! one outcome per node. Feature capabilities are registered in code through a
//! [`FeatureRegistry`] and selected by name in the configuration.

// ============================================================================
// Core modules
// ============================================================================

pub mod logging;
pub mod run;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{ConfigError, FeatureConfig, RunConfig};
pub use logging::init_logging;
pub use run::{NodeReport, Outcome, RunError, RunReport, build_evaluator, run};
pub use uqeval_core::FeatureRegistry;
