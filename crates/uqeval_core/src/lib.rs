//! Per-sample evaluation core for uncertainty quantification
//!
//! This crate evaluates a simulation model at one sampled point in parameter
//! space and turns the heterogeneous outputs into a uniform result set that a
//! cross-sample aggregator can consume. It supports:
//! - In-process models and external model executables
//! - Feature extraction through caller-supplied capabilities
//! - Classification of results into 0D, 1D and 2D entries
//! - Cubic spline interpolation of adaptive (irregular-grid) traces
//!
//! Each call to [`Evaluator::evaluate`] is one independent unit of work meant
//! to run on one worker of a pool. Sampling, statistics and the pool itself
//! belong to the caller.
//!
//! ```ignore
//! use uqeval_core::{Evaluator, FeatureBridge, InProcessInvoker, ParameterNode};
//!
//! let evaluator = Evaluator::new(InProcessInvoker::new(my_model), FeatureBridge::None);
//! let node = ParameterNode::new(["a", "b"], [0.3, 1.2])?;
//! let results = evaluator.evaluate(&node)?;
//! let spline = results.get("my_model").and_then(|e| e.interpolation.as_ref());
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod classify;
pub mod error;
pub mod evaluator;
pub mod features;
pub mod interpolation;
pub mod invoke;
pub mod spline;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use classify::{Dimensionality, Rank, classify};
pub use config::ExternalModelConfig;
pub use error::{EvaluationError, Stage};
pub use evaluator::{Evaluator, error_chain};
pub use features::{FeatureBridge, FeatureRegistry};
pub use interpolation::create_interpolations;
pub use invoke::{ExternalInvoker, InProcessInvoker, Model, ModelInvoker};
pub use model::{AdaptiveSet, ParameterNode, RawTrace, ResultEntry, ResultSet};
pub use spline::Spline;
