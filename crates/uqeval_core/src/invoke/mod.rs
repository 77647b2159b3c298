//! Running the model for one parameter node
//!
//! Two invokers produce a [`RawTrace`] from a [`ParameterNode`]:
//!
//! - [`InProcessInvoker`] calls a [`Model`] implementation directly.
//! - [`ExternalInvoker`] starts a model executable and reads back the arrays
//!   it writes to disk.

mod artifacts;
mod external;
mod in_process;

pub use artifacts::{ArtifactGuard, ArtifactToken, worker_slot};
pub use external::ExternalInvoker;
pub use in_process::InProcessInvoker;

use crate::error::{BoxError, EvaluationError};
use crate::model::{ModelOutput, ParameterNode, RawTrace};

/// A simulation model that runs in the current process
pub trait Model: Send + Sync {
    /// Result name of the model's own trace
    fn name(&self) -> &str;

    /// Whether the model's grid varies between samples
    fn adaptive(&self) -> bool {
        false
    }

    /// Run the model with the node's parameters, returning `(t, U)`
    fn run(&self, parameters: &ParameterNode) -> Result<ModelOutput, BoxError>;

    /// Reshape `(t, U)` after a run; either part may become absent
    fn postprocess(&self, trace: RawTrace) -> Result<RawTrace, BoxError> {
        Ok(trace)
    }
}

/// Produces the raw trace of one evaluation
pub trait ModelInvoker: Send + Sync {
    fn model_name(&self) -> &str;

    fn adaptive_model(&self) -> bool;

    fn invoke(&self, node: &ParameterNode) -> Result<RawTrace, EvaluationError>;
}
