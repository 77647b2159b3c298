use crate::error::{EvaluationError, ModelExecutionError};
use crate::model::{ParameterNode, RawTrace};

use super::{Model, ModelInvoker};

/// Invokes a [`Model`] in the calling thread
#[derive(Debug, Clone)]
pub struct InProcessInvoker<M> {
    model: M,
}

impl<M: Model> InProcessInvoker<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

impl<M: Model> ModelInvoker for InProcessInvoker<M> {
    fn model_name(&self) -> &str {
        self.model.name()
    }

    fn adaptive_model(&self) -> bool {
        self.model.adaptive()
    }

    fn invoke(&self, node: &ParameterNode) -> Result<RawTrace, EvaluationError> {
        let output = self
            .model
            .run(node)
            .map_err(ModelExecutionError::Run)?;

        let trace = RawTrace::try_from(output)?;

        let trace = self
            .model
            .postprocess(trace)
            .map_err(ModelExecutionError::Postprocess)?;

        Ok(trace)
    }
}
