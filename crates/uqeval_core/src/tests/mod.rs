//! Integration tests for the evaluation pipeline
//!
//! Tests are organized by topic:
//! - `interpolation` - Adaptive entries, spline attachment and rejections
//! - `in_process` - In-process model invocation and postprocessing
//! - `external` - Model executables, artifact exchange and cleanup
//! - `features` - Feature bridges, legacy calculators and the registry
//! - `evaluator` - End-to-end evaluation and error reporting

#[cfg(unix)]
mod external;
mod in_process;
mod interpolation;

use ndarray::{Array1, ArrayD};

use crate::error::BoxError;
use crate::invoke::Model;
use crate::model::{ModelOutput, ParameterNode, RawTrace};

type RunFn = dyn Fn(&ParameterNode) -> Result<ModelOutput, BoxError> + Send + Sync;
type PostprocessFn = dyn Fn(RawTrace) -> Result<RawTrace, BoxError> + Send + Sync;

/// Model whose run and postprocess are plain closures
pub(crate) struct ClosureModel {
    name: String,
    adaptive: bool,
    run: Box<RunFn>,
    postprocess: Option<Box<PostprocessFn>>,
}

impl ClosureModel {
    pub(crate) fn new(
        name: &str,
        run: impl Fn(&ParameterNode) -> Result<ModelOutput, BoxError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            adaptive: false,
            run: Box::new(run),
            postprocess: None,
        }
    }

    pub(crate) fn adaptive(mut self) -> Self {
        self.adaptive = true;
        self
    }

    pub(crate) fn with_postprocess(
        mut self,
        postprocess: impl Fn(RawTrace) -> Result<RawTrace, BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.postprocess = Some(Box::new(postprocess));
        self
    }
}

impl Model for ClosureModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn adaptive(&self) -> bool {
        self.adaptive
    }

    fn run(&self, parameters: &ParameterNode) -> Result<ModelOutput, BoxError> {
        (self.run)(parameters)
    }

    fn postprocess(&self, trace: RawTrace) -> Result<RawTrace, BoxError> {
        match &self.postprocess {
            Some(postprocess) => postprocess(trace),
            None => Ok(trace),
        }
    }
}

/// `[0, 1, ..., n-1]` as a 1D array
pub(crate) fn range(n: usize) -> ArrayD<f64> {
    Array1::from_iter((0..n).map(|i| i as f64)).into_dyn()
}

/// Model returning `t = U = [0..9]`
pub(crate) fn linear_model(name: &str) -> ClosureModel {
    ClosureModel::new(name, |_| {
        Ok(ModelOutput::pair(Some(range(10)), Some(range(10))))
    })
}
