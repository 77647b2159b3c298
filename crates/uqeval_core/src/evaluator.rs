//! One unit of work: evaluate the model at one parameter node
//!
//! ```ignore
//! use uqeval_core::{Evaluator, ExternalInvoker, FeatureBridge, ParameterNode};
//!
//! let evaluator = Evaluator::new(ExternalInvoker::new(config), FeatureBridge::None);
//! let node = ParameterNode::new(["gbar_Na", "gbar_K"], [120.0, 36.0])?;
//! let results = evaluator.evaluate(&node)?;
//! ```

use std::collections::BTreeMap;
use std::error::Error as _;
use std::sync::Arc;

use tracing::error;

use crate::error::EvaluationError;
use crate::features::FeatureBridge;
use crate::interpolation::create_interpolations;
use crate::invoke::ModelInvoker;
use crate::model::{AdaptiveSet, LegacyRecord, ParameterNode, ResultSet};

/// Runs invocation, feature extraction, merging and interpolation for one
/// sample and logs any failure before handing it back
#[derive(Clone)]
pub struct Evaluator {
    invoker: Arc<dyn ModelInvoker>,
    features: FeatureBridge,
    adaptive: AdaptiveSet,
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("model", &self.invoker.model_name())
            .field("features", &self.features)
            .field("adaptive", &self.adaptive)
            .finish()
    }
}

impl Evaluator {
    /// The adaptive set is derived from the model's adaptive flag and the
    /// capability's declared adaptive features
    pub fn new(invoker: impl ModelInvoker + 'static, features: FeatureBridge) -> Self {
        let adaptive = AdaptiveSet::from_parts(
            invoker.model_name(),
            invoker.adaptive_model(),
            features.adaptive_features(),
        );
        Self {
            invoker: Arc::new(invoker),
            features,
            adaptive,
        }
    }

    /// Replace the derived adaptive set
    #[must_use]
    pub fn with_adaptive(mut self, adaptive: AdaptiveSet) -> Self {
        self.adaptive = adaptive;
        self
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        self.invoker.model_name()
    }

    #[must_use]
    pub fn adaptive(&self) -> &AdaptiveSet {
        &self.adaptive
    }

    /// Evaluate the pipeline for `node`.
    ///
    /// Every failure is logged once here, with its stage and full cause chain,
    /// and returned unchanged. No partial result set is ever returned.
    pub fn evaluate(&self, node: &ParameterNode) -> Result<ResultSet, EvaluationError> {
        self.run(node).inspect_err(|err| {
            error!(
                model = %self.invoker.model_name(),
                stage = %err.stage(),
                parameters = ?node,
                "evaluation failed: {}",
                error_chain(err)
            );
        })
    }

    /// Same as [`Evaluator::evaluate`] but in the legacy record shape
    pub fn evaluate_legacy(
        &self,
        node: &ParameterNode,
    ) -> Result<BTreeMap<String, LegacyRecord>, EvaluationError> {
        self.evaluate(node).map(ResultSet::into_legacy)
    }

    fn run(&self, node: &ParameterNode) -> Result<ResultSet, EvaluationError> {
        let trace = self.invoker.invoke(node)?;
        let features = self.features.compute(&trace)?;
        let results = ResultSet::merge(self.invoker.model_name(), trace, features)?;
        create_interpolations(results, &self.adaptive)
    }
}

/// `err: cause: cause ...` for the whole source chain
pub fn error_chain(err: &EvaluationError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
