//! Batch driver: evaluate every node of a run over a rayon pool
//!
//! Each node is one independent unit of work. Failures are recorded per node
//! and never stop the batch; results come back in node order, tagged with the
//! node index.

use jiff::Timestamp;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};
use uqeval_core::error::FeatureComputationError;
use uqeval_core::{
    Evaluator, ExternalInvoker, FeatureBridge, FeatureRegistry, ParameterNode, ResultSet, Stage,
    error_chain,
};

use crate::config::{ConfigError, RunConfig};

/// Errors that stop a run before any node is evaluated
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("feature capability: {0}")]
    Features(#[from] FeatureComputationError),

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// What happened to one node
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Completed { results: ResultSet },
    Failed { stage: Stage, message: String },
}

#[derive(Debug, Serialize)]
pub struct NodeReport {
    pub index: usize,
    pub parameters: ParameterNode,
    pub outcome: Outcome,
}

impl NodeReport {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, Outcome::Completed { .. })
    }
}

/// Outcome of a whole batch
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub model: String,
    pub started: Timestamp,
    pub finished: Timestamp,
    pub nodes: Vec<NodeReport>,
}

impl RunReport {
    #[must_use]
    pub fn completed(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_completed()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.nodes.len() - self.completed()
    }
}

/// Evaluator for the configured model and feature capability
pub fn build_evaluator(
    config: &RunConfig,
    registry: &FeatureRegistry,
) -> Result<Evaluator, RunError> {
    let features = match &config.features {
        None => FeatureBridge::None,
        Some(features) => registry
            .resolve(&features.capability)?
            .with_options(features.options.clone()),
    };
    Ok(Evaluator::new(
        ExternalInvoker::new(config.model.clone()),
        features,
    ))
}

/// Evaluate every node of `config`.
///
/// `threads` overrides the configured worker count.
pub fn run(
    config: &RunConfig,
    registry: &FeatureRegistry,
    threads: Option<usize>,
) -> Result<RunReport, RunError> {
    let nodes = config.parameter_nodes()?;
    let evaluator = build_evaluator(config, registry)?;

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = threads.or(config.threads) {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    info!(
        model = %evaluator.model_name(),
        nodes = nodes.len(),
        threads = pool.current_num_threads(),
        "starting run"
    );

    let started = Timestamp::now();
    let reports: Vec<NodeReport> = pool.install(|| {
        nodes
            .into_par_iter()
            .enumerate()
            .map(|(index, node)| evaluate_node(&evaluator, index, node))
            .collect()
    });
    let report = RunReport {
        model: evaluator.model_name().to_string(),
        started,
        finished: Timestamp::now(),
        nodes: reports,
    };

    if report.failed() > 0 {
        warn!(
            completed = report.completed(),
            failed = report.failed(),
            "run finished with failed nodes"
        );
    } else {
        info!(completed = report.completed(), "run finished");
    }
    Ok(report)
}

fn evaluate_node(evaluator: &Evaluator, index: usize, parameters: ParameterNode) -> NodeReport {
    let outcome = match evaluator.evaluate(&parameters) {
        Ok(results) => Outcome::Completed { results },
        Err(err) => Outcome::Failed {
            stage: err.stage(),
            message: error_chain(&err),
        },
    };
    NodeReport {
        index,
        parameters,
        outcome,
    }
}
