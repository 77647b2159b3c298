//! In-process model invocation

use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ClosureModel, linear_model, range};
use crate::error::{EvaluationError, ModelExecutionError, Stage};
use crate::invoke::{InProcessInvoker, ModelInvoker};
use crate::model::{ModelOutput, ParameterNode, RawTrace, scalar};

#[test]
fn test_run_receives_parameters_by_name() {
    let model = ClosureModel::new("scaled", |node| {
        let a = node.get("a").ok_or("parameter a missing")?;
        let b = node.get("b").ok_or("parameter b missing")?;
        Ok(ModelOutput::pair(None, Some(scalar(a * b))))
    });
    let invoker = InProcessInvoker::new(model);
    let node = ParameterNode::new(["a", "b"], [3.0, 4.0]).unwrap();

    let trace = invoker.invoke(&node).unwrap();

    assert!(trace.grid.is_none());
    assert_eq!(trace.values, Some(scalar(12.0)));
}

#[test]
fn test_single_return_value_is_a_model_execution_error() {
    let model = ClosureModel::new("single", |_| Ok(ModelOutput::from(range(10))));
    let invoker = InProcessInvoker::new(model);

    let err = invoker.invoke(&ParameterNode::single("a", 1.0)).unwrap_err();

    assert!(matches!(
        err,
        EvaluationError::ModelExecution(ModelExecutionError::MalformedReturn { returned: 1 })
    ));
    assert!(err.to_string().contains("must return t and U"));
    assert_eq!(err.stage(), Stage::Invocation);
}

#[test]
fn test_run_failure_keeps_its_cause() {
    let model = ClosureModel::new("broken", |_| Err("solver diverged".into()));
    let invoker = InProcessInvoker::new(model);

    let err = invoker.invoke(&ParameterNode::single("a", 1.0)).unwrap_err();

    let source = err.source().and_then(|cause| cause.source());
    assert_eq!(source.map(ToString::to_string).as_deref(), Some("solver diverged"));
}

#[test]
fn test_postprocess_is_applied_after_run() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let model = linear_model("model").with_postprocess(move |trace| {
        counter.fetch_add(1, Ordering::Relaxed);
        Ok(RawTrace::new(None, trace.values.map(|u| u * 2.0)))
    });
    let invoker = InProcessInvoker::new(model);

    let trace = invoker.invoke(&ParameterNode::single("a", 1.0)).unwrap();

    assert_eq!(calls.load(Ordering::Relaxed), 1);
    assert!(trace.grid.is_none());
    assert_eq!(trace.values, Some(range(10) * 2.0));
}

#[test]
fn test_postprocess_failure_is_tagged_with_its_stage() {
    let model = linear_model("model").with_postprocess(|_| Err("bad units".into()));
    let invoker = InProcessInvoker::new(model);

    let err = invoker.invoke(&ParameterNode::single("a", 1.0)).unwrap_err();

    assert_eq!(err.stage(), Stage::Postprocess);
    assert!(err.to_string().contains("bad units"));
}

#[test]
fn test_invoker_reports_model_identity() {
    let invoker = InProcessInvoker::new(linear_model("neuron").adaptive());
    assert_eq!(invoker.model_name(), "neuron");
    assert!(invoker.adaptive_model());
}
