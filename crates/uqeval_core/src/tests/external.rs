//! Model executables and artifact exchange
//!
//! The "executables" here are `sh -c` scripts. Protocol arguments land in the
//! positional parameters: `$2` is the artifact token and `$4` the save path.

use std::fs;
use std::path::Path;

use ndarray::arr1;
use ndarray_npy::write_npy;
use tempfile::{TempDir, tempdir};

use crate::config::ExternalModelConfig;
use crate::error::{EvaluationError, ModelExecutionError, Stage};
use crate::invoke::{ExternalInvoker, ModelInvoker};
use crate::model::ParameterNode;

const COPY_FIXTURES: &str =
    r#"cp "$4/fixture_U.npy" "$4/.tmp_U_$2.npy" && cp "$4/fixture_t.npy" "$4/.tmp_t_$2.npy""#;

fn script_model(dir: &Path, script: &str) -> ExternalInvoker {
    ExternalInvoker::new(ExternalModelConfig::new(
        "script",
        ["sh", "-c", script, "script"],
        dir,
    ))
}

/// Temp dir holding `fixture_t.npy = [0, 1, 2, 3]` and `fixture_U.npy = [0, 1, 4, 9]`
fn fixture_dir() -> TempDir {
    let dir = tempdir().unwrap();
    write_npy(dir.path().join("fixture_t.npy"), &arr1(&[0.0, 1.0, 2.0, 3.0])).unwrap();
    write_npy(dir.path().join("fixture_U.npy"), &arr1(&[0.0, 1.0, 4.0, 9.0])).unwrap();
    dir
}

/// Exchange files left behind in `dir`
fn leftover_artifacts(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(".tmp_"))
        .collect()
}

#[test]
fn test_artifacts_are_read_back_and_removed() {
    let dir = fixture_dir();
    let invoker = script_model(dir.path(), COPY_FIXTURES);

    let trace = invoker
        .invoke(&ParameterNode::single("a", 1.0))
        .unwrap();

    assert_eq!(trace.grid, Some(arr1(&[0.0, 1.0, 2.0, 3.0]).into_dyn()));
    assert_eq!(trace.values, Some(arr1(&[0.0, 1.0, 4.0, 9.0]).into_dyn()));
    assert!(leftover_artifacts(dir.path()).is_empty());
}

#[test]
fn test_parameters_are_passed_with_16_decimals() {
    let dir = fixture_dir();
    let script = format!(r#"echo "$@" > "$4/args.txt" && {COPY_FIXTURES}"#);
    let invoker = script_model(dir.path(), &script);
    let node = ParameterNode::new(["gbar_Na", "gbar_K"], [1.5, 0.25]).unwrap();

    invoker.invoke(&node).unwrap();

    let args = fs::read_to_string(dir.path().join("args.txt")).unwrap();
    let args: Vec<&str> = args.split_whitespace().collect();
    assert_eq!(args[0], "--CPU");
    assert!(args[1].starts_with("0_"));
    assert_eq!(args[2], "--save_path");
    assert_eq!(Path::new(args[3]), dir.path());
    assert_eq!(
        &args[4..],
        [
            "--parameters",
            "gbar_Na",
            "1.5000000000000000",
            "gbar_K",
            "0.2500000000000000"
        ]
    );
}

#[test]
fn test_non_zero_exit_carries_stderr() {
    let dir = tempdir().unwrap();
    let invoker = script_model(dir.path(), "echo boom >&2; exit 3");

    let err = invoker
        .invoke(&ParameterNode::single("a", 1.0))
        .unwrap_err();

    match &err {
        EvaluationError::ModelExecution(ModelExecutionError::NonZeroExit { status, stderr }) => {
            assert_eq!(*status, Some(3));
            assert_eq!(stderr.trim(), "boom");
        }
        other => panic!("expected a non-zero exit, got {other:?}"),
    }
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.stage(), Stage::Invocation);
}

#[test]
fn test_artifacts_are_removed_when_the_model_fails() {
    let dir = fixture_dir();
    let script = format!("{COPY_FIXTURES}; echo late failure >&2; exit 1");
    let invoker = script_model(dir.path(), &script);

    let err = invoker
        .invoke(&ParameterNode::single("a", 1.0))
        .unwrap_err();

    assert!(err.to_string().contains("late failure"));
    assert!(leftover_artifacts(dir.path()).is_empty());
}

#[test]
fn test_missing_artifacts_are_an_artifact_error() {
    let dir = tempdir().unwrap();
    let invoker = script_model(dir.path(), "exit 0");

    let err = invoker
        .invoke(&ParameterNode::single("a", 1.0))
        .unwrap_err();

    assert!(matches!(err, EvaluationError::ArtifactIo(_)));
    assert_eq!(err.stage(), Stage::Artifacts);
}

#[test]
fn test_one_missing_artifact_still_cleans_up_the_other() {
    let dir = fixture_dir();
    let invoker = script_model(dir.path(), r#"cp "$4/fixture_U.npy" "$4/.tmp_U_$2.npy""#);

    let err = invoker
        .invoke(&ParameterNode::single("a", 1.0))
        .unwrap_err();

    assert!(matches!(err, EvaluationError::ArtifactIo(_)));
    assert!(leftover_artifacts(dir.path()).is_empty());
}

#[test]
fn test_save_path_is_created_when_missing() {
    let dir = fixture_dir();
    let nested = dir.path().join("runs").join("node_0");
    let script = r#"cp "$4/../../fixture_U.npy" "$4/.tmp_U_$2.npy" && cp "$4/../../fixture_t.npy" "$4/.tmp_t_$2.npy""#;
    let invoker = script_model(&nested, script);

    invoker.invoke(&ParameterNode::single("a", 1.0)).unwrap();

    assert!(nested.is_dir());
}

#[test]
fn test_missing_executable_fails_to_spawn() {
    let dir = tempdir().unwrap();
    let invoker = ExternalInvoker::new(ExternalModelConfig::new(
        "missing",
        ["/nonexistent/model-binary"],
        dir.path(),
    ));

    let err = invoker
        .invoke(&ParameterNode::single("a", 1.0))
        .unwrap_err();

    assert!(matches!(
        err,
        EvaluationError::ModelExecution(ModelExecutionError::Spawn { .. })
    ));
}

#[test]
fn test_integer_grid_artifact_is_read_as_float() {
    let dir = fixture_dir();
    write_npy(dir.path().join("fixture_t.npy"), &arr1(&[0i64, 1, 2, 3])).unwrap();
    let invoker = script_model(dir.path(), COPY_FIXTURES);

    let trace = invoker
        .invoke(&ParameterNode::single("a", 1.0))
        .unwrap();

    assert_eq!(trace.grid, Some(arr1(&[0.0, 1.0, 2.0, 3.0]).into_dyn()));
    assert!(leftover_artifacts(dir.path()).is_empty());
}

#[test]
fn test_uncreatable_save_path_is_an_artifact_error() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    let save_path = blocker.join("runs");
    let invoker = script_model(&save_path, COPY_FIXTURES);

    let err = invoker
        .invoke(&ParameterNode::single("a", 1.0))
        .unwrap_err();

    match &err {
        EvaluationError::ArtifactIo(io) => assert_eq!(io.path, save_path),
        other => panic!("expected an artifact error, got {other:?}"),
    }
    assert_eq!(err.stage(), Stage::Artifacts);
}
