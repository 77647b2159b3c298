use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::spline::SplineError;

/// Boxed cause raised by an external capability (model or feature set)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Pipeline stage in which an evaluation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Invocation,
    Postprocess,
    Artifacts,
    Features,
    Merge,
    Interpolation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Invocation => "invocation",
            Stage::Postprocess => "postprocess",
            Stage::Artifacts => "artifacts",
            Stage::Features => "features",
            Stage::Merge => "merge",
            Stage::Interpolation => "interpolation",
        };
        f.write_str(name)
    }
}

/// Errors raised while running the model itself
#[derive(Debug)]
pub enum ModelExecutionError {
    /// `Model::run` raised
    Run(BoxError),
    /// The model run did not return exactly a `(t, U)` pair
    MalformedReturn { returned: usize },
    /// `Model::postprocess` raised
    Postprocess(BoxError),
    /// The external executable could not be started
    Spawn {
        program: String,
        source: std::io::Error,
    },
    /// The external executable exited unsuccessfully
    NonZeroExit { status: Option<i32>, stderr: String },
}

impl fmt::Display for ModelExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelExecutionError::Run(e) => write!(f, "model run failed: {e}"),
            ModelExecutionError::MalformedReturn { returned } => write!(
                f,
                "model returned {returned} value(s): model.run() or model function must return t and U (return t, U | return None, U)"
            ),
            ModelExecutionError::Postprocess(e) => write!(f, "model postprocess failed: {e}"),
            ModelExecutionError::Spawn { program, source } => {
                write!(f, "failed to start model executable {program}: {source}")
            }
            ModelExecutionError::NonZeroExit { status, stderr } => match status {
                Some(code) => write!(f, "model exited with status {code}: {}", stderr.trim_end()),
                None => write!(f, "model terminated by signal: {}", stderr.trim_end()),
            },
        }
    }
}

impl std::error::Error for ModelExecutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelExecutionError::Run(e) | ModelExecutionError::Postprocess(e) => Some(e.as_ref()),
            ModelExecutionError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors raised while computing or collecting features
#[derive(Debug)]
pub enum FeatureComputationError {
    /// No feature capability is registered under this name
    UnknownCapability(String),
    /// The capability could not be constructed for this trace
    Create(BoxError),
    Preprocess(BoxError),
    Calculate(BoxError),
    /// A feature trace carries a grid without values
    Malformed { feature: String },
    /// A feature shares its name with the model
    NameCollision { feature: String },
}

impl fmt::Display for FeatureComputationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureComputationError::UnknownCapability(name) => {
                write!(f, "no feature capability registered as {name:?}")
            }
            FeatureComputationError::Create(e) => {
                write!(f, "failed to set up feature calculation: {e}")
            }
            FeatureComputationError::Preprocess(e) => write!(f, "feature preprocess failed: {e}"),
            FeatureComputationError::Calculate(e) => {
                write!(f, "feature calculation failed: {e}")
            }
            FeatureComputationError::Malformed { feature } => {
                write!(f, "feature {feature} returned a grid without values")
            }
            FeatureComputationError::NameCollision { feature } => {
                write!(f, "feature {feature} has the same name as the model")
            }
        }
    }
}

impl std::error::Error for FeatureComputationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeatureComputationError::Create(e)
            | FeatureComputationError::Preprocess(e)
            | FeatureComputationError::Calculate(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// An adaptive entry has a shape that cannot be interpolated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimensionalityError {
    ZeroDimensional { name: String },
    MissingGrid { name: String },
}

impl DimensionalityError {
    pub fn name(&self) -> &str {
        match self {
            DimensionalityError::ZeroDimensional { name }
            | DimensionalityError::MissingGrid { name } => name,
        }
    }
}

impl fmt::Display for DimensionalityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionalityError::ZeroDimensional { name } => {
                write!(f, "{name} is 0D, unable to perform interpolation")
            }
            DimensionalityError::MissingGrid { name } => write!(
                f,
                "{name} does not return any grid values, unable to perform interpolation"
            ),
        }
    }
}

impl std::error::Error for DimensionalityError {}

/// An adaptive entry is 2D or higher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedInterpolationError {
    pub name: String,
    pub rank: usize,
}

impl fmt::Display for UnsupportedInterpolationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}D), no support for >= 2D interpolation",
            self.name, self.rank
        )
    }
}

impl std::error::Error for UnsupportedInterpolationError {}

/// Artifact files could not be read, or their directory could not be created
#[derive(Debug)]
pub struct ArtifactIoError {
    pub path: PathBuf,
    pub source: BoxError,
}

impl fmt::Display for ArtifactIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "model artifact i/o failed for {}: {}",
            self.path.display(),
            self.source
        )
    }
}

impl std::error::Error for ArtifactIoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Failure of one sample's evaluation, tagged with the failing stage
#[derive(Debug)]
pub enum EvaluationError {
    ModelExecution(ModelExecutionError),
    FeatureComputation(FeatureComputationError),
    Dimensionality(DimensionalityError),
    UnsupportedInterpolation(UnsupportedInterpolationError),
    ArtifactIo(ArtifactIoError),
    SplineFit { name: String, source: SplineError },
}

impl EvaluationError {
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            EvaluationError::ModelExecution(ModelExecutionError::Postprocess(_)) => {
                Stage::Postprocess
            }
            EvaluationError::ModelExecution(_) => Stage::Invocation,
            EvaluationError::FeatureComputation(FeatureComputationError::NameCollision {
                ..
            }) => Stage::Merge,
            EvaluationError::FeatureComputation(_) => Stage::Features,
            EvaluationError::ArtifactIo(_) => Stage::Artifacts,
            EvaluationError::Dimensionality(_)
            | EvaluationError::UnsupportedInterpolation(_)
            | EvaluationError::SplineFit { .. } => Stage::Interpolation,
        }
    }
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::ModelExecution(e) => write!(f, "{e}"),
            EvaluationError::FeatureComputation(e) => write!(f, "{e}"),
            EvaluationError::Dimensionality(e) => write!(f, "{e}"),
            EvaluationError::UnsupportedInterpolation(e) => write!(f, "{e}"),
            EvaluationError::ArtifactIo(e) => write!(f, "{e}"),
            EvaluationError::SplineFit { name, source } => {
                write!(f, "unable to fit spline for {name}: {source}")
            }
        }
    }
}

impl std::error::Error for EvaluationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EvaluationError::ModelExecution(e) => Some(e),
            EvaluationError::FeatureComputation(e) => Some(e),
            EvaluationError::Dimensionality(e) => Some(e),
            EvaluationError::UnsupportedInterpolation(e) => Some(e),
            EvaluationError::ArtifactIo(e) => Some(e),
            EvaluationError::SplineFit { source, .. } => Some(source),
        }
    }
}

impl From<ModelExecutionError> for EvaluationError {
    fn from(err: ModelExecutionError) -> Self {
        EvaluationError::ModelExecution(err)
    }
}

impl From<FeatureComputationError> for EvaluationError {
    fn from(err: FeatureComputationError) -> Self {
        EvaluationError::FeatureComputation(err)
    }
}

impl From<DimensionalityError> for EvaluationError {
    fn from(err: DimensionalityError) -> Self {
        EvaluationError::Dimensionality(err)
    }
}

impl From<UnsupportedInterpolationError> for EvaluationError {
    fn from(err: UnsupportedInterpolationError) -> Self {
        EvaluationError::UnsupportedInterpolation(err)
    }
}

impl From<ArtifactIoError> for EvaluationError {
    fn from(err: ArtifactIoError) -> Self {
        EvaluationError::ArtifactIo(err)
    }
}

/// Errors building a `ParameterNode`
#[derive(Debug, Clone, PartialEq)]
pub enum NodeError {
    LengthMismatch { names: usize, values: usize },
    DuplicateName(String),
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::LengthMismatch { names, values } => write!(
                f,
                "{names} parameter name(s) but {values} value(s) in node"
            ),
            NodeError::DuplicateName(name) => write!(f, "parameter {name} appears more than once"),
        }
    }
}

impl std::error::Error for NodeError {}

pub type Result<T> = std::result::Result<T, EvaluationError>;
