use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::config::ExternalModelConfig;
use crate::error::{ArtifactIoError, EvaluationError, ModelExecutionError};
use crate::model::{ParameterNode, RawTrace};

use super::ModelInvoker;
use super::artifacts::{ArtifactGuard, ArtifactToken};

/// Runs a model executable once per evaluation.
///
/// The executable is called as
/// `<command...> --CPU <token> --save_path <dir> --parameters <name> <value>...`
/// with every value printed to 16 decimals, must exit with status 0 and must
/// leave `.tmp_U_<token>.npy` and `.tmp_t_<token>.npy` in `<dir>`. The call
/// blocks until the process exits.
#[derive(Debug, Clone)]
pub struct ExternalInvoker {
    config: ExternalModelConfig,
}

impl ExternalInvoker {
    pub fn new(config: ExternalModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExternalModelConfig {
        &self.config
    }

    /// Protocol arguments appended to the base command
    #[must_use]
    pub fn protocol_args(&self, token: &ArtifactToken, node: &ParameterNode) -> Vec<String> {
        let mut args = vec![
            "--CPU".to_string(),
            token.to_string(),
            "--save_path".to_string(),
            self.config.save_path.display().to_string(),
            "--parameters".to_string(),
        ];
        for (name, value) in node.iter() {
            args.push(name.to_string());
            args.push(format!("{value:.16}"));
        }
        args
    }

    fn command(
        &self,
        token: &ArtifactToken,
        node: &ParameterNode,
    ) -> Result<Command, ModelExecutionError> {
        let (program, base_args) = self.config.command.split_first().ok_or_else(|| {
            ModelExecutionError::Spawn {
                program: String::new(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "model command is empty",
                ),
            }
        })?;

        let mut command = Command::new(program);
        command
            .args(base_args)
            .args(self.protocol_args(token, node))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        Ok(command)
    }
}

impl ModelInvoker for ExternalInvoker {
    fn model_name(&self) -> &str {
        &self.config.name
    }

    fn adaptive_model(&self) -> bool {
        self.config.adaptive
    }

    fn invoke(&self, node: &ParameterNode) -> Result<RawTrace, EvaluationError> {
        std::fs::create_dir_all(&self.config.save_path).map_err(|e| ArtifactIoError {
            path: self.config.save_path.clone(),
            source: Box::new(e),
        })?;

        let token = ArtifactToken::generate();
        // Held across the run so the files go away on every exit path
        let artifacts = ArtifactGuard::new(&self.config.save_path, &token);

        let mut command = self.command(&token, node)?;
        debug!(model = %self.config.name, token = %token, ?command, "starting model executable");

        let output = command.output().map_err(|source| ModelExecutionError::Spawn {
            program: self.config.command.join(" "),
            source,
        })?;

        if !self.config.suppress_model_output && !output.stdout.is_empty() {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(&output.stdout).and_then(|()| stdout.flush()) {
                warn!("failed to forward model output: {e}");
            }
        }

        if !output.status.success() {
            return Err(ModelExecutionError::NonZeroExit {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .into());
        }

        let (grid, values) = artifacts.read()?;
        Ok(RawTrace::new(Some(grid), Some(values)))
    }
}
