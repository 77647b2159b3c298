//! On-disk `(t, U)` exchange with model executables
//!
//! The executable writes `.tmp_U_<token>.npy` and `.tmp_t_<token>.npy` into
//! the configured directory. Tokens combine the pool worker slot with a fresh
//! UUID, so two evaluations never share a file even when they run on the same
//! worker. [`ArtifactGuard`] removes both files when it is dropped.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use ndarray::ArrayD;
use ndarray_npy::{ReadNpyError, read_npy};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ArtifactIoError;

/// Slot of the rayon worker running this evaluation, or `"0"` outside a pool
#[must_use]
pub fn worker_slot() -> String {
    #[cfg(feature = "parallel")]
    {
        if let Some(index) = rayon::current_thread_index() {
            return (index + 1).to_string();
        }
    }

    "0".to_string()
}

/// Namespace for the artifacts of one evaluation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactToken {
    worker: String,
    task: Uuid,
}

impl ArtifactToken {
    /// Fresh token for the current worker
    #[must_use]
    pub fn generate() -> Self {
        Self {
            worker: worker_slot(),
            task: Uuid::new_v4(),
        }
    }

    #[must_use]
    pub fn worker(&self) -> &str {
        &self.worker
    }
}

impl fmt::Display for ArtifactToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.worker, self.task.simple())
    }
}

/// Owns the artifact paths of one evaluation and deletes them on drop
#[derive(Debug)]
pub struct ArtifactGuard {
    values_path: PathBuf,
    grid_path: PathBuf,
}

impl ArtifactGuard {
    pub fn new(dir: &Path, token: &ArtifactToken) -> Self {
        Self {
            values_path: dir.join(format!(".tmp_U_{token}.npy")),
            grid_path: dir.join(format!(".tmp_t_{token}.npy")),
        }
    }

    #[must_use]
    pub fn values_path(&self) -> &Path {
        &self.values_path
    }

    #[must_use]
    pub fn grid_path(&self) -> &Path {
        &self.grid_path
    }

    /// Read `(t, U)` as written by the executable
    pub fn read(&self) -> Result<(ArrayD<f64>, ArrayD<f64>), ArtifactIoError> {
        let values = read_array(&self.values_path)?;
        let grid = read_array(&self.grid_path)?;
        Ok((grid, values))
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        for path in [&self.values_path, &self.grid_path] {
            match std::fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "removed model artifact"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), "failed to remove model artifact: {e}"),
            }
        }
    }
}

fn read_array(path: &Path) -> Result<ArrayD<f64>, ArtifactIoError> {
    let to_artifact_error = |e: ReadNpyError| ArtifactIoError {
        path: path.to_path_buf(),
        source: Box::new(e),
    };

    match read_npy::<_, ArrayD<f64>>(path) {
        Ok(array) => Ok(array),
        Err(err @ ReadNpyError::WrongDescriptor(_)) => read_widened(path)
            .map_err(to_artifact_error)?
            .ok_or_else(|| to_artifact_error(err)),
        Err(err) => Err(to_artifact_error(err)),
    }
}

/// Read an array stored with another numeric type and widen it to `f64`.
///
/// `Ok(None)` means the file holds none of the accepted types.
fn read_widened(path: &Path) -> Result<Option<ArrayD<f64>>, ReadNpyError> {
    match read_npy::<_, ArrayD<i64>>(path) {
        Ok(array) => return Ok(Some(array.mapv(|v| v as f64))),
        Err(ReadNpyError::WrongDescriptor(_)) => {}
        Err(err) => return Err(err),
    }
    match read_npy::<_, ArrayD<i32>>(path) {
        Ok(array) => return Ok(Some(array.mapv(f64::from))),
        Err(ReadNpyError::WrongDescriptor(_)) => {}
        Err(err) => return Err(err),
    }
    match read_npy::<_, ArrayD<f32>>(path) {
        Ok(array) => Ok(Some(array.mapv(f64::from))),
        Err(ReadNpyError::WrongDescriptor(_)) => Ok(None),
        Err(err) => Err(err),
    }
}
