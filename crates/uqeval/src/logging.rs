use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use jiff::Timestamp;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// File name of the run log inside the data directory
pub const LOG_FILE: &str = "uqeval.log";

/// Size-based trimming applied to the run log before each run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRotation {
    /// Size above which the log is trimmed
    pub max_size: u64,
    /// Bytes of recent output kept after trimming
    pub keep: u64,
}

impl Default for LogRotation {
    fn default() -> Self {
        Self {
            max_size: 5 * 1024 * 1024,
            keep: 1024 * 1024,
        }
    }
}

impl LogRotation {
    /// Trim `log_path` down to its last `keep` bytes once it grows past
    /// `max_size`.
    ///
    /// Kept output starts after the first newline past the cut, so no partial
    /// line survives. Returns whether the file was trimmed.
    pub fn apply(&self, log_path: &Path) -> io::Result<bool> {
        let size = match fs::metadata(log_path) {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };
        if size <= self.max_size {
            return Ok(false);
        }

        let mut tail = Vec::new();
        let mut file = File::open(log_path)?;
        file.seek(SeekFrom::Start(size.saturating_sub(self.keep)))?;
        file.read_to_end(&mut tail)?;
        drop(file);

        let first_line = match tail.iter().position(|&b| b == b'\n') {
            Some(newline) if size > self.keep => newline + 1,
            _ => 0,
        };

        let mut file = File::create(log_path)?;
        writeln!(
            file,
            "--- uqeval log trimmed at {} ({size} bytes, older runs removed) ---",
            Timestamp::now()
        )?;
        file.write_all(&tail[first_line..])?;
        Ok(true)
    }
}

/// Initialize logging to write to a file in the data directory.
///
/// Logs go to `{data_dir}/uqeval.log` through a non-blocking writer; keep the
/// returned guard alive until the run is over or buffered lines are lost.
/// `RUST_LOG` overrides the `level` parameter.
pub fn init_logging(data_dir: &Path, level: &str) -> color_eyre::Result<WorkerGuard> {
    fs::create_dir_all(data_dir)?;

    let log_path = data_dir.join(LOG_FILE);

    let trimmed = LogRotation::default().apply(&log_path).unwrap_or_else(|e| {
        eprintln!("Warning: failed to trim {}: {e}", log_path.display());
        false
    });

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let default_filter = format!("uqeval={level},uqeval_core=warn");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .try_init()?;

    tracing::info!(
        log_path = %log_path.display(),
        trimmed,
        "uqeval logging initialized"
    );
    Ok(guard)
}
