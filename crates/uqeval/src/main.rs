use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use uqeval::{FeatureRegistry, RunConfig, init_logging, run};

#[derive(Parser, Debug)]
#[command(name = "uqeval")]
#[command(about = "Evaluate a model executable at every node of a parameter sample")]
struct Args {
    /// Path to the YAML run configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Write the JSON report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to the data directory holding the log (default: ~/.uqeval/)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Worker threads, overriding the configuration
    #[arg(short, long)]
    threads: Option<usize>,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".uqeval")
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);

    let _log_guard = init_logging(&data_dir, &args.log_level)?;

    let config = RunConfig::load(&args.config)?;
    let report = run(&config, &FeatureRegistry::new(), args.threads)?;

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, &report)?;
            writer.flush()?;
            tracing::info!("report written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &report)?;
            writeln!(stdout)?;
        }
    }

    if report.failed() > 0 {
        eprintln!(
            "{} of {} nodes failed, see the report for details",
            report.failed(),
            report.nodes.len()
        );
    }

    Ok(())
}
