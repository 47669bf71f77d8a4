use crate::models::RunResult;
use anyhow::{Context, Result};
use log::info;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Artifact file name for a run, e.g. `trades_by_day_<run id>.json`.
pub fn run_artifact_file_name(result: &RunResult) -> String {
    format!("trades_by_day_{}.json", result.run_id)
}

/// Writes the run's accumulated day-by-day trades as pretty-printed JSON
/// into `dir`, named for the run. Called by run owners after an abort so the
/// partial backtest stays auditable and recoverable.
pub fn write_run_artifact<P: AsRef<Path>>(result: &RunResult, dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create artifact directory {}", dir.display()))?;
    }

    let path = dir.join(run_artifact_file_name(result));
    let file = File::create(&path)
        .with_context(|| format!("Unable to create run artifact at {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, result)
        .context("Failed to serialize run artifact")?;
    writer
        .flush()
        .context("Failed to flush run artifact to disk")?;

    info!(
        "Wrote run artifact for {} ({} day{}, {}) to {}",
        result.run_id,
        result.processed_day_count,
        if result.processed_day_count == 1 { "" } else { "s" },
        result.status.as_str(),
        path.display()
    );
    Ok(path)
}

/// Reads a previously written run artifact back.
pub fn load_run_artifact<P: AsRef<Path>>(path: P) -> Result<RunResult> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open run artifact at {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("Invalid run artifact at {}", path.display()))
}
