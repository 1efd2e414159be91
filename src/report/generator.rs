//! Evaluation report output.
//!
//! One formatted line per metric goes to the console and to a cumulative
//! log file in the dataset's stats folder. The log file is opened in append
//! mode: each run adds one block, so the file accumulates the history of
//! evaluations for that dataset. The console and file formats differ
//! (four/two vs three/three decimals), matching the established report
//! layout downstream tooling parses.

use crate::models::{MetricSummary, RunMetadata};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Header line shared by the console and log outputs.
pub const REPORT_HEADER: &str = "Test Phase Metrics [ANIMA]: ";

/// Log filename for a dataset.
pub fn log_file_name(dataset: &str) -> String {
    format!("log_{}.txt", dataset)
}

/// Console line for one metric.
pub fn console_line(summary: &MetricSummary) -> String {
    format!(
        "\t{} -> Mean: {:.4} Std: {:.2}",
        summary.name, summary.mean, summary.std
    )
}

/// Log-file line for one metric.
pub fn log_line(summary: &MetricSummary) -> String {
    format!(
        "\t{} --> Mean: {:.3}, Std: {:.3}",
        summary.name, summary.mean, summary.std
    )
}

/// Print the per-metric summary block to the console.
pub fn print_summaries(summaries: &[MetricSummary]) {
    println!("{}", REPORT_HEADER);
    for summary in summaries {
        println!("{}", console_line(summary));
    }
}

/// Append one run's block to the cumulative log file.
pub fn append_log(path: &Path, metadata: &RunMetadata, summaries: &[MetricSummary]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    writeln!(file, "{}", run_header(metadata))?;
    writeln!(file, "{}", REPORT_HEADER)?;
    for summary in summaries {
        writeln!(file, "{}", log_line(summary))?;
    }

    Ok(())
}

/// Timestamped header identifying the run a log block belongs to.
fn run_header(metadata: &RunMetadata) -> String {
    format!(
        "[{}] dataset: {}, subjects: {} evaluated, {} skipped, {} value(s) dropped, {:.1}s",
        metadata.run_date.format("%Y-%m-%d %H:%M:%S UTC"),
        metadata.dataset,
        metadata.subjects_evaluated,
        metadata.subjects_skipped,
        metadata.values_dropped,
        metadata.duration_seconds
    )
}
