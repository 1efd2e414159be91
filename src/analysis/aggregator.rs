//! Metric report parsing and cohort aggregation.
//!
//! Each subject's XML report is a flat document of named scalar entries.
//! Two policies apply while folding reports into the metric table:
//!
//! - a report with exactly two entries means the ground truth was empty and
//!   the analyzer computed nothing; the subject is skipped entirely;
//! - infinite or NaN values are dropped per metric per subject with a
//!   diagnostic, without aborting the run.

use crate::models::MetricTable;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Number of entries the analyzer writes when the ground truth is empty
/// (`NbTestedLesions` and `VolTestedLesions`, both zero).
pub const EMPTY_GT_ENTRY_COUNT: usize = 2;

/// One subject's parsed metric report.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectReport {
    /// Subject identifier, derived from the report filename.
    pub subject: String,
    /// Named scalar entries in document order.
    pub entries: Vec<(String, f64)>,
}

impl SubjectReport {
    /// True if the ground truth was empty and the report holds only the
    /// placeholder entries.
    pub fn is_empty_gt(&self) -> bool {
        self.entries.len() == EMPTY_GT_ENTRY_COUNT
    }
}

/// Outcome of folding a set of reports into one table.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Valid values collected per metric.
    pub table: MetricTable,
    /// Subjects whose reports contributed values.
    pub subjects_evaluated: usize,
    /// Subjects skipped entirely (empty ground truth).
    pub subjects_skipped: usize,
    /// Individual values dropped for being infinite or NaN.
    pub values_dropped: usize,
}

/// All XML report paths in the stats directory, sorted by filename.
pub fn collect_report_paths(stats_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(stats_dir)
        .with_context(|| format!("Failed to read stats directory: {}", stats_dir.display()))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "xml").unwrap_or(false))
        .collect();

    paths.sort();
    Ok(paths)
}

/// Subject identifier for a report path.
///
/// The analyzer names reports `<subject>_global.xml`; anything else falls
/// back to the bare file stem.
pub fn subject_from_report_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.strip_suffix("_global").unwrap_or(&stem).to_string()
}

/// Parse one report file.
pub fn parse_report(path: &Path) -> Result<SubjectReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report: {}", path.display()))?;

    parse_report_str(&subject_from_report_path(path), &content)
        .with_context(|| format!("Failed to parse report: {}", path.display()))
}

/// Parse report XML: every top-level element is one named scalar entry.
///
/// The metric name comes from the element's `name` attribute, falling back
/// to the tag name; the value is the element text. A value that does not
/// parse as a number is a hard error, as it means the analyzer's output
/// contract was broken.
pub fn parse_report_str(subject: &str, xml: &str) -> Result<SubjectReport> {
    let doc = roxmltree::Document::parse(xml).context("Malformed XML")?;

    let mut entries = Vec::new();
    for node in doc.root_element().children().filter(|n| n.is_element()) {
        let name = node
            .attribute("name")
            .unwrap_or_else(|| node.tag_name().name())
            .to_string();

        // f64 parsing accepts the analyzer's `inf`/`nan` spellings, which
        // must survive here so the non-finite filter can count them.
        let text = node.text().map(str::trim).unwrap_or_default();
        let value: f64 = text
            .parse()
            .map_err(|_| anyhow!("Entry `{}` has a non-numeric value: `{}`", name, text))?;

        entries.push((name, value));
    }

    Ok(SubjectReport {
        subject: subject.to_string(),
        entries,
    })
}

/// Fold one report into the table; returns the number of dropped values.
///
/// The caller must have excluded empty-ground-truth reports already.
pub fn accumulate(table: &mut MetricTable, report: &SubjectReport) -> usize {
    let mut dropped = 0;
    for (name, value) in &report.entries {
        if !value.is_finite() {
            warn!(
                "Skipping Metric={} for Subject={} Due to INF or NaNs!",
                name, report.subject
            );
            dropped += 1;
            continue;
        }
        table.push(name, *value);
    }
    dropped
}

/// Parse and fold all reports into a single aggregation.
pub fn aggregate_reports(paths: &[PathBuf]) -> Result<Aggregation> {
    let mut agg = Aggregation::default();

    for path in paths {
        let report = parse_report(path)?;

        if report.is_empty_gt() {
            info!(
                "Skipping Subject={} ENTIRELY Due to Empty GT!",
                report.subject
            );
            agg.subjects_skipped += 1;
            continue;
        }

        agg.values_dropped += accumulate(&mut agg.table, &report);
        agg.subjects_evaluated += 1;
    }

    Ok(agg)
}
