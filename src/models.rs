//! Data models for the segmentation-evaluation workflow.
//!
//! This module contains the core data structures used throughout the
//! application for representing subject pairs, collected metric values,
//! and per-run summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A prediction volume paired with its ground-truth volume.
///
/// Pairs are only constructed for matching subject identifiers; the pairing
/// step rejects anything else before a `SubjectPair` exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectPair {
    /// Subject identifier, derived from the parent folder name.
    pub subject: String,
    /// Path to the predicted segmentation volume (`*_pred.nii.gz`).
    pub pred: PathBuf,
    /// Path to the ground-truth segmentation volume (`*_gt.nii.gz`).
    pub gt: PathBuf,
}

/// Ordered collection of valid metric values across the cohort.
///
/// Keys are metric names as reported by the analyzer; values are appended in
/// subject-processing order. Only finite values are admitted.
#[derive(Debug, Clone, Default)]
pub struct MetricTable {
    values: BTreeMap<String, Vec<f64>>,
}

impl MetricTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value to the list collected for `metric`.
    ///
    /// Non-finite values must be filtered out by the caller; debug builds
    /// assert this invariant.
    pub fn push(&mut self, metric: &str, value: f64) {
        debug_assert!(value.is_finite());
        self.values.entry(metric.to_string()).or_default().push(value);
    }

    /// Returns the values collected so far for `metric`.
    pub fn get(&self, metric: &str) -> Option<&[f64]> {
        self.values.get(metric).map(Vec::as_slice)
    }

    /// Number of distinct metrics collected.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no metric has been collected.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(metric, values)` entries in metric-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Finalizes the table into per-metric summaries.
    pub fn summaries(&self) -> Vec<MetricSummary> {
        self.iter()
            .map(|(name, values)| MetricSummary::from_values(name, values))
            .collect()
    }
}

/// Mean and population standard deviation of one metric across the cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Metric name as reported by the analyzer.
    pub name: String,
    /// Arithmetic mean of the collected values.
    pub mean: f64,
    /// Population standard deviation (divide by N, not N-1).
    pub std: f64,
    /// Number of values that contributed.
    pub count: usize,
}

impl MetricSummary {
    /// Summarizes a non-empty slice of collected values.
    pub fn from_values(name: &str, values: &[f64]) -> Self {
        Self {
            name: name.to_string(),
            mean: mean(values),
            std: population_std(values),
            count: values.len(),
        }
    }
}

/// Metadata about one evaluation run, written into the log header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Dataset the predictions belong to.
    pub dataset: String,
    /// Date and time the run started.
    pub run_date: DateTime<Utc>,
    /// Subjects whose reports contributed values.
    pub subjects_evaluated: usize,
    /// Subjects skipped entirely (empty ground truth).
    pub subjects_skipped: usize,
    /// Individual values dropped for being infinite or NaN.
    pub values_dropped: usize,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// Arithmetic mean of a slice. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation of a slice (divide by N, not N-1).
///
/// Returns 0.0 for an empty or single-element slice.
pub fn population_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_population_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-12);
        // Textbook population SD of this set is exactly 2.
        assert!((population_std(&values) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_population_std_not_bessel_corrected() {
        let values = [1.0, 3.0];
        // Population SD is 1.0; the sample SD would be sqrt(2).
        assert!((population_std(&values) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_value_has_zero_std() {
        let summary = MetricSummary::from_values("Dice", &[0.91]);
        assert!((summary.mean - 0.91).abs() < 1e-12);
        assert_eq!(summary.std, 0.0);
        assert_eq!(summary.count, 1);
    }

    #[test]
    fn test_metric_table_accumulates_in_order() {
        let mut table = MetricTable::new();
        table.push("Dice", 0.91);
        table.push("Hausdorff", 12.3);
        table.push("Dice", 0.87);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("Dice"), Some(&[0.91, 0.87][..]));
        assert_eq!(table.get("Hausdorff"), Some(&[12.3][..]));
        assert_eq!(table.get("Jaccard"), None);
    }

    #[test]
    fn test_summaries_cover_each_metric() {
        let mut table = MetricTable::new();
        table.push("Dice", 0.9);
        table.push("Dice", 0.8);
        table.push("Hausdorff", 10.0);

        let summaries = table.summaries();
        assert_eq!(summaries.len(), 2);

        let dice = summaries.iter().find(|s| s.name == "Dice").unwrap();
        assert!((dice.mean - 0.85).abs() < 1e-12);
        assert_eq!(dice.count, 2);

        let hausdorff = summaries.iter().find(|s| s.name == "Hausdorff").unwrap();
        assert_eq!(hausdorff.count, 1);
        assert_eq!(hausdorff.std, 0.0);
    }
}
