//! Research-support utilities for a medical-image segmentation pipeline.
//!
//! Three subsystems share this library:
//!
//! - the `anima-metrics` binary scores predicted masks against ground truth
//!   by invoking the external `animaSegPerfAnalyzer` tool per subject and
//!   aggregating the per-subject XML reports into cohort statistics;
//! - the `csa-charts` binary turns a tabular dataset of per-subject,
//!   per-contrast CSA measurements into comparative charts;
//! - the `export-transforms` binary emits the declarative preprocessing and
//!   augmentation pipelines consumed by the external training framework.

/// Metric report parsing and cohort aggregation
pub mod analysis;
/// External `animaSegPerfAnalyzer` invocation
pub mod analyzer;
/// CSA table derivations and chart rendering
pub mod charts;
/// Command-line interface for the metrics workflow
pub mod cli;
/// ANIMA installation and chart configuration files
pub mod config;
/// Core data structures and descriptive statistics
pub mod models;
/// Prediction/ground-truth discovery and pairing
pub mod pairing;
/// Console and log-file report output
pub mod report;
/// Declarative preprocessing and augmentation pipelines
pub mod transforms;
/// NIfTI volume loading, binarization, and writing
pub mod volume;
