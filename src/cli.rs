//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing for the metrics workflow
//! using clap, including validation and verbosity handling.

use clap::Parser;
use std::fmt;
use std::path::PathBuf;

/// anima-metrics - segmentation scoring against ground truth
///
/// Scores predicted segmentation masks against expert ground truth using the
/// external `animaSegPerfAnalyzer` tool and aggregates the per-subject
/// reports into cohort statistics.
///
/// Examples:
///   anima-metrics --pred-folder ./test_predictions -d sci-t2w
///   anima-metrics --pred-folder ./test_predictions -d ms-mp2rage -v
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Folder containing NIfTI test predictions AND ground-truth volumes
    ///
    /// Expected layout: `<pred-folder>/**/<subject>/..._pred.nii.gz` with a
    /// matching `..._gt.nii.gz` next to it. Outputs are written under
    /// `<pred-folder>/anima_stats/`.
    #[arg(long, value_name = "DIR")]
    pub pred_folder: PathBuf,

    /// Dataset the predictions belong to
    ///
    /// Selects the cumulative log file (`log_<dataset>.txt`) the run appends to.
    #[arg(short = 'd', long, value_name = "NAME")]
    pub dataset_name: DatasetName,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Datasets the evaluation supports (closed choice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DatasetName {
    /// Spinal cord injury, T2-weighted
    SciT2w,
    /// Radiculopathy, EPI
    RadioculopathyEpi,
    /// Multiple sclerosis, MP2RAGE
    MsMp2rage,
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetName::SciT2w => write!(f, "sci-t2w"),
            DatasetName::RadioculopathyEpi => write!(f, "radioculopathy-epi"),
            DatasetName::MsMp2rage => write!(f, "ms-mp2rage"),
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if !self.pred_folder.exists() {
            return Err(format!(
                "Prediction folder does not exist: {}",
                self.pred_folder.display()
            ));
        }

        if !self.pred_folder.is_dir() {
            return Err(format!(
                "Prediction folder is not a directory: {}",
                self.pred_folder.display()
            ));
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args(pred_folder: PathBuf) -> Args {
        Args {
            pred_folder,
            dataset_name: DatasetName::SciT2w,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_dataset_name_display() {
        assert_eq!(DatasetName::SciT2w.to_string(), "sci-t2w");
        assert_eq!(
            DatasetName::RadioculopathyEpi.to_string(),
            "radioculopathy-epi"
        );
        assert_eq!(DatasetName::MsMp2rage.to_string(), "ms-mp2rage");
    }

    #[test]
    fn test_validation_missing_folder() {
        let args = make_args(PathBuf::from("/does/not/exist"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_accepts_existing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let args = make_args(dir.path().to_path_buf());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = make_args(dir.path().to_path_buf());
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = make_args(dir.path().to_path_buf());
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
