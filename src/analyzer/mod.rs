//! Invocation of the external `animaSegPerfAnalyzer` binary.
//!
//! One synchronous invocation per subject. The analyzer is asked for
//! segmentation evaluation (`-s`), surface-distance evaluation (`-d`), and
//! XML output (`-X`); it writes `<prefix>_global.xml` next to the given
//! output prefix. Exit status is captured and checked so a failed run
//! surfaces here, with the analyzer's stderr, instead of as a downstream
//! parse failure.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Name of the analyzer executable inside the ANIMA binaries directory.
pub const ANALYZER_BINARY: &str = "animaSegPerfAnalyzer";

/// Handle on a resolved `animaSegPerfAnalyzer` installation.
#[derive(Debug, Clone)]
pub struct SegPerfAnalyzer {
    binary: PathBuf,
}

impl SegPerfAnalyzer {
    /// Point at the analyzer inside the given ANIMA binaries directory.
    pub fn new(binaries_dir: &Path) -> Self {
        Self {
            binary: binaries_dir.join(ANALYZER_BINARY),
        }
    }

    /// Full path of the analyzer executable.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Query the analyzer's version string.
    pub fn version(&self) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .with_context(|| format!("Failed to run {}", self.binary.display()))?;

        if !output.status.success() {
            bail!(
                "{} --version exited with {}",
                ANALYZER_BINARY,
                output.status
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Score one binarized prediction against its binarized ground truth.
    ///
    /// Writes the XML report to `<out_prefix>_global.xml`.
    pub fn evaluate(&self, pred_bin: &Path, gt_bin: &Path, out_prefix: &Path) -> Result<()> {
        debug!(
            "Running {} on {} vs {}",
            ANALYZER_BINARY,
            pred_bin.display(),
            gt_bin.display()
        );

        let output = Command::new(&self.binary)
            .arg("-i")
            .arg(pred_bin)
            .arg("-r")
            .arg(gt_bin)
            .arg("-o")
            .arg(out_prefix)
            .args(["-d", "-s", "-X"])
            .output()
            .with_context(|| format!("Failed to run {}", self.binary.display()))?;

        if !output.status.success() {
            bail!(
                "{} exited with {} for `{}`: {}",
                ANALYZER_BINARY,
                output.status,
                out_prefix.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_path_is_joined() {
        let analyzer = SegPerfAnalyzer::new(Path::new("/opt/anima/bin"));
        assert_eq!(
            analyzer.binary(),
            Path::new("/opt/anima/bin/animaSegPerfAnalyzer")
        );
    }

    #[test]
    fn test_missing_binary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = SegPerfAnalyzer::new(dir.path());

        assert!(analyzer.version().is_err());
        assert!(analyzer
            .evaluate(
                Path::new("pred_bin.nii.gz"),
                Path::new("gt_bin.nii.gz"),
                Path::new("out/subject"),
            )
            .is_err());
    }
}
