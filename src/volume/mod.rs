//! NIfTI volume loading, binarization, and writing.
//!
//! The analyzer accepts binarized inputs only, so each prediction and
//! ground-truth volume is thresholded before invocation. Binarized copies
//! are written with a fresh default header: the source affines are
//! deliberately discarded so both inputs end up in one space.

use anyhow::{Context, Result};
use ndarray::{Array3, Ix3};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};
use std::path::Path;

/// Voxel threshold above which a voxel counts as foreground.
///
/// Strictly greater-than: a voxel of exactly 0.5 stays background.
pub const BINARIZE_THRESHOLD: f32 = 0.5;

/// Load a 3-D NIfTI volume as `f32`.
pub fn load(path: &Path) -> Result<Array3<f32>> {
    let obj = ReaderOptions::new()
        .read_file(path)
        .with_context(|| format!("Failed to read NIfTI volume: {}", path.display()))?;

    let data = obj
        .into_volume()
        .into_ndarray::<f32>()
        .with_context(|| format!("Failed to decode NIfTI volume: {}", path.display()))?;

    data.into_dimensionality::<Ix3>()
        .with_context(|| format!("Volume is not 3-D: {}", path.display()))
}

/// Threshold a volume into a 0.0/1.0 mask.
pub fn binarize(volume: &Array3<f32>) -> Array3<f32> {
    volume.mapv(|v| if v > BINARIZE_THRESHOLD { 1.0 } else { 0.0 })
}

/// Write a volume to disk; `.nii.gz` paths are gzip-compressed.
pub fn save(volume: &Array3<f32>, path: &Path) -> Result<()> {
    WriterOptions::new(path)
        .write_nifti(volume)
        .with_context(|| format!("Failed to write NIfTI volume: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr3;

    #[test]
    fn test_binarize_threshold_is_strict() {
        let volume = arr3(&[[[0.0_f32, 0.5], [0.51, 1.0]], [[0.49, 0.500001], [2.0, -1.0]]]);
        let mask = binarize(&volume);

        // Exactly 0.5 maps to background, 0.51 to foreground.
        assert_eq!(mask[[0, 0, 0]], 0.0);
        assert_eq!(mask[[0, 0, 1]], 0.0);
        assert_eq!(mask[[0, 1, 0]], 1.0);
        assert_eq!(mask[[0, 1, 1]], 1.0);
        assert_eq!(mask[[1, 0, 0]], 0.0);
        assert_eq!(mask[[1, 0, 1]], 1.0);
        assert_eq!(mask[[1, 1, 0]], 1.0);
        assert_eq!(mask[[1, 1, 1]], 0.0);
    }

    #[test]
    fn test_binarize_output_is_binary() {
        let volume = arr3(&[[[0.1_f32, 0.9, 0.3], [0.7, 0.5, 0.6]]]);
        let mask = binarize(&volume);
        assert!(mask.iter().all(|&v| v == 0.0 || v == 1.0));
        assert_eq!(mask.shape(), volume.shape());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask_bin.nii.gz");

        let mask = arr3(&[[[0.0_f32, 1.0], [1.0, 0.0]], [[1.0, 1.0], [0.0, 0.0]]]);
        save(&mask, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.shape(), mask.shape());
        assert_eq!(loaded, mask);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(load(Path::new("/does/not/exist.nii.gz")).is_err());
    }
}
