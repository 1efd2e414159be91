//! Discovery and pairing of prediction and ground-truth volumes.
//!
//! Predictions (`*_pred.nii.gz`) and ground truths (`*_gt.nii.gz`) are
//! discovered recursively under the prediction folder and paired by subject
//! identifier, taken from the file's parent directory name. Any identifier
//! without a counterpart halts the run before anything is scored.

use crate::models::SubjectPair;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Filename suffix identifying prediction volumes.
pub const PRED_SUFFIX: &str = "_pred.nii.gz";

/// Filename suffix identifying ground-truth volumes.
pub const GT_SUFFIX: &str = "_gt.nii.gz";

/// Fatal pairing failures.
#[derive(Debug, thiserror::Error)]
pub enum PairingError {
    /// A prediction exists for a subject with no ground truth.
    #[error("prediction for subject `{0}` has no matching ground truth")]
    MissingGroundTruth(String),

    /// A ground truth exists for a subject with no prediction.
    #[error("ground truth for subject `{0}` has no matching prediction")]
    MissingPrediction(String),

    /// Two volumes of the same kind resolve to one subject identifier.
    #[error("subject `{subject}` has more than one {kind} volume")]
    DuplicateSubject {
        /// The ambiguous subject identifier.
        subject: String,
        /// Which side is duplicated ("prediction" or "ground-truth").
        kind: &'static str,
    },

    /// The folder contains no prediction volumes at all.
    #[error("no `*{PRED_SUFFIX}` volumes found under `{0}`")]
    NoPredictions(PathBuf),
}

/// Discover all prediction/ground-truth pairs under `pred_folder`.
///
/// Returns pairs sorted by subject identifier so downstream processing order
/// is deterministic. Every prediction must have exactly one ground truth
/// with the same identifier and vice versa.
pub fn discover_pairs(pred_folder: &Path) -> Result<Vec<SubjectPair>, PairingError> {
    let mut preds: BTreeMap<String, PathBuf> = BTreeMap::new();
    let mut gts: BTreeMap<String, PathBuf> = BTreeMap::new();

    for entry in WalkDir::new(pred_folder).into_iter() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        let (kind, map) = if name.ends_with(PRED_SUFFIX) {
            ("prediction", &mut preds)
        } else if name.ends_with(GT_SUFFIX) {
            ("ground-truth", &mut gts)
        } else {
            continue;
        };

        let subject = subject_id(entry.path());
        if map.insert(subject.clone(), entry.path().to_path_buf()).is_some() {
            return Err(PairingError::DuplicateSubject { subject, kind });
        }
    }

    if preds.is_empty() {
        return Err(PairingError::NoPredictions(pred_folder.to_path_buf()));
    }

    let mut pairs = Vec::with_capacity(preds.len());
    for (subject, pred) in preds {
        let gt = gts
            .remove(&subject)
            .ok_or_else(|| PairingError::MissingGroundTruth(subject.clone()))?;
        pairs.push(SubjectPair { subject, pred, gt });
    }

    // Any leftover ground truth has no prediction counterpart.
    if let Some(subject) = gts.into_keys().next() {
        return Err(PairingError::MissingPrediction(subject));
    }

    Ok(pairs)
}

/// Subject identifier for a volume: the name of its parent directory.
///
/// The datasets lay each subject's volumes out in a folder named
/// `<subject>_<contrast>`, so the folder, not the filename, carries the
/// identity.
pub fn subject_id(path: &Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
