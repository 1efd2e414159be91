//! Declarative preprocessing and augmentation pipelines.
//!
//! The training framework consumes its transform pipeline as an ordered
//! list of named steps. This module declares the project's train and
//! validation pipelines and serializes them to JSON, tagged with the
//! framework's dictionary-transform names (`LoadImaged`, `RandAffined`,
//! ...). Parameter values follow the preprocessing order the pipeline was
//! tuned with: crop to non-zero, normalize, resample to target spacing,
//! then augment.

use serde::Serialize;

/// Median image size in voxels after 1 mm isotropic resampling, used as the
/// symmetric padding target.
pub const MEDIAN_IMAGE_SIZE: [usize; 3] = [192, 228, 106];

/// Target isotropic voxel spacing in mm.
pub const ISO_PIXDIM: [f64; 3] = [1.0, 1.0, 1.0];

/// Key the image volume travels under in each sample dictionary.
pub const IMAGE_KEY: &str = "image";

/// Default key for the label volume.
pub const DEFAULT_LABEL_KEY: &str = "label";

/// One step of a transform pipeline.
///
/// Serializes with the framework's transform name as the `name` tag and the
/// step's parameters alongside.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name")]
pub enum TransformStep {
    /// Load the image and label volumes from disk.
    #[serde(rename = "LoadImaged")]
    LoadImage { keys: Vec<String> },

    /// Move the channel dimension first.
    #[serde(rename = "EnsureChannelFirstd")]
    EnsureChannelFirst { keys: Vec<String> },

    /// Crop to the bounding box of non-zero image voxels.
    #[serde(rename = "CropForegroundd")]
    CropForeground { keys: Vec<String>, source_key: String },

    /// Normalize image intensity.
    #[serde(rename = "NormalizeIntensityd")]
    NormalizeIntensity {
        keys: Vec<String>,
        nonzero: bool,
        channel_wise: bool,
    },

    /// Resample to a target voxel spacing.
    #[serde(rename = "Spacingd")]
    Spacing {
        keys: Vec<String>,
        pixdim: [f64; 3],
        mode: Vec<String>,
    },

    /// Reorient to a canonical axis code.
    #[serde(rename = "Orientationd")]
    Orientation { keys: Vec<String>, axcodes: String },

    /// Pad to a fixed spatial size.
    #[serde(rename = "SpatialPadd")]
    SpatialPad {
        keys: Vec<String>,
        spatial_size: [usize; 3],
        method: String,
    },

    /// Randomly crop fixed-size patches centered on foreground or
    /// background voxels with probability pos / (pos + neg).
    #[serde(rename = "RandCropByPosNegLabeld")]
    RandCropByPosNegLabel {
        keys: Vec<String>,
        label_key: String,
        spatial_size: [usize; 3],
        pos: f64,
        neg: f64,
        num_samples: usize,
        image_key: String,
        image_threshold: f64,
    },

    /// Random affine transform (rotation, scaling, translation).
    #[serde(rename = "RandAffined")]
    RandAffine {
        keys: Vec<String>,
        mode: Vec<String>,
        prob: f64,
        rotate_range: (f64, f64),
        scale_range: (f64, f64),
        translate_range: (f64, f64),
    },

    /// Random 3-D elastic deformation.
    #[serde(rename = "Rand3DElasticd")]
    Rand3dElastic {
        keys: Vec<String>,
        sigma_range: (f64, f64),
        magnitude_range: (f64, f64),
        prob: f64,
    },

    /// Randomly downsample and re-upsample to simulate low resolution.
    #[serde(rename = "RandSimulateLowResolutiond")]
    RandSimulateLowResolution {
        keys: Vec<String>,
        zoom_range: (f64, f64),
        prob: f64,
    },

    /// Random gamma contrast adjustment.
    #[serde(rename = "RandAdjustContrastd")]
    RandAdjustContrast {
        keys: Vec<String>,
        gamma: (f64, f64),
        prob: f64,
    },

    /// Random MRI bias field.
    #[serde(rename = "RandBiasFieldd")]
    RandBiasField {
        keys: Vec<String>,
        coeff_range: (f64, f64),
        degree: u32,
        prob: f64,
    },

    /// Random Gaussian smoothing.
    #[serde(rename = "RandGaussianSmoothd")]
    RandGaussianSmooth {
        keys: Vec<String>,
        sigma_x: (f64, f64),
        sigma_y: (f64, f64),
        sigma_z: (f64, f64),
        prob: f64,
    },
}

fn image_only() -> Vec<String> {
    vec![IMAGE_KEY.to_string()]
}

fn image_and(label_key: &str) -> Vec<String> {
    vec![IMAGE_KEY.to_string(), label_key.to_string()]
}

/// Training pipeline: preprocessing followed by augmentation.
///
/// `crop_size` is the patch size fed to the network and `num_samples` the
/// number of patches drawn per volume.
pub fn train_pipeline(
    crop_size: [usize; 3],
    num_samples: usize,
    label_key: &str,
) -> Vec<TransformStep> {
    vec![
        TransformStep::LoadImage {
            keys: image_and(label_key),
        },
        TransformStep::EnsureChannelFirst {
            keys: image_and(label_key),
        },
        TransformStep::CropForeground {
            keys: image_and(label_key),
            source_key: IMAGE_KEY.to_string(),
        },
        TransformStep::NormalizeIntensity {
            keys: image_only(),
            nonzero: false,
            channel_wise: false,
        },
        TransformStep::Spacing {
            keys: image_and(label_key),
            pixdim: ISO_PIXDIM,
            mode: vec!["bilinear".to_string(), "bilinear".to_string()],
        },
        TransformStep::SpatialPad {
            keys: image_and(label_key),
            spatial_size: MEDIAN_IMAGE_SIZE,
            method: "symmetric".to_string(),
        },
        TransformStep::RandCropByPosNegLabel {
            keys: image_and(label_key),
            label_key: label_key.to_string(),
            spatial_size: crop_size,
            pos: 2.0,
            neg: 1.0,
            num_samples,
            image_key: IMAGE_KEY.to_string(),
            image_threshold: 0.0,
        },
        TransformStep::RandAffine {
            keys: image_and(label_key),
            mode: vec!["bilinear".to_string(), "nearest".to_string()],
            prob: 1.0,
            rotate_range: (-20.0, 20.0),
            scale_range: (0.8, 1.2),
            translate_range: (-0.1, 0.1),
        },
        TransformStep::Rand3dElastic {
            keys: image_and(label_key),
            sigma_range: (3.5, 5.5),
            magnitude_range: (25.0, 35.0),
            prob: 0.5,
        },
        TransformStep::RandSimulateLowResolution {
            keys: image_only(),
            zoom_range: (0.5, 1.0),
            prob: 0.25,
        },
        TransformStep::RandAdjustContrast {
            keys: image_only(),
            gamma: (0.5, 1.5),
            prob: 0.5,
        },
        TransformStep::RandBiasField {
            keys: image_only(),
            coeff_range: (0.0, 0.5),
            degree: 3,
            prob: 0.3,
        },
        TransformStep::RandGaussianSmooth {
            keys: image_only(),
            sigma_x: (0.0, 2.0),
            sigma_y: (0.0, 2.0),
            sigma_z: (0.0, 2.0),
            prob: 0.3,
        },
    ]
}

/// Validation pipeline: preprocessing only, no augmentation.
pub fn val_pipeline(label_key: &str) -> Vec<TransformStep> {
    vec![
        TransformStep::LoadImage {
            keys: image_and(label_key),
        },
        TransformStep::EnsureChannelFirst {
            keys: image_and(label_key),
        },
        TransformStep::Orientation {
            keys: image_and(label_key),
            axcodes: "RPI".to_string(),
        },
        TransformStep::CropForeground {
            keys: image_and(label_key),
            source_key: IMAGE_KEY.to_string(),
        },
        TransformStep::NormalizeIntensity {
            keys: image_only(),
            nonzero: false,
            channel_wise: false,
        },
        TransformStep::Spacing {
            keys: image_and(label_key),
            pixdim: ISO_PIXDIM,
            mode: vec!["bilinear".to_string(), "bilinear".to_string()],
        },
    ]
}

/// Serialize a pipeline to pretty JSON for the training framework.
pub fn to_json(steps: &[TransformStep]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(steps)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_pipeline_order() {
        let steps = train_pipeline([64, 128, 128], 4, DEFAULT_LABEL_KEY);
        assert_eq!(steps.len(), 13);

        // Preprocessing comes before augmentation, in the tuned order.
        assert!(matches!(steps[0], TransformStep::LoadImage { .. }));
        assert!(matches!(steps[2], TransformStep::CropForeground { .. }));
        assert!(matches!(steps[3], TransformStep::NormalizeIntensity { .. }));
        assert!(matches!(steps[4], TransformStep::Spacing { .. }));
        assert!(matches!(steps[6], TransformStep::RandCropByPosNegLabel { .. }));
    }

    #[test]
    fn test_crop_parameters_propagate() {
        let steps = train_pipeline([48, 160, 320], 2, "seg");
        let crop = steps
            .iter()
            .find_map(|s| match s {
                TransformStep::RandCropByPosNegLabel {
                    spatial_size,
                    num_samples,
                    label_key,
                    pos,
                    neg,
                    ..
                } => Some((*spatial_size, *num_samples, label_key.clone(), *pos, *neg)),
                _ => None,
            })
            .unwrap();

        assert_eq!(crop.0, [48, 160, 320]);
        assert_eq!(crop.1, 2);
        assert_eq!(crop.2, "seg");
        assert_eq!(crop.3, 2.0);
        assert_eq!(crop.4, 1.0);
    }

    #[test]
    fn test_val_pipeline_has_no_random_steps() {
        let steps = val_pipeline(DEFAULT_LABEL_KEY);
        assert_eq!(steps.len(), 6);
        assert!(matches!(steps[2], TransformStep::Orientation { .. }));

        let json = to_json(&steps).unwrap();
        assert!(!json.contains("\"Rand"));
    }

    #[test]
    fn test_json_uses_framework_transform_names() {
        let json = to_json(&train_pipeline([64, 128, 128], 4, DEFAULT_LABEL_KEY)).unwrap();
        assert!(json.contains("\"name\": \"LoadImaged\""));
        assert!(json.contains("\"name\": \"RandAffined\""));
        assert!(json.contains("\"name\": \"Rand3DElasticd\""));
        assert!(json.contains("\"spatial_size\""));
    }
}
