//! export-transforms - emit the augmentation pipelines as JSON
//!
//! Writes `train_transforms.json` and `val_transforms.json` for the
//! external training framework.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error

use anyhow::{bail, Context, Result};
use clap::Parser;
use segeval::transforms::{self, DEFAULT_LABEL_KEY};
use std::path::PathBuf;

/// export-transforms - emit the augmentation pipelines as JSON
///
/// Examples:
///   export-transforms --out-dir pipelines
///   export-transforms --crop-size 48,160,320 --num-samples 2
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output folder for the pipeline files
    #[arg(long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Patch size drawn from each volume (three comma-separated voxels)
    #[arg(long, value_name = "X,Y,Z", value_delimiter = ',', default_value = "64,128,128")]
    crop_size: Vec<usize>,

    /// Number of patches drawn per volume
    #[arg(long, value_name = "COUNT", default_value = "4")]
    num_samples: usize,

    /// Dictionary key of the label volume
    #[arg(long, value_name = "KEY", default_value = DEFAULT_LABEL_KEY)]
    label_key: String,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run_export(args) {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run_export(args: Args) -> Result<()> {
    let crop_size: [usize; 3] = match args.crop_size.as_slice() {
        &[x, y, z] => [x, y, z],
        other => bail!("--crop-size needs exactly 3 values, got {}", other.len()),
    };

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create output folder: {}", args.out_dir.display()))?;

    let train = transforms::train_pipeline(crop_size, args.num_samples, &args.label_key);
    let val = transforms::val_pipeline(&args.label_key);

    let train_path = args.out_dir.join("train_transforms.json");
    let val_path = args.out_dir.join("val_transforms.json");
    std::fs::write(&train_path, transforms::to_json(&train)?)
        .with_context(|| format!("Failed to write {}", train_path.display()))?;
    std::fs::write(&val_path, transforms::to_json(&val)?)
        .with_context(|| format!("Failed to write {}", val_path.display()))?;

    println!("✅ Wrote {} and {}", train_path.display(), val_path.display());
    Ok(())
}
