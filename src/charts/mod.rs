//! CSA comparison charts.
//!
//! The tabular dataset of per-subject, per-contrast CSA measurements is
//! derived into pairwise-difference and variability columns (`table`) and
//! rendered into comparative figures (`plot`).

use anyhow::{Context, Result};
use std::path::PathBuf;

pub mod plot;
pub mod table;

pub use plot::{method_color, render_panel_grid, DistributionSpec};
pub use table::CsaTable;

/// Create a timestamped `charts_<datetime>` output folder in the working
/// directory and return its path.
pub fn experiment_dir() -> Result<PathBuf> {
    let folder = PathBuf::from(format!(
        "charts_{}",
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    ));
    std::fs::create_dir_all(&folder)
        .with_context(|| format!("Failed to create chart folder: {}", folder.display()))?;
    Ok(folder)
}
