//! csa-charts - comparative CSA visualizations
//!
//! Turns a CSV of per-subject, per-contrast CSA measurements into three
//! comparative figures: per-contrast pairwise-difference panels, the
//! aggregated pairwise-difference chart, and the across-contrast
//! variability chart.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, CSV, rendering failure)

use anyhow::{Context, Result};
use clap::Parser;
use segeval::charts::{self, CsaTable, DistributionSpec};
use segeval::config::ChartsConfig;
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// csa-charts - comparative CSA visualizations
///
/// Examples:
///   csa-charts --csv csa_measurements.csv --config charts.toml
///   csa-charts --csv csa_measurements.csv --config charts.toml --out-dir figures
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file with one row per subject and one `{method}_{contrast}`
    /// column per measurement
    #[arg(long, value_name = "FILE")]
    csv: PathBuf,

    /// TOML file listing methods, contrasts, and the reference contrast
    #[arg(long, value_name = "FILE")]
    config: PathBuf,

    /// Output folder for the rendered figures
    ///
    /// Defaults to a timestamped `charts_<datetime>` folder.
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    if let Err(e) = run_charts(args) {
        error!("Chart generation failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Legend labels for the pairwise-difference figures.
fn method_roles() -> [String; 3] {
    [
        "Benchmark".to_string(),
        "Single GT".to_string(),
        "Mean GT".to_string(),
    ]
}

fn run_charts(args: Args) -> Result<()> {
    let config = ChartsConfig::load(&args.config)?;
    let table = CsaTable::from_csv_path(&args.csv)?;
    info!("Loaded {} subject(s) from {}", table.n_rows(), args.csv.display());

    let out_dir = match args.out_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create output folder: {}", dir.display()))?;
            dir
        }
        None => charts::experiment_dir()?,
    };

    let pwd_contrasts = config.non_ref_contrasts();
    let (pwd_table, pwd_columns) =
        table.pairwise_diff(&config.methods, &pwd_contrasts, &config.ref_contrast)?;

    // Per-contrast panels: one distribution per method, per contrast.
    let mut panels = Vec::with_capacity(pwd_contrasts.len());
    for contrast in &pwd_contrasts {
        let columns: Vec<String> = config
            .methods
            .iter()
            .map(|m| format!("{}_{}", m, contrast))
            .collect();
        panels.push(DistributionSpec {
            title: format!(
                "{} CSA % difference across methods w.r.t {}",
                contrast, config.ref_contrast
            ),
            x_desc: "Methods".to_string(),
            y_desc: format!("% difference in CSA w.r.t {}", config.ref_contrast),
            series: pwd_table.series(&columns)?,
            benchmark_count: config.benchmark_count,
            roles: method_roles(),
            symmetric: true,
        });
    }
    let panel_path = out_dir.join("contrast_pwd.png");
    charts::render_panel_grid(&panel_path, &panels)?;
    debug!("Wrote {}", panel_path.display());

    // Aggregated pairwise difference across contrasts.
    let macro_pwd = DistributionSpec {
        title: "% difference in CSA across all contrasts".to_string(),
        x_desc: "Methods".to_string(),
        y_desc: format!("CSA % difference w.r.t {}", config.ref_contrast),
        series: pwd_table.series(&pwd_columns)?,
        benchmark_count: config.benchmark_count,
        roles: method_roles(),
        symmetric: true,
    };
    let macro_pwd_path = out_dir.join("macro_pwd.png");
    macro_pwd.render(&macro_pwd_path)?;
    debug!("Wrote {}", macro_pwd_path.display());

    // Across-contrast variability per method.
    let (sd_table, sd_columns) = table.per_subject_sd(&config.methods, &config.contrasts)?;
    let macro_sd = DistributionSpec {
        title: "Variability of CSA across MRI contrasts".to_string(),
        x_desc: "Segmentation type".to_string(),
        y_desc: "Standard deviation (mm^2)".to_string(),
        series: sd_table.series(&sd_columns)?,
        benchmark_count: config.benchmark_count,
        roles: [
            "Manual Ground Truth".to_string(),
            "MeanGT - Contrast specific".to_string(),
            "MeanGT - Generalist".to_string(),
        ],
        symmetric: false,
    };
    let macro_sd_path = out_dir.join("macro_sd.png");
    macro_sd.render(&macro_sd_path)?;
    debug!("Wrote {}", macro_sd_path.display());

    println!("✅ Wrote 3 figure(s) to: {}", out_dir.display());
    Ok(())
}
