//! anima-metrics - segmentation scoring against ground truth
//!
//! A CLI tool that evaluates predicted segmentation masks against expert
//! ground truth using the external `animaSegPerfAnalyzer` command and
//! aggregates the per-subject reports into cohort statistics.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, pairing, volume I/O, analyzer failure)

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use segeval::analysis::aggregator;
use segeval::analyzer::SegPerfAnalyzer;
use segeval::cli::Args;
use segeval::config::AnimaConfig;
use segeval::models::{RunMetadata, SubjectPair};
use segeval::{pairing, report, volume};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Name of the per-dataset output folder inside the prediction folder.
const STATS_DIR_NAME: &str = "anima_stats";

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Initialize logging
    init_logging(&args);

    info!("anima-metrics v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the evaluation
    match run_evaluation(args) {
        Ok(()) => {}
        Err(e) => {
            error!("Evaluation failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete evaluation workflow.
fn run_evaluation(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Locate the ANIMA installation
    let config = AnimaConfig::load().context("Could not locate the ANIMA installation")?;
    let analyzer = SegPerfAnalyzer::new(&config.binaries_dir);
    println!("🔬 ANIMA binaries: {}", config.binaries_dir.display());

    match analyzer.version() {
        Ok(version) => println!("   animaSegPerfAnalyzer version: {}", version),
        Err(e) => warn!("Could not query analyzer version: {:#}", e),
    }

    // Prepare the output folder
    let stats_dir = args.pred_folder.join(STATS_DIR_NAME);
    std::fs::create_dir_all(&stats_dir)
        .with_context(|| format!("Failed to create stats folder: {}", stats_dir.display()))?;
    println!("📁 Saving performance metrics to: {}", stats_dir.display());

    // Step 1: Pair predictions with ground truths by subject identifier
    let pairs = pairing::discover_pairs(&args.pred_folder)?;
    println!("📊 Evaluating {} subject(s)...", pairs.len());

    // Step 2: Binarize and score each subject, one at a time
    let pb = ProgressBar::new(pairs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    for pair in &pairs {
        evaluate_subject(&analyzer, pair, &stats_dir)?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    // Step 3: Aggregate the per-subject reports
    let report_paths = aggregator::collect_report_paths(&stats_dir)?;
    let aggregation = aggregator::aggregate_reports(&report_paths)?;
    let summaries = aggregation.table.summaries();

    let metadata = RunMetadata {
        dataset: args.dataset_name.to_string(),
        run_date: Utc::now(),
        subjects_evaluated: aggregation.subjects_evaluated,
        subjects_skipped: aggregation.subjects_skipped,
        values_dropped: aggregation.values_dropped,
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };

    // Step 4: Report to console and the cumulative log
    println!();
    report::print_summaries(&summaries);

    let log_path = stats_dir.join(report::log_file_name(&metadata.dataset));
    report::append_log(&log_path, &metadata, &summaries)?;

    println!(
        "\n✅ Evaluated {} subject(s), skipped {} (empty GT), dropped {} value(s).",
        metadata.subjects_evaluated, metadata.subjects_skipped, metadata.values_dropped
    );
    println!("   Report appended to: {}", log_path.display());

    Ok(())
}

/// Binarize one subject's volumes and run the analyzer on them.
///
/// The binarized copies live in a scratch directory that is removed when
/// this function returns, on success and on error alike.
fn evaluate_subject(
    analyzer: &SegPerfAnalyzer,
    pair: &SubjectPair,
    stats_dir: &Path,
) -> Result<()> {
    debug!("Subject {}: {} vs {}", pair.subject, pair.pred.display(), pair.gt.display());

    let scratch = tempfile::tempdir().context("Failed to create scratch directory")?;

    // The analyzer accepts binarized inputs only
    let pred = volume::load(&pair.pred)?;
    let gt = volume::load(&pair.gt)?;

    let pred_bin = scratch.path().join(format!("{}_pred_bin.nii.gz", pair.subject));
    let gt_bin = scratch.path().join(format!("{}_gt_bin.nii.gz", pair.subject));
    volume::save(&volume::binarize(&pred), &pred_bin)?;
    volume::save(&volume::binarize(&gt), &gt_bin)?;

    analyzer
        .evaluate(&pred_bin, &gt_bin, &stats_dir.join(&pair.subject))
        .with_context(|| format!("Analyzer failed for subject `{}`", pair.subject))
}
