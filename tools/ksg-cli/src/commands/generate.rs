//! Animate the still images of a project and write the result.

use std::path::PathBuf;

use ksg_common::config::AppConfig;
use ksg_processing_core::animator::{EntryOutcome, EntryReport};
use ksg_processing_core::{AnimatorConfig, RandomPicker, SlideshowAnimator};
use ksg_project_model::project::KdenliveProject;

pub fn run(
    path: PathBuf,
    output: PathBuf,
    seed: Option<u64>,
    report_path: Option<PathBuf>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let animator_config = AnimatorConfig::from_defaults(&config.animation)
        .map_err(|e| anyhow::anyhow!("Invalid animation settings: {e}"))?;

    let mut project = KdenliveProject::load(&path)
        .map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    if let Some(root) = project.root_dir() {
        tracing::info!(root, "Loaded {}", path.display());
    }

    let picker = match seed {
        Some(seed) => {
            tracing::debug!(seed, "Using seeded effect picker");
            RandomPicker::seeded(seed)
        }
        None => RandomPicker::from_entropy(),
    };

    let mut animator = SlideshowAnimator::new(animator_config, picker);
    let report = animator
        .run_with_progress(&mut project, print_progress)
        .map_err(|e| anyhow::anyhow!("Failed to animate {}: {e}", path.display()))?;

    tracing::info!(
        animated = report.animated(),
        skipped = report.skipped_existing(),
        without_media = report.without_media(),
        "Slideshow pass complete"
    );

    if let Some(report_path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&report_path, json).map_err(|e| {
            anyhow::anyhow!("Failed to write report {}: {e}", report_path.display())
        })?;
    }

    project
        .save(&output)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output.display()))?;
    println!("{} generated", output.display());

    Ok(())
}

fn print_progress(entry: &EntryReport) {
    match &entry.outcome {
        EntryOutcome::Animated { resource, .. } => println!("working on {resource}"),
        EntryOutcome::SkippedExisting { resource } => {
            println!("skipping {resource} (a filter already exists)")
        }
        EntryOutcome::NoMedia { .. } => {}
    }
}
