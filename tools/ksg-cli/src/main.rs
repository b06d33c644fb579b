//! KSG CLI: Kdenlive slideshow generator.
//!
//! Usage:
//!   ksg [OPTIONS] <PROJECT>    Animate every still image on the timeline
//!   ksg --show-config          Show the effective configuration
//!
//! Without a project path a short usage banner is printed.

use std::path::PathBuf;

use clap::Parser;
use ksg_common::config::{config_file_path, AppConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "ksg",
    about = "Add Ken Burns pan/zoom animations to the images of a Kdenlive project",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (default: $XDG_CONFIG_HOME/ksg/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    show_config: bool,

    #[command(flatten)]
    generate: GenerateArgs,
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Kdenlive project whose timeline holds the images
    project: Option<PathBuf>,

    /// Output project file [default: slideshow.kdenlive]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seed for reproducible effect selection
    #[arg(long)]
    seed: Option<u64>,

    /// Zoom factor applied on top of the covering scale
    #[arg(long)]
    zoom: Option<f64>,

    /// Write a JSON report of every processed entry
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config_file_path);
    let loaded = AppConfig::try_load_from(&config_path);
    let mut config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => AppConfig::default(),
    };

    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    ksg_common::logging::init_logging(&config.logging);

    match loaded {
        Ok(Some(_)) => tracing::debug!(path = %config_path.display(), "Loaded configuration"),
        Ok(None) => tracing::debug!(path = %config_path.display(), "No configuration file, using defaults"),
        Err(e) => tracing::warn!("Ignoring configuration at {}: {e}", config_path.display()),
    }

    if cli.show_config {
        return commands::config::run(&config, &config_path);
    }

    let GenerateArgs {
        project,
        output,
        seed,
        zoom,
        report,
    } = cli.generate;

    let Some(project) = project else {
        print_usage();
        return Ok(());
    };

    if let Some(zoom) = zoom {
        config.animation.zoom_factor = zoom;
    }
    let output = output.unwrap_or_else(|| config.output_file.clone());

    commands::generate::run(project, output, seed, report, &config)
}

fn print_usage() {
    println!("kdenlive slideshow generator");
    println!("usage: ksg projekt.kdenlive");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_project_named_config_is_a_project() {
        let cli = Cli::try_parse_from(["ksg", "config"]).unwrap();
        assert!(!cli.show_config);
        assert_eq!(cli.generate.project, Some(PathBuf::from("config")));
    }

    #[test]
    fn test_show_config_and_generate_flags() {
        let cli = Cli::try_parse_from(["ksg", "--show-config"]).unwrap();
        assert!(cli.show_config);
        assert_eq!(cli.generate.project, None);

        let cli = Cli::try_parse_from([
            "ksg", "in.kdenlive", "-o", "out.kdenlive", "--seed", "7", "--zoom", "1.2", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.generate.project, Some(PathBuf::from("in.kdenlive")));
        assert_eq!(cli.generate.output, Some(PathBuf::from("out.kdenlive")));
        assert_eq!(cli.generate.seed, Some(7));
        assert_eq!(cli.generate.zoom, Some(1.2));
    }
}
