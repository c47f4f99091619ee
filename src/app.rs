//! Application entry point: wires configuration, collaborators and the
//! pipeline together, then reports the produced files.

use crate::cli::Cli;
use crate::config::Config;
use crate::detect::WhisperProcessDetector;
use crate::error::Result;
use crate::media::FfmpegEngine;
use crate::pipeline::{Pipeline, RunOutputs};
use owo_colors::OwoColorize;
use std::sync::Arc;

/// Load the config, apply CLI overrides, run one pipeline pass and print
/// the output paths.
pub async fn run(cli: Cli) -> Result<RunOutputs> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_init(&config_path)?.with_env_overrides();

    // CLI overrides win over file and environment
    if let Some(dir) = cli.input_dir {
        config.paths.input_dir = dir;
    }
    if let Some(model) = cli.model {
        config.detection.model_id = model;
    }
    if let Some(device) = cli.device {
        config.detection.device = device;
    }
    config.validate()?;

    let detector = Arc::new(WhisperProcessDetector::new(
        config.paths.detector_script.clone(),
    ));
    let media = Arc::new(FfmpegEngine::new());

    let pipeline = Pipeline::new(config, detector, media)
        .with_quiet(cli.quiet)
        .with_verbosity(cli.verbose)
        .with_jobs(cli.jobs);

    let outputs = pipeline.run().await?;

    if !cli.quiet {
        eprintln!("{}", "done".green());
    }
    println!("{}", outputs.dictation.display());
    println!("{}", outputs.shadowing.display());
    println!("{}", outputs.transcript.display());

    Ok(outputs)
}
