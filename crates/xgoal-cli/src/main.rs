use anyhow::Result;
use clap::ArgMatches;
use log::LevelFilter;
use std::path::PathBuf;

use xgoal_cli::cli::build_cli;
use xgoal_cli::pipeline::output::{write_features, write_outputs};
use xgoal_cli::pipeline::{assemble_features, run_pipeline, PipelineConfig};
use xgoal_cli::util::validate_tsv_or_csv_file;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("XGOAL_LOG", "error,xgoal=info"))
        .init();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("features", sub_m)) => handle_features(sub_m),
        Some(("config", _)) => {
            println!("{}", serde_json::to_string_pretty(&PipelineConfig::default())?);
            Ok(())
        }
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    match config_path {
        Some(path) => eprintln!("[xGoal::Train] Using config: {:?}", path),
        None => eprintln!("[xGoal::Train] No config provided; using defaults."),
    }

    let config = match PipelineConfig::from_arguments(config_path, matches) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {:#}", e);
            std::process::exit(1)
        }
    };

    if config_path.is_none() {
        let default_json = serde_json::to_string_pretty(&config).unwrap_or_default();
        eprintln!("[xGoal::Train] Default config:\n{}", default_json);
    }

    eprintln!("[xGoal::Train] Training on shots from: {}", config.data);
    let outcome = match run_pipeline(&config) {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    };

    if let Err(e) = write_outputs(&config, &outcome) {
        log::error!("Failed to write outputs: {:#}", e);
        std::process::exit(1)
    }

    eprintln!(
        "[xGoal::Train] Completed: ROC AUC {:.4}, PR AUC {:.4} (baseline {:.4}) on {} test shots.",
        outcome.evaluation.roc_auc,
        outcome.evaluation.average_precision,
        outcome.evaluation.baseline_average_precision,
        outcome.evaluation.n_test
    );
    Ok(())
}

fn handle_features(matches: &ArgMatches) -> Result<()> {
    let data: &String = matches
        .get_one("data")
        .ok_or_else(|| anyhow::anyhow!("missing shot table argument"))?;
    let output: Option<&PathBuf> = matches.get_one("output_file");
    eprintln!("[xGoal::Features] Building features for: {}", data);

    let defaults = PipelineConfig::default();
    let result = validate_tsv_or_csv_file(data)
        .and_then(|_| assemble_features(data, &defaults.features, &defaults.label))
        .and_then(|dataset| write_features(&dataset, &defaults.label, output.map(|p| p.as_path())));

    if let Err(e) = result {
        log::error!("Feature export failed: {:#}", e);
        std::process::exit(1)
    }
    Ok(())
}
