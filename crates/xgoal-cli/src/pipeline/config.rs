use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};

use xgoal_classifiers::config::ModelConfig;
use xgoal_classifiers::dataset::{default_features, DEFAULT_LABEL};
use xgoal_classifiers::evaluation::DEFAULT_CALIBRATION_BINS;
use xgoal_classifiers::models::grid_search::GridSearchConfig;

use crate::util::validate_tsv_or_csv_file;

/// Parameters for one training run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Shot table (.csv or .tsv)
    pub data: String,
    pub output_dir: String,
    /// Share of shots held out for evaluation
    pub test_size: f64,
    /// Shuffle seed for the split. `null` draws a fresh split every run.
    pub seed: Option<u64>,
    pub features: Vec<String>,
    pub label: String,
    pub model: ModelConfig,
    /// When set, the model hyperparameters are chosen by cross-validation.
    pub grid_search: Option<GridSearchConfig>,
    pub calibration_bins: usize,
    pub report: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data: String::new(),
            output_dir: String::from("."),
            test_size: 0.10,
            seed: Some(42),
            features: default_features(),
            label: DEFAULT_LABEL.to_string(),
            model: ModelConfig::default(),
            grid_search: None,
            calibration_bins: DEFAULT_CALIBRATION_BINS,
            report: true,
        }
    }
}

impl PipelineConfig {
    /// Load `config_path` (or the defaults) and apply command line overrides.
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => load_pipeline_config(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(data) = matches.get_one::<String>("data") {
            config.data = data.clone();
        }
        validate_tsv_or_csv_file(&config.data)?;

        if let Some(output_dir) = matches.get_one::<String>("output_dir") {
            config.output_dir = output_dir.clone();
        }
        if let Some(&seed) = matches.get_one::<u64>("seed") {
            config.seed = Some(seed);
        }
        if let Some(&test_size) = matches.get_one::<f64>("test_size") {
            config.test_size = test_size;
        }
        if matches.get_flag("grid_search") && config.grid_search.is_none() {
            config.grid_search = Some(GridSearchConfig::default());
        }
        if matches.get_flag("no_report") {
            config.report = false;
        }

        Ok(config)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        Path::new(&self.output_dir).join(file_name)
    }
}

/// Load a pipeline configuration from a JSON file. Missing fields take their
/// default values.
pub fn load_pipeline_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: PipelineConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}
