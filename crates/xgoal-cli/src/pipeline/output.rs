use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use xgoal_classifiers::config::ModelConfig;
use xgoal_classifiers::dataset::Dataset;
use xgoal_classifiers::evaluation::EvaluationReport;
use xgoal_classifiers::models::grid_search::GridSearchResult;

use super::config::PipelineConfig;
use super::run::PipelineOutcome;
use crate::util::delimiter_for;

pub const PREDICTIONS_FILE: &str = "xgoal_predictions.tsv";
pub const METRICS_FILE: &str = "xgoal_metrics.json";
pub const REPORT_FILE: &str = "xgoal_report.html";
pub const CONFIG_FILE: &str = "xgoal_config.json";

#[derive(Serialize)]
struct MetricsOutput<'a> {
    model: &'a ModelConfig,
    evaluation: &'a EvaluationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    grid_search: Option<&'a GridSearchResult>,
}

/// Write the test-set predictions as `row_id`, `label`, `xg` (TSV).
pub fn write_predictions<P: AsRef<Path>>(outcome: &PipelineOutcome, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(BufWriter::new(file));

    writer.write_record(["row_id", "label", "xg"])?;
    for ((row_id, label), xg) in outcome
        .test
        .row_ids
        .iter()
        .zip(outcome.test.y.iter())
        .zip(&outcome.probabilities)
    {
        writer.write_record(&[row_id.to_string(), label.to_string(), format!("{:.6}", xg)])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the selected model, the evaluation metrics and any grid-search
/// results as pretty JSON.
pub fn write_metrics<P: AsRef<Path>>(outcome: &PipelineOutcome, path: P) -> Result<()> {
    let output = MetricsOutput {
        model: &outcome.model,
        evaluation: &outcome.evaluation,
        grid_search: outcome.grid_search.as_ref(),
    };
    let json = serde_json::to_string_pretty(&output)?;
    fs::write(path.as_ref(), json)
        .with_context(|| format!("Failed to write metrics: {:?}", path.as_ref()))
}

pub fn write_config<P: AsRef<Path>>(config: &PipelineConfig, path: P) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path.as_ref(), json)
        .with_context(|| format!("Failed to write config: {:?}", path.as_ref()))
}

/// Write the feature matrix with its label column. `None` writes CSV to stdout.
pub fn write_features(dataset: &Dataset, label: &str, output: Option<&Path>) -> Result<()> {
    let (sink, delimiter): (Box<dyn Write>, u8) = match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?;
            (Box::new(BufWriter::new(file)), delimiter_for(path))
        }
        None => (Box::new(io::stdout().lock()), b','),
    };
    let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_writer(sink);

    let mut header = dataset.feature_names.clone();
    header.push(label.to_string());
    writer.write_record(&header)?;

    for (row, label) in dataset.x.outer_iter().zip(dataset.y.iter()) {
        let mut record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        record.push(label.to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write predictions, metrics, the effective config and (if enabled) the
/// HTML report into the configured output directory.
pub fn write_outputs(config: &PipelineConfig, outcome: &PipelineOutcome) -> Result<()> {
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory: {}", config.output_dir))?;

    write_predictions(outcome, config.output_path(PREDICTIONS_FILE))?;
    write_metrics(outcome, config.output_path(METRICS_FILE))?;
    write_config(config, config.output_path(CONFIG_FILE))?;
    if config.report {
        super::report::write_report(config, outcome, config.output_path(REPORT_FILE))?;
    }
    log::info!("Wrote outputs to {}", config.output_dir);
    Ok(())
}
