use anyhow::{Context, Result};

use xgoal_classifiers::config::ModelConfig;
use xgoal_classifiers::dataset::{assemble, train_test_split, Dataset};
use xgoal_classifiers::evaluation::{evaluate_model, EvaluationReport};
use xgoal_classifiers::features::build_features;
use xgoal_classifiers::io::read_shots;
use xgoal_classifiers::models::factory::build_model;
use xgoal_classifiers::models::grid_search::{grid_search, GridSearchResult};
use xgoal_classifiers::preprocessing::normalize_coordinates;

use super::config::PipelineConfig;

/// Everything a finished run produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub train: Dataset,
    pub test: Dataset,
    /// Configuration the final model was fitted with
    pub model: ModelConfig,
    pub grid_search: Option<GridSearchResult>,
    pub evaluation: EvaluationReport,
    /// Goal probability for each row of `test`
    pub probabilities: Vec<f64>,
}

/// Load, normalize and featurize the shot table, then assemble the model
/// matrix for `features` and `label`.
pub fn assemble_features(data: &str, features: &[String], label: &str) -> Result<Dataset> {
    let frame = read_shots(data)?;
    frame.log_summary();

    let normalized = normalize_coordinates(&frame).context("Failed to normalize coordinates")?;
    let featurized = build_features(&normalized).context("Failed to build features")?;
    let dataset = assemble(&featurized, features, label).context("Failed to assemble dataset")?;
    log::debug!(
        "Assembled {} x {} matrix (label: {})",
        dataset.x.nrows(),
        dataset.x.ncols(),
        label
    );
    Ok(dataset)
}

/// Run the full train/evaluate pipeline described by `config`.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutcome> {
    let dataset = assemble_features(&config.data, &config.features, &config.label)?;
    dataset.log_summary("Dataset");

    let (train, test) = train_test_split(&dataset, config.test_size, config.seed)
        .context("Failed to split dataset")?;
    train.log_summary("Train");
    test.log_summary("Test");

    let (model_config, search) = match &config.grid_search {
        Some(grid) => {
            let result = grid_search(&config.model, grid, &train).context("Grid search failed")?;
            (result.best.clone(), Some(result))
        }
        None => (config.model.clone(), None),
    };

    let mut model = build_model(model_config.clone())?;
    log::info!("Fitting {} model on {} shots", model.name(), train.len());
    model
        .fit(&train.x, &train.y.to_vec())
        .with_context(|| format!("Failed to fit {} model", model.name()))?;

    let (evaluation, probabilities) = evaluate_model(model.as_ref(), &train, &test, config.calibration_bins)
        .context("Failed to evaluate model")?;
    evaluation.log_summary();

    Ok(PipelineOutcome {
        train,
        test,
        model: model_config,
        grid_search: search,
        evaluation,
        probabilities,
    })
}
