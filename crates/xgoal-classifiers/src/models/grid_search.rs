//! Cross-validated grid search over GBDT hyperparameters.
//!
//! Every combination of the candidate values is scored with k-fold
//! cross-validation on the training set; the combination with the highest
//! mean fold score wins. Folds are drawn once and shared by all candidates.
//! Candidates are evaluated on the rayon pool, each worker fitting its own
//! models.
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::config::{ModelConfig, ModelType};
use crate::dataset::{k_fold_indices, Dataset};
use crate::error::{PipelineError, Result};
use crate::models::factory::build_model;
use crate::stats;

/// Metric maximised by the search. Losses are negated so higher is better.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    RocAuc,
    AveragePrecision,
    NegBrierScore,
    NegLogLoss,
}

impl Scoring {
    pub fn score(&self, labels: &[bool], probs: &[f64]) -> Result<f64> {
        match self {
            Scoring::RocAuc => stats::roc_auc(labels, probs),
            Scoring::AveragePrecision => stats::average_precision(labels, probs),
            Scoring::NegBrierScore => stats::brier_score(labels, probs).map(|v| -v),
            Scoring::NegLogLoss => stats::log_loss(labels, probs).map(|v| -v),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scoring::RocAuc => "roc_auc",
            Scoring::AveragePrecision => "average_precision",
            Scoring::NegBrierScore => "neg_brier_score",
            Scoring::NegLogLoss => "neg_log_loss",
        }
    }
}

impl FromStr for Scoring {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "roc_auc" => Ok(Scoring::RocAuc),
            "average_precision" => Ok(Scoring::AveragePrecision),
            "neg_brier_score" => Ok(Scoring::NegBrierScore),
            "neg_log_loss" => Ok(Scoring::NegLogLoss),
            _ => Err(format!(
                "Unknown scoring metric: {}. Expected one of: roc_auc, average_precision, neg_brier_score, neg_log_loss",
                s
            )),
        }
    }
}

/// Candidate values per hyperparameter. An empty list keeps the base value.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GridSearchConfig {
    pub learning_rate: Vec<f32>,
    pub max_depth: Vec<u32>,
    pub num_boost_round: Vec<u32>,
    pub scoring: Scoring,
    pub n_folds: usize,
    pub seed: Option<u64>,
}

impl Default for GridSearchConfig {
    fn default() -> Self {
        Self {
            learning_rate: vec![0.05, 0.1],
            max_depth: vec![3, 5],
            num_boost_round: vec![50, 100],
            scoring: Scoring::AveragePrecision,
            n_folds: 5,
            seed: Some(42),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct GridPointResult {
    pub config: ModelConfig,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
    pub std_score: f64,
}

#[derive(Serialize, Debug, Clone)]
pub struct GridSearchResult {
    pub scoring: Scoring,
    pub best: ModelConfig,
    pub best_score: f64,
    pub results: Vec<GridPointResult>,
}

/// Expand the grid around `base`. Only GBDT configurations have a grid.
pub fn candidates(base: &ModelConfig, grid: &GridSearchConfig) -> Result<Vec<ModelConfig>> {
    let ModelType::GBDT {
        max_depth,
        num_boost_round,
        debug,
        training_optimization_level,
        loss_type,
    } = &base.model_type
    else {
        return Err(PipelineError::InvalidHyperparameter(
            "grid search requires a GBDT base configuration".to_string(),
        ));
    };

    let or_base = |values: &[u32], base: u32| {
        if values.is_empty() {
            vec![base]
        } else {
            values.to_vec()
        }
    };
    let learning_rates = if grid.learning_rate.is_empty() {
        vec![base.learning_rate]
    } else {
        grid.learning_rate.clone()
    };
    let depths = or_base(&grid.max_depth, *max_depth);
    let rounds = or_base(&grid.num_boost_round, *num_boost_round);

    let mut out = Vec::with_capacity(learning_rates.len() * depths.len() * rounds.len());
    for &learning_rate in &learning_rates {
        for &depth in &depths {
            for &round in &rounds {
                let config = ModelConfig::new(
                    learning_rate,
                    ModelType::GBDT {
                        max_depth: depth,
                        num_boost_round: round,
                        debug: *debug,
                        training_optimization_level: *training_optimization_level,
                        loss_type: loss_type.clone(),
                    },
                );
                config.validate()?;
                out.push(config);
            }
        }
    }
    Ok(out)
}

fn cross_validate(
    config: &ModelConfig,
    dataset: &Dataset,
    folds: &[(Vec<usize>, Vec<usize>)],
    scoring: Scoring,
) -> Result<GridPointResult> {
    let mut fold_scores = Vec::with_capacity(folds.len());
    for (fold, (train_idx, val_idx)) in folds.iter().enumerate() {
        let train = dataset.filter_by_indices(train_idx);
        let validation = dataset.filter_by_indices(val_idx);

        let mut model = build_model(config.clone())?;
        model.fit(&train.x, &train.y.to_vec())?;
        let probs: Vec<f64> = model
            .predict_proba(&validation.x)?
            .into_iter()
            .map(f64::from)
            .collect();
        let score = scoring.score(&validation.labels_as_bool(), &probs)?;
        log::trace!("{:?} fold {}: {} = {:.4}", config, fold, scoring.name(), score);
        fold_scores.push(score);
    }

    let mean_score = fold_scores.iter().mean();
    let std_score = fold_scores.iter().population_std_dev();
    Ok(GridPointResult {
        config: config.clone(),
        fold_scores,
        mean_score,
        std_score,
    })
}

/// Highest mean score; ties keep the earliest grid point.
fn select_best(results: &[GridPointResult]) -> Option<&GridPointResult> {
    results.iter().fold(None, |best, r| match best {
        Some(b) if b.mean_score >= r.mean_score => Some(b),
        _ => Some(r),
    })
}

/// Run the search on `dataset` and return every grid point plus the winner.
pub fn grid_search(base: &ModelConfig, grid: &GridSearchConfig, dataset: &Dataset) -> Result<GridSearchResult> {
    let configs = candidates(base, grid)?;
    let folds = k_fold_indices(&dataset.y.to_vec(), grid.n_folds, grid.seed)?;
    log::info!(
        "Grid search: {} candidates x {} folds, scoring {}",
        configs.len(),
        folds.len(),
        grid.scoring.name()
    );

    let results = configs
        .par_iter()
        .map(|config| cross_validate(config, dataset, &folds, grid.scoring))
        .collect::<Result<Vec<_>>>()?;

    let best = select_best(&results).ok_or(PipelineError::EmptyInput)?;

    log::info!(
        "Best {} = {:.4} (+/- {:.4}) with {:?}",
        grid.scoring.name(),
        best.mean_score,
        best.std_score,
        best.config
    );

    Ok(GridSearchResult {
        scoring: grid.scoring,
        best: best.config.clone(),
        best_score: best.mean_score,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn grid_expands_cartesian_product() {
        let grid = GridSearchConfig {
            learning_rate: vec![0.05, 0.1, 0.2],
            max_depth: vec![2, 4],
            num_boost_round: vec![],
            ..GridSearchConfig::default()
        };
        let configs = candidates(&ModelConfig::default(), &grid).unwrap();
        assert_eq!(configs.len(), 6);
        for c in &configs {
            match c.model_type {
                ModelType::GBDT { num_boost_round, .. } => assert_eq!(num_boost_round, 100),
                _ => panic!("expected GBDT"),
            }
        }
    }

    #[test]
    fn invalid_candidate_rejected() {
        let grid = GridSearchConfig {
            num_boost_round: vec![0],
            ..GridSearchConfig::default()
        };
        assert!(matches!(
            candidates(&ModelConfig::default(), &grid),
            Err(PipelineError::InvalidHyperparameter(_))
        ));
    }

    #[test]
    fn baseline_has_no_grid() {
        let base = ModelConfig::new(0.1, ModelType::Baseline {});
        assert!(candidates(&base, &GridSearchConfig::default()).is_err());
    }

    #[test]
    fn scoring_parses_names() {
        assert_eq!("roc_auc".parse::<Scoring>().unwrap(), Scoring::RocAuc);
        assert_eq!(
            "AVERAGE_PRECISION".parse::<Scoring>().unwrap(),
            Scoring::AveragePrecision
        );
        assert!("f1".parse::<Scoring>().is_err());
    }

    #[test]
    fn search_picks_a_candidate() {
        let n = 60;
        let x = Array2::from_shape_fn((n, 2), |(r, c)| {
            if c == 0 {
                (r % 6) as f32 / 6.0
            } else {
                (r % 5) as f32 / 5.0
            }
        });
        let y = (0..n).map(|r| (r % 6 >= 4) as i32).collect();
        let dataset = Dataset::new(x, y, vec!["a".into(), "b".into()]).unwrap();

        let grid = GridSearchConfig {
            learning_rate: vec![0.1],
            max_depth: vec![2, 3],
            num_boost_round: vec![5],
            scoring: Scoring::RocAuc,
            n_folds: 3,
            seed: Some(0),
        };
        let result = grid_search(&ModelConfig::default(), &grid, &dataset).unwrap();
        assert_eq!(result.results.len(), 2);
        assert!(result.results.iter().all(|r| r.fold_scores.len() == 3));
        assert!(result.best_score >= result.results[1].mean_score);
        assert!(result.best_score > 0.5);
    }

    fn point(depth: u32, mean_score: f64) -> GridPointResult {
        GridPointResult {
            config: ModelConfig::new(
                0.1,
                ModelType::GBDT {
                    max_depth: depth,
                    num_boost_round: 10,
                    debug: false,
                    training_optimization_level: 2,
                    loss_type: "LogLikelyhood".to_string(),
                },
            ),
            fold_scores: vec![mean_score],
            mean_score,
            std_score: 0.0,
        }
    }

    #[test]
    fn ties_keep_earliest_candidate() {
        let results = vec![point(2, 0.7), point(3, 0.8), point(4, 0.8), point(5, 0.6)];
        let best = select_best(&results).unwrap();
        assert_eq!(best.config, results[1].config);
        assert!(select_best(&[]).is_none());
    }

    #[test]
    fn sparse_goals_search_for_any_seed() {
        // 50 shots, 5 goals: stratified folds keep a goal in every fold
        let n = 50;
        let x = Array2::from_shape_fn((n, 2), |(r, c)| {
            if c == 0 {
                if r % 10 == 0 { 0.9 } else { (r % 9) as f32 / 10.0 }
            } else {
                (r % 7) as f32 / 7.0
            }
        });
        let y = (0..n).map(|r| (r % 10 == 0) as i32).collect();
        let dataset = Dataset::new(x, y, vec!["a".into(), "b".into()]).unwrap();

        for seed in 0..10 {
            let grid = GridSearchConfig {
                learning_rate: vec![0.1],
                max_depth: vec![2],
                num_boost_round: vec![3],
                scoring: Scoring::AveragePrecision,
                n_folds: 5,
                seed: Some(seed),
            };
            let result = grid_search(&ModelConfig::default(), &grid, &dataset);
            assert!(result.is_ok(), "seed {}: {:?}", seed, result.err());
        }
    }
}
