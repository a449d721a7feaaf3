use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{PipelineError, Result};

/// Loss functions accepted by the `gbdt` backend that yield a goal probability.
pub const PROBABILITY_LOSSES: [&str; 2] = ["LogLikelyhood", "binary:logistic"];

/// Central configuration for models in the crate.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub learning_rate: f32,

    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    GBDT {
        max_depth: u32,
        num_boost_round: u32,
        debug: bool,
        training_optimization_level: u8,
        loss_type: String,
    },
    /// Predicts the training goal rate for every shot.
    Baseline {},
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::GBDT {
            max_depth: 3,
            num_boost_round: 100,
            debug: false,
            training_optimization_level: 2,
            loss_type: "LogLikelyhood".to_string(),
        }
    }
}

impl ModelType {
    pub fn name(&self) -> &'static str {
        match self {
            ModelType::GBDT { .. } => "gbdt",
            ModelType::Baseline {} => "baseline",
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gbdt" => Ok(ModelType::default()),
            "baseline" => Ok(ModelType::Baseline {}),
            _ => Err(format!(
                "Unknown model type: {}. Expected one of: gbdt, baseline",
                s
            )),
        }
    }
}

impl ModelConfig {
    pub fn new(learning_rate: f32, model_type: ModelType) -> Self {
        Self {
            learning_rate,
            model_type,
        }
    }

    /// Reject configurations the boosting backend cannot train with.
    pub fn validate(&self) -> Result<()> {
        match &self.model_type {
            ModelType::GBDT {
                max_depth,
                num_boost_round,
                loss_type,
                ..
            } => {
                if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
                    return Err(PipelineError::InvalidHyperparameter(format!(
                        "learning_rate must be positive, got {}",
                        self.learning_rate
                    )));
                }
                if *max_depth == 0 {
                    return Err(PipelineError::InvalidHyperparameter(
                        "max_depth must be at least 1".to_string(),
                    ));
                }
                if *num_boost_round == 0 {
                    return Err(PipelineError::InvalidHyperparameter(
                        "num_boost_round must be at least 1".to_string(),
                    ));
                }
                if !PROBABILITY_LOSSES.contains(&loss_type.as_str()) {
                    return Err(PipelineError::InvalidHyperparameter(format!(
                        "loss_type '{}' is not a probability loss (expected one of {:?})",
                        loss_type, PROBABILITY_LOSSES
                    )));
                }
                Ok(())
            }
            ModelType::Baseline {} => Ok(()),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            model_type: ModelType::default(),
        }
    }
}
