use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::Array2;

use crate::config::{ModelConfig, ModelType};
use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::{check_training_data, ClassifierModel};

/// Gradient Boosting Decision Tree (GBDT) classifier
pub struct GBDTClassifier {
    model: Option<GBDT>,
    n_features: usize,
    params: ModelConfig,
}

impl GBDTClassifier {
    pub fn new(params: ModelConfig) -> Self {
        GBDTClassifier {
            model: None,
            n_features: 0,
            params,
        }
    }

    fn to_data_vec(x: &Array2<f32>, labels: Option<&[f32]>) -> DataVec {
        let mut data = DataVec::with_capacity(x.nrows());
        for (i, row) in x.outer_iter().enumerate() {
            let label = labels.map(|l| l[i]).unwrap_or(0.0);
            data.push(Data::new_training_data(row.to_vec(), 1.0, label, None));
        }
        data
    }
}

impl ClassifierModel for GBDTClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<()> {
        self.params.validate()?;
        let positives = check_training_data(x, y)?;
        if positives == 0 || positives == y.len() {
            return Err(PipelineError::SingleClass);
        }

        match &self.params.model_type {
            ModelType::GBDT {
                max_depth,
                num_boost_round,
                debug,
                training_optimization_level,
                loss_type,
            } => {
                let mut config = Config::new();

                config.set_feature_size(x.ncols());
                config.set_shrinkage(self.params.learning_rate);
                config.set_max_depth(*max_depth);
                config.set_iterations(*num_boost_round as usize);
                config.set_debug(*debug);
                config.set_training_optimization_level(*training_optimization_level);
                config.set_loss(loss_type);

                // LogLikelyhood expects -1/1 targets, binary:logistic expects 0/1.
                let labels: Vec<f32> = if loss_type == "LogLikelyhood" {
                    y.iter().map(|&v| if v == 1 { 1.0 } else { -1.0 }).collect()
                } else {
                    y.iter().map(|&v| v as f32).collect()
                };

                let mut train_x = Self::to_data_vec(x, Some(labels.as_slice()));
                let mut gbdt = GBDT::new(&config);
                log::debug!(
                    "Fitting GBDT on {} rows x {} features ({} rounds, depth {}, lr {})",
                    x.nrows(),
                    x.ncols(),
                    num_boost_round,
                    max_depth,
                    self.params.learning_rate
                );
                gbdt.fit(&mut train_x);

                self.n_features = x.ncols();
                self.model = Some(gbdt);
                Ok(())
            }
            other => Err(PipelineError::InvalidHyperparameter(format!(
                "expected GBDT parameters, got {:?}",
                other
            ))),
        }
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>> {
        let model = self.model.as_ref().ok_or(PipelineError::ModelNotFitted)?;
        if x.ncols() != self.n_features {
            return Err(PipelineError::LengthMismatch {
                left: self.n_features,
                right: x.ncols(),
            });
        }
        let test_x = Self::to_data_vec(x, None);
        let predictions = model.predict(&test_x);
        Ok(predictions.into_iter().map(|p| p.clamp(0.0, 1.0)).collect())
    }

    fn name(&self) -> &str {
        "gbdt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Array2<f32>, Vec<i32>) {
        // goal iff the first feature (closeness to goal) is large
        let x = Array2::from_shape_vec(
            (10, 2),
            vec![
                0.9, 0.1, 0.1, 0.4, 0.8, 0.3, 0.2, 0.9, 0.95, 0.5, 0.15, 0.2, 0.85, 0.7, 0.05,
                0.6, 0.9, 0.8, 0.3, 0.1,
            ],
        )
        .unwrap();
        let y = vec![1, 0, 1, 0, 1, 0, 1, 0, 1, 0];
        (x, y)
    }

    fn params() -> ModelConfig {
        ModelConfig::new(
            0.1,
            ModelType::GBDT {
                max_depth: 3,
                num_boost_round: 20,
                debug: false,
                training_optimization_level: 2,
                loss_type: "LogLikelyhood".to_string(),
            },
        )
    }

    #[test]
    fn test_gbdt_classifier() {
        let (x, y) = separable();
        let mut classifier = GBDTClassifier::new(params());
        classifier.fit(&x, &y).unwrap();

        let probs = classifier.predict_proba(&x).unwrap();
        assert_eq!(probs.len(), y.len());
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));

        let mean = |label: i32| {
            let v: Vec<f32> = probs
                .iter()
                .zip(&y)
                .filter(|&(_, &l)| l == label)
                .map(|(&p, _)| p)
                .collect();
            v.iter().sum::<f32>() / v.len() as f32
        };
        assert!(mean(1) > mean(0));
    }

    #[test]
    fn predict_before_fit_fails() {
        let classifier = GBDTClassifier::new(params());
        assert!(matches!(
            classifier.predict_proba(&Array2::zeros((1, 2))),
            Err(PipelineError::ModelNotFitted)
        ));
    }

    #[test]
    fn row_mismatch_rejected() {
        let (x, _) = separable();
        let mut classifier = GBDTClassifier::new(params());
        assert!(matches!(
            classifier.fit(&x, &[1, 0]),
            Err(PipelineError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn wrong_feature_count_rejected() {
        let (x, y) = separable();
        let mut classifier = GBDTClassifier::new(params());
        classifier.fit(&x, &y).unwrap();
        assert!(classifier.predict_proba(&Array2::zeros((2, 3))).is_err());
    }
}
