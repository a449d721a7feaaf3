use ndarray::Array2;

use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::{check_training_data, ClassifierModel};

/// No-skill classifier that predicts the training goal rate for every shot.
///
/// Its ROC AUC is 0.5 and its average precision equals the goal rate of the
/// evaluated set, which makes it the reference point for any real model.
#[derive(Debug, Clone, Default)]
pub struct BaselineClassifier {
    rate: Option<f32>,
}

impl BaselineClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rate(&self) -> Option<f32> {
        self.rate
    }
}

impl ClassifierModel for BaselineClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<()> {
        let positives = check_training_data(x, y)?;
        self.rate = Some(positives as f32 / y.len() as f32);
        log::debug!("Baseline goal rate: {:?}", self.rate);
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>> {
        let rate = self.rate.ok_or(PipelineError::ModelNotFitted)?;
        Ok(vec![rate; x.nrows()])
    }

    fn name(&self) -> &str {
        "baseline"
    }
}
