//! Held-out evaluation of a fitted shot classifier.
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::Result;
use crate::models::ClassifierModel;
use crate::stats::{self, CalibrationCurve};

pub const DEFAULT_CALIBRATION_BINS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub n_train: usize,
    pub n_test: usize,
    pub train_positive_rate: f64,
    pub test_positive_rate: f64,
    pub roc_auc: f64,
    pub average_precision: f64,
    /// AUC-PR of a no-skill model: the training goal rate
    pub baseline_average_precision: f64,
    pub brier_score: f64,
    pub log_loss: f64,
    pub accuracy: f64,
    pub calibration: CalibrationCurve,
}

impl EvaluationReport {
    pub fn log_summary(&self) {
        log::info!("----- Evaluation ({} test shots) -----", self.n_test);
        log::info!("ROC AUC:            {:.4}", self.roc_auc);
        log::info!(
            "PR AUC:             {:.4} (baseline {:.4})",
            self.average_precision,
            self.baseline_average_precision
        );
        log::info!("Brier score:        {:.4}", self.brier_score);
        log::info!("Log loss:           {:.4}", self.log_loss);
        log::info!("Accuracy @ 0.5:     {:.4}", self.accuracy);
    }
}

/// Score `probs` against `labels`. `train_positive_rate` sets the AUC-PR
/// baseline.
pub fn evaluate(
    labels: &[bool],
    probs: &[f64],
    train_positive_rate: f64,
    n_train: usize,
    calibration_bins: usize,
) -> Result<EvaluationReport> {
    let positives = labels.iter().filter(|&&l| l).count();
    Ok(EvaluationReport {
        n_train,
        n_test: labels.len(),
        train_positive_rate,
        test_positive_rate: if labels.is_empty() {
            0.0
        } else {
            positives as f64 / labels.len() as f64
        },
        roc_auc: stats::roc_auc(labels, probs)?,
        average_precision: stats::average_precision(labels, probs)?,
        baseline_average_precision: train_positive_rate,
        brier_score: stats::brier_score(labels, probs)?,
        log_loss: stats::log_loss(labels, probs)?,
        accuracy: stats::accuracy(labels, probs, 0.5)?,
        calibration: stats::calibration_curve(labels, probs, calibration_bins)?,
    })
}

/// Predict the test partition with `model` and evaluate it. Returns the
/// report together with the test probabilities in row order.
pub fn evaluate_model(
    model: &dyn ClassifierModel,
    train: &Dataset,
    test: &Dataset,
    calibration_bins: usize,
) -> Result<(EvaluationReport, Vec<f64>)> {
    let probs: Vec<f64> = model
        .predict_proba(&test.x)?
        .into_iter()
        .map(f64::from)
        .collect();
    let report = evaluate(
        &test.labels_as_bool(),
        &probs,
        train.positive_rate(),
        train.len(),
        calibration_bins,
    )?;
    Ok((report, probs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_is_training_rate() {
        let labels = [true, false, false, false];
        let probs = [0.7, 0.2, 0.1, 0.3];
        let report = evaluate(&labels, &probs, 0.125, 40, 5).unwrap();
        assert_eq!(report.baseline_average_precision, 0.125);
        assert_eq!(report.roc_auc, 1.0);
        assert_eq!(report.test_positive_rate, 0.25);
        assert_eq!(report.n_train, 40);
    }

    #[test]
    fn single_class_test_set_fails() {
        assert!(evaluate(&[false, false], &[0.1, 0.2], 0.1, 10, 10).is_err());
    }
}
