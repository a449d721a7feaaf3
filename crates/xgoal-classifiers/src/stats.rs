//! Binary-classification metrics for probabilistic predictions.
//!
//! ROC and precision-recall curves walk the predictions in descending score
//! order, treating tied scores as a single threshold. Average precision uses
//! the step-wise definition `AP = sum_n (R_n - R_{n-1}) * P_n`, so a model
//! that predicts a constant scores exactly the positive rate.
use itertools_num::linspace;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Clip applied to probabilities before taking logarithms.
const LOG_LOSS_EPS: f64 = 1e-15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub thresholds: Vec<f64>,
    pub auc: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrCurve {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub thresholds: Vec<f64>,
    pub average_precision: f64,
}

/// Observed goal frequency against mean predicted probability per bin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationCurve {
    pub prob_true: Vec<f64>,
    pub prob_pred: Vec<f64>,
    pub counts: Vec<usize>,
}

fn check_lengths(labels: &[bool], scores: &[f64]) -> Result<()> {
    if labels.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    if labels.len() != scores.len() {
        return Err(PipelineError::LengthMismatch {
            left: labels.len(),
            right: scores.len(),
        });
    }
    if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
        return Err(PipelineError::NonFiniteScore { index });
    }
    Ok(())
}

fn check_both_classes(labels: &[bool]) -> Result<usize> {
    let positives = labels.iter().filter(|&&l| l).count();
    if positives == 0 || positives == labels.len() {
        return Err(PipelineError::SingleClass);
    }
    Ok(positives)
}

/// Cumulative (threshold, tp, fp) at each distinct score, highest first.
fn threshold_counts(labels: &[bool], scores: &[f64]) -> Vec<(f64, usize, usize)> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut counts = Vec::new();
    let (mut tp, mut fp) = (0usize, 0usize);
    let mut i = 0;
    while i < order.len() {
        let current = scores[order[i]];
        while i < order.len() && scores[order[i]] == current {
            if labels[order[i]] {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        counts.push((current, tp, fp));
    }
    counts
}

pub fn roc_curve(labels: &[bool], scores: &[f64]) -> Result<RocCurve> {
    check_lengths(labels, scores)?;
    let positives = check_both_classes(labels)? as f64;
    let negatives = labels.len() as f64 - positives;

    let mut fpr = vec![0.0];
    let mut tpr = vec![0.0];
    let mut thresholds = vec![f64::INFINITY];
    for (threshold, tp, fp) in threshold_counts(labels, scores) {
        fpr.push(fp as f64 / negatives);
        tpr.push(tp as f64 / positives);
        thresholds.push(threshold);
    }

    let auc: f64 = fpr
        .windows(2)
        .zip(tpr.windows(2))
        .map(|(x, y)| (x[1] - x[0]) * (y[1] + y[0]) / 2.0)
        .sum();

    Ok(RocCurve {
        fpr,
        tpr,
        thresholds,
        auc,
    })
}

/// Area under the ROC curve (trapezoidal).
pub fn roc_auc(labels: &[bool], scores: &[f64]) -> Result<f64> {
    Ok(roc_curve(labels, scores)?.auc)
}

pub fn precision_recall_curve(labels: &[bool], scores: &[f64]) -> Result<PrCurve> {
    check_lengths(labels, scores)?;
    let positives = check_both_classes(labels)? as f64;

    let mut precision = vec![1.0];
    let mut recall = vec![0.0];
    let mut thresholds = vec![f64::INFINITY];
    let mut average_precision = 0.0;
    for (threshold, tp, fp) in threshold_counts(labels, scores) {
        let p = tp as f64 / (tp + fp) as f64;
        let r = tp as f64 / positives;
        average_precision += (r - recall[recall.len() - 1]) * p;
        precision.push(p);
        recall.push(r);
        thresholds.push(threshold);
    }

    Ok(PrCurve {
        precision,
        recall,
        thresholds,
        average_precision,
    })
}

/// Area under the precision-recall curve as average precision.
pub fn average_precision(labels: &[bool], scores: &[f64]) -> Result<f64> {
    Ok(precision_recall_curve(labels, scores)?.average_precision)
}

/// Bin predictions into `n_bins` equal-width bins over [0, 1]. Empty bins are
/// dropped. A probability on an inner edge belongs to the lower bin.
pub fn calibration_curve(labels: &[bool], probs: &[f64], n_bins: usize) -> Result<CalibrationCurve> {
    check_lengths(labels, probs)?;
    if n_bins == 0 {
        return Err(PipelineError::InvalidHyperparameter(
            "calibration needs at least one bin".to_string(),
        ));
    }

    let edges: Vec<f64> = linspace(0.0, 1.0, n_bins + 1).collect();
    let inner = &edges[1..n_bins];

    let mut sum_pred = vec![0.0; n_bins];
    let mut sum_true = vec![0.0; n_bins];
    let mut counts = vec![0usize; n_bins];
    for (&label, &p) in labels.iter().zip(probs) {
        let bin = inner.iter().filter(|&&edge| edge < p).count();
        sum_pred[bin] += p;
        sum_true[bin] += if label { 1.0 } else { 0.0 };
        counts[bin] += 1;
    }

    let mut curve = CalibrationCurve {
        prob_true: Vec::new(),
        prob_pred: Vec::new(),
        counts: Vec::new(),
    };
    for bin in 0..n_bins {
        if counts[bin] > 0 {
            let n = counts[bin] as f64;
            curve.prob_true.push(sum_true[bin] / n);
            curve.prob_pred.push(sum_pred[bin] / n);
            curve.counts.push(counts[bin]);
        }
    }
    Ok(curve)
}

/// Mean squared error between probabilities and outcomes.
pub fn brier_score(labels: &[bool], probs: &[f64]) -> Result<f64> {
    check_lengths(labels, probs)?;
    let total: f64 = labels
        .iter()
        .zip(probs)
        .map(|(&l, &p)| (p - if l { 1.0 } else { 0.0 }).powi(2))
        .sum();
    Ok(total / labels.len() as f64)
}

/// Mean binary cross-entropy.
pub fn log_loss(labels: &[bool], probs: &[f64]) -> Result<f64> {
    check_lengths(labels, probs)?;
    let total: f64 = labels
        .iter()
        .zip(probs)
        .map(|(&l, &p)| {
            let p = p.clamp(LOG_LOSS_EPS, 1.0 - LOG_LOSS_EPS);
            if l {
                -p.ln()
            } else {
                -(1.0 - p).ln()
            }
        })
        .sum();
    Ok(total / labels.len() as f64)
}

/// Share of rows where `prob >= threshold` agrees with the label.
pub fn accuracy(labels: &[bool], probs: &[f64], threshold: f64) -> Result<f64> {
    check_lengths(labels, probs)?;
    let correct = labels
        .iter()
        .zip(probs)
        .filter(|&(&l, &p)| (p >= threshold) == l)
        .count();
    Ok(correct as f64 / labels.len() as f64)
}
