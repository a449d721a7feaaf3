use plotly::common::{DashType, Line, Mode};
use plotly::histogram::HistNorm;
use plotly::layout::{Axis, BarMode, Layout};
use plotly::{Histogram, Plot, Scatter};

use crate::error::Result;
use crate::stats::{calibration_curve, precision_recall_curve, roc_curve};

fn diagonal(name: &str) -> Box<Scatter<f64, f64>> {
    Scatter::new(vec![0.0, 1.0], vec![0.0, 1.0])
        .mode(Mode::Lines)
        .name(name)
        .line(Line::new().color("grey").dash(DashType::Dash))
}

fn unit_layout(title: &str, x_title: &str, y_title: &str) -> Layout {
    Layout::new()
        .title(title)
        .x_axis(Axis::new().title(x_title).range(vec![0.0, 1.0]))
        .y_axis(Axis::new().title(y_title).range(vec![0.0, 1.05]))
}

/// ROC curve with the chance diagonal.
pub fn plot_roc(labels: &[bool], probs: &[f64], title: &str) -> Result<Plot> {
    let curve = roc_curve(labels, probs)?;

    let trace = Scatter::new(curve.fpr, curve.tpr)
        .mode(Mode::Lines)
        .name(format!("Model (AUC = {:.3})", curve.auc));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.add_trace(diagonal("Chance"));
    plot.set_layout(unit_layout(title, "False positive rate", "True positive rate"));
    Ok(plot)
}

/// Precision-recall curve with the no-skill line at `baseline`.
pub fn plot_precision_recall(labels: &[bool], probs: &[f64], baseline: f64, title: &str) -> Result<Plot> {
    let curve = precision_recall_curve(labels, probs)?;

    let trace = Scatter::new(curve.recall, curve.precision)
        .mode(Mode::Lines)
        .name(format!("Model (AP = {:.3})", curve.average_precision));

    let no_skill = Scatter::new(vec![0.0, 1.0], vec![baseline, baseline])
        .mode(Mode::Lines)
        .name(format!("No skill ({:.3})", baseline))
        .line(Line::new().color("grey").dash(DashType::Dash));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.add_trace(no_skill);
    plot.set_layout(unit_layout(title, "Recall", "Precision"));
    Ok(plot)
}

/// Reliability diagram: observed goal rate against mean predicted xG per bin.
pub fn plot_calibration(labels: &[bool], probs: &[f64], n_bins: usize, title: &str) -> Result<Plot> {
    let curve = calibration_curve(labels, probs, n_bins)?;

    let trace = Scatter::new(curve.prob_pred, curve.prob_true)
        .mode(Mode::LinesMarkers)
        .name("Model");

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.add_trace(diagonal("Perfectly calibrated"));
    plot.set_layout(unit_layout(title, "Mean predicted probability", "Fraction of goals"));
    Ok(plot)
}

/// Plot a histogram of the predicted probabilities for goals and non-goals
pub fn plot_score_histogram(labels: &[bool], probs: &[f64], title: &str) -> Plot {
    let mut goals = Vec::new();
    let mut misses = Vec::new();

    for (&label, &p) in labels.iter().zip(probs.iter()) {
        if label {
            goals.push(p);
        } else {
            misses.push(p);
        }
    }

    let trace_goals = Histogram::new(goals)
        .name("Goal")
        .opacity(0.6)
        .hist_norm(HistNorm::Probability);

    let trace_misses = Histogram::new(misses)
        .name("No goal")
        .opacity(0.6)
        .hist_norm(HistNorm::Probability);

    let layout = Layout::new()
        .title(title)
        .bar_mode(BarMode::Overlay)
        .x_axis(Axis::new().title("Predicted probability"))
        .y_axis(Axis::new().title("Share of shots"));

    let mut plot = Plot::new();
    plot.add_trace(trace_misses);
    plot.add_trace(trace_goals);
    plot.set_layout(layout);

    plot
}
