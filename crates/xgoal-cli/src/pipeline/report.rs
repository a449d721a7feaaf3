use std::path::Path;

use anyhow::{Context, Result};
use maud::{html, Markup};

use xgoal_classifiers::models::grid_search::GridSearchResult;
use xgoal_classifiers::report::plots::{
    plot_calibration, plot_precision_recall, plot_roc, plot_score_histogram,
};
use xgoal_classifiers::report::{Report, ReportSection};

use super::config::PipelineConfig;
use super::run::PipelineOutcome;

fn overview_table(outcome: &PipelineOutcome) -> Markup {
    let eval = &outcome.evaluation;
    html! {
        table {
            tr { th { "" } th { "Shots" } th { "Goals" } th { "Goal rate" } }
            tr {
                td { "Train" }
                td { (eval.n_train) }
                td { (outcome.train.n_positive()) }
                td { (format!("{:.4}", eval.train_positive_rate)) }
            }
            tr {
                td { "Test" }
                td { (eval.n_test) }
                td { (outcome.test.n_positive()) }
                td { (format!("{:.4}", eval.test_positive_rate)) }
            }
        }
        p { "Features: " (outcome.train.feature_names.join(", ")) }
    }
}

fn metrics_table(outcome: &PipelineOutcome) -> Markup {
    let eval = &outcome.evaluation;
    let rows = [
        ("ROC AUC", eval.roc_auc),
        ("PR AUC (average precision)", eval.average_precision),
        ("PR AUC baseline (train goal rate)", eval.baseline_average_precision),
        ("Brier score", eval.brier_score),
        ("Log loss", eval.log_loss),
        ("Accuracy at 0.5", eval.accuracy),
    ];
    html! {
        table {
            tr { th { "Metric" } th { "Value" } }
            @for (name, value) in rows {
                tr { td { (name) } td { (format!("{:.4}", value)) } }
            }
        }
    }
}

fn grid_table(search: &GridSearchResult) -> Markup {
    html! {
        p { "Scoring: " (search.scoring.name()) ", best " (format!("{:.4}", search.best_score)) }
        table {
            tr { th { "Model" } th { "Mean" } th { "Std" } }
            @for point in &search.results {
                tr {
                    td { (serde_json::to_string(&point.config).unwrap_or_default()) }
                    td { (format!("{:.4}", point.mean_score)) }
                    td { (format!("{:.4}", point.std_score)) }
                }
            }
        }
    }
}

/// Assemble the HTML report for a finished run.
pub fn build_report(config: &PipelineConfig, outcome: &PipelineOutcome) -> Result<Report> {
    let labels = outcome.test.labels_as_bool();
    let probs = &outcome.probabilities;
    let baseline = outcome.evaluation.baseline_average_precision;

    let mut report = Report::new(
        "xGoal",
        env!("CARGO_PKG_VERSION"),
        None,
        &format!("Expected goals: {} model", outcome.model.model_type.name()),
    );

    let mut overview = ReportSection::new("Overview");
    overview.add_content(overview_table(outcome));
    report.add_section(overview);

    let mut metrics = ReportSection::new("Metrics");
    metrics.add_content(metrics_table(outcome));
    report.add_section(metrics);

    let mut plots = ReportSection::new("Diagnostics");
    plots.add_plot(plot_roc(&labels, probs, "ROC curve")?);
    plots.add_plot(plot_precision_recall(&labels, probs, baseline, "Precision-recall curve")?);
    plots.add_plot(plot_calibration(
        &labels,
        probs,
        config.calibration_bins,
        "Calibration",
    )?);
    plots.add_plot(plot_score_histogram(&labels, probs, "xG distribution"));
    report.add_section(plots);

    if let Some(search) = &outcome.grid_search {
        let mut grid = ReportSection::new("Grid Search");
        grid.add_content(grid_table(search));
        report.add_section(grid);
    }

    let mut settings = ReportSection::new("Configuration");
    let config_json = serde_json::to_string_pretty(config)?;
    settings.add_content(html! { pre { (config_json) } });
    report.add_section(settings);

    Ok(report)
}

pub fn write_report<P: AsRef<Path>>(config: &PipelineConfig, outcome: &PipelineOutcome, path: P) -> Result<()> {
    let report = build_report(config, outcome)?;
    report
        .save_to_file(path.as_ref())
        .with_context(|| format!("Failed to write report: {:?}", path.as_ref()))?;
    log::info!("Report saved to {:?}", path.as_ref());
    Ok(())
}
