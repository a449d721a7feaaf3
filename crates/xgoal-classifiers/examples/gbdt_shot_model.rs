//! Train a GBDT xG model on a shot table and write an HTML report.
//!
//! cargo run --example gbdt_shot_model -- shots.csv [report.html]
use anyhow::{Context, Result};
use maud::html;

use xgoal_classifiers::config::ModelConfig;
use xgoal_classifiers::dataset::{assemble, default_features, train_test_split, DEFAULT_LABEL};
use xgoal_classifiers::evaluation::{evaluate_model, DEFAULT_CALIBRATION_BINS};
use xgoal_classifiers::features::build_features;
use xgoal_classifiers::io::read_shots;
use xgoal_classifiers::models::factory::build_model;
use xgoal_classifiers::preprocessing::normalize_coordinates;
use xgoal_classifiers::report::plots::{plot_calibration, plot_roc, plot_score_histogram};
use xgoal_classifiers::report::{Report, ReportSection};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let data = args.next().context("usage: gbdt_shot_model <shots.csv> [report.html]")?;
    let report_path = args.next().unwrap_or_else(|| "gbdt_shot_model.html".to_string());

    let frame = normalize_coordinates(&read_shots(&data)?)?;
    let dataset = assemble(&build_features(&frame)?, &default_features(), DEFAULT_LABEL)?;
    let (train, test) = train_test_split(&dataset, 0.10, Some(42))?;

    let mut model = build_model(ModelConfig::default())?;
    model.fit(&train.x, &train.y.to_vec())?;
    let (evaluation, probs) = evaluate_model(model.as_ref(), &train, &test, DEFAULT_CALIBRATION_BINS)?;
    evaluation.log_summary();

    let labels = test.labels_as_bool();
    let mut section = ReportSection::new("Held-out shots");
    section.add_content(html! {
        p { "ROC AUC " (format!("{:.3}", evaluation.roc_auc)) ", PR AUC " (format!("{:.3}", evaluation.average_precision)) }
    });
    section.add_plot(plot_roc(&labels, &probs, "ROC curve")?);
    section.add_plot(plot_calibration(&labels, &probs, DEFAULT_CALIBRATION_BINS, "Calibration")?);
    section.add_plot(plot_score_histogram(&labels, &probs, "xG distribution"));

    let mut report = Report::new("xGoal", env!("CARGO_PKG_VERSION"), None, "GBDT shot model");
    report.add_section(section);
    report.save_to_file(&report_path)?;
    println!("Report written to {}", report_path);
    Ok(())
}
