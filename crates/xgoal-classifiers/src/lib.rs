//! xgoal-classifiers: expected-goals modelling from shot-event data.
//!
//! This crate loads shot tables, normalizes pitch coordinates, builds the
//! distance and body-part features, assembles model-ready matrices, trains
//! gradient-boosted classifiers (with optional cross-validated grid search)
//! and evaluates them with ranking and calibration metrics and HTML reports.
pub mod config;
pub mod data_handling;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod io;
pub mod models;
pub mod preprocessing;
pub mod report;
pub mod stats;
