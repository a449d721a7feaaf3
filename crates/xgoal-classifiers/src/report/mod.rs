//! HTML evaluation reports with embedded plotly figures.
pub mod plots;
pub mod report;

pub use report::{Report, ReportSection};
