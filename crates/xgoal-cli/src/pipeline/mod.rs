//! The `train` and `features` commands: load, normalize, featurize, split,
//! fit, evaluate and write outputs.
pub mod config;
pub mod output;
pub mod report;
pub mod run;

pub use config::{load_pipeline_config, PipelineConfig};
pub use run::{assemble_features, run_pipeline, PipelineOutcome};
