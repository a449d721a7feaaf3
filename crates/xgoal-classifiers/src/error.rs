use std::error::Error;
use std::fmt;

/// Precondition failures raised by the data-preparation and modelling steps.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A required column is not present in the frame
    MissingColumn(String),
    /// A column exists but holds the wrong kind of values
    ColumnType { column: String, expected: &'static str },
    /// A label value outside {0, 1}
    InvalidLabel { row: usize, value: i64 },
    /// Row counts of two aligned inputs differ
    LengthMismatch { left: usize, right: usize },
    AlreadyNormalized,
    NotNormalized,
    /// Train/test split cannot produce two non-empty partitions
    InvalidSplit(String),
    InvalidHyperparameter(String),
    ModelNotFitted,
    /// Ranking metrics need both classes present
    SingleClass,
    EmptyInput,
    /// A score or probability is NaN or infinite
    NonFiniteScore { index: usize },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PipelineError::MissingColumn(name) => write!(f, "Missing required column '{}'", name),
            PipelineError::ColumnType { column, expected } => {
                write!(f, "Column '{}' must hold {} values", column, expected)
            }
            PipelineError::InvalidLabel { row, value } => {
                write!(f, "Label at row {} must be 0 or 1, found {}", row, value)
            }
            PipelineError::LengthMismatch { left, right } => {
                write!(f, "Inputs must have equal length ({} != {})", left, right)
            }
            PipelineError::AlreadyNormalized => {
                write!(f, "Coordinates are already normalized to the unit square")
            }
            PipelineError::NotNormalized => {
                write!(f, "Coordinates must be normalized before building features")
            }
            PipelineError::InvalidSplit(msg) => write!(f, "Invalid train/test split: {}", msg),
            PipelineError::InvalidHyperparameter(msg) => write!(f, "Invalid hyperparameter: {}", msg),
            PipelineError::ModelNotFitted => write!(f, "Model must be fitted before predicting"),
            PipelineError::SingleClass => {
                write!(f, "Labels must contain both positive and negative examples")
            }
            PipelineError::EmptyInput => write!(f, "Input contains no rows"),
            PipelineError::NonFiniteScore { index } => {
                write!(f, "Score at position {} is not a finite number", index)
            }
        }
    }
}

impl Error for PipelineError {}

pub type Result<T> = std::result::Result<T, PipelineError>;
