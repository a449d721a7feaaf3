use ndarray::Array2;

use crate::error::Result;

/// Contract shared by every shot classifier.
///
/// Labels use 0 for no goal and 1 for goal. Implementations convert to their
/// backend's convention internally.
pub trait ClassifierModel {
    /// Fit the model on a feature matrix and row-aligned labels.
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<()>;

    /// Goal probability for every row of `x`, each in [0, 1].
    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}

/// Shared input checks for `fit`.
pub(crate) fn check_training_data(x: &Array2<f32>, y: &[i32]) -> Result<usize> {
    use crate::error::PipelineError;

    if x.nrows() != y.len() {
        return Err(PipelineError::LengthMismatch {
            left: x.nrows(),
            right: y.len(),
        });
    }
    if y.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    for (row, &label) in y.iter().enumerate() {
        if label != 0 && label != 1 {
            return Err(PipelineError::InvalidLabel {
                row,
                value: label as i64,
            });
        }
    }
    Ok(y.iter().filter(|&&v| v == 1).count())
}
