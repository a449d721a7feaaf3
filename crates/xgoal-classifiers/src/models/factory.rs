use crate::config::{ModelConfig, ModelType};
use crate::error::Result;
use crate::models::baseline::BaselineClassifier;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::gbdt::GBDTClassifier;

/// Build a boxed classifier model from a `ModelConfig`.
/// Hyperparameters are validated before anything is constructed.
pub fn build_model(params: ModelConfig) -> Result<Box<dyn ClassifierModel>> {
    params.validate()?;
    let model: Box<dyn ClassifierModel> = match params.model_type {
        ModelType::GBDT { .. } => Box::new(GBDTClassifier::new(params)),
        ModelType::Baseline {} => Box::new(BaselineClassifier::new()),
    };
    Ok(model)
}
