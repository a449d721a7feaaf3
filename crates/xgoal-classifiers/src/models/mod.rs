pub mod baseline;
pub mod classifier_trait;
pub mod factory;
pub mod gbdt;
pub mod grid_search;

pub use classifier_trait::ClassifierModel;
