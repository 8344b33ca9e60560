use std::sync::Arc;

use wseval_core::metrics_api::EvalAlgorithm;

pub mod classification;
pub mod qa_accuracy;

pub use classification::{AverageStrategy, ClassificationAccuracy};
pub use qa_accuracy::QaAccuracy;

pub const DEFAULT_LABELS: [&str; 6] = [
    "irrelevant",
    "pii",
    "dqgeneral",
    "greeting",
    "redirection",
    "contact",
];

pub fn default_labels() -> Vec<String> {
    DEFAULT_LABELS.iter().map(|s| s.to_string()).collect()
}

/// Resolve an algorithm by its reported name.
pub fn algorithm_by_name(name: &str, labels: &[String]) -> Option<Arc<dyn EvalAlgorithm>> {
    match name {
        classification::NAME => Some(Arc::new(ClassificationAccuracy::new(labels.to_vec()))),
        qa_accuracy::NAME => Some(Arc::new(QaAccuracy::default())),
        _ => None,
    }
}
