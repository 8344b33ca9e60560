//! Intent classification accuracy.
//!
//! The model output is converted to a label with the `<intention>` tag
//! convention (first tag holding a valid label, else `irrelevant`) and compared
//! to the target label.

use std::collections::{BTreeMap, BTreeSet};
use wseval_core::intent;
use wseval_core::metrics_api::EvalAlgorithm;
use wseval_core::model::{EvalScore, RecordOutput};

pub const NAME: &str = "classification_accuracy";
pub const ACCURACY: &str = "classification_accuracy_score";
pub const BALANCED_ACCURACY: &str = "balanced_accuracy_score";
pub const PRECISION: &str = "precision_score";
pub const RECALL: &str = "recall_score";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AverageStrategy {
    /// Pool every decision. For single-label data precision == recall == accuracy.
    #[default]
    Micro,
    /// Unweighted mean over classes seen in targets or predictions.
    Macro,
}

#[derive(Debug, Clone)]
pub struct ClassificationAccuracy {
    valid_labels: Vec<String>,
    average: AverageStrategy,
}

impl ClassificationAccuracy {
    pub fn new(valid_labels: Vec<String>) -> Self {
        Self {
            valid_labels,
            average: AverageStrategy::default(),
        }
    }

    pub fn with_average(mut self, average: AverageStrategy) -> Self {
        self.average = average;
        self
    }

    pub fn predict_label<'a>(&self, model_output: &'a str) -> &'a str {
        intent::classify(model_output, &self.valid_labels)
    }
}

#[derive(Default)]
struct ClassCounts {
    true_positive: usize,
    predicted: usize,
    actual: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

impl EvalAlgorithm for ClassificationAccuracy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn score_record(&self, model_output: &str, target_output: &str) -> Vec<EvalScore> {
        let predicted = self.predict_label(model_output);
        let correct = predicted == target_output.trim();
        vec![EvalScore::new(ACCURACY, if correct { 1.0 } else { 0.0 })]
    }

    fn aggregate(&self, rows: &[RecordOutput]) -> Vec<EvalScore> {
        let mut classes: BTreeMap<&str, ClassCounts> = BTreeMap::new();
        let mut correct = 0;
        for row in rows {
            let predicted = self.predict_label(&row.model_output);
            let actual = row.target_output.trim();
            if !self.valid_labels.iter().any(|l| l == actual) {
                tracing::debug!("target label '{}' is not a valid label", actual);
            }
            classes.entry(predicted).or_default().predicted += 1;
            let c = classes.entry(actual).or_default();
            c.actual += 1;
            if predicted == actual {
                c.true_positive += 1;
                correct += 1;
            }
        }

        let accuracy = ratio(correct, rows.len());
        let in_targets: BTreeSet<&str> = classes
            .iter()
            .filter(|(_, c)| c.actual > 0)
            .map(|(k, _)| *k)
            .collect();
        let balanced = mean(
            in_targets
                .iter()
                .map(|k| ratio(classes[k].true_positive, classes[k].actual)),
        );
        let (precision, recall) = match self.average {
            AverageStrategy::Micro => (accuracy, accuracy),
            AverageStrategy::Macro => (
                mean(classes.values().map(|c| ratio(c.true_positive, c.predicted))),
                mean(classes.values().map(|c| ratio(c.true_positive, c.actual))),
            ),
        };

        vec![
            EvalScore::new(ACCURACY, accuracy),
            EvalScore::new(BALANCED_ACCURACY, balanced),
            EvalScore::new(PRECISION, precision),
            EvalScore::new(RECALL, recall),
        ]
    }
}
