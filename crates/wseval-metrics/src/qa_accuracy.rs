//! Free-text answer accuracy against one or more reference answers.
//!
//! A target may hold several acceptable answers joined with `<OR>`; every
//! score is the best one over those answers.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use wseval_core::metrics_api::EvalAlgorithm;
use wseval_core::model::EvalScore;

pub const NAME: &str = "qa_accuracy";
pub const F1: &str = "f1_score";
pub const EXACT_MATCH: &str = "exact_match_score";
pub const QUASI_EXACT_MATCH: &str = "quasi_exact_match_score";
pub const PRECISION_OVER_WORDS: &str = "precision_over_words";
pub const RECALL_OVER_WORDS: &str = "recall_over_words";

pub const DEFAULT_TARGET_DELIMITER: &str = "<OR>";

lazy_static! {
    static ref ARTICLES: Regex = Regex::new(r"\b(a|an|the)\b").unwrap();
}

/// Lowercase, strip ASCII punctuation, drop English articles, collapse whitespace.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let no_punct: String = lowered
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    let no_articles = ARTICLES.replace_all(&no_punct, " ");
    no_articles.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct WordOverlap {
    precision: f64,
    recall: f64,
    f1: f64,
}

fn word_overlap(model_output: &str, target: &str) -> WordOverlap {
    let predicted = normalize(model_output);
    let reference = normalize(target);
    let predicted: Vec<&str> = predicted.split_whitespace().collect();
    let reference: Vec<&str> = reference.split_whitespace().collect();

    let mut ref_counts: HashMap<&str, usize> = HashMap::new();
    for w in &reference {
        *ref_counts.entry(*w).or_default() += 1;
    }
    let mut common = 0usize;
    for w in &predicted {
        if let Some(n) = ref_counts.get_mut(w) {
            if *n > 0 {
                *n -= 1;
                common += 1;
            }
        }
    }

    if common == 0 {
        return WordOverlap {
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
        };
    }
    let precision = common as f64 / predicted.len() as f64;
    let recall = common as f64 / reference.len() as f64;
    WordOverlap {
        precision,
        recall,
        f1: 2.0 * precision * recall / (precision + recall),
    }
}

#[derive(Debug, Clone)]
pub struct QaAccuracy {
    target_delimiter: String,
}

impl Default for QaAccuracy {
    fn default() -> Self {
        Self {
            target_delimiter: DEFAULT_TARGET_DELIMITER.to_string(),
        }
    }
}

impl QaAccuracy {
    pub fn with_target_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.target_delimiter = delimiter.into();
        self
    }

    fn targets<'a>(&self, target_output: &'a str) -> Vec<&'a str> {
        if self.target_delimiter.is_empty() {
            return vec![target_output];
        }
        target_output.split(self.target_delimiter.as_str()).collect()
    }
}

impl EvalAlgorithm for QaAccuracy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn score_record(&self, model_output: &str, target_output: &str) -> Vec<EvalScore> {
        let mut best = [0.0f64; 5];
        for target in self.targets(target_output) {
            let overlap = word_overlap(model_output, target);
            let exact = (model_output.trim() == target.trim()) as u8 as f64;
            let quasi = (normalize(model_output) == normalize(target)) as u8 as f64;
            let current = [
                overlap.f1,
                exact,
                quasi,
                overlap.precision,
                overlap.recall,
            ];
            for (b, c) in best.iter_mut().zip(current) {
                *b = b.max(c);
            }
        }
        [
            F1,
            EXACT_MATCH,
            QUASI_EXACT_MATCH,
            PRECISION_OVER_WORDS,
            RECALL_OVER_WORDS,
        ]
        .iter()
        .zip(best)
        .map(|(name, value)| EvalScore::new(*name, value))
        .collect()
    }
}
