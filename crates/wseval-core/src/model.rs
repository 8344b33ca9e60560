use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a model runner hands back for one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub text: String,
    /// The remote model exposes no calibrated score, so this stays `None` for socket clients.
    pub confidence: Option<f64>,
}

impl Prediction {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
        }
    }
}

/// One labeled line of a per-intent source dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalRecord {
    #[serde(rename = "Question")]
    pub question: String,
    #[serde(rename = "Reponse", default)]
    pub response: String,
    #[serde(rename = "Intent", default)]
    pub intent: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A record projected onto the fields one evaluation reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub index: usize,
    pub model_input: String,
    pub target_output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalScore {
    pub name: String,
    pub value: f64,
}

impl EvalScore {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Per-record line of a saved evaluation output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordOutput {
    pub model_input: String,
    pub model_output: String,
    pub target_output: String,
    pub scores: Vec<EvalScore>,
}

impl RecordOutput {
    pub fn score(&self, name: &str) -> Option<f64> {
        self.scores.iter().find(|s| s.name == name).map(|s| s.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalOutput {
    pub eval_name: String,
    pub dataset_name: String,
    pub dataset_scores: Vec<EvalScore>,
    pub num_records: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_record_uses_dataset_field_names_and_keeps_extras() {
        let line = r#"{"Question":"Bonjour","Reponse":"Salut","Intent":"greeting","Source":"faq"}"#;
        let rec: EvalRecord = serde_json::from_str(line).unwrap();
        assert_eq!(rec.question, "Bonjour");
        assert_eq!(rec.response, "Salut");
        assert_eq!(rec.intent, "greeting");
        assert_eq!(rec.extra["Source"], "faq");

        let back = serde_json::to_value(&rec).unwrap();
        assert_eq!(back["Reponse"], "Salut");
        assert_eq!(back["Source"], "faq");
    }

    #[test]
    fn record_output_score_lookup() {
        let row = RecordOutput {
            model_input: "q".into(),
            model_output: "a".into(),
            target_output: "a".into(),
            scores: vec![EvalScore::new("exact_match_score", 1.0)],
        };
        assert_eq!(row.score("exact_match_score"), Some(1.0));
        assert_eq!(row.score("f1_score"), None);
    }
}
