//! `eval_results_summary.json`: dataset-level scores keyed by evaluation name.

use crate::model::EvalOutput;
use std::collections::BTreeMap;
use std::path::Path;

pub const SUMMARY_FILE_NAME: &str = "eval_results_summary.json";

pub type Summary = BTreeMap<String, BTreeMap<String, f64>>;

/// Later outputs with the same evaluation name replace earlier ones.
pub fn format_results(outputs: &[EvalOutput]) -> Summary {
    outputs
        .iter()
        .map(|out| {
            let scores = out
                .dataset_scores
                .iter()
                .map(|s| (s.name.clone(), s.value))
                .collect();
            (out.eval_name.clone(), scores)
        })
        .collect()
}

pub fn write_summary(folder: &Path, outputs: &[EvalOutput]) -> anyhow::Result<std::path::PathBuf> {
    std::fs::create_dir_all(folder)?;
    let path = folder.join(SUMMARY_FILE_NAME);
    let json = serde_json::to_string_pretty(&format_results(outputs))?;
    std::fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EvalScore;

    fn output(name: &str, scores: &[(&str, f64)]) -> EvalOutput {
        EvalOutput {
            eval_name: name.into(),
            dataset_name: "eval_data".into(),
            dataset_scores: scores.iter().map(|(n, v)| EvalScore::new(*n, *v)).collect(),
            num_records: 4,
            output_path: None,
        }
    }

    #[test]
    fn summary_nests_scores_under_eval_name() {
        let summary = format_results(&[
            output("classification_accuracy", &[("classification_accuracy_score", 0.75)]),
            output("qa_accuracy", &[("f1_score", 0.5), ("exact_match_score", 0.25)]),
        ]);
        assert_eq!(summary["classification_accuracy"]["classification_accuracy_score"], 0.75);
        assert_eq!(summary["qa_accuracy"]["exact_match_score"], 0.25);
    }

    #[test]
    fn write_summary_creates_folder() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("eval_results");
        let path = write_summary(&folder, &[output("qa_accuracy", &[("f1_score", 1.0)])]).unwrap();

        assert_eq!(path, folder.join(SUMMARY_FILE_NAME));
        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(v["qa_accuracy"]["f1_score"], 1.0);
    }
}
