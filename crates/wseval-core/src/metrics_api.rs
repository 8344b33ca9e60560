use crate::model::{EvalScore, RecordOutput};

/// A scoring algorithm: per-record scores plus a dataset-level aggregate.
pub trait EvalAlgorithm: Send + Sync {
    fn name(&self) -> &'static str;

    fn score_record(&self, model_output: &str, target_output: &str) -> Vec<EvalScore>;

    /// Default: mean of every per-record score name, in first-seen order.
    fn aggregate(&self, rows: &[RecordOutput]) -> Vec<EvalScore> {
        mean_scores(rows)
    }
}

pub fn mean_scores(rows: &[RecordOutput]) -> Vec<EvalScore> {
    let mut names: Vec<&str> = Vec::new();
    for row in rows {
        for s in &row.scores {
            if !names.contains(&s.name.as_str()) {
                names.push(&s.name);
            }
        }
    }
    names
        .into_iter()
        .map(|name| {
            let values: Vec<f64> = rows.iter().filter_map(|r| r.score(name)).collect();
            let mean = if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            };
            EvalScore::new(name, mean)
        })
        .collect()
}
