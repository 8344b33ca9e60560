//! Evaluation driver: sends every sample of a dataset through a model runner,
//! scores the answers and aggregates dataset-level scores.
//!
//! Parallelism never shares a connection. Each worker gets its own runner via
//! [`ModelRunner::fork`] and pulls samples from a shared queue.

use crate::client::ModelRunner;
use crate::dataset::{self, DatasetConfig};
use crate::metrics_api::EvalAlgorithm;
use crate::model::{EvalOutput, RecordOutput, Sample};
use crate::report::console::default_progress_sink;
use crate::report::progress::{ProgressEvent, ProgressSink};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;

#[derive(Debug, Clone)]
pub struct Evaluator {
    pub parallelism: usize,
    pub results_folder: PathBuf,
    pub show_progress: bool,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            parallelism: 1,
            results_folder: PathBuf::from("eval_results"),
            show_progress: true,
        }
    }
}

pub fn record_output_path(folder: &Path, eval_name: &str, dataset_name: &str) -> PathBuf {
    folder.join(format!("{}_{}.jsonl", eval_name, dataset_name))
}

impl Evaluator {
    /// Reads up to `num_records` samples of `dataset`, predicts and scores them.
    /// With `save`, per-record rows go to `<results_folder>/<eval>_<dataset>.jsonl`.
    pub async fn evaluate(
        &self,
        runner: &dyn ModelRunner,
        algorithm: Arc<dyn EvalAlgorithm>,
        dataset: &DatasetConfig,
        num_records: usize,
        save: bool,
    ) -> anyhow::Result<EvalOutput> {
        let samples = dataset::load_samples(dataset, num_records)?;
        let eval_name = algorithm.name();
        tracing::info!(
            "running {} on {} ({} records, runner={}, parallelism={})",
            eval_name,
            dataset.name,
            samples.len(),
            runner.name(),
            self.parallelism
        );
        if samples.is_empty() {
            tracing::warn!("dataset {} yielded no records", dataset.name);
        }

        let progress = if self.show_progress {
            default_progress_sink(eval_name, samples.len())
        } else {
            None
        };
        let rows = self
            .predict_all(runner, algorithm.clone(), samples, progress)
            .await;

        let output_path = if save {
            let path = record_output_path(&self.results_folder, eval_name, &dataset.name);
            dataset::write_jsonl(&path, &rows)?;
            Some(path)
        } else {
            None
        };

        Ok(EvalOutput {
            eval_name: eval_name.to_string(),
            dataset_name: dataset.name.clone(),
            dataset_scores: algorithm.aggregate(&rows),
            num_records: rows.len(),
            output_path,
        })
    }

    /// Rows come back in sample order regardless of completion order.
    async fn predict_all(
        &self,
        runner: &dyn ModelRunner,
        algorithm: Arc<dyn EvalAlgorithm>,
        samples: Vec<Sample>,
        progress: Option<ProgressSink>,
    ) -> Vec<RecordOutput> {
        let total = samples.len();
        let workers = self.parallelism.max(1).min(total.max(1));
        let queue = Arc::new(Mutex::new(VecDeque::from(samples)));
        let done = Arc::new(AtomicUsize::new(0));
        let mut join_set = JoinSet::new();

        for _ in 0..workers {
            let mut runner = runner.fork();
            let algorithm = algorithm.clone();
            let queue = queue.clone();
            let done = done.clone();
            let progress = progress.clone();
            join_set.spawn(async move {
                let mut rows = Vec::new();
                loop {
                    let next = queue.lock().expect("sample queue poisoned").pop_front();
                    let Some(sample) = next else { break };
                    let prediction = runner.predict(&sample.model_input).await;
                    let scores = algorithm.score_record(&prediction.text, &sample.target_output);
                    rows.push((
                        sample.index,
                        RecordOutput {
                            model_input: sample.model_input,
                            model_output: prediction.text,
                            target_output: sample.target_output,
                            scores,
                        },
                    ));
                    let n = done.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(sink) = &progress {
                        sink(ProgressEvent { done: n, total });
                    }
                }
                rows
            });
        }

        let mut indexed = Vec::with_capacity(total);
        while let Some(res) = join_set.join_next().await {
            match res {
                Ok(rows) => indexed.extend(rows),
                Err(e) => tracing::error!("evaluation worker failed: {}", e),
            }
        }
        indexed.sort_by_key(|(idx, _)| *idx);
        indexed.into_iter().map(|(_, row)| row).collect()
    }
}
