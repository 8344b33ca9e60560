use super::super::args::RunArgs;
use crate::exit_codes::{CONFIG_ERROR, NO_RECORDS, SUCCESS};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use wseval_core::client::{RunnerSettings, WsModelRunner};
use wseval_core::dataset::{
    self, DatasetConfig, DEFAULT_ANSWER_FIELD, DEFAULT_INPUT_FIELD, DEFAULT_INTENT_FIELD,
};
use wseval_core::engine::Evaluator;
use wseval_core::model::EvalOutput;
use wseval_core::report::{console, summary};
use wseval_core::settings;
use wseval_metrics::{default_labels, ClassificationAccuracy, QaAccuracy};

const CORPUS_NAME: &str = "eval_data";

fn seconds(flag: &str, value: f64) -> Result<Duration, String> {
    Duration::try_from_secs_f64(value).map_err(|e| format!("--{flag} {value}: {e}"))
}

fn dataset_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| CORPUS_NAME.to_string())
}

fn runner_settings(args: &RunArgs) -> Result<RunnerSettings, String> {
    let retry_backoff = seconds("retry-backoff", args.retry_backoff)?;
    let response_timeout = args
        .response_timeout
        .map(|t| seconds("response-timeout", t))
        .transpose()?;
    let settings = RunnerSettings::new(args.ws_address.clone(), args.ws_origin.clone())
        .map_err(|e| e.to_string())?;
    Ok(settings
        .with_retry_backoff(retry_backoff)
        .with_response_timeout(response_timeout))
}

pub(crate) async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let runner_settings = match runner_settings(&args) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("{}", msg);
            return Ok(CONFIG_ERROR);
        }
    };
    settings::set_throttle(args.ws_throttle);

    let corpus = dataset::combine_from_folder(&args.data_folder, args.sample_size, args.seed)?;
    dataset::write_jsonl(&args.eval_data, &corpus)?;
    tracing::info!(
        "sampled {} records into {}",
        corpus.len(),
        args.eval_data.display()
    );

    let labels = if args.labels.is_empty() {
        default_labels()
    } else {
        args.labels.clone()
    };
    let evaluator = Evaluator {
        parallelism: args.parallelization_factor,
        results_folder: args.eval_results_folder.clone(),
        show_progress: true,
    };

    let classification_data = match &args.classification_dataset {
        Some(path) => DatasetConfig::new(
            dataset_name(path),
            path.clone(),
            DEFAULT_INPUT_FIELD,
            DEFAULT_INTENT_FIELD,
        ),
        None => DatasetConfig::new(
            CORPUS_NAME,
            args.eval_data.clone(),
            DEFAULT_INPUT_FIELD,
            DEFAULT_INTENT_FIELD,
        ),
    };
    let intent_runner = WsModelRunner::new(runner_settings.clone().with_output_intent(true)).await;
    let classification = evaluator
        .evaluate(
            &intent_runner,
            Arc::new(ClassificationAccuracy::new(labels)),
            &classification_data,
            args.num_records,
            true,
        )
        .await?;
    drop(intent_runner);

    let qa_data = DatasetConfig::new(
        CORPUS_NAME,
        args.eval_data.clone(),
        DEFAULT_INPUT_FIELD,
        DEFAULT_ANSWER_FIELD,
    );
    let answer_runner = WsModelRunner::new(runner_settings).await;
    let qa = evaluator
        .evaluate(
            &answer_runner,
            Arc::new(QaAccuracy::default()),
            &qa_data,
            args.num_records,
            true,
        )
        .await?;

    let outputs: Vec<EvalOutput> = vec![classification, qa];
    let summary_path = summary::write_summary(&args.eval_results_folder, &outputs)?;
    console::print_eval_summary(&outputs);
    eprintln!("summary: {}", summary_path.display());

    if let Some(empty) = outputs.iter().find(|o| o.num_records == 0) {
        eprintln!(
            "no records evaluated for {} on {}",
            empty.eval_name, empty.dataset_name
        );
        return Ok(NO_RECORDS);
    }
    Ok(SUCCESS)
}
