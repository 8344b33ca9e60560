use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "wseval",
    version,
    about = "Offline evaluation of a conversational assistant over its WebSocket API"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sample the corpus, run classification and QA accuracy, write the summary
    Run(RunArgs),
    /// Break down misclassifications of a saved classification run
    Visualize(VisualizeArgs),
    Version,
}

#[derive(Parser, Clone, Debug)]
pub struct RunArgs {
    /// records sampled per intent dataset
    #[arg(long, default_value_t = 1)]
    pub sample_size: usize,

    /// concurrent connections used by each evaluation
    #[arg(long, default_value_t = 1)]
    pub parallelization_factor: usize,

    /// minimum seconds between two frames on a connection
    #[arg(
        long,
        env = "WSEVAL_THROTTLE",
        default_value = "1",
        value_parser = wseval_core::settings::parse_throttle_secs
    )]
    pub ws_throttle: Duration,

    /// ws:// or wss:// address of the assistant
    #[arg(long, env = "WSEVAL_WS_ADDRESS")]
    pub ws_address: Option<String>,

    /// Origin header sent with the handshake
    #[arg(long, env = "WSEVAL_WS_ORIGIN")]
    pub ws_origin: Option<String>,

    #[arg(long, default_value = "eval_results")]
    pub eval_results_folder: PathBuf,

    /// folder holding the per-intent JSONL source files
    #[arg(long, default_value = "data/master_datasets")]
    pub data_folder: PathBuf,

    /// where the sampled corpus is written
    #[arg(long, default_value = "data/eval_data.jsonl")]
    pub eval_data: PathBuf,

    /// classification input (defaults to the sampled corpus)
    #[arg(long)]
    pub classification_dataset: Option<PathBuf>,

    /// per-evaluation record limit
    #[arg(long, default_value_t = 1000)]
    pub num_records: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// valid intent labels (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub labels: Vec<String>,

    /// seconds to wait before reconnecting after a failed exchange
    #[arg(long, default_value_t = 2.0)]
    pub retry_backoff: f64,

    /// seconds to wait for a response frame (off when unset)
    #[arg(long)]
    pub response_timeout: Option<f64>,
}

#[derive(Parser, Clone, Debug)]
pub struct VisualizeArgs {
    /// per-record output of a classification run
    #[arg(long, default_value = "eval_results.jsonl")]
    pub data_path: PathBuf,

    #[arg(long, default_value = "visualization.svg")]
    pub output_path: PathBuf,
}
