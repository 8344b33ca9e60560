//! Progress reporting for evaluation runs. The evaluator emits done/total in
//! completion order; the console layer consumes it through a sink.

use std::sync::Arc;

/// One progress update: how many records are done and total count.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent {
    pub done: usize,
    pub total: usize,
}

/// Sink for progress events. Called each time a record has been predicted and scored.
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;
