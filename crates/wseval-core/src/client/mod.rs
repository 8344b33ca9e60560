pub mod wire;
pub mod ws;

use crate::model::Prediction;
use async_trait::async_trait;

pub use ws::{ConnectionState, RunnerSettings, WsModelRunner, SENTINEL_ERROR_TEXT};

/// Anything the evaluation engine can send prompts to.
///
/// `predict` never fails: implementations fold errors into a sentinel text so a
/// batch keeps going past individual records.
#[async_trait]
pub trait ModelRunner: Send {
    fn name(&self) -> &str;

    async fn predict(&mut self, prompt: &str) -> Prediction;

    /// Independent runner with the same settings and its own connection state.
    fn fork(&self) -> Box<dyn ModelRunner>;
}
