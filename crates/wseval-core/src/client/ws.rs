//! Request/response client for the conversational model endpoint.
//!
//! Each `predict` is one round-trip over a [`ThrottledChannel`]. Any failure
//! (connect, transmit, receive, malformed frame, timeout) is answered with a
//! backoff, a brand-new connection and exactly one retry. A second failure
//! yields [`SENTINEL_ERROR_TEXT`] instead of an error.
//!
//! Only [`RunnerSettings`] is persisted. The live channel is rebuilt on first
//! use after [`WsModelRunner::restore`].

use super::wire;
use super::ModelRunner;
use crate::errors::{ConfigError, ExchangeError, TransportError};
use crate::model::Prediction;
use crate::transport::{Connector, Endpoint, Throttle, ThrottledChannel, WebSocketConnector};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Returned in place of an answer when the retry fails too. Scores as a wrong answer.
pub const SENTINEL_ERROR_TEXT: &str = "TestError: an error occurred during the test process";

pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(2);

fn default_retry_backoff() -> Duration {
    DEFAULT_RETRY_BACKOFF
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerSettings {
    pub endpoint: Endpoint,
    /// Return `<intention>{intent}</intention>` instead of the answer text.
    #[serde(default)]
    pub output_intent: bool,
    /// `None` follows the process-wide interval.
    #[serde(default)]
    pub throttle: Option<Duration>,
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff: Duration,
    /// Off by default: a stalled endpoint then blocks the call.
    #[serde(default)]
    pub response_timeout: Option<Duration>,
}

impl RunnerSettings {
    pub fn new(address: Option<String>, origin: Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: Endpoint::new(address, origin)?,
            output_intent: false,
            throttle: None,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            response_timeout: None,
        })
    }

    pub fn with_output_intent(mut self, output_intent: bool) -> Self {
        self.output_intent = output_intent;
        self
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = Some(throttle);
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.response_timeout = timeout;
        self
    }

    fn throttle(&self) -> Throttle {
        self.throttle.map(Throttle::Fixed).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

pub struct WsModelRunner {
    settings: RunnerSettings,
    connector: Arc<dyn Connector>,
    channel: Option<ThrottledChannel>,
}

impl WsModelRunner {
    /// Connects over a real WebSocket. A failed connect is logged, not returned.
    pub async fn new(settings: RunnerSettings) -> Self {
        Self::with_connector(settings, Arc::new(WebSocketConnector)).await
    }

    pub async fn with_connector(settings: RunnerSettings, connector: Arc<dyn Connector>) -> Self {
        let mut runner = Self::restore(settings, connector);
        runner.reconnect().await;
        runner
    }

    /// Rebuilds a runner from persisted settings without connecting.
    pub fn restore(settings: RunnerSettings, connector: Arc<dyn Connector>) -> Self {
        Self {
            settings,
            connector,
            channel: None,
        }
    }

    /// Persistable part of the runner. The live channel is never included.
    pub fn snapshot(&self) -> RunnerSettings {
        self.settings.clone()
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    pub fn state(&self) -> ConnectionState {
        if self.channel.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Drops the current channel (its sender task winds down) and opens a new one.
    async fn reconnect(&mut self) {
        self.channel = None;
        let address = self.settings.endpoint.address();
        match ThrottledChannel::open(
            self.connector.as_ref(),
            &self.settings.endpoint,
            self.settings.throttle(),
        )
        .await
        {
            Ok(channel) => {
                tracing::info!("connected to WebSocket at {}", address);
                self.channel = Some(channel);
            }
            Err(e) => tracing::error!("failed to connect to WebSocket: {}", e),
        }
    }

    /// One round trip. Only a first attempt may open a missing channel; the
    /// retry runs on whatever the preceding reconnect produced.
    async fn exchange(
        &mut self,
        prompt: &str,
        connect_if_missing: bool,
    ) -> Result<String, ExchangeError> {
        let request = wire::encode_request(prompt)?;
        let output_intent = self.settings.output_intent;
        let timeout = self.settings.response_timeout;

        if self.channel.is_none() && connect_if_missing {
            self.reconnect().await;
        }
        let channel = self.channel.as_mut().ok_or(TransportError::NotConnected)?;
        channel.enqueue(request);
        let frame = match timeout {
            Some(limit) => tokio::time::timeout(limit, channel.receive())
                .await
                .map_err(|_| ExchangeError::Timeout(limit))??,
            None => channel.receive().await?,
        };

        let response = wire::decode_response(&frame)?;
        Ok(response.into_text(output_intent))
    }
}

#[async_trait]
impl ModelRunner for WsModelRunner {
    fn name(&self) -> &str {
        "websocket"
    }

    async fn predict(&mut self, prompt: &str) -> Prediction {
        match self.exchange(prompt, true).await {
            Ok(text) => Prediction::text(text),
            Err(first) => {
                tracing::warn!("request failed ({}), retrying after reconnect", first);
                tokio::time::sleep(self.settings.retry_backoff).await;
                self.reconnect().await;
                match self.exchange(prompt, false).await {
                    Ok(text) => Prediction::text(text),
                    Err(e) => {
                        tracing::error!("failed after retry: {}", e);
                        Prediction::text(SENTINEL_ERROR_TEXT)
                    }
                }
            }
        }
    }

    fn fork(&self) -> Box<dyn ModelRunner> {
        Box::new(Self::restore(self.snapshot(), self.connector.clone()))
    }
}
