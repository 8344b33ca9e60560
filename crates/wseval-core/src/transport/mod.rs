//! Physical connection to the model endpoint.
//!
//! A [`Connector`] opens a [`Connection`], which is split into an outbound
//! [`FrameSink`] (owned by the dispatcher's sender task) and an inbound
//! [`FrameSource`] (owned by the caller's request path).

pub mod channel;
pub mod dispatcher;
#[cfg(test)]
pub(crate) mod fake;
pub mod websocket;

use crate::errors::{ConfigError, TransportError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use channel::ThrottledChannel;
pub use dispatcher::Throttle;
pub use websocket::WebSocketConnector;

/// Address plus origin credential. Both are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    address: String,
    origin: String,
}

impl Endpoint {
    pub fn new(address: Option<String>, origin: Option<String>) -> Result<Self, ConfigError> {
        let address = address
            .filter(|a| !a.trim().is_empty())
            .ok_or(ConfigError::MissingAddress)?;
        let origin = origin
            .filter(|o| !o.trim().is_empty())
            .ok_or(ConfigError::MissingOrigin)?;
        if !(address.starts_with("ws://") || address.starts_with("wss://")) {
            return Err(ConfigError::InvalidAddress {
                address,
                detail: "expected a ws:// or wss:// URI".into(),
            });
        }
        Ok(Self { address, origin })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }
}

#[async_trait]
pub trait FrameSink: Send {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;
}

#[async_trait]
pub trait FrameSource: Send {
    /// Next inbound text frame. Control frames are consumed silently.
    async fn recv_text(&mut self) -> Result<String, TransportError>;
}

pub struct Connection {
    pub sink: Box<dyn FrameSink>,
    pub source: Box<dyn FrameSource>,
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Connection, TransportError>;
}
