//! WebSocket transport over `tokio-tungstenite`.

use super::{Connection, Connector, Endpoint, FrameSink, FrameSource};
use crate::errors::TransportError;
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens a client WebSocket, sending the origin credential as the `Origin`
/// handshake header.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Connection, TransportError> {
        let connect_err = |detail: String| TransportError::Connect {
            address: endpoint.address().to_string(),
            detail,
        };

        let mut request = endpoint
            .address()
            .into_client_request()
            .map_err(|e| connect_err(e.to_string()))?;
        let origin = HeaderValue::from_str(endpoint.origin())
            .map_err(|e| connect_err(format!("invalid origin header: {}", e)))?;
        request.headers_mut().insert("Origin", origin);

        let (stream, response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| connect_err(e.to_string()))?;
        tracing::debug!(
            "handshake with {} completed (status {})",
            endpoint.address(),
            response.status()
        );

        let (write, read) = stream.split();
        Ok(Connection {
            sink: Box::new(WsSink { inner: write }),
            source: Box::new(WsSource { inner: read }),
        })
    }
}

struct WsSink {
    inner: SplitSink<WsStream, WsMessage>,
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.inner
            .send(WsMessage::Text(text.into()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}

struct WsSource {
    inner: SplitStream<WsStream>,
}

#[async_trait]
impl FrameSource for WsSource {
    async fn recv_text(&mut self) -> Result<String, TransportError> {
        loop {
            match self.inner.next().await {
                Some(Ok(WsMessage::Text(text))) => return Ok(text.as_str().to_owned()),
                Some(Ok(WsMessage::Binary(bytes))) => {
                    return String::from_utf8(bytes.to_vec())
                        .map_err(|e| TransportError::Receive(format!("non-UTF-8 frame: {}", e)));
                }
                Some(Ok(WsMessage::Close(_))) | None => return Err(TransportError::Closed),
                // Ping/Pong/raw frames: tungstenite answers pings itself.
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(TransportError::Receive(e.to_string())),
            }
        }
    }
}
