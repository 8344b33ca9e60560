use super::dispatcher::{Dispatcher, Throttle};
use super::{Connection, Connector, Endpoint, FrameSource};
use crate::errors::TransportError;

/// One live connection: throttled outbound queue plus the inbound half.
///
/// Dropping the channel closes the queue, which stops its sender task.
pub struct ThrottledChannel {
    dispatcher: Dispatcher,
    source: Box<dyn FrameSource>,
}

impl ThrottledChannel {
    pub async fn open(
        connector: &dyn Connector,
        endpoint: &Endpoint,
        throttle: Throttle,
    ) -> Result<Self, TransportError> {
        let connection = connector.connect(endpoint).await?;
        Ok(Self::from_connection(connection, throttle))
    }

    pub fn from_connection(connection: Connection, throttle: Throttle) -> Self {
        Self {
            dispatcher: Dispatcher::spawn(connection.sink, throttle),
            source: connection.source,
        }
    }

    pub fn enqueue(&self, message: String) {
        self.dispatcher.enqueue(message);
    }

    /// Waits for the next inbound frame. No timeout here.
    pub async fn receive(&mut self) -> Result<String, TransportError> {
        self.source.recv_text().await
    }
}
