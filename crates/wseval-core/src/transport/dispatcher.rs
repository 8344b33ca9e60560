//! Single background sender that drains an unbounded FIFO queue onto a
//! [`FrameSink`], sleeping the throttle interval after every successful send.
//!
//! Producers only ever touch the queue. A frame that fails to transmit is
//! logged and dropped; the producer is not told.

use super::FrameSink;
use crate::settings;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Throttle {
    /// Read the process-wide interval before each pause.
    #[default]
    Process,
    Fixed(Duration),
}

impl Throttle {
    pub fn interval(self) -> Duration {
        match self {
            Throttle::Process => settings::throttle_interval(),
            Throttle::Fixed(d) => d,
        }
    }
}

/// Producer handle. Dropping it closes the queue; the sender task then exits
/// after draining what was already queued. The task is never joined.
#[derive(Debug)]
pub struct Dispatcher {
    queue: mpsc::UnboundedSender<String>,
}

impl Dispatcher {
    /// Must be called from within a tokio runtime.
    pub fn spawn(sink: Box<dyn FrameSink>, throttle: Throttle) -> Self {
        let (queue, rx) = mpsc::unbounded_channel();
        tokio::spawn(send_loop(sink, rx, throttle));
        Self { queue }
    }

    /// Never blocks.
    pub fn enqueue(&self, message: String) {
        if self.queue.send(message).is_err() {
            tracing::error!("sender task is gone; outbound message dropped");
        }
    }
}

async fn send_loop(
    mut sink: Box<dyn FrameSink>,
    mut rx: mpsc::UnboundedReceiver<String>,
    throttle: Throttle,
) {
    while let Some(message) = rx.recv().await {
        tracing::debug!("sending: {}", message);
        let len = message.len();
        match sink.send_text(message).await {
            Ok(()) => {
                tracing::info!("message sent ({} bytes)", len);
                tokio::time::sleep(throttle.interval()).await;
            }
            Err(e) => tracing::error!("error sending message: {}", e),
        }
    }
    tracing::debug!("outbound queue closed; sender stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fake::{FakeBehavior, FakeConnector};
    use crate::transport::{Connector, Endpoint};
    use serial_test::serial;

    fn endpoint() -> Endpoint {
        Endpoint::new(
            Some("ws://fake.local/ws".into()),
            Some("https://fake.local".into()),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn transmits_in_submission_order() {
        let fake = FakeConnector::new(FakeBehavior::Respond(|p| p.to_string()));
        let mut conn = fake.connect(&endpoint()).await.unwrap();
        let dispatcher = Dispatcher::spawn(conn.sink, Throttle::Fixed(Duration::from_millis(10)));

        let submitted: Vec<String> = (0..25).map(|i| format!("msg-{i}")).collect();
        for m in &submitted {
            dispatcher.enqueue(m.clone());
        }
        let mut received = Vec::new();
        for _ in 0..submitted.len() {
            received.push(conn.source.recv_text().await.unwrap());
        }

        assert_eq!(fake.sent_payloads(), submitted);
        assert_eq!(received, submitted);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_sends_are_spaced_by_throttle() {
        for throttle_ms in [0u64, 50, 1000] {
            let throttle = Duration::from_millis(throttle_ms);
            let fake = FakeConnector::new(FakeBehavior::Reply("ok".into()));
            let mut conn = fake.connect(&endpoint()).await.unwrap();
            let dispatcher = Dispatcher::spawn(conn.sink, Throttle::Fixed(throttle));

            for i in 0..4 {
                dispatcher.enqueue(format!("{i}"));
            }
            for _ in 0..4 {
                conn.source.recv_text().await.unwrap();
            }

            let sent = fake.sent();
            assert_eq!(sent.len(), 4);
            for pair in sent.windows(2) {
                assert!(
                    pair[1].at.duration_since(pair[0].at) >= throttle,
                    "gap below {throttle:?}"
                );
            }
        }
    }

    #[tokio::test(start_paused = true)]
    #[serial]
    async fn process_throttle_spaces_sends_by_installed_interval() {
        let _guard = settings::ThrottleGuard::set(Duration::from_millis(500));
        let fake = FakeConnector::new(FakeBehavior::Reply("ok".into()));
        let mut conn = fake.connect(&endpoint()).await.unwrap();
        let dispatcher = Dispatcher::spawn(conn.sink, Throttle::Process);

        for i in 0..3 {
            dispatcher.enqueue(format!("{i}"));
        }
        for _ in 0..3 {
            conn.source.recv_text().await.unwrap();
        }

        let sent = fake.sent();
        assert_eq!(sent.len(), 3);
        for pair in sent.windows(2) {
            assert!(pair[1].at.duration_since(pair[0].at) >= Duration::from_millis(500));
        }
    }

    #[tokio::test(start_paused = true)]
    #[serial]
    async fn process_throttle_is_reread_before_each_pause() {
        let guard = settings::ThrottleGuard::set(Duration::from_secs(10));
        let fake = FakeConnector::new(FakeBehavior::Reply("ok".into()));
        let mut conn = fake.connect(&endpoint()).await.unwrap();
        let dispatcher = Dispatcher::spawn(conn.sink, Throttle::Process);

        dispatcher.enqueue("first".into());
        conn.source.recv_text().await.unwrap();
        settings::set_throttle(Duration::from_millis(100));
        dispatcher.enqueue("second".into());
        dispatcher.enqueue("third".into());
        conn.source.recv_text().await.unwrap();
        conn.source.recv_text().await.unwrap();
        drop(guard);

        let sent = fake.sent();
        // The pause after "first" was already running with 10 s.
        assert!(sent[1].at.duration_since(sent[0].at) >= Duration::from_secs(10));
        let gap = sent[2].at.duration_since(sent[1].at);
        assert!(gap >= Duration::from_millis(100) && gap < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn enqueue_returns_without_waiting_for_throttle() {
        let fake = FakeConnector::new(FakeBehavior::Reply("ok".into()));
        let conn = fake.connect(&endpoint()).await.unwrap();
        let dispatcher = Dispatcher::spawn(conn.sink, Throttle::Fixed(Duration::from_secs(60)));

        let start = tokio::time::Instant::now();
        for i in 0..10 {
            dispatcher.enqueue(format!("{i}"));
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_send_is_dropped_and_not_throttled() {
        let fake = FakeConnector::new(FakeBehavior::Broken);
        let mut conn = fake.connect(&endpoint()).await.unwrap();
        let dispatcher = Dispatcher::spawn(conn.sink, Throttle::Fixed(Duration::from_secs(5)));

        dispatcher.enqueue("a".into());
        dispatcher.enqueue("b".into());
        tokio::task::yield_now().await;

        assert!(fake.sent().is_empty());
        assert!(conn.source.recv_text().await.is_err());
    }
}
