//! In-memory connector for tests: scripted per-connection behavior and a log of
//! every frame physically transmitted.

use super::{Connection, Connector, Endpoint, FrameSink, FrameSource};
use crate::errors::TransportError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub enum FakeBehavior {
    /// Every transmitted frame is answered with this frame.
    Reply(String),
    /// Every transmitted frame is answered with `f(payload)`.
    Respond(fn(&str) -> String),
    /// Sends fail and the inbound side reports a closed connection.
    Broken,
    /// Sends succeed but nothing ever comes back.
    Silent,
    /// The connect attempt itself fails.
    Refuse,
}

#[derive(Debug, Clone)]
pub struct SentFrame {
    /// 1-based connect attempt that carried the frame.
    pub connection: usize,
    pub payload: String,
    pub at: Instant,
}

struct FakeState {
    script: Mutex<VecDeque<FakeBehavior>>,
    fallback: FakeBehavior,
    attempts: AtomicUsize,
    sent: Mutex<Vec<SentFrame>>,
}

#[derive(Clone)]
pub struct FakeConnector {
    state: Arc<FakeState>,
}

impl FakeConnector {
    /// Every connection behaves like `fallback` unless scripted otherwise with [`then`](Self::then).
    pub fn new(fallback: FakeBehavior) -> Self {
        Self {
            state: Arc::new(FakeState {
                script: Mutex::new(VecDeque::new()),
                fallback,
                attempts: AtomicUsize::new(0),
                sent: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Queue the behavior of the next not-yet-scripted connect attempt.
    pub fn then(self, behavior: FakeBehavior) -> Self {
        self.state
            .script
            .lock()
            .expect("fake script poisoned")
            .push_back(behavior);
        self
    }

    pub fn connect_attempts(&self) -> usize {
        self.state.attempts.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<SentFrame> {
        self.state.sent.lock().expect("fake log poisoned").clone()
    }

    pub fn sent_payloads(&self) -> Vec<String> {
        self.sent().into_iter().map(|f| f.payload).collect()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Connection, TransportError> {
        let connection = self.state.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let behavior = self
            .state
            .script
            .lock()
            .expect("fake script poisoned")
            .pop_front()
            .unwrap_or_else(|| self.state.fallback.clone());

        if matches!(behavior, FakeBehavior::Refuse) {
            return Err(TransportError::Connect {
                address: endpoint.address().to_string(),
                detail: "connection refused".into(),
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let broken = matches!(behavior, FakeBehavior::Broken);
        Ok(Connection {
            sink: Box::new(FakeSink {
                connection,
                behavior,
                replies: tx,
                state: self.state.clone(),
            }),
            source: Box::new(FakeSource { broken, replies: rx }),
        })
    }
}

struct FakeSink {
    connection: usize,
    behavior: FakeBehavior,
    replies: mpsc::UnboundedSender<String>,
    state: Arc<FakeState>,
}

#[async_trait]
impl FrameSink for FakeSink {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        let reply = match &self.behavior {
            FakeBehavior::Broken | FakeBehavior::Refuse => {
                return Err(TransportError::Send("broken pipe".into()))
            }
            FakeBehavior::Reply(frame) => Some(frame.clone()),
            FakeBehavior::Respond(f) => Some(f(&text)),
            FakeBehavior::Silent => None,
        };
        self.state
            .sent
            .lock()
            .expect("fake log poisoned")
            .push(SentFrame {
                connection: self.connection,
                payload: text,
                at: Instant::now(),
            });
        if let Some(reply) = reply {
            // Receiver gone means the client dropped this connection already.
            let _ = self.replies.send(reply);
        }
        Ok(())
    }
}

struct FakeSource {
    broken: bool,
    replies: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
impl FrameSource for FakeSource {
    async fn recv_text(&mut self) -> Result<String, TransportError> {
        if self.broken {
            return Err(TransportError::Closed);
        }
        self.replies.recv().await.ok_or(TransportError::Closed)
    }
}
