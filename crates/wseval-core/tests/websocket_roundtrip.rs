//! End-to-end against a local WebSocket server.

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use wseval_core::client::{ModelRunner, RunnerSettings, WsModelRunner};

struct TestServer {
    address: String,
    origins: Arc<Mutex<Vec<String>>>,
    connections: Arc<AtomicUsize>,
}

/// Replies `{"message": "<prompt>-reply", "intent": "greeting"}`.
/// With `drop_first`, the first connection is closed after reading one frame.
async fn spawn_server(drop_first: bool) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let origins = Arc::new(Mutex::new(Vec::new()));
    let connections = Arc::new(AtomicUsize::new(0));

    let seen = origins.clone();
    let count = connections.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let seen = seen.clone();
            let n = count.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::spawn(async move {
                let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                    if let Some(origin) = req.headers().get("origin").and_then(|v| v.to_str().ok())
                    {
                        seen.lock().unwrap().push(origin.to_string());
                    }
                    Ok(resp)
                };
                let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback)
                    .await
                    .unwrap();
                while let Some(Ok(msg)) = ws.next().await {
                    let Message::Text(text) = msg else { continue };
                    if drop_first && n == 1 {
                        let _ = ws.close(None).await;
                        return;
                    }
                    let v: Value = serde_json::from_str(text.as_str()).unwrap();
                    let reply = json!({
                        "message": format!("{}-reply", v["message"].as_str().unwrap()),
                        "intent": "greeting",
                    });
                    if ws.send(Message::Text(reply.to_string().into())).await.is_err() {
                        return;
                    }
                }
            });
        }
    });

    TestServer {
        address: format!("ws://{}", addr),
        origins,
        connections,
    }
}

fn settings(server: &TestServer) -> RunnerSettings {
    RunnerSettings::new(
        Some(server.address.clone()),
        Some("https://app.test".to_string()),
    )
    .unwrap()
    .with_throttle(Duration::ZERO)
    .with_retry_backoff(Duration::from_millis(10))
    .with_response_timeout(Some(Duration::from_secs(5)))
}

#[tokio::test]
async fn predict_round_trips_and_sends_origin() {
    let server = spawn_server(false).await;
    let mut runner = WsModelRunner::new(settings(&server)).await;

    let p = runner.predict("hello").await;

    assert_eq!(p.text, "hello-reply");
    assert_eq!(p.confidence, None);
    assert_eq!(*server.origins.lock().unwrap(), vec!["https://app.test"]);
}

#[tokio::test]
async fn intent_mode_over_real_socket() {
    let server = spawn_server(false).await;
    let mut runner = WsModelRunner::new(settings(&server).with_output_intent(true)).await;

    assert_eq!(
        runner.predict("bonjour").await.text,
        "<intention>greeting</intention>"
    );
}

#[tokio::test]
async fn closed_connection_is_replaced_once() {
    let server = spawn_server(true).await;
    let mut runner = WsModelRunner::new(settings(&server)).await;

    let p = runner.predict("again").await;

    assert_eq!(p.text, "again-reply");
    assert_eq!(server.connections.load(Ordering::SeqCst), 2);
}
