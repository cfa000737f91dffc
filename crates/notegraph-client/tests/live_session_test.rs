//! End-to-end tests of the live session against a fake extraction server.
//!
//! The server is a real axum WebSocket endpoint on an ephemeral port, so
//! these go through `WsConnector` and tokio-tungstenite unchanged.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use notegraph_client::{
    ClientError, RenderOutcome, Session, SessionState, TerminalRenderer, WsConnector,
};

const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

#[derive(Clone, Copy)]
enum Behaviour {
    /// One entity per capitalised word, one edge between each pair of
    /// neighbouring entities.
    Graph,
    Error,
    Garbage,
    Silent,
}

#[derive(Clone)]
struct FakeServer {
    behaviour: Behaviour,
    upgrades: Arc<AtomicUsize>,
}

async fn ws_handler(ws: WebSocketUpgrade, State(server): State<FakeServer>) -> impl IntoResponse {
    server.upgrades.fetch_add(1, Ordering::SeqCst);
    ws.on_upgrade(move |socket| handle_socket(socket, server.behaviour))
}

async fn handle_socket(mut socket: WebSocket, behaviour: Behaviour) {
    while let Some(Ok(msg)) = socket.recv().await {
        let Message::Text(frame) = msg else {
            continue;
        };
        let request: serde_json::Value = serde_json::from_str(&frame).unwrap();
        let names = request["text"]
            .as_str()
            .unwrap()
            .split_whitespace()
            .filter(|w| w.starts_with(|c: char| c.is_uppercase()))
            .count();

        let reply = match behaviour {
            Behaviour::Graph => serde_json::json!({
                "entities": [],
                "edges": [],
                "entity_count": names,
                "edge_count": names.saturating_sub(1),
                "graph_image": STANDARD.encode(PNG_BYTES),
            })
            .to_string(),
            Behaviour::Error => serde_json::json!({"error": "extraction model unavailable"}).to_string(),
            Behaviour::Garbage => "<html>502 Bad Gateway</html>".to_string(),
            Behaviour::Silent => continue,
        };

        if socket.send(Message::Text(reply)).await.is_err() {
            break;
        }
    }
}

struct TestServer {
    url: String,
    upgrades: Arc<AtomicUsize>,
}

impl TestServer {
    async fn spawn(behaviour: Behaviour) -> Self {
        let upgrades = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/ws", get(ws_handler))
            .with_state(FakeServer {
                behaviour,
                upgrades: upgrades.clone(),
            });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("ws://{}/ws", addr),
            upgrades,
        }
    }

    fn connector(&self, recv_timeout: Duration) -> WsConnector {
        WsConnector::new(self.url.clone(), Duration::from_secs(5), recv_timeout)
    }

    fn upgrades(&self) -> usize {
        self.upgrades.load(Ordering::SeqCst)
    }
}

fn output(renderer: TerminalRenderer<Vec<u8>>) -> String {
    String::from_utf8(renderer.into_inner()).unwrap()
}

#[tokio::test]
async fn test_graph_reply_saves_image() {
    let server = TestServer::spawn(Behaviour::Graph).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new(server.connector(Duration::from_secs(5)));
    let mut renderer = TerminalRenderer::new(Vec::new(), dir.path());

    let outcome = session
        .submit("Alice founded Acme", &mut renderer)
        .await
        .unwrap();

    assert_eq!(outcome, RenderOutcome::Graph);
    let saved = renderer.last_image().unwrap().to_path_buf();
    assert_eq!(std::fs::read(&saved).unwrap(), PNG_BYTES);
    assert!(output(renderer).contains("Graph has 2 entities and 1 edges."));

    session.close().await;
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn test_connection_reused_across_submissions() {
    let server = TestServer::spawn(Behaviour::Graph).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new(server.connector(Duration::from_secs(5)));
    let mut renderer = TerminalRenderer::new(Vec::new(), dir.path());

    for text in ["Alice", "Alice and Bob", "Carol met Dave in Paris"] {
        session.submit(text, &mut renderer).await.unwrap();
    }

    assert_eq!(server.upgrades(), 1);
    session.close().await;
}

#[tokio::test]
async fn test_empty_graph_warns() {
    let server = TestServer::spawn(Behaviour::Graph).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new(server.connector(Duration::from_secs(5)));
    let mut renderer = TerminalRenderer::new(Vec::new(), dir.path());

    // No capitalised words means zero entities and zero edges.
    let outcome = session
        .submit("nothing worth naming here", &mut renderer)
        .await
        .unwrap();

    assert_eq!(outcome, RenderOutcome::Empty);
    assert!(renderer.last_image().is_none());
    assert!(output(renderer).contains("No entities or edges were extracted from the text."));
}

#[tokio::test]
async fn test_server_error_reply_not_retried() {
    let server = TestServer::spawn(Behaviour::Error).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new(server.connector(Duration::from_secs(5)));
    let mut renderer = TerminalRenderer::new(Vec::new(), dir.path());

    let outcome = session.submit("Alice", &mut renderer).await.unwrap();

    assert_eq!(outcome, RenderOutcome::ServerError);
    assert_eq!(server.upgrades(), 1);
    assert!(output(renderer).contains("error: Server error: extraction model unavailable"));
}

#[tokio::test]
async fn test_malformed_reply_retried_until_cap() {
    let server = TestServer::spawn(Behaviour::Garbage).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new(server.connector(Duration::from_secs(5)));
    let mut renderer = TerminalRenderer::new(Vec::new(), dir.path());

    let err = session.submit("Alice", &mut renderer).await.unwrap_err();

    assert!(matches!(err, ClientError::RetriesExhausted { attempts: 3 }));
    assert_eq!(server.upgrades(), 3);
    assert_eq!(session.state(), SessionState::Error);
    assert!(output(renderer).contains("Failed to communicate with server after 3 attempts"));
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let server = TestServer::spawn(Behaviour::Silent).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new(server.connector(Duration::from_secs(1)));
    let mut renderer = TerminalRenderer::new(Vec::new(), dir.path());

    let err = session.submit("Alice", &mut renderer).await.unwrap_err();

    assert!(matches!(err, ClientError::RetriesExhausted { .. }));
    assert_eq!(server.upgrades(), 3);
}

#[tokio::test]
async fn test_unreachable_server_reports_each_attempt() {
    // Reserve a port, then free it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let connector = WsConnector::new(
        format!("ws://{}/ws", addr),
        Duration::from_secs(2),
        Duration::from_secs(2),
    );
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new(connector);
    let mut renderer = TerminalRenderer::new(Vec::new(), dir.path());

    let err = session.submit("Alice", &mut renderer).await.unwrap_err();
    assert!(matches!(err, ClientError::RetriesExhausted { attempts: 3 }));

    let text = output(renderer);
    assert_eq!(
        text.matches("Failed to connect to extraction server").count(),
        3
    );
    assert!(text.contains("Failed to communicate with server after 3 attempts"));
}

#[tokio::test]
async fn test_blank_input_never_reaches_server() {
    let server = TestServer::spawn(Behaviour::Graph).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new(server.connector(Duration::from_secs(5)));
    let mut renderer = TerminalRenderer::new(Vec::new(), dir.path());

    let outcome = session.submit(" \t ", &mut renderer).await.unwrap();

    assert_eq!(outcome, RenderOutcome::BlankInput);
    assert_eq!(server.upgrades(), 0);
    assert!(output(renderer).contains("warning: Please enter some text"));
}
