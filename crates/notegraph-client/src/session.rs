//! Live extraction session.
//!
//! The connection lifecycle is an explicit state machine. [`SessionState::on`]
//! is a pure transition function; [`Session`] drives it with the events its
//! socket produces.
//!
//! ```text
//!                 ConnectSucceeded            Submit
//!  Disconnected ------------------> Connected -------> AwaitingResponse
//!       ^   |                          ^  |                  |  |
//!       |   | MaxRetriesExceeded       |  +-- TransportError-+  | ResponseReceived
//!       |   v                          |                        |
//!       +- Error                       +------------------------+
//!   Submit
//! ```

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};
use crate::protocol::{decode_reply, encode_request, ExtractionReply};
use crate::render::{render_reply, RenderOutcome, Renderer, EMPTY_INPUT_PROMPT};
use crate::transport::{Connection, Connector};

/// Connect-and-send cycles attempted per submission.
pub const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    AwaitingResponse,
    /// The last submission exhausted its retries.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Submit,
    ConnectSucceeded,
    ConnectFailed,
    ResponseReceived,
    TransportError,
    MaxRetriesExceeded,
    Shutdown,
}

impl SessionState {
    /// Next state after `event`. Events that make no sense in the current
    /// state leave it unchanged.
    pub fn on(self, event: SessionEvent) -> SessionState {
        use SessionEvent as E;
        use SessionState as S;

        match (self, event) {
            (_, E::Shutdown) => S::Disconnected,
            (S::Disconnected, E::ConnectSucceeded) => S::Connected,
            (S::Disconnected, E::ConnectFailed) => S::Disconnected,
            (S::Disconnected, E::MaxRetriesExceeded) => S::Error,
            (S::Connected, E::Submit) => S::AwaitingResponse,
            (S::Connected, E::TransportError) => S::Disconnected,
            (S::AwaitingResponse, E::ResponseReceived) => S::Connected,
            (S::AwaitingResponse, E::TransportError) => S::Disconnected,
            (S::Error, E::Submit) => S::Disconnected,
            (state, _) => state,
        }
    }
}

/// A client session holding at most one warm connection.
pub struct Session<C: Connector> {
    connector: C,
    connection: Option<Box<dyn Connection>>,
    state: SessionState,
    max_attempts: u32,
}

impl<C: Connector> Session<C> {
    pub fn new(connector: C) -> Self {
        Self::with_max_attempts(connector, MAX_ATTEMPTS)
    }

    pub fn with_max_attempts(connector: C, max_attempts: u32) -> Self {
        Self {
            connector,
            connection: None,
            state: SessionState::Disconnected,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn apply(&mut self, event: SessionEvent) {
        let next = self.state.on(event);
        if next != self.state {
            debug!(
                subsystem = "client",
                component = "session",
                from = ?self.state,
                to = ?next,
                event = ?event,
                "Session transition"
            );
        }
        self.state = next;
    }

    /// Send `text` and render the reply.
    ///
    /// Whitespace-only text is not sent; the user is prompted instead and the
    /// session state is left alone.
    ///
    /// Connect failures are shown to the user as they happen. Transport
    /// failures drop the connection and restart the connect-and-send cycle,
    /// up to the attempt cap. A reply carrying a server error is rendered
    /// and not retried.
    pub async fn submit(
        &mut self,
        text: &str,
        renderer: &mut dyn Renderer,
    ) -> ClientResult<RenderOutcome> {
        if text.trim().is_empty() {
            renderer.warning(EMPTY_INPUT_PROMPT)?;
            return Ok(RenderOutcome::BlankInput);
        }

        let frame = encode_request(text)?;
        let start = Instant::now();

        if self.state == SessionState::Error {
            self.apply(SessionEvent::Submit);
        }

        let mut attempt = 0;
        while attempt < self.max_attempts {
            attempt += 1;

            if self.connection.is_none() {
                match self.connector.connect().await {
                    Ok(connection) => {
                        self.connection = Some(connection);
                        self.apply(SessionEvent::ConnectSucceeded);
                    }
                    Err(e) => {
                        warn!(
                            subsystem = "client",
                            component = "session",
                            attempt,
                            error = %e,
                            "Connection attempt failed"
                        );
                        self.apply(SessionEvent::ConnectFailed);
                        renderer.error(&e.to_string())?;
                        continue;
                    }
                }
            }

            self.apply(SessionEvent::Submit);
            match self.exchange(frame.clone()).await {
                Ok(reply) => {
                    self.apply(SessionEvent::ResponseReceived);
                    info!(
                        subsystem = "client",
                        component = "session",
                        op = "submit",
                        attempt,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Extraction reply received"
                    );
                    return render_reply(&reply, renderer);
                }
                Err(e) if e.is_transport() => {
                    warn!(
                        subsystem = "client",
                        component = "session",
                        attempt,
                        error = %e,
                        "Exchange failed, discarding connection"
                    );
                    self.discard().await;
                    self.apply(SessionEvent::TransportError);
                }
                Err(e) => {
                    self.discard().await;
                    self.apply(SessionEvent::TransportError);
                    return Err(e);
                }
            }
        }

        self.apply(SessionEvent::MaxRetriesExceeded);
        let err = ClientError::RetriesExhausted {
            attempts: self.max_attempts,
        };
        renderer.error(&err.to_string())?;
        Err(err)
    }

    async fn exchange(&mut self, frame: String) -> ClientResult<ExtractionReply> {
        let connection = self.connection.as_mut().ok_or(ClientError::Closed)?;
        connection.send_text(frame).await?;
        let reply = connection.recv_text().await?;
        decode_reply(&reply)
    }

    async fn discard(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            if let Err(e) = connection.close().await {
                debug!(
                    subsystem = "client",
                    component = "session",
                    error = %e,
                    "Close after failure did not complete cleanly"
                );
            }
        }
    }

    /// Tear down the connection, whatever state the session is in.
    pub async fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            match connection.close().await {
                Ok(()) => info!(
                    subsystem = "client",
                    component = "session",
                    op = "close",
                    "Connection closed"
                ),
                Err(e) => debug!(
                    subsystem = "client",
                    component = "session",
                    error = %e,
                    "Connection close did not complete cleanly"
                ),
            }
        }
        self.apply(SessionEvent::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::render::testing::{RecordingRenderer, Shown};
    use crate::render::EMPTY_RESULT_WARNING;

    const GRAPH_REPLY: &str =
        r#"{"entities": [], "edges": [], "entity_count": 0, "edge_count": 0, "graph_image": ""}"#;

    /// What a scripted connection does when asked for a reply.
    #[derive(Clone)]
    enum Step {
        Reply(&'static str),
        Drop,
    }

    struct ScriptedConnection {
        steps: Arc<Mutex<VecDeque<Step>>>,
        sent: Arc<Mutex<Vec<String>>>,
        closes: Arc<AtomicU32>,
    }

    #[async_trait]
    impl Connection for ScriptedConnection {
        async fn send_text(&mut self, text: String) -> ClientResult<()> {
            self.sent.lock().unwrap().push(text);
            Ok(())
        }

        async fn recv_text(&mut self) -> ClientResult<String> {
            match self.steps.lock().unwrap().pop_front() {
                Some(Step::Reply(frame)) => Ok(frame.to_string()),
                Some(Step::Drop) | None => Err(ClientError::Closed),
            }
        }

        async fn close(&mut self) -> ClientResult<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Fails the first `fail_connects` connects, then hands out connections
    /// that play back `steps`.
    #[derive(Clone, Default)]
    struct ScriptedConnector {
        fail_connects: Arc<AtomicU32>,
        connects: Arc<AtomicU32>,
        steps: Arc<Mutex<VecDeque<Step>>>,
        sent: Arc<Mutex<Vec<String>>>,
        closes: Arc<AtomicU32>,
    }

    impl ScriptedConnector {
        fn new(fail_connects: u32, steps: Vec<Step>) -> Self {
            Self {
                fail_connects: Arc::new(AtomicU32::new(fail_connects)),
                steps: Arc::new(Mutex::new(steps.into())),
                ..Default::default()
            }
        }

        fn connects(&self) -> u32 {
            self.connects.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Connector for ScriptedConnector {
        async fn connect(&self) -> ClientResult<Box<dyn Connection>> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            let remaining = self.fail_connects.load(Ordering::SeqCst);
            if remaining > 0 {
                self.fail_connects.store(remaining - 1, Ordering::SeqCst);
                return Err(ClientError::Connect("connection refused".to_string()));
            }
            Ok(Box::new(ScriptedConnection {
                steps: self.steps.clone(),
                sent: self.sent.clone(),
                closes: self.closes.clone(),
            }))
        }
    }

    #[test]
    fn test_transition_table() {
        use SessionEvent as E;
        use SessionState as S;

        assert_eq!(S::Disconnected.on(E::ConnectSucceeded), S::Connected);
        assert_eq!(S::Disconnected.on(E::ConnectFailed), S::Disconnected);
        assert_eq!(S::Disconnected.on(E::MaxRetriesExceeded), S::Error);
        assert_eq!(S::Connected.on(E::Submit), S::AwaitingResponse);
        assert_eq!(S::Connected.on(E::TransportError), S::Disconnected);
        assert_eq!(S::AwaitingResponse.on(E::ResponseReceived), S::Connected);
        assert_eq!(S::AwaitingResponse.on(E::TransportError), S::Disconnected);
        assert_eq!(S::Error.on(E::Submit), S::Disconnected);

        for state in [S::Disconnected, S::Connected, S::AwaitingResponse, S::Error] {
            assert_eq!(state.on(E::Shutdown), S::Disconnected);
        }
    }

    #[test]
    fn test_irrelevant_events_ignored() {
        use SessionEvent as E;
        use SessionState as S;

        assert_eq!(S::AwaitingResponse.on(E::Submit), S::AwaitingResponse);
        assert_eq!(S::Connected.on(E::ResponseReceived), S::Connected);
        assert_eq!(S::Error.on(E::ConnectSucceeded), S::Error);
        assert_eq!(S::Disconnected.on(E::ResponseReceived), S::Disconnected);
    }

    #[tokio::test]
    async fn test_success_keeps_connection_warm() {
        let connector = ScriptedConnector::new(
            0,
            vec![Step::Reply(GRAPH_REPLY), Step::Reply(GRAPH_REPLY)],
        );
        let mut session = Session::new(connector.clone());
        let mut renderer = RecordingRenderer::default();

        session.submit("first", &mut renderer).await.unwrap();
        assert_eq!(session.state(), SessionState::Connected);
        session.submit("second", &mut renderer).await.unwrap();

        assert_eq!(connector.connects(), 1);
        assert!(session.is_connected());
        let sent = connector.sent.lock().unwrap().clone();
        assert_eq!(sent, vec![r#"{"text":"first"}"#, r#"{"text":"second"}"#]);
    }

    #[tokio::test]
    async fn test_connect_failures_then_success() {
        let connector = ScriptedConnector::new(2, vec![Step::Reply(GRAPH_REPLY)]);
        let mut session = Session::new(connector.clone());
        let mut renderer = RecordingRenderer::default();

        let outcome = session.submit("text", &mut renderer).await.unwrap();

        assert_eq!(outcome, RenderOutcome::Empty);
        assert_eq!(connector.connects(), 3);
        assert_eq!(renderer.errors().len(), 2);
        assert!(renderer.errors()[0].contains("connection refused"));
        let rendered: Vec<_> = renderer
            .shown
            .iter()
            .filter(|s| !matches!(s, Shown::Error(_)))
            .collect();
        assert_eq!(rendered, vec![&Shown::Warning(EMPTY_RESULT_WARNING.into())]);
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let connector = ScriptedConnector::new(u32::MAX, vec![]);
        let mut session = Session::new(connector.clone());
        let mut renderer = RecordingRenderer::default();

        let err = session.submit("text", &mut renderer).await.unwrap_err();

        assert!(matches!(err, ClientError::RetriesExhausted { attempts: 3 }));
        assert_eq!(connector.connects(), MAX_ATTEMPTS);
        assert_eq!(session.state(), SessionState::Error);
        assert_eq!(
            renderer.shown.last(),
            Some(&Shown::Error(
                "Failed to communicate with server after 3 attempts".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_transport_error_discards_and_retries() {
        let connector = ScriptedConnector::new(
            0,
            vec![Step::Drop, Step::Reply("not json"), Step::Reply(GRAPH_REPLY)],
        );
        let mut session = Session::new(connector.clone());
        let mut renderer = RecordingRenderer::default();

        let outcome = session.submit("text", &mut renderer).await.unwrap();

        assert_eq!(outcome, RenderOutcome::Empty);
        assert_eq!(connector.connects(), 3);
        assert_eq!(connector.closes.load(Ordering::SeqCst), 2);
        assert_eq!(connector.sent.lock().unwrap().len(), 3);
        assert_eq!(
            renderer.shown,
            vec![Shown::Warning(EMPTY_RESULT_WARNING.into())]
        );
    }

    #[tokio::test]
    async fn test_null_server_error_not_retried() {
        let connector = ScriptedConnector::new(0, vec![Step::Reply(r#"{"error": null}"#)]);
        let mut session = Session::new(connector.clone());
        let mut renderer = RecordingRenderer::default();

        let outcome = session.submit("text", &mut renderer).await.unwrap();

        assert_eq!(outcome, RenderOutcome::ServerError);
        assert_eq!(connector.connects(), 1);
        assert_eq!(renderer.shown, vec![Shown::Error("Server error: null".into())]);
    }

    #[tokio::test]
    async fn test_blank_input_prompts_without_sending() {
        let connector = ScriptedConnector::new(0, vec![Step::Reply(GRAPH_REPLY)]);
        let mut session = Session::new(connector.clone());
        let mut renderer = RecordingRenderer::default();

        for blank in ["", "   ", "\n\t "] {
            let outcome = session.submit(blank, &mut renderer).await.unwrap();
            assert_eq!(outcome, RenderOutcome::BlankInput);
        }

        assert_eq!(connector.connects(), 0);
        assert!(connector.sent.lock().unwrap().is_empty());
        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(
            renderer.shown,
            vec![Shown::Warning(EMPTY_INPUT_PROMPT.into()); 3]
        );
    }

    #[tokio::test]
    async fn test_server_error_not_retried() {
        let connector = ScriptedConnector::new(
            0,
            vec![Step::Reply(r#"{"error": "model not loaded"}"#)],
        );
        let mut session = Session::new(connector.clone());
        let mut renderer = RecordingRenderer::default();

        let outcome = session.submit("text", &mut renderer).await.unwrap();

        assert_eq!(outcome, RenderOutcome::ServerError);
        assert_eq!(connector.connects(), 1);
        assert_eq!(connector.sent.lock().unwrap().len(), 1);
        assert_eq!(renderer.errors(), vec!["Server error: model not loaded"]);
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn test_recovers_after_error_state() {
        let connector = ScriptedConnector::new(3, vec![Step::Reply(GRAPH_REPLY)]);
        let mut session = Session::new(connector.clone());
        let mut renderer = RecordingRenderer::default();

        assert!(session.submit("text", &mut renderer).await.is_err());
        assert_eq!(session.state(), SessionState::Error);

        session.submit("again", &mut renderer).await.unwrap();
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(connector.connects(), 4);
    }

    #[tokio::test]
    async fn test_close_tears_down() {
        let connector = ScriptedConnector::new(0, vec![Step::Reply(GRAPH_REPLY)]);
        let mut session = Session::new(connector.clone());
        let mut renderer = RecordingRenderer::default();

        session.submit("text", &mut renderer).await.unwrap();
        session.close().await;

        assert!(!session.is_connected());
        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(connector.closes.load(Ordering::SeqCst), 1);
    }
}
