//! Socket transport.
//!
//! [`Connector`] and [`Connection`] are the seam between the session state
//! machine and the network, so the retry logic can be driven by scripted
//! connections in tests.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};

/// An open, bidirectional text channel.
#[async_trait]
pub trait Connection: Send {
    async fn send_text(&mut self, text: String) -> ClientResult<()>;

    /// Wait for the next text frame.
    async fn recv_text(&mut self) -> ClientResult<String>;

    async fn close(&mut self) -> ClientResult<()>;
}

/// Opens connections to the extraction service.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> ClientResult<Box<dyn Connection>>;
}

/// WebSocket connector with connect and receive timeouts.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
    connect_timeout: Duration,
    recv_timeout: Duration,
}

impl WsConnector {
    pub fn new(url: impl Into<String>, connect_timeout: Duration, recv_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            connect_timeout,
            recv_timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> ClientResult<Box<dyn Connection>> {
        let (stream, _response) =
            match tokio::time::timeout(self.connect_timeout, connect_async(self.url.as_str()))
                .await
            {
                Ok(Ok(pair)) => pair,
                Ok(Err(e)) => return Err(ClientError::Connect(e.to_string())),
                Err(_) => return Err(ClientError::Timeout(self.connect_timeout.as_secs())),
            };

        info!(
            subsystem = "client",
            component = "transport",
            op = "connect",
            url = %self.url,
            "Connected to extraction server"
        );
        Ok(Box::new(WsConnection {
            stream,
            recv_timeout: self.recv_timeout,
        }))
    }
}

struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    recv_timeout: Duration,
}

#[async_trait]
impl Connection for WsConnection {
    async fn send_text(&mut self, text: String) -> ClientResult<()> {
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn recv_text(&mut self) -> ClientResult<String> {
        let deadline = tokio::time::Instant::now() + self.recv_timeout;
        loop {
            let next = tokio::time::timeout_at(deadline, self.stream.next())
                .await
                .map_err(|_| ClientError::Timeout(self.recv_timeout.as_secs()))?;

            match next {
                Some(Ok(Message::Text(text))) => return Ok(text),
                Some(Ok(Message::Binary(bytes))) => {
                    return String::from_utf8(bytes)
                        .map_err(|e| ClientError::Protocol(e.to_string()));
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {
                    debug!(
                        subsystem = "client",
                        component = "transport",
                        "Skipping control frame"
                    );
                }
                Some(Ok(Message::Close(_))) | None => return Err(ClientError::Closed),
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }

    async fn close(&mut self) -> ClientResult<()> {
        match self.stream.close(None).await {
            Ok(()) => Ok(()),
            Err(e) => match ClientError::from(e) {
                ClientError::Closed => Ok(()),
                other => Err(other),
            },
        }
    }
}
