//! Error types for the extraction client.

use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Extraction client errors.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The socket connection could not be established.
    #[error("Failed to connect to extraction server: {0}")]
    Connect(String),

    /// Sending or receiving a frame failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// No frame arrived within the configured timeout.
    #[error("Timed out after {0}s")]
    Timeout(u64),

    /// The server sent something that is not a valid reply.
    #[error("Malformed server reply: {0}")]
    Protocol(String),

    /// The server closed the connection.
    #[error("Connection closed by server")]
    Closed,

    /// Every connect-and-send attempt failed.
    #[error("Failed to communicate with server after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// Rendering a reply failed.
    #[error("Error processing server response: {0}")]
    Render(String),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Whether the failure happened on the wire, so the connection must be
    /// discarded and the exchange retried.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Connect(_)
                | ClientError::Transport(_)
                | ClientError::Timeout(_)
                | ClientError::Protocol(_)
                | ClientError::Closed
        )
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => ClientError::Closed,
            other => ClientError::Transport(other.to_string()),
        }
    }
}
