//! Wire format for the extraction socket.
//!
//! One text frame per direction per exchange:
//!
//! ```text
//! -> {"text": "..."}
//! <- {"entities": [...], "edges": [...], "entity_count": N, "edge_count": M, "graph_image": "<base64>"}
//! <- {"error": "..."}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Request frame sent for each submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub text: String,
}

/// Entities, edges and the rendered graph returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default)]
    pub entities: Vec<serde_json::Value>,
    #[serde(default)]
    pub edges: Vec<serde_json::Value>,
    pub entity_count: u64,
    pub edge_count: u64,
    /// Base64-encoded image bytes.
    #[serde(default)]
    pub graph_image: String,
}

impl ExtractionResult {
    /// Nothing was extracted. Decided on the reported counts, not the lists.
    pub fn is_empty(&self) -> bool {
        self.entity_count == 0 && self.edge_count == 0
    }
}

/// A decoded reply frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionReply {
    /// The server reported a failure; shown verbatim and never retried.
    /// Any JSON value under `error` counts, including `null`.
    Failure { error: serde_json::Value },
    Graph(ExtractionResult),
}

impl ExtractionReply {
    /// Text of a server-reported failure. Strings are shown as-is, any other
    /// value as its JSON text.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            ExtractionReply::Failure {
                error: serde_json::Value::String(message),
            } => Some(message.clone()),
            ExtractionReply::Failure { error } => Some(error.to_string()),
            ExtractionReply::Graph(_) => None,
        }
    }
}

pub fn encode_request(text: &str) -> ClientResult<String> {
    serde_json::to_string(&ExtractionRequest {
        text: text.to_string(),
    })
    .map_err(|e| ClientError::Protocol(e.to_string()))
}

/// Parse a reply frame. Anything that matches neither shape is a
/// [`ClientError::Protocol`] failure.
pub fn decode_reply(frame: &str) -> ClientResult<ExtractionReply> {
    serde_json::from_str(frame).map_err(|e| ClientError::Protocol(e.to_string()))
}
