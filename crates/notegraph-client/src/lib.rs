//! # notegraph-client
//!
//! Live extraction client for notegraph.
//!
//! Text is sent to an entity/relationship extraction server over a WebSocket,
//! one frame per submission, and the reply is rendered as counts plus a
//! saved graph image.
//!
//! - [`protocol`]: request and reply frames
//! - [`transport`]: the [`Connector`]/[`Connection`] seam and its WebSocket implementation
//! - [`session`]: connection state machine with a fixed retry cap
//! - [`render`]: presentation of replies
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use notegraph_client::{Session, TerminalRenderer, WsConnector};
//!
//! let connector = WsConnector::new(
//!     "ws://127.0.0.1:8000/ws",
//!     Duration::from_secs(10),
//!     Duration::from_secs(60),
//! );
//! let mut session = Session::new(connector);
//! let mut renderer = TerminalRenderer::new(std::io::stdout(), "./graphs");
//! session.submit("Alice works at Acme.", &mut renderer).await?;
//! session.close().await;
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod render;
pub mod session;
pub mod transport;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use protocol::{decode_reply, encode_request, ExtractionReply, ExtractionRequest, ExtractionResult};
pub use render::{
    render_reply, RenderOutcome, Renderer, TerminalRenderer, EMPTY_INPUT_PROMPT, EMPTY_RESULT_WARNING,
};
pub use session::{Session, SessionEvent, SessionState, MAX_ATTEMPTS};
pub use transport::{Connection, Connector, WsConnector};
