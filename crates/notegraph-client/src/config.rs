//! Command-line and environment configuration for `notegraph-live`.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::{ClientError, ClientResult};
use crate::transport::WsConnector;

pub const DEFAULT_WS_URL: &str = "ws://127.0.0.1:8000/ws";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_RECV_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_OUTPUT_DIR: &str = "./graphs";

#[derive(Parser, Debug, Clone)]
#[command(name = "notegraph-live")]
#[command(author, version, about = "Stream text to an extraction server and save the returned graph")]
pub struct ClientConfig {
    /// WebSocket URL of the extraction server
    #[arg(long, env = "EXTRACTION_WS_URL", default_value = DEFAULT_WS_URL)]
    pub url: String,

    /// Seconds to wait for the socket handshake
    #[arg(long, env = "EXTRACTION_CONNECT_TIMEOUT_SECS", default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    pub connect_timeout_secs: u64,

    /// Seconds to wait for a reply
    #[arg(long, env = "EXTRACTION_RECV_TIMEOUT_SECS", default_value_t = DEFAULT_RECV_TIMEOUT_SECS)]
    pub recv_timeout_secs: u64,

    /// Directory where graph images are saved
    #[arg(short, long, env = "GRAPH_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Submit the whole file as one text instead of reading lines from stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

impl ClientConfig {
    /// Check values clap cannot.
    pub fn validate(&self) -> ClientResult<()> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(ClientError::Config(format!(
                "Extraction URL must use ws:// or wss://, got '{}'",
                self.url
            )));
        }
        if self.connect_timeout_secs == 0 || self.recv_timeout_secs == 0 {
            return Err(ClientError::Config(
                "Timeouts must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn connector(&self) -> WsConnector {
        WsConnector::new(
            self.url.clone(),
            Duration::from_secs(self.connect_timeout_secs),
            Duration::from_secs(self.recv_timeout_secs),
        )
    }
}
