//! Presentation of extraction replies.

use std::io::Write;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use tracing::info;

use crate::error::{ClientError, ClientResult};
use crate::protocol::{ExtractionReply, ExtractionResult};

/// Warning shown when the server found nothing in the text.
pub const EMPTY_RESULT_WARNING: &str = "No entities or edges were extracted from the text.";

/// Prompt shown instead of sending blank input.
pub const EMPTY_INPUT_PROMPT: &str = "Please enter some text to extract a graph from.";

/// Output surface for the live session.
pub trait Renderer {
    fn error(&mut self, message: &str) -> ClientResult<()>;
    fn warning(&mut self, message: &str) -> ClientResult<()>;
    fn info(&mut self, message: &str) -> ClientResult<()>;

    /// Show a decoded image. `extension` is detected from the bytes.
    fn image(&mut self, bytes: &[u8], extension: &str) -> ClientResult<()>;
}

/// Which branch [`render_reply`] took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    ServerError,
    Empty,
    Graph,
    /// Counts were shown but the image could not be decoded or displayed.
    Unrenderable,
    /// Input was blank; nothing was sent and the user was prompted instead.
    BlankInput,
}

pub fn render_reply(
    reply: &ExtractionReply,
    renderer: &mut dyn Renderer,
) -> ClientResult<RenderOutcome> {
    let result = match reply {
        ExtractionReply::Failure { .. } => {
            let message = reply.failure_message().unwrap_or_default();
            renderer.error(&format!("Server error: {}", message))?;
            return Ok(RenderOutcome::ServerError);
        }
        ExtractionReply::Graph(result) => result,
    };

    if result.is_empty() {
        renderer.warning(EMPTY_RESULT_WARNING)?;
        return Ok(RenderOutcome::Empty);
    }

    renderer.info(&format!(
        "Graph has {} entities and {} edges.",
        result.entity_count, result.edge_count
    ))?;

    match show_graph(result, renderer) {
        Ok(()) => Ok(RenderOutcome::Graph),
        Err(e) => {
            let message = match e {
                ClientError::Render(_) => e.to_string(),
                other => ClientError::Render(other.to_string()).to_string(),
            };
            renderer.error(&message)?;
            Ok(RenderOutcome::Unrenderable)
        }
    }
}

fn show_graph(result: &ExtractionResult, renderer: &mut dyn Renderer) -> ClientResult<()> {
    let bytes = STANDARD
        .decode(result.graph_image.trim())
        .map_err(|e| ClientError::Render(format!("graph image is not base64: {}", e)))?;

    let kind = infer::get(&bytes)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .ok_or_else(|| ClientError::Render("graph image is not a recognised image".to_string()))?;

    renderer.image(&bytes, kind.extension())
}

/// Writes messages to a terminal and saves images under `output_dir`.
pub struct TerminalRenderer<W: Write> {
    out: W,
    output_dir: PathBuf,
    last_image: Option<PathBuf>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            out,
            output_dir: output_dir.into(),
            last_image: None,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the most recently saved image.
    pub fn last_image(&self) -> Option<&Path> {
        self.last_image.as_deref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn error(&mut self, message: &str) -> ClientResult<()> {
        writeln!(self.out, "error: {}", message)?;
        Ok(())
    }

    fn warning(&mut self, message: &str) -> ClientResult<()> {
        writeln!(self.out, "warning: {}", message)?;
        Ok(())
    }

    fn info(&mut self, message: &str) -> ClientResult<()> {
        writeln!(self.out, "{}", message)?;
        Ok(())
    }

    fn image(&mut self, bytes: &[u8], extension: &str) -> ClientResult<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        let name = format!(
            "graph-{}.{}",
            Utc::now().format("%Y%m%dT%H%M%S%.3f"),
            extension
        );
        let path = self.output_dir.join(name);
        std::fs::write(&path, bytes)?;

        info!(
            subsystem = "client",
            component = "render",
            path = %path.display(),
            size_bytes = bytes.len(),
            "Graph image saved"
        );
        writeln!(self.out, "Graph image saved to {}", path.display())?;
        self.last_image = Some(path);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Shown {
        Error(String),
        Warning(String),
        Info(String),
        Image { size: usize, extension: String },
    }

    /// Renderer that records everything it is asked to show.
    #[derive(Debug, Default)]
    pub struct RecordingRenderer {
        pub shown: Vec<Shown>,
    }

    impl RecordingRenderer {
        pub fn errors(&self) -> Vec<&str> {
            self.shown
                .iter()
                .filter_map(|s| match s {
                    Shown::Error(m) => Some(m.as_str()),
                    _ => None,
                })
                .collect()
        }

        pub fn images(&self) -> usize {
            self.shown
                .iter()
                .filter(|s| matches!(s, Shown::Image { .. }))
                .count()
        }
    }

    impl Renderer for RecordingRenderer {
        fn error(&mut self, message: &str) -> ClientResult<()> {
            self.shown.push(Shown::Error(message.to_string()));
            Ok(())
        }

        fn warning(&mut self, message: &str) -> ClientResult<()> {
            self.shown.push(Shown::Warning(message.to_string()));
            Ok(())
        }

        fn info(&mut self, message: &str) -> ClientResult<()> {
            self.shown.push(Shown::Info(message.to_string()));
            Ok(())
        }

        fn image(&mut self, bytes: &[u8], extension: &str) -> ClientResult<()> {
            self.shown.push(Shown::Image {
                size: bytes.len(),
                extension: extension.to_string(),
            });
            Ok(())
        }
    }
}
