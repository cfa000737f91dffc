//! notegraph-live: interactive extraction client.
//!
//! Each non-blank line read from stdin (or the whole of `--file`) is sent to
//! the extraction server; replies are printed and graph images saved.

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use notegraph_client::{ClientConfig, Session, TerminalRenderer, WsConnector};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so they never interleave with rendered output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("notegraph_client=info,notegraph_live=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::parse();
    config.validate().context("Invalid client configuration")?;

    info!(
        subsystem = "client",
        url = %config.url,
        output_dir = %config.output_dir.display(),
        "Starting live extraction client"
    );

    let mut session = Session::new(config.connector());
    let mut renderer = TerminalRenderer::new(std::io::stdout(), config.output_dir.clone());

    let result = match &config.file {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            tokio::select! {
                r = submit(&mut session, &text, &mut renderer) => r,
                _ = tokio::signal::ctrl_c() => {
                    info!(subsystem = "client", "Interrupted");
                    Ok(())
                }
            }
        }
        None => run_stdin(&mut session, &mut renderer).await,
    };

    session.close().await;
    result
}

async fn run_stdin(
    session: &mut Session<WsConnector>,
    renderer: &mut TerminalRenderer<std::io::Stdout>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!(subsystem = "client", "Interrupted");
                return Ok(());
            }
        };

        let Some(line) = line else {
            return Ok(());
        };

        // One submission at a time; input is not read while a reply is pending.
        tokio::select! {
            r = submit(session, &line, renderer) => r?,
            _ = tokio::signal::ctrl_c() => {
                info!(subsystem = "client", "Interrupted");
                return Ok(());
            }
        }
    }
}

async fn submit(
    session: &mut Session<WsConnector>,
    text: &str,
    renderer: &mut TerminalRenderer<std::io::Stdout>,
) -> anyhow::Result<()> {
    // Failures were already shown to the user; keep the session going.
    if let Err(e) = session.submit(text, renderer).await {
        warn!(subsystem = "client", error = %e, "Submission failed");
    }
    Ok(())
}
