//! `relay verify-sse`: read the first event of a running server's `/sse` stream.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use futures_util::StreamExt;
use relay_mcp::LIVENESS_MESSAGE;
use tracing::{error, info};

pub const DEFAULT_SSE_URL: &str = "http://localhost:3000/sse";

const READ_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn run(url: &str) -> Result<ExitCode> {
    match first_event(url, READ_TIMEOUT).await {
        Ok(event) if event.contains(LIVENESS_MESSAGE) => {
            info!(url, "SSE endpoint is live");
            println!("{}", event.trim_end());
            Ok(ExitCode::SUCCESS)
        }
        Ok(event) => {
            error!(url, event = %event.trim_end(), "unexpected first SSE event");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => {
            error!(url, error = %err, "SSE verification failed");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Text of the stream up to and including the first blank-line event terminator.
pub async fn first_event(url: &str, timeout: Duration) -> Result<String> {
    tokio::time::timeout(timeout, read_first_event(url))
        .await
        .map_err(|_| anyhow!("no SSE event from {url} within {}s", timeout.as_secs()))?
}

async fn read_first_event(url: &str) -> Result<String> {
    let response = reqwest::Client::new()
        .get(url)
        .header("Accept", "text/event-stream")
        .send()
        .await
        .with_context(|| format!("failed to connect to {url}"))?;
    if !response.status().is_success() {
        bail!("{url} responded with {}", response.status());
    }

    let mut stream = response.bytes_stream();
    let mut received = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("failed to read SSE stream")?;
        received.push_str(&String::from_utf8_lossy(&chunk));
        if let Some(end) = received.find("\n\n") {
            received.truncate(end + 2);
            return Ok(received);
        }
    }
    bail!("stream from {url} closed before the first event")
}
