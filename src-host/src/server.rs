//! Stdio request loop: one JSON message per line in, one reply per line out.

use deskrelay_core::{Bridge, Inbound};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, warn};

/// Serve requests until `reader` reaches EOF.
///
/// Requests are handled one at a time in arrival order; host calls block, so
/// each runs on the blocking pool. A handler that panics does not end the loop.
pub async fn serve<R, W>(bridge: Arc<Bridge>, reader: R, writer: &mut W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let inbound = match Inbound::parse(line) {
            Ok(inbound) => inbound,
            Err(e) => {
                warn!("Dropping message: {}", e);
                continue;
            }
        };
        debug!(channel = %inbound.channel, id = ?inbound.id, "Received message");

        let channel = inbound.channel.clone();
        let id = inbound.id;
        let handler = bridge.clone();
        let reply = match tokio::task::spawn_blocking(move || handler.handle(inbound)).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(channel = %channel, id = ?id, "Handler aborted: {}", e);
                bridge.handler_fault(&channel, id, format!("handler aborted: {e}"))
            }
        };

        if let Some(reply) = reply {
            let mut out = serde_json::to_string(&reply)?;
            out.push('\n');
            writer.write_all(out.as_bytes()).await?;
            writer.flush().await?;
        }
    }
    Ok(())
}
