//! Stdio transport: newline-delimited JSON-RPC.
//!
//! The process is one connection and therefore one session. Each input line
//! is an envelope or a batch; each response is written as one line. Logs go
//! to stderr so stdout only ever carries protocol frames.

use super::dispatcher::Dispatcher;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

/// Serves stdin/stdout until EOF.
pub async fn run(dispatcher: &Dispatcher) -> std::io::Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(dispatcher, stdin, stdout).await
}

/// Serves one connection over any line reader / writer pair.
pub async fn serve<R, W>(dispatcher: &Dispatcher, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let connection_id = Uuid::new_v4().to_string();
    let mut lines = reader.lines();

    tracing::info!(session = %connection_id, "Stdio transport ready");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let outcome = dispatcher.handle(Some(&connection_id), line.as_bytes()).await;
        if let Some(body) = outcome.body {
            let mut frame = serde_json::to_vec(&body)?;
            frame.push(b'\n');
            writer.write_all(&frame).await?;
            writer.flush().await?;
        }
    }

    dispatcher.end_session(&connection_id);
    tracing::info!(session = %connection_id, "Stdin closed, stdio transport stopped");
    Ok(())
}
