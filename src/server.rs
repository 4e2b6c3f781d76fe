use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::watch;

use crate::handlers::Dispatcher;
use crate::protocol::{JsonRpcError, JsonRpcResponse};

/// Maximum bytes per JSON-RPC message (1 MiB).
const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to read from stdin: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to write response: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Requests the transport loop to stop.
#[derive(Debug)]
pub struct ShutdownTrigger(watch::Sender<bool>);

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.0.send_replace(true);
    }
}

/// Observed by the transport loop between and during reads.
#[derive(Debug, Clone)]
pub struct ShutdownSignal(watch::Receiver<bool>);

impl ShutdownSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self(rx)
    }

    pub fn is_triggered(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once shutdown was requested. Pends forever if the trigger is
    /// dropped without firing.
    pub async fn triggered(&mut self) {
        while !*self.0.borrow_and_update() {
            if self.0.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger(tx), ShutdownSignal(rx))
}

/// MCP server that communicates over stdio using newline-delimited JSON-RPC 2.0.
///
/// One request is handled to completion before the next line is read, so
/// responses come out in request order.
pub struct McpServer {
    dispatcher: Dispatcher,
    shutdown: ShutdownSignal,
}

impl McpServer {
    pub fn new(dispatcher: Dispatcher, shutdown: ShutdownSignal) -> Self {
        Self { dispatcher, shutdown }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Serve the process's stdin/stdout until EOF or shutdown.
    pub async fn run(&self) -> Result<(), ServerError> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve any line-oriented reader/writer pair until EOF or shutdown.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut shutdown = self.shutdown.clone();
        let mut raw = Vec::new();

        loop {
            if shutdown.is_triggered() {
                tracing::info!("shutdown requested, stopping");
                return Ok(());
            }

            raw.clear();
            let n = tokio::select! {
                biased;
                _ = shutdown.triggered() => {
                    tracing::info!("shutdown requested while waiting for input, stopping");
                    return Ok(());
                }
                read = reader.read_until(b'\n', &mut raw) => read.map_err(ServerError::Read)?,
            };
            if n == 0 {
                tracing::info!("stdin closed");
                return Ok(());
            }

            if n > MAX_MESSAGE_BYTES {
                tracing::warn!(bytes = n, limit = MAX_MESSAGE_BYTES, "message too large");
                write_response(
                    &mut writer,
                    &JsonRpcResponse::error(None, JsonRpcError::parse_error()),
                )
                .await?;
                continue;
            }

            if raw.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            if let Some(resp) = self.dispatcher.handle_message(&raw).await {
                write_response(&mut writer, &resp).await?;
            }
        }
    }
}

/// Write one response as a single line and flush it.
async fn write_response<W>(writer: &mut W, resp: &JsonRpcResponse) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    let out = match serde_json::to_string(resp) {
        Ok(out) => out,
        Err(e) => {
            tracing::error!(error = %e, "cannot serialize response");
            let fallback = JsonRpcResponse::error(
                resp.id.clone(),
                JsonRpcError::internal_error("Internal error"),
            );
            serde_json::to_string(&fallback)?
        }
    };

    writer.write_all(out.as_bytes()).await.map_err(ServerError::Write)?;
    writer.write_all(b"\n").await.map_err(ServerError::Write)?;
    writer.flush().await.map_err(ServerError::Write)?;
    Ok(())
}
