//! Line writer shared by the ingestion and processing loops.
//!
//! Every line is written whole under a lock and flushed before the lock is
//! released, so the two loops never interleave partial lines and the peer sees
//! each response without buffering delay.

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::protocol::envelope;
use crate::protocol::types::BridgeResponse;

/// Cloneable handle to the output stream.
#[derive(Debug)]
pub struct ResponseSink<W> {
    inner: Arc<Mutex<W>>,
}

impl<W> Clone for ResponseSink<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W> ResponseSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    /// Write one line followed by `\n`, then flush.
    pub async fn write_line(&self, line: &str) -> io::Result<()> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        let mut writer = self.inner.lock().await;
        writer.write_all(buf.as_bytes()).await?;
        writer.flush().await
    }

    /// Write a response as one JSON line.
    pub async fn send(&self, response: &BridgeResponse) -> io::Result<()> {
        self.write_line(&envelope::to_line(response)).await
    }

    /// Write an error envelope.
    pub async fn send_error(&self, message: impl Into<String>) -> io::Result<()> {
        self.send(&envelope::error(message)).await
    }
}
