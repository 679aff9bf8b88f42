//! Trait abstraction for the command link to enable testing

use async_trait::async_trait;
use std::io;

#[cfg(test)]
use mockall::automock;

/// Trait for command link I/O operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SinkIO: Send {
    /// Write all data to the link
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush the output buffer
    async fn flush(&mut self) -> io::Result<()>;
}

/// Wrapper around tokio_serial::SerialStream that implements SinkIO
pub struct TokioSerialSink {
    port: tokio_serial::SerialStream,
}

impl TokioSerialSink {
    pub fn new(port: tokio_serial::SerialStream) -> Self {
        Self { port }
    }
}

#[async_trait]
impl SinkIO for TokioSerialSink {
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.write_all(data).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.flush().await
    }
}
