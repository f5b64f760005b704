//! Line-oriented event sink
//!
//! Consumes batches from the delivery channel and writes each event's
//! textual representation as one line, flushing after every batch.

use anyhow::{Context, Result};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::debug;
use trawl_core::domain::event::SearchEvent;

/// Writes events one per line to any async writer
pub struct LineSink<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> LineSink<W> {
    /// Creates a sink over the given writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Drains the channel until every sender is gone
    pub async fn run(&mut self, mut rx: mpsc::Receiver<Vec<SearchEvent>>) -> Result<()> {
        while let Some(batch) = rx.recv().await {
            debug!("Writing batch of {} event(s)", batch.len());
            self.write_batch(&batch).await?;
        }
        Ok(())
    }

    async fn write_batch(&mut self, batch: &[SearchEvent]) -> Result<()> {
        for event in batch {
            self.writer
                .write_all(event.to_string().as_bytes())
                .await
                .context("failed to write event")?;
            self.writer
                .write_all(b"\n")
                .await
                .context("failed to write record separator")?;
        }
        self.writer.flush().await.context("failed to flush sink")?;
        Ok(())
    }
}
