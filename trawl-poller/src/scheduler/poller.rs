//! Event poller
//!
//! Polls the search head on a fixed cadence and forwards each non-empty
//! batch into the delivery channel. Acquisition and search failures only
//! cost the current cycle; the next tick starts a fresh attempt.

use anyhow::Result;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{self, Duration};
use tracing::{debug, error, info};
use trawl_core::domain::event::SearchEvent;

use crate::reader::EventReader;

/// Fixed-interval polling loop over an [`EventReader`]
pub struct EventPoller {
    poll_interval: Duration,
    reader: Arc<dyn EventReader>,
    tx: mpsc::Sender<Vec<SearchEvent>>,
}

impl EventPoller {
    /// Creates a new poller
    pub fn new(
        poll_interval: Duration,
        reader: Arc<dyn EventReader>,
        tx: mpsc::Sender<Vec<SearchEvent>>,
    ) -> Self {
        Self {
            poll_interval,
            reader,
            tx,
        }
    }

    /// Starts the polling loop
    ///
    /// Returns only when the delivery channel is closed on the consuming
    /// side, always as an error; every other failure is logged and the
    /// loop continues.
    pub async fn run(&self) -> Result<Infallible> {
        info!(
            "Starting event poller (interval: {:?})",
            self.poll_interval
        );

        let mut interval = time::interval(self.poll_interval);

        loop {
            interval.tick().await;

            if self.tx.is_closed() {
                anyhow::bail!("delivery channel closed, stopping poller");
            }

            debug!("Polling for new events");

            match self.poll_once().await {
                Ok(0) => debug!("No new events this cycle"),
                Ok(delivered) => info!("Delivered {} event(s) this cycle", delivered),
                Err(e) => error!("Error during poll cycle: {:#}", e),
            }
        }
    }

    /// Performs a single poll cycle, returning the number of events
    /// delivered downstream
    async fn poll_once(&self) -> Result<usize> {
        let events = self.reader.read().await?;

        if events.is_empty() {
            return Ok(0);
        }

        let delivered = events.len();
        self.tx
            .send(events)
            .await
            .map_err(|_| anyhow::anyhow!("delivery channel closed"))?;

        Ok(delivered)
    }
}
