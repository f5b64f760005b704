//! Event reading
//!
//! One read per polling tick: acquire a session from the broker, run the
//! configured search over it, hand the resulting batch back. The reader is
//! trait-based so the scheduler can be tested without a live server.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use trawl_client::{HttpConnector, SessionBroker};
use trawl_core::domain::event::SearchEvent;
use trawl_core::domain::search::SearchQuery;

/// Produces one batch of events per polling tick
#[async_trait]
pub trait EventReader: Send + Sync {
    /// Reads the next batch; an empty batch is a normal quiet cycle
    async fn read(&self) -> Result<Vec<SearchEvent>>;
}

/// Reader backed by the session broker and the configured search
pub struct SearchReader {
    broker: SessionBroker<HttpConnector>,
    query: SearchQuery,
    first_cycle: AtomicBool,
}

impl SearchReader {
    /// Creates a reader over an already-constructed broker
    pub fn new(broker: SessionBroker<HttpConnector>, query: SearchQuery) -> Self {
        Self {
            broker,
            query,
            first_cycle: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl EventReader for SearchReader {
    async fn read(&self) -> Result<Vec<SearchEvent>> {
        // Stays "first" until one cycle actually succeeds, so the initial
        // earliest-time bound is not consumed by a failed tick.
        let first_cycle = self.first_cycle.load(Ordering::SeqCst);

        let session = self
            .broker
            .acquire_session()
            .await
            .context("failed to acquire a session")?;

        let events = session
            .search(&self.query, first_cycle)
            .await
            .context("search request failed")?;

        self.first_cycle.store(false, Ordering::SeqCst);
        Ok(events)
    }
}
