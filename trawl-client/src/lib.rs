//! Trawl Client
//!
//! Session acquisition for the Trawl event poller.
//!
//! This crate owns the connection layer between the polling loop and the
//! remote search head: an ordered pool of candidate endpoints, a cache of
//! authenticated sessions, optional liveness probing before reuse, bounded
//! connection attempts, and failover across the pool.
//!
//! # Example
//!
//! ```no_run
//! use trawl_client::{HttpConnector, SessionBroker};
//! use trawl_core::domain::endpoint::EndpointDescriptor;
//! use trawl_core::domain::search::SearchQuery;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = vec![
//!         EndpointDescriptor::new("search-1.example.com", 8089, "admin", "changeme")
//!             .with_timeout_millis(5000),
//!         EndpointDescriptor::new("search-2.example.com", 8089, "admin", "changeme")
//!             .with_timeout_millis(5000),
//!     ];
//!     let broker = SessionBroker::new(HttpConnector::new(), pool);
//!
//!     let session = broker.acquire_session().await?;
//!     let events = session
//!         .search(&SearchQuery::new("index=main error"), true)
//!         .await?;
//!     println!("got {} events", events.len());
//!     Ok(())
//! }
//! ```

pub mod error;

mod broker;
mod connector;
mod session;

// Re-export commonly used types
pub use broker::SessionBroker;
pub use connector::{Connector, HttpConnector};
pub use error::{AcquireError, ConnectError, SearchError};
pub use session::SearchSession;
