//! Error types for session acquisition and search execution

use std::time::Duration;
use thiserror::Error;
use trawl_core::domain::endpoint::EndpointDescriptor;

/// Failure of a single connection attempt to one endpoint
///
/// Every variant is non-fatal to the broker: it affects one descriptor for
/// one acquisition call, after which the broker moves on to the next
/// candidate in the pool.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The transport could not reach the server
    #[error("connection refused: {0}")]
    Refused(String),

    /// The server rejected the supplied credentials
    #[error("authentication failed (status {status})")]
    AuthenticationFailed {
        /// HTTP status returned by the login endpoint
        status: u16,
    },

    /// The attempt did not resolve within the descriptor's deadline
    #[error("connection attempt timed out after {after:?}")]
    Timeout {
        /// Deadline that expired
        after: Duration,
    },

    /// The attempt task was cancelled or panicked while being awaited
    #[error("connection attempt was interrupted")]
    Interrupted,
}

/// Terminal failure of one `acquire_session` call
#[derive(Debug, Error)]
pub enum AcquireError {
    /// Every candidate endpoint in the pool failed
    #[error("could not connect to any of the configured servers [{}]", format_endpoints(.attempted))]
    NoServerReachable {
        /// Endpoints attempted, in pool order
        attempted: Vec<EndpointDescriptor>,
    },
}

fn format_endpoints(endpoints: &[EndpointDescriptor]) -> String {
    endpoints
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure of a search request executed over an established session
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP request failed
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("search head returned status {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error body from the server
        message: String,
    },

    /// Result payload could not be parsed
    #[error("failed to parse search results: {0}")]
    Parse(String),
}
