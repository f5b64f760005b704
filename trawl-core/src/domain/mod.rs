//! Core domain types
//!
//! This module contains the domain structures used across Trawl crates.
//! Endpoint descriptors identify candidate search-head servers, search
//! parameters describe the query the poller runs each cycle, and events
//! are the records that flow downstream.

pub mod endpoint;
pub mod event;
pub mod search;
