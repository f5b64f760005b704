//! Trawl Core
//!
//! Core types and abstractions for the Trawl event poller.
//!
//! This crate contains:
//! - Domain types: endpoint descriptors, search parameters, and event records
//!
//! These types are shared between the client crate (session acquisition) and
//! the poller binary (scheduling and delivery).

pub mod domain;
