//! Scheduler layer for the poller
//!
//! This layer drives the fixed-interval polling loop: each tick reads one
//! batch of events through the reader and forwards it into the delivery
//! channel. A failed tick is logged and skipped, never fatal.

pub mod poller;

pub use poller::EventPoller;
