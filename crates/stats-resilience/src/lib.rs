//! # Stats Resilience
//!
//! Bounded-wait helpers. The server makes a single cache connection attempt
//! per process, so there is no retry or circuit breaking here, only timeouts.

pub mod timeout;

pub use timeout::*;
