//! # Stats Core
//!
//! Core error types, result aliases, and tracing setup shared by every crate
//! of the readme-stats server.

pub mod error;
pub mod result;
pub mod telemetry;

pub use error::*;
pub use result::*;
pub use telemetry::*;
