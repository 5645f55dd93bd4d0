//! # Stats Server Library
//!
//! Process wiring for the readme-stats server: listener, cache manager,
//! router and the shutdown coordinator that ties their lifecycles together.

pub mod app;
pub mod shutdown;
pub mod startup;

pub use app::{run, serve};
pub use shutdown::{shutdown_signal, ShutdownCoordinator, ShutdownOutcome, ShutdownState};
