//! # Stats Config
//!
//! Configuration management for the readme-stats server.
//! Supports layered configuration from files and environment variables,
//! including the deployment-level `CACHE_HOST`, `CACHE_PORT` and `LISTEN_PORT`.

mod app_config;
mod loader;
pub mod validation;

pub use app_config::*;
pub use loader::*;
