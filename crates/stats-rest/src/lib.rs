//! # Stats REST
//!
//! HTTP surface of the readme-stats server, built on Axum.
//! Provides liveness and readiness probes, a service info endpoint and the
//! OpenAPI document. Card-rendering routes are mounted by collaborators on
//! top of the router returned by [`create_router`].

pub mod controllers;
pub mod middleware;
pub mod openapi;
pub mod probes;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
