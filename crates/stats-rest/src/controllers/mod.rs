//! REST API controllers.

pub mod health_controller;
pub mod info_controller;

pub use health_controller::*;
pub use info_controller::*;
