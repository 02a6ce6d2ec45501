//! Utilities Module
//!
//! Configuration and structured logging shared across the crate.

pub mod config;
pub mod logging;

pub use config::CoreConfig;
pub use logging::{disable_debug, enable_debug, is_debug_enabled};
