//! Core utilities for the scene-graph crates.
//!
//! This crate provides foundational types and utilities used across the workspace:
//! - Error types and result aliases
//! - Logging initialization
//! - Frame timing passed explicitly into updates
//! - Run configuration

mod config;
mod error;
mod logging;
mod timer;

pub use config::RunConfig;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use timer::{FrameTime, Timer};
