//! # chromabind common library
//!
//! Shared code for the chromabind crates:
//! - Error type
//! - TOML configuration loading
//! - Tracing initialization

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
