//! FFI bindings for external libraries
//!
//! - **chromaprint**: native function table for the audio fingerprinting library

pub mod chromaprint;

pub use chromaprint::{ContextPtr, NativeApi};
