//! Error types for chromabind
//!
//! Construction failures and handle corruption are returned to the immediate
//! caller. Configuration problems with the `algorithm` option are warnings
//! (see [`crate::resolver`]) and never reach this type.

use crate::algorithm::Algorithm;
use thiserror::Error;

/// Binding error
#[derive(Debug, Error)]
pub enum BindError {
    /// Native constructor returned null; no object was created
    #[error("Failed to create native context for algorithm {algorithm}")]
    ConstructionFailed { algorithm: Algorithm },

    /// Native address cannot be stored without truncation; no object was created
    #[error("Native address {address:#x} does not fit in a managed integer")]
    HandleOutOfRange { address: usize },

    /// Reserved handle attribute is absent
    #[error("Invalid object: handle attribute {attribute:?} is missing")]
    HandleMissing { attribute: String },

    /// Reserved handle attribute does not decode to this object's context
    #[error("Invalid object: handle attribute {attribute:?} is malformed ({reason})")]
    HandleMalformed { attribute: String, reason: String },

    /// Sample rate outside valid range (8000-192000 Hz)
    #[error("Invalid sample rate: {0} Hz (must be 8000-192000 Hz)")]
    InvalidSampleRate(u32),

    /// Channel count not supported (must be 1 or 2)
    #[error("Invalid channel count: {0} (must be 1 or 2)")]
    InvalidChannelCount(u8),

    /// Sample buffer longer than the native size argument can express
    #[error("Sample buffer too large: {0} samples")]
    BufferTooLarge(usize),

    #[error("Failed to start fingerprinting")]
    StartFailed,

    #[error("Failed to feed audio data")]
    FeedFailed,

    #[error("Failed to finish fingerprinting")]
    FinishFailed,

    #[error("Failed to generate fingerprint")]
    FingerprintFailed,

    /// chromabind-common error (configuration, I/O)
    #[error("Common error: {0}")]
    Common(#[from] chromabind_common::Error),
}

/// Result type for binding operations
pub type BindResult<T> = std::result::Result<T, BindError>;
