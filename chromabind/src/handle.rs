//! Opaque native context handle and its integer encoding
//!
//! The managed runtime stores integers, not addresses. [`NativeHandle`] is the
//! only place a raw context address exists; it crosses into attributes only
//! as an [`EncodedHandle`] produced by the checked `encode`/`decode` pair.

use crate::ffi::ContextPtr;
use std::os::raw::c_void;
use std::ptr::NonNull;
use thiserror::Error;

/// Non-null address of a native context. Never dereferenced by this crate.
///
/// Wrapping `NonNull` keeps the handle (and anything owning it) `!Send` and
/// `!Sync`: a native context must be used by one caller at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(NonNull<c_void>);

/// Managed-runtime integer representation of a [`NativeHandle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedHandle(i64);

/// Address that cannot be represented as a managed integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("native address {address:#x} does not fit in a managed integer")]
pub struct EncodeError {
    pub address: usize,
}

/// Integer that does not describe a live native address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("encoded handle is zero")]
    Null,

    #[error("encoded handle {0} is negative")]
    Negative(i64),

    #[error("encoded handle {0} exceeds the platform pointer width")]
    TooWide(i64),
}

impl NativeHandle {
    /// Wrap a pointer returned by the native constructor; `None` for null
    pub fn from_raw(ptr: ContextPtr) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    pub fn as_ptr(self) -> ContextPtr {
        self.0.as_ptr()
    }

    /// Encode as a managed integer, failing instead of truncating.
    pub fn encode(self) -> Result<EncodedHandle, EncodeError> {
        let address = self.0.as_ptr() as usize;
        let encoded = i64::try_from(address)
            .map(EncodedHandle)
            .map_err(|_| EncodeError { address })?;

        match encoded.decode() {
            Ok(decoded) if decoded == self => Ok(encoded),
            _ => Err(EncodeError { address }),
        }
    }
}

impl EncodedHandle {
    pub fn from_i64(value: i64) -> Self {
        Self(value)
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }

    /// Recover the native address. Zero and negative values are rejected.
    pub fn decode(self) -> Result<NativeHandle, DecodeError> {
        if self.0 == 0 {
            return Err(DecodeError::Null);
        }
        if self.0 < 0 {
            return Err(DecodeError::Negative(self.0));
        }

        let address = usize::try_from(self.0).map_err(|_| DecodeError::TooWide(self.0))?;
        NativeHandle::from_raw(address as *mut c_void).ok_or(DecodeError::Null)
    }
}
