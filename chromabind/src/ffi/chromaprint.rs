//! Chromaprint native function table
//!
//! The binding never calls libchromaprint symbols directly. Every native call
//! goes through a [`NativeApi`] table of C function pointers, which is either
//! linked against the system library (`chromaprint` feature) or supplied by
//! the embedding runtime.
//!
//! # Safety
//! Function pointers in a table must follow the libchromaprint C ABI and
//! contracts: `new` returns an owned context or null, `free` releases it,
//! and buffers handed out by `get_fingerprint`/`get_raw_fingerprint` are
//! released with `dealloc`.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};

/// Opaque `ChromaprintContext *`
pub type ContextPtr = *mut c_void;

pub const CHROMAPRINT_ALGORITHM_TEST1: c_int = 0;
pub const CHROMAPRINT_ALGORITHM_TEST2: c_int = 1;
pub const CHROMAPRINT_ALGORITHM_TEST3: c_int = 2;
pub const CHROMAPRINT_ALGORITHM_TEST4: c_int = 3;
pub const CHROMAPRINT_ALGORITHM_DEFAULT: c_int = CHROMAPRINT_ALGORITHM_TEST2;

// ============================================================================
// Function Table
// ============================================================================

/// Fixed C-style function table of the native library
#[derive(Debug, Clone, Copy)]
pub struct NativeApi {
    pub new: unsafe extern "C" fn(algorithm: c_int) -> ContextPtr,
    pub free: unsafe extern "C" fn(ctx: ContextPtr),
    pub get_algorithm: unsafe extern "C" fn(ctx: ContextPtr) -> c_int,
    pub start:
        unsafe extern "C" fn(ctx: ContextPtr, sample_rate: c_int, num_channels: c_int) -> c_int,
    pub feed: unsafe extern "C" fn(ctx: ContextPtr, data: *const i16, size: c_int) -> c_int,
    pub finish: unsafe extern "C" fn(ctx: ContextPtr) -> c_int,
    pub get_fingerprint:
        unsafe extern "C" fn(ctx: ContextPtr, fingerprint: *mut *mut c_char) -> c_int,
    pub get_raw_fingerprint: unsafe extern "C" fn(
        ctx: ContextPtr,
        fingerprint: *mut *mut u32,
        size: *mut c_int,
    ) -> c_int,
    pub dealloc: unsafe extern "C" fn(ptr: *mut c_void),
    pub get_version: unsafe extern "C" fn() -> *const c_char,
}

impl NativeApi {
    /// Native library version string (e.g. "1.5.1")
    pub fn version(&self) -> String {
        unsafe {
            let c_version = (self.get_version)();
            if c_version.is_null() {
                return String::new();
            }
            CStr::from_ptr(c_version).to_string_lossy().into_owned()
        }
    }
}

// ============================================================================
// System Library Bindings
// ============================================================================

#[cfg(feature = "chromaprint")]
mod linked {
    use super::*;

    #[link(name = "chromaprint")]
    extern "C" {
        pub fn chromaprint_new(algorithm: c_int) -> ContextPtr;
        pub fn chromaprint_free(ctx: ContextPtr);
        pub fn chromaprint_get_algorithm(ctx: ContextPtr) -> c_int;
        pub fn chromaprint_start(ctx: ContextPtr, sample_rate: c_int, num_channels: c_int)
            -> c_int;
        pub fn chromaprint_feed(ctx: ContextPtr, data: *const i16, size: c_int) -> c_int;
        pub fn chromaprint_finish(ctx: ContextPtr) -> c_int;
        pub fn chromaprint_get_fingerprint(ctx: ContextPtr, fingerprint: *mut *mut c_char)
            -> c_int;
        pub fn chromaprint_get_raw_fingerprint(
            ctx: ContextPtr,
            fingerprint: *mut *mut u32,
            size: *mut c_int,
        ) -> c_int;
        pub fn chromaprint_dealloc(ptr: *mut c_void);
        pub fn chromaprint_get_version() -> *const c_char;
    }
}

#[cfg(feature = "chromaprint")]
impl NativeApi {
    /// Function table backed by the system libchromaprint
    pub fn chromaprint() -> Self {
        Self {
            new: linked::chromaprint_new,
            free: linked::chromaprint_free,
            get_algorithm: linked::chromaprint_get_algorithm,
            start: linked::chromaprint_start,
            feed: linked::chromaprint_feed,
            finish: linked::chromaprint_finish,
            get_fingerprint: linked::chromaprint_get_fingerprint,
            get_raw_fingerprint: linked::chromaprint_get_raw_fingerprint,
            dealloc: linked::chromaprint_dealloc,
            get_version: linked::chromaprint_get_version,
        }
    }
}
