//! chromabind - libchromaprint context handles for managed-object runtimes
//!
//! A managed runtime stores plain values in per-object attribute mappings and
//! cannot hold raw addresses. This crate creates the native context, stores
//! its address as an integer attribute under a reserved name, and recovers
//! the same address for every later native call on that object.
//!
//! ```rust,ignore
//! use chromabind::{HandleBinder, NativeApi, Options};
//!
//! let binder = HandleBinder::new(NativeApi::chromaprint());
//! let mut fp = binder.construct(&Options::new().with("algorithm", "test3"))?;
//! let fingerprint = fp.generate_fingerprint(&samples, 44100, 1)?;
//! ```

pub mod algorithm;
pub mod attributes;
pub mod binder;
pub mod error;
pub mod ffi;
pub mod fingerprinter;
pub mod handle;
pub mod resolver;
pub mod value;

// Links libchromaprint for the `NativeApi::chromaprint` table
#[cfg(feature = "chromaprint")]
use chromaprint_sys_next as _;

pub use crate::algorithm::Algorithm;
pub use crate::attributes::{AttributeMap, AttributeStore};
pub use crate::binder::{retrieve_handle, HandleBinder};
pub use crate::error::{BindError, BindResult};
pub use crate::ffi::NativeApi;
pub use crate::fingerprinter::Fingerprinter;
pub use crate::handle::{EncodedHandle, NativeHandle};
pub use crate::resolver::{resolve, ConfigWarning, Resolution};
pub use crate::value::{Options, Value};
