//! Handle binder
//!
//! Creates the native context for a resolved option set, stores its encoded
//! address under the reserved attribute, and implements the retrieval
//! contract every later operation goes through.
//!
//! Attribute write order on construction:
//! 1. configured defaults
//! 2. caller options (overwriting defaults)
//! 3. canonical `algorithm` value
//! 4. encoded handle under the reserved name

use crate::algorithm::Algorithm;
use crate::attributes::{AttributeMap, AttributeStore};
use crate::error::{BindError, BindResult};
use crate::ffi::NativeApi;
use crate::fingerprinter::Fingerprinter;
use crate::handle::{EncodedHandle, NativeHandle};
use crate::resolver::{resolve, ALGORITHM_KEY};
use crate::value::{Options, Value};
use chromabind_common::config::{validate_reserved_name, BindingConfig, DEFAULT_HANDLE_ATTRIBUTE};
use tracing::{debug, info, warn};

/// Builds managed objects bound to fresh native contexts
#[derive(Debug, Clone)]
pub struct HandleBinder {
    api: NativeApi,
    handle_attribute: String,
    defaults: Options,
}

impl HandleBinder {
    /// Binder with the default reserved attribute and no default attributes
    pub fn new(api: NativeApi) -> Self {
        Self {
            api,
            handle_attribute: DEFAULT_HANDLE_ATTRIBUTE.to_string(),
            defaults: Options::new(),
        }
    }

    /// Binder configured from the `[binding]` config section
    pub fn from_config(api: NativeApi, config: &BindingConfig) -> BindResult<Self> {
        validate_reserved_name(&config.handle_attribute)?;

        let defaults = config
            .defaults
            .iter()
            .filter(|(key, _)| key.as_str() != ALGORITHM_KEY && **key != config.handle_attribute)
            .map(|(key, value)| (key.clone(), Value::from(value.clone())))
            .collect();

        Ok(Self {
            api,
            handle_attribute: config.handle_attribute.clone(),
            defaults,
        })
    }

    /// Store the encoded handle under `name` (must start with `_`)
    pub fn with_handle_attribute(mut self, name: impl Into<String>) -> BindResult<Self> {
        let name = name.into();
        validate_reserved_name(&name)?;
        self.handle_attribute = name;
        Ok(self)
    }

    /// Attribute written to every new object before caller options
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(key, value);
        self
    }

    pub fn handle_attribute(&self) -> &str {
        &self.handle_attribute
    }

    pub fn api(&self) -> &NativeApi {
        &self.api
    }

    /// Construct an object backed by a fresh [`AttributeMap`]
    pub fn construct(&self, options: &Options) -> BindResult<Fingerprinter> {
        self.construct_in(AttributeMap::new(), options)
    }

    /// Construct an object whose attributes live in `store`.
    ///
    /// `store` is only written once the native context exists and its
    /// address has been encoded; on error it is dropped untouched.
    pub fn construct_in<S: AttributeStore>(
        &self,
        mut store: S,
        options: &Options,
    ) -> BindResult<Fingerprinter<S>> {
        let resolution = resolve(options);
        let (handle, encoded) = self.create_context(resolution.algorithm)?;

        for (key, value) in &self.defaults {
            store.set(key, value.clone());
        }

        for (key, value) in resolution.attributes {
            if key == self.handle_attribute {
                warn!(
                    attribute = %key,
                    "Option collides with the reserved handle attribute, ignored"
                );
                continue;
            }
            store.set(&key, value);
        }

        store.set(ALGORITHM_KEY, Value::Algorithm(resolution.algorithm));
        store.set(&self.handle_attribute, Value::Integer(encoded.as_i64()));

        info!(
            algorithm = %resolution.algorithm,
            warnings = resolution.warnings.len(),
            "Native context bound"
        );

        Ok(Fingerprinter::new(
            store,
            self.api,
            self.handle_attribute.clone(),
            handle,
        ))
    }

    fn create_context(&self, algorithm: Algorithm) -> BindResult<(NativeHandle, EncodedHandle)> {
        let ptr = unsafe { (self.api.new)(algorithm.native_code()) };

        let Some(handle) = NativeHandle::from_raw(ptr) else {
            warn!(algorithm = %algorithm, "Native constructor returned null");
            return Err(BindError::ConstructionFailed { algorithm });
        };

        match handle.encode() {
            Ok(encoded) => {
                debug!(algorithm = %algorithm, "Native context created");
                Ok((handle, encoded))
            }
            Err(e) => {
                unsafe { (self.api.free)(handle.as_ptr()) };
                warn!(error = %e, "Native context released: address not encodable");
                Err(BindError::HandleOutOfRange { address: e.address })
            }
        }
    }
}

/// Read the reserved attribute from `store` and decode it.
///
/// Fails on a missing attribute or a value that is not a positive integer
/// within the platform pointer width; never substitutes a null handle.
pub fn retrieve_handle<S: AttributeStore + ?Sized>(
    store: &S,
    attribute: &str,
) -> BindResult<NativeHandle> {
    let value = store
        .get(attribute)
        .ok_or_else(|| BindError::HandleMissing {
            attribute: attribute.to_string(),
        })?;

    let Value::Integer(raw) = value else {
        return Err(malformed(attribute, format!("expected integer, found {}", value)));
    };

    EncodedHandle::from_i64(*raw)
        .decode()
        .map_err(|e| malformed(attribute, e.to_string()))
}

pub(crate) fn malformed(attribute: &str, reason: impl Into<String>) -> BindError {
    BindError::HandleMalformed {
        attribute: attribute.to_string(),
        reason: reason.into(),
    }
}
