//! Managed fingerprinting object
//!
//! A [`Fingerprinter`] owns one native context and the attribute mapping that
//! carries its encoded address. Every native call re-reads the reserved
//! attribute through [`retrieve_handle`], so a corrupted or removed attribute
//! fails the operation instead of reaching the library.
//!
//! # Thread safety
//! **NOT thread-safe.** `Fingerprinter` is `!Send` and `!Sync`; each native
//! context is used by one caller at a time.
//!
//! # Release
//! The native context is freed by [`Fingerprinter::close`] or on drop. Drop
//! frees the context this object created, never an address read from a
//! tampered attribute.

use crate::algorithm::Algorithm;
use crate::attributes::{AttributeMap, AttributeStore};
use crate::binder::{malformed, retrieve_handle};
use crate::error::{BindError, BindResult};
use crate::ffi::NativeApi;
use crate::handle::NativeHandle;
use crate::resolver::ALGORITHM_KEY;
use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};
use tracing::{debug, warn};

/// Object handed to the managed runtime
pub struct Fingerprinter<S: AttributeStore = AttributeMap> {
    attributes: S,
    api: NativeApi,
    handle_attribute: String,
    /// Context created for this object; `None` once released
    context: Option<NativeHandle>,
}

impl<S: AttributeStore> Fingerprinter<S> {
    pub(crate) fn new(
        attributes: S,
        api: NativeApi,
        handle_attribute: String,
        context: NativeHandle,
    ) -> Self {
        Self {
            attributes,
            api,
            handle_attribute,
            context: Some(context),
        }
    }

    pub fn attributes(&self) -> &S {
        &self.attributes
    }

    /// Mutable access for the managed runtime. Changing the reserved
    /// attribute makes later native operations fail.
    pub fn attributes_mut(&mut self) -> &mut S {
        &mut self.attributes
    }

    pub fn handle_attribute(&self) -> &str {
        &self.handle_attribute
    }

    /// Canonical algorithm stored at construction
    pub fn algorithm(&self) -> Option<Algorithm> {
        self.attributes.get(ALGORITHM_KEY)?.as_algorithm()
    }

    /// Whether the native context has been released
    pub fn is_closed(&self) -> bool {
        self.context.is_none()
    }

    /// Recover the native handle from the reserved attribute
    pub fn handle(&self) -> BindResult<NativeHandle> {
        let decoded = retrieve_handle(&self.attributes, &self.handle_attribute)?;

        match self.context {
            Some(owned) if owned == decoded => Ok(decoded),
            Some(_) => Err(malformed(
                &self.handle_attribute,
                "does not match the context owned by this object",
            )),
            None => Err(malformed(&self.handle_attribute, "context already released")),
        }
    }

    /// Algorithm code reported by the native context
    pub fn native_algorithm(&self) -> BindResult<c_int> {
        let handle = self.handle()?;
        Ok(unsafe { (self.api.get_algorithm)(handle.as_ptr()) })
    }

    /// Native library version string
    pub fn version(&self) -> String {
        self.api.version()
    }

    /// Begin a fingerprinting session
    pub fn start(&mut self, sample_rate: u32, num_channels: u8) -> BindResult<()> {
        validate_parameters(sample_rate, num_channels)?;
        let handle = self.handle()?;

        let result = unsafe {
            (self.api.start)(
                handle.as_ptr(),
                sample_rate as c_int,
                num_channels as c_int,
            )
        };

        if result == 0 {
            Err(BindError::StartFailed)
        } else {
            Ok(())
        }
    }

    /// Feed interleaved 16-bit PCM samples
    pub fn feed(&mut self, samples: &[i16]) -> BindResult<()> {
        let size =
            c_int::try_from(samples.len()).map_err(|_| BindError::BufferTooLarge(samples.len()))?;
        let handle = self.handle()?;

        let result = unsafe { (self.api.feed)(handle.as_ptr(), samples.as_ptr(), size) };

        if result == 0 {
            Err(BindError::FeedFailed)
        } else {
            Ok(())
        }
    }

    /// Flush buffered audio and compute the fingerprint
    pub fn finish(&mut self) -> BindResult<()> {
        let handle = self.handle()?;
        let result = unsafe { (self.api.finish)(handle.as_ptr()) };

        if result == 0 {
            Err(BindError::FinishFailed)
        } else {
            Ok(())
        }
    }

    /// Compressed, base64-encoded fingerprint (AcoustID format)
    pub fn fingerprint(&self) -> BindResult<String> {
        let handle = self.handle()?;
        let mut c_fingerprint: *mut c_char = std::ptr::null_mut();

        let result = unsafe { (self.api.get_fingerprint)(handle.as_ptr(), &mut c_fingerprint) };

        if result == 0 || c_fingerprint.is_null() {
            return Err(BindError::FingerprintFailed);
        }

        let fingerprint = unsafe { CStr::from_ptr(c_fingerprint) }
            .to_string_lossy()
            .into_owned();

        unsafe { (self.api.dealloc)(c_fingerprint as *mut c_void) };

        Ok(fingerprint)
    }

    /// Uncompressed fingerprint words
    pub fn raw_fingerprint(&self) -> BindResult<Vec<u32>> {
        let handle = self.handle()?;
        let mut c_raw: *mut u32 = std::ptr::null_mut();
        let mut size: c_int = 0;

        let result =
            unsafe { (self.api.get_raw_fingerprint)(handle.as_ptr(), &mut c_raw, &mut size) };

        if result == 0 || c_raw.is_null() {
            return Err(BindError::FingerprintFailed);
        }

        let words = match usize::try_from(size) {
            Ok(len) => Ok(unsafe { std::slice::from_raw_parts(c_raw, len) }.to_vec()),
            Err(_) => Err(BindError::FingerprintFailed),
        };

        unsafe { (self.api.dealloc)(c_raw as *mut c_void) };

        words
    }

    /// Start, feed, finish and read the fingerprint for f32 samples in [-1.0, 1.0]
    pub fn generate_fingerprint(
        &mut self,
        samples: &[f32],
        sample_rate: u32,
        num_channels: u8,
    ) -> BindResult<String> {
        self.start(sample_rate, num_channels)?;
        let pcm_samples = convert_f32_to_i16(samples);
        self.feed(&pcm_samples)?;
        self.finish()?;
        let fingerprint = self.fingerprint()?;

        debug!(
            fingerprint_length = fingerprint.len(),
            sample_count = samples.len(),
            sample_rate,
            channels = num_channels,
            "Fingerprint generated"
        );

        Ok(fingerprint)
    }

    /// Free the native context and remove the reserved attribute.
    ///
    /// Goes through the retrieval contract: a missing or corrupted attribute
    /// is reported and the context stays alive until drop.
    pub fn close(&mut self) -> BindResult<()> {
        let handle = self.handle()?;
        self.release(handle);
        self.attributes.remove(&self.handle_attribute);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Private Helper Methods
    // ------------------------------------------------------------------------

    fn release(&mut self, handle: NativeHandle) {
        unsafe { (self.api.free)(handle.as_ptr()) };
        self.context = None;
        debug!("Native context released");
    }
}

impl<S: AttributeStore> Drop for Fingerprinter<S> {
    fn drop(&mut self) {
        let Some(owned) = self.context else {
            return;
        };

        if let Err(e) = self.handle() {
            warn!(error = %e, "Releasing native context of an object with a corrupted handle");
        }

        self.release(owned);
    }
}

// ============================================================================
// Parameter Validation and Audio Format Conversion
// ============================================================================

fn validate_parameters(sample_rate: u32, num_channels: u8) -> BindResult<()> {
    // Chromaprint supports 8kHz - 192kHz
    if !(8000..=192000).contains(&sample_rate) {
        return Err(BindError::InvalidSampleRate(sample_rate));
    }

    if !(1..=2).contains(&num_channels) {
        return Err(BindError::InvalidChannelCount(num_channels));
    }

    Ok(())
}

/// Convert f32 samples [-1.0, 1.0] to i16 PCM, clamping out-of-range input
fn convert_f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&sample| {
            let scaled = sample * 32767.0;
            scaled.clamp(-32768.0, 32767.0) as i16
        })
        .collect()
}
