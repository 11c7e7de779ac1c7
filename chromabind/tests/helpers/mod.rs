//! Test helper utilities
//!
//! Shared utilities for testing chromabind

#![allow(dead_code)]

pub mod fake_native;
pub mod log_capture;

pub use fake_native::{
    context_id, failing_api, fake_api, free_count, rejecting_api, unencodable_free_count,
};
#[cfg(target_pointer_width = "64")]
pub use fake_native::{unencodable_api, UNENCODABLE_ADDRESS};
pub use log_capture::{capture_logs, LogCapture};

use chromabind::HandleBinder;

/// Binder over the fake native table
pub fn fake_binder() -> HandleBinder {
    HandleBinder::new(fake_api())
}

/// `seconds` of a sine wave at `frequency` Hz, mono f32
pub fn generate_sine_wave(frequency: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * seconds) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}
