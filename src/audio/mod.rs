// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio engine for the dice game.
//!
//! This module provides:
//! - Clip loading and decoding (one short word clip per face)
//! - Silence trimming and back-to-back concatenation
//! - Output device abstraction with a cpal implementation
//! - The sequenced player and its device lifecycle handling

pub mod buffer;
pub mod clips;
pub mod decode;
pub mod device;
pub mod output;
pub mod player;

pub use buffer::{combine, trim_silence, SampleBuffer, SILENCE_THRESHOLD};
pub use clips::{load_clips, ClipKey, ClipSource};
pub use device::{DeviceFactory, DeviceState, OutputDevice};
pub use output::{AudioOutput, CpalDeviceFactory, OutputConfig};
pub use player::{SequencedPlayer, DEGRADED_RETRY, STALE_INTERACTION};

use std::path::PathBuf;

use thiserror::Error;

/// Audio error types
#[derive(Debug, Error)]
pub enum AudioError {
    /// Clip file could not be read
    #[error("Failed to read clip {path:?}: {source}")]
    ClipRead {
        /// Clip location
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// Clip bytes could not be decoded
    #[error("Failed to decode clip: {0}")]
    Decode(String),
    /// Clip could not be converted to the device rate
    #[error("Resampling from {from} Hz to {to} Hz failed: {reason}")]
    Resample {
        /// Source rate
        from: u32,
        /// Target rate
        to: u32,
        /// Resampler message
        reason: String,
    },
    /// No audio device available
    #[error("No audio device available")]
    NoDevice,
    /// Failed to initialize audio
    #[error("Audio initialization failed: {0}")]
    InitFailed(String),
    /// Failed to build, start or pause the stream
    #[error("Audio stream failed: {0}")]
    StreamFailed(String),
    /// Device is not in a usable state
    #[error("Audio device is {0}")]
    Unavailable(DeviceState),
}
