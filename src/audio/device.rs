// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Output device abstraction.
//!
//! The player only talks to these traits, so the device lifecycle can be
//! driven against cpal in production and against fakes in tests.

use std::fmt;

use super::{AudioError, SampleBuffer};

/// Lifecycle state of the shared output device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// No device has been opened yet
    Uninitialized,
    /// Stream is live
    Running,
    /// Stream is paused and may be resumed
    Suspended,
    /// Device was closed; must be recreated
    Closed,
    /// Backend reported an error; must be recreated
    Failed,
}

impl DeviceState {
    /// Whether the device has to be replaced rather than resumed
    pub fn needs_recreate(self) -> bool {
        matches!(
            self,
            DeviceState::Uninitialized | DeviceState::Closed | DeviceState::Failed
        )
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceState::Uninitialized => "uninitialized",
            DeviceState::Running => "running",
            DeviceState::Suspended => "suspended",
            DeviceState::Closed => "closed",
            DeviceState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A live playback device holding at most one current source
pub trait OutputDevice {
    /// Current lifecycle state
    fn state(&self) -> DeviceState;

    /// Rate the device renders at
    fn sample_rate(&self) -> u32;

    /// Bring a suspended device back to running
    fn resume(&mut self) -> Result<(), AudioError>;

    /// Pause rendering without releasing the device
    fn suspend(&mut self) -> Result<(), AudioError>;

    /// Start playing `buffer`, replacing whatever is currently playing
    fn start(&mut self, buffer: SampleBuffer) -> Result<(), AudioError>;

    /// Stop the current source, if any
    fn stop(&mut self);

    /// Whether a source is still rendering
    fn is_playing(&self) -> bool;

    /// Release the device; the handle is unusable afterwards
    fn close(&mut self);
}

/// Opens fresh output devices
pub trait DeviceFactory {
    /// Open a new device, ready to play
    fn create(&self) -> Result<Box<dyn OutputDevice>, AudioError>;
}
