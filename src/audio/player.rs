// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequenced clip player.
//!
//! Speaks a combination by joining the color, pattern and decoration clips
//! into one buffer and playing it on the shared output device. The device
//! lifecycle is centralised in [`SequencedPlayer::ensure_running`]; host
//! events (focus, visibility, input) are fed in through the `on_*` handlers.
//!
//! Device problems never surface as errors: they are logged, the device is
//! resumed or recreated, and if that fails the player goes quiet.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::buffer::{combine, SampleBuffer};
use super::clips::{load_clips, ClipKey, ClipSource};
use super::device::{DeviceFactory, DeviceState, OutputDevice};
use crate::dice::{Axis, Combination};

/// Idle time after which a regained device is recreated instead of resumed
pub const STALE_INTERACTION: Duration = Duration::from_millis(1000);

/// Minimum wait between input-driven attempts to reopen a missing device
pub const DEGRADED_RETRY: Duration = Duration::from_secs(2);

/// Plays the three clips of a combination back to back
pub struct SequencedPlayer {
    enabled: bool,
    source: ClipSource,
    buffers: HashMap<ClipKey, SampleBuffer>,
    factory: Box<dyn DeviceFactory>,
    device: Option<Box<dyn OutputDevice>>,
    degraded: bool,
    last_failure: Option<Instant>,
    last_interaction: Instant,
    last_hidden: Option<Instant>,
    last_blur: Option<Instant>,
}

impl SequencedPlayer {
    /// Create a player; no device is opened until it is first needed
    pub fn new(source: ClipSource, factory: Box<dyn DeviceFactory>) -> Self {
        Self {
            enabled: true,
            source,
            buffers: HashMap::new(),
            factory,
            device: None,
            degraded: false,
            last_failure: None,
            last_interaction: Instant::now(),
            last_hidden: None,
            last_blur: None,
        }
    }

    /// Start muted or unmuted
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether narration is on
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the last attempt to open a device failed
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// State of the shared device
    pub fn device_state(&self) -> DeviceState {
        self.device
            .as_ref()
            .map(|d| d.state())
            .unwrap_or(DeviceState::Uninitialized)
    }

    /// Whether a sequence is still rendering
    pub fn is_playing(&self) -> bool {
        self.device.as_ref().is_some_and(|d| d.is_playing())
    }

    /// Number of clips currently held
    pub fn loaded_count(&self) -> usize {
        self.buffers.len()
    }

    /// Flip the mute flag and return the new enabled state
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.stop_current();
        }
        info!(enabled = self.enabled, "Narration toggled");
        self.enabled
    }

    /// (Re)load every clip, converted to the device rate when a device is open.
    ///
    /// Returns the number of clips that loaded.
    pub async fn load(&mut self) -> usize {
        let target_rate = self.device.as_ref().map(|d| d.sample_rate());
        self.buffers = load_clips(&self.source, target_rate).await;
        self.buffers.len()
    }

    /// Speak a combination.
    ///
    /// A no-op while muted. Any sequence still playing is stopped and
    /// replaced. Missing clips abort the call after logging.
    pub async fn play_sequence(&mut self, color: &str, pattern: &str, decoration: &str) {
        if !self.enabled {
            return;
        }

        if !self.ensure_running().await {
            debug!("No running audio device, skipping sequence");
            return;
        }

        let keys = [
            ClipKey::new(Axis::Color, color),
            ClipKey::new(Axis::Pattern, pattern),
            ClipKey::new(Axis::Decoration, decoration),
        ];

        let mut clips = Vec::with_capacity(keys.len());
        for key in &keys {
            match self.buffers.get(key) {
                Some(buffer) => clips.push(buffer),
                None => {
                    warn!(clip = %key, "Missing clip, sequence not played");
                    return;
                }
            }
        }

        let Some(device) = self.device.as_mut() else {
            return;
        };

        let combined = combine(&clips, device.sample_rate());
        let duration = combined.duration();

        if device.is_playing() {
            debug!("Replacing the sequence that is still playing");
        }
        device.stop();

        match device.start(combined) {
            Ok(()) => debug!(
                color,
                pattern,
                decoration,
                duration_ms = duration.as_millis() as u64,
                "Sequence started"
            ),
            Err(e) => {
                warn!(error = %e, "Playback failed, recreating audio device");
                self.recreate().await;
            }
        }
    }

    /// Speak a rolled combination
    pub async fn play_combination(&mut self, combination: &Combination) {
        self.play_sequence(
            &combination.color,
            &combination.pattern,
            &combination.decoration,
        )
        .await;
    }

    /// Bring the device to the running state.
    ///
    /// Opens it when absent, resumes it when suspended and recreates it
    /// (reloading every clip) when it is closed, failed or will not resume.
    /// Returns whether the device ended up running.
    pub async fn ensure_running(&mut self) -> bool {
        let state = self.device_state();
        match state {
            DeviceState::Running => return true,
            DeviceState::Suspended => {
                if let Some(device) = self.device.as_mut() {
                    match device.resume() {
                        Ok(()) if device.state() == DeviceState::Running => {
                            debug!("Audio device resumed");
                            return true;
                        }
                        Ok(()) => warn!(
                            state = %device.state(),
                            "Audio device did not resume, recreating"
                        ),
                        Err(e) => warn!(error = %e, "Failed to resume audio device, recreating"),
                    }
                }
            }
            DeviceState::Uninitialized => debug!("Opening audio device"),
            DeviceState::Closed | DeviceState::Failed => {
                warn!(state = %state, "Audio device unusable, recreating")
            }
        }

        self.recreate().await
    }

    /// Replace the device with a fresh one and reload every clip.
    ///
    /// On failure the player degrades to silence. Returns whether the new
    /// device is running.
    pub async fn recreate(&mut self) -> bool {
        if let Some(mut old) = self.device.take() {
            old.close();
        }

        let mut device = match self.factory.create() {
            Ok(device) => device,
            Err(e) => {
                warn!(error = %e, "Could not open audio device, continuing without sound");
                self.degraded = true;
                self.last_failure = Some(Instant::now());
                return false;
            }
        };

        if device.state() == DeviceState::Suspended {
            if let Err(e) = device.resume() {
                warn!(error = %e, "New audio device would not start");
            }
        }

        self.degraded = false;
        self.last_failure = None;
        self.device = Some(device);
        let loaded = self.load().await;
        info!(loaded, expected = self.source.len(), "Audio device ready");

        self.device_state() == DeviceState::Running
    }

    /// Record a user interaction and make sure the device is usable.
    ///
    /// Muted players only stamp the clock. While degraded, a new device is
    /// tried at most once per [`DEGRADED_RETRY`].
    pub async fn on_interaction(&mut self) {
        self.last_interaction = Instant::now();
        if self.enabled && !self.retry_pending() {
            self.ensure_running().await;
        }
    }

    /// The host window regained focus
    pub async fn on_focus(&mut self) {
        if !self.retry_pending() {
            self.ensure_running().await;
        }
    }

    /// The host window lost focus
    pub fn on_blur(&mut self) {
        self.last_blur = Some(Instant::now());
        debug!("Host lost focus");
    }

    /// The host became hidden
    pub fn on_hidden(&mut self) {
        self.last_hidden = Some(Instant::now());
        debug!("Host hidden");
    }

    /// The host became visible again
    pub async fn on_visibility_regained(&mut self) {
        self.force_resume().await;
    }

    /// The host page was shown; `persisted` marks a restore from cache
    pub async fn on_page_show(&mut self, persisted: bool) {
        debug!(persisted, "Host shown");
        self.force_resume().await;
    }

    /// Stop playback and release the device
    pub fn shutdown(&mut self) {
        if let Some(mut device) = self.device.take() {
            device.close();
        }
        info!("Audio player shut down");
    }

    /// Stop playback, then resume or, after a long idle spell, recreate
    async fn force_resume(&mut self) {
        self.stop_current();

        let idle = self.last_interaction.elapsed();
        let away = self
            .last_hidden
            .or(self.last_blur)
            .map(|t| t.elapsed().as_millis() as u64);

        if idle > STALE_INTERACTION {
            info!(
                idle_ms = idle.as_millis() as u64,
                away_ms = ?away,
                "Recreating audio device after inactivity"
            );
            self.recreate().await;
        } else {
            self.ensure_running().await;
        }
    }

    /// Degraded and the last failed open was too recent to try again
    fn retry_pending(&self) -> bool {
        self.degraded
            && self
                .last_failure
                .is_some_and(|at| at.elapsed() < DEGRADED_RETRY)
    }

    fn stop_current(&mut self) {
        if let Some(device) = self.device.as_mut() {
            device.stop();
        }
    }

    /// Override the interaction clock
    pub fn set_last_interaction(&mut self, at: Instant) {
        self.last_interaction = at;
    }
}

impl Drop for SequencedPlayer {
    fn drop(&mut self) {
        if let Some(device) = self.device.as_mut() {
            device.close();
        }
    }
}
