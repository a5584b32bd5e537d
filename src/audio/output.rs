// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio output via cpal.
//!
//! Opens the default output device at its preferred rate and renders a
//! single mono source to every output channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use tracing::{error, info};

use super::device::{DeviceFactory, DeviceState, OutputDevice};
use super::{AudioError, SampleBuffer};

/// Audio output configuration
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of output channels
    pub channels: u16,
    /// Buffer size in frames (`None` lets the backend choose)
    pub buffer_size: Option<u32>,
}

impl OutputConfig {
    /// Calculate latency in milliseconds, when the buffer size is fixed
    pub fn latency_ms(&self) -> Option<f64> {
        self.buffer_size
            .map(|frames| (frames as f64 / self.sample_rate as f64) * 1000.0)
    }
}

/// The source currently being rendered
#[derive(Debug, Default)]
struct PlaybackSlot {
    samples: Vec<f32>,
    position: usize,
}

impl PlaybackSlot {
    fn replace(&mut self, samples: Vec<f32>) {
        self.samples = samples;
        self.position = 0;
    }

    fn clear(&mut self) {
        self.samples.clear();
        self.position = 0;
    }

    fn is_playing(&self) -> bool {
        self.position < self.samples.len()
    }

    /// Copy the next frames into an interleaved output block
    fn render(&mut self, data: &mut [f32], channels: usize) {
        for frame in data.chunks_mut(channels) {
            let Some(&sample) = self.samples.get(self.position) else {
                break;
            };
            frame.fill(sample);
            self.position += 1;
        }
    }
}

/// cpal-backed output device
pub struct AudioOutput {
    stream: Option<Stream>,
    _device: Device,
    config: OutputConfig,
    slot: Arc<Mutex<PlaybackSlot>>,
    failed: Arc<AtomicBool>,
    paused: bool,
}

impl AudioOutput {
    /// Open the default output device and start its stream
    pub fn open(buffer_size: Option<u32>) -> Result<Self, AudioError> {
        let host = cpal::default_host();

        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let supported = device
            .default_output_config()
            .map_err(|e| AudioError::InitFailed(format!("Failed to get default config: {}", e)))?;

        let config = OutputConfig {
            sample_rate: supported.sample_rate().0,
            channels: supported.channels(),
            buffer_size,
        };

        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: match buffer_size {
                Some(frames) => cpal::BufferSize::Fixed(frames),
                None => cpal::BufferSize::Default,
            },
        };

        let slot = Arc::new(Mutex::new(PlaybackSlot::default()));
        let failed = Arc::new(AtomicBool::new(false));
        let channels = config.channels.max(1) as usize;

        let render_slot = Arc::clone(&slot);
        let error_flag = Arc::clone(&failed);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    data.fill(0.0);
                    // Never block the audio thread; a contended block plays silence
                    if let Ok(mut slot) = render_slot.try_lock() {
                        slot.render(data, channels);
                    }
                },
                move |err| {
                    error!(error = %err, "Audio stream error");
                    error_flag.store(true, Ordering::SeqCst);
                },
                None,
            )
            .map_err(|e| AudioError::StreamFailed(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamFailed(format!("Failed to start stream: {}", e)))?;

        info!(
            device = device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate = config.sample_rate,
            channels = config.channels,
            "Audio output opened"
        );

        Ok(Self {
            stream: Some(stream),
            _device: device,
            config,
            slot,
            failed,
            paused: false,
        })
    }

    /// Get current configuration
    pub fn config(&self) -> &OutputConfig {
        &self.config
    }
}

impl OutputDevice for AudioOutput {
    fn state(&self) -> DeviceState {
        if self.stream.is_none() {
            DeviceState::Closed
        } else if self.failed.load(Ordering::SeqCst) {
            DeviceState::Failed
        } else if self.paused {
            DeviceState::Suspended
        } else {
            DeviceState::Running
        }
    }

    fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        let stream = self
            .stream
            .as_ref()
            .ok_or(AudioError::Unavailable(DeviceState::Closed))?;
        stream
            .play()
            .map_err(|e| AudioError::StreamFailed(format!("Failed to resume stream: {}", e)))?;
        self.paused = false;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), AudioError> {
        let stream = self
            .stream
            .as_ref()
            .ok_or(AudioError::Unavailable(DeviceState::Closed))?;
        stream
            .pause()
            .map_err(|e| AudioError::StreamFailed(format!("Failed to pause stream: {}", e)))?;
        self.paused = true;
        Ok(())
    }

    fn start(&mut self, buffer: SampleBuffer) -> Result<(), AudioError> {
        let state = self.state();
        if state != DeviceState::Running {
            return Err(AudioError::Unavailable(state));
        }
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| AudioError::StreamFailed("Playback slot poisoned".to_string()))?;
        slot.replace(buffer.into_samples());
        Ok(())
    }

    fn stop(&mut self) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.clear();
        }
    }

    fn is_playing(&self) -> bool {
        self.slot.lock().map(|s| s.is_playing()).unwrap_or(false)
    }

    fn close(&mut self) {
        self.stop();
        // Dropping the stream releases the device
        self.stream = None;
    }
}

/// Opens the default cpal output device
#[derive(Debug, Clone, Default)]
pub struct CpalDeviceFactory {
    buffer_size: Option<u32>,
}

impl CpalDeviceFactory {
    /// Create a factory; `buffer_size` is clamped to 64..=4096 frames
    pub fn new(buffer_size: Option<u32>) -> Self {
        Self {
            buffer_size: buffer_size.map(|size| size.clamp(64, 4096)),
        }
    }
}

impl DeviceFactory for CpalDeviceFactory {
    fn create(&self) -> Result<Box<dyn OutputDevice>, AudioError> {
        Ok(Box::new(AudioOutput::open(self.buffer_size)?))
    }
}
