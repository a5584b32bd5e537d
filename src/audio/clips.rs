// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Clip source mapping and asynchronous clip loading.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::decode::{decode_clip, resample};
use super::{AudioError, SampleBuffer};
use crate::dice::Axis;

/// Identifies the clip for one face of one die
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClipKey {
    /// Die axis
    pub axis: Axis,
    /// Face label
    pub label: String,
}

impl ClipKey {
    /// Create a clip key
    pub fn new(axis: Axis, label: impl Into<String>) -> Self {
        Self {
            axis,
            label: label.into(),
        }
    }
}

impl fmt::Display for ClipKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.axis, self.label)
    }
}

/// Where each clip is fetched from, in configuration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipSource {
    entries: Vec<(ClipKey, PathBuf)>,
}

impl ClipSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the location for a clip, replacing any previous one
    pub fn insert(&mut self, key: ClipKey, path: impl Into<PathBuf>) {
        let path = path.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = path,
            None => self.entries.push((key, path)),
        }
    }

    /// Location of a clip
    pub fn path(&self, key: &ClipKey) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, p)| p.as_path())
    }

    /// All entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&ClipKey, &Path)> {
        self.entries.iter().map(|(k, p)| (k, p.as_path()))
    }

    /// Number of clips
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check for an empty source
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load every clip in `source`.
///
/// Clips that cannot be read or decoded are logged and left out; the rest
/// are converted to `target_rate` when one is given.
pub async fn load_clips(
    source: &ClipSource,
    target_rate: Option<u32>,
) -> HashMap<ClipKey, SampleBuffer> {
    let mut loaded = HashMap::with_capacity(source.len());

    for (key, path) in source.iter() {
        match load_clip(path, target_rate).await {
            Ok(buffer) => {
                debug!(clip = %key, samples = buffer.len(), rate = buffer.sample_rate(), "Clip loaded");
                loaded.insert(key.clone(), buffer);
            }
            Err(e) => warn!(clip = %key, path = ?path, error = %e, "Failed to load clip"),
        }
    }

    info!(loaded = loaded.len(), expected = source.len(), "Clip loading finished");
    loaded
}

async fn load_clip(path: &Path, target_rate: Option<u32>) -> Result<SampleBuffer, AudioError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| AudioError::ClipRead {
            path: path.to_path_buf(),
            source,
        })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_owned);

    tokio::task::spawn_blocking(move || {
        let buffer = decode_clip(bytes, extension.as_deref())?;
        match target_rate {
            Some(rate) if rate != buffer.sample_rate() => resample(&buffer, rate),
            _ => Ok(buffer),
        }
    })
    .await
    .map_err(|e| AudioError::Decode(format!("decode task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};
    use tempfile::tempdir;

    fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for s in samples {
            writer.write_sample(*s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_clip_source_insert_replaces() {
        let mut source = ClipSource::new();
        let key = ClipKey::new(Axis::Color, "Red");
        source.insert(key.clone(), "a.wav");
        source.insert(key.clone(), "b.wav");
        assert_eq!(source.len(), 1);
        assert_eq!(source.path(&key), Some(Path::new("b.wav")));
    }

    #[test]
    fn test_clip_key_display() {
        assert_eq!(ClipKey::new(Axis::Pattern, "Spotty").to_string(), "pattern/Spotty");
    }

    #[tokio::test]
    async fn test_load_clips_skips_missing() {
        let dir = tempdir().unwrap();
        let red = dir.path().join("red.wav");
        write_wav(&red, &[0, 8000, 0], 8000);

        let mut source = ClipSource::new();
        source.insert(ClipKey::new(Axis::Color, "Red"), &red);
        source.insert(ClipKey::new(Axis::Color, "Green"), dir.path().join("green.wav"));

        let loaded = load_clips(&source, None).await;
        assert_eq!(loaded.len(), 1);
        let buffer = &loaded[&ClipKey::new(Axis::Color, "Red")];
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.sample_rate(), 8000);
    }

    #[tokio::test]
    async fn test_load_clips_skips_undecodable() {
        let dir = tempdir().unwrap();
        let bad = dir.path().join("plain.wav");
        std::fs::write(&bad, b"not a wav file").unwrap();

        let mut source = ClipSource::new();
        source.insert(ClipKey::new(Axis::Pattern, "Plain"), &bad);

        assert!(load_clips(&source, None).await.is_empty());
    }

    #[tokio::test]
    async fn test_load_clips_resamples_to_target() {
        let dir = tempdir().unwrap();
        let tree = dir.path().join("tree.wav");
        write_wav(&tree, &[4000; 8000], 8000);

        let mut source = ClipSource::new();
        source.insert(ClipKey::new(Axis::Decoration, "Tree"), &tree);

        let loaded = load_clips(&source, Some(16000)).await;
        let buffer = &loaded[&ClipKey::new(Axis::Decoration, "Tree")];
        assert_eq!(buffer.sample_rate(), 16000);
        assert!((buffer.len() as i64 - 16000).abs() < 64);
    }
}
