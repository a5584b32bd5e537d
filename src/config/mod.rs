// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for the dice game.
//!
//! This module provides data structures for loading the three dice
//! (axis name, faces, default label, per-face clip overrides) and the
//! audio clip source settings.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::audio::{ClipKey, ClipSource};
use crate::dice::{Axis, DiceSet, FaceSet};

/// Root configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiceFile {
    /// One entry per die
    pub dice: DiceConfig,
    /// Audio clip settings
    #[serde(default)]
    pub audio: AudioConfig,
    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl DiceFile {
    /// Load a configuration from a YAML or TOML file (chosen by extension)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut file = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&contents)?,
            _ => Self::from_yaml(&contents)?,
        };
        file.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(file)
    }

    /// Parse a configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse a configuration from TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Validate the dice and build the face sets
    pub fn dice_set(&self) -> Result<DiceSet> {
        let color = self.dice.color.face_set(Axis::Color)?;
        let pattern = self.dice.pattern.face_set(Axis::Pattern)?;
        let decoration = self.dice.decoration.face_set(Axis::Decoration)?;
        DiceSet::new(color, pattern, decoration)
    }

    /// Map every face to the clip file it should be loaded from.
    ///
    /// Per-face overrides win; otherwise the clip is
    /// `<clip_dir>/<lowercase label>.<extension>`.
    pub fn clip_source(&self) -> Result<ClipSource> {
        let clip_dir = self.base_dir.join(&self.audio.clip_dir);
        let mut source = ClipSource::new();

        for axis in Axis::ALL {
            let die = self.dice.get(axis);
            for label in &die.faces {
                let path = match die.clips.get(label) {
                    Some(path) => self.base_dir.join(path),
                    None => clip_dir.join(format!(
                        "{}.{}",
                        label.to_lowercase(),
                        self.audio.extension
                    )),
                };
                source.insert(ClipKey::new(axis, label.clone()), path);
            }

            for label in die.clips.keys() {
                if !die.faces.contains(label) {
                    bail!(
                        "Clip override for '{}' on die '{}' does not match any face",
                        label,
                        die.name
                    );
                }
            }
        }

        Ok(source)
    }
}

impl Default for DiceFile {
    fn default() -> Self {
        Self {
            dice: DiceConfig::default(),
            audio: AudioConfig::default(),
            base_dir: PathBuf::new(),
        }
    }
}

/// The three dice, one per axis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiceConfig {
    /// First die
    pub color: DieConfig,
    /// Second die
    pub pattern: DieConfig,
    /// Third die
    pub decoration: DieConfig,
}

impl DiceConfig {
    /// Die configuration for an axis
    pub fn get(&self, axis: Axis) -> &DieConfig {
        match axis {
            Axis::Color => &self.color,
            Axis::Pattern => &self.pattern,
            Axis::Decoration => &self.decoration,
        }
    }
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self {
            color: DieConfig::new("Color", &["Red", "Green", "Yellow"], "Red"),
            pattern: DieConfig::new("Pattern", &["Stripy", "Spotty", "Plain"], "Plain"),
            decoration: DieConfig::new(
                "Decoration",
                &["Snowman", "Reindeer", "Tree", "Snowflake"],
                "Tree",
            ),
        }
    }
}

/// A single die
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DieConfig {
    /// Human-readable axis name
    pub name: String,
    /// Face labels in display order
    #[serde(default)]
    pub faces: Vec<String>,
    /// Label shown before the first roll (defaults to the first face)
    #[serde(default)]
    pub default: Option<String>,
    /// Per-face clip path overrides (relative to the config file)
    #[serde(default)]
    pub clips: HashMap<String, String>,
}

impl DieConfig {
    fn new(name: &str, faces: &[&str], default: &str) -> Self {
        Self {
            name: name.to_string(),
            faces: faces.iter().map(|f| f.to_string()).collect(),
            default: Some(default.to_string()),
            clips: HashMap::new(),
        }
    }

    fn face_set(&self, axis: Axis) -> Result<FaceSet> {
        FaceSet::new(axis, &self.name, self.faces.clone(), self.default.clone())
    }
}

/// Audio clip settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioConfig {
    /// Whether narration starts enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Directory holding one clip per face
    #[serde(default = "default_clip_dir")]
    pub clip_dir: String,
    /// Clip file extension
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_enabled() -> bool {
    true
}
fn default_clip_dir() -> String {
    "audio".to_string()
}
fn default_extension() -> String {
    "wav".to_string()
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            clip_dir: default_clip_dir(),
            extension: default_extension(),
        }
    }
}

/// Load and fully validate a configuration file
pub fn validate_config<P: AsRef<Path>>(path: P) -> Result<DiceFile> {
    let file = DiceFile::load(path)?;
    file.dice_set()?;
    file.clip_source()?;
    Ok(file)
}
