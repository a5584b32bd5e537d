// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Dice model: axes, face sets and combinations.
//!
//! This module provides:
//! - The three fixed die axes and their ordering
//! - Validated face sets (one per axis)
//! - Combinations and their canonical textual key
//! - The combination tracker with fair sampling over undiscovered combinations

pub mod tracker;

pub use tracker::{CombinationTracker, RollOutcome, Stats, TrackerState};

use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// One of the three independent die dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// First die
    Color,
    /// Second die
    Pattern,
    /// Third die
    Decoration,
}

impl Axis {
    /// All axes in canonical key order
    pub const ALL: [Axis; 3] = [Axis::Color, Axis::Pattern, Axis::Decoration];

    /// Position of this axis within a combination
    pub fn index(self) -> usize {
        match self {
            Axis::Color => 0,
            Axis::Pattern => 1,
            Axis::Decoration => 2,
        }
    }

    /// Lowercase identifier, used in config keys and log fields
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::Color => "color",
            Axis::Pattern => "pattern",
            Axis::Decoration => "decoration",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The allowed labels for one axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceSet {
    axis: Axis,
    name: String,
    faces: Vec<String>,
    default: String,
}

impl FaceSet {
    /// Create a validated face set.
    ///
    /// Rejects empty sets, blank labels, duplicate labels and a default
    /// that is not one of the faces. When no default is given the first
    /// face is used.
    pub fn new(
        axis: Axis,
        name: impl Into<String>,
        faces: Vec<String>,
        default: Option<String>,
    ) -> Result<Self> {
        let name = name.into();

        if faces.is_empty() {
            bail!("Die '{}' ({}) has no faces", name, axis);
        }

        for (i, face) in faces.iter().enumerate() {
            if face.trim().is_empty() {
                bail!("Die '{}' ({}) has a blank face at position {}", name, axis, i);
            }
            if faces[..i].contains(face) {
                bail!("Die '{}' ({}) lists face '{}' more than once", name, axis, face);
            }
        }

        let default = match default {
            Some(label) if faces.contains(&label) => label,
            Some(label) => bail!(
                "Default '{}' for die '{}' ({}) is not one of its faces",
                label,
                name,
                axis
            ),
            None => faces[0].clone(),
        };

        Ok(Self {
            axis,
            name,
            faces,
            default,
        })
    }

    /// Axis this set belongs to
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Human-readable axis name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Labels in configured order
    pub fn faces(&self) -> &[String] {
        &self.faces
    }

    /// Label shown before the first roll
    pub fn default_face(&self) -> &str {
        &self.default
    }

    /// Number of faces
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Always false for a validated set
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Check whether a label is one of the faces
    pub fn contains(&self, label: &str) -> bool {
        self.faces.iter().any(|f| f == label)
    }
}

/// The three face sets of a game session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceSet {
    color: FaceSet,
    pattern: FaceSet,
    decoration: FaceSet,
}

impl DiceSet {
    /// Bundle three face sets; each must carry the matching axis
    pub fn new(color: FaceSet, pattern: FaceSet, decoration: FaceSet) -> Result<Self> {
        for (expected, set) in Axis::ALL.iter().zip([&color, &pattern, &decoration]) {
            if set.axis() != *expected {
                bail!(
                    "Face set '{}' is for the {} axis, expected {}",
                    set.name(),
                    set.axis(),
                    expected
                );
            }
        }
        Ok(Self {
            color,
            pattern,
            decoration,
        })
    }

    /// Face set for an axis
    pub fn get(&self, axis: Axis) -> &FaceSet {
        match axis {
            Axis::Color => &self.color,
            Axis::Pattern => &self.pattern,
            Axis::Decoration => &self.decoration,
        }
    }

    /// Face sets in axis order
    pub fn iter(&self) -> impl Iterator<Item = &FaceSet> {
        [&self.color, &self.pattern, &self.decoration].into_iter()
    }

    /// Size of the full Cartesian product
    pub fn total(&self) -> usize {
        self.color.len() * self.pattern.len() * self.decoration.len()
    }

    /// Combination made of every axis' default label
    pub fn defaults(&self) -> Combination {
        Combination::new(
            self.color.default_face(),
            self.pattern.default_face(),
            self.decoration.default_face(),
        )
    }

    /// Every combination, in face order (not sorted)
    pub fn product(&self) -> Vec<Combination> {
        let mut out = Vec::with_capacity(self.total());
        for color in self.color.faces() {
            for pattern in self.pattern.faces() {
                for decoration in self.decoration.faces() {
                    out.push(Combination::new(color, pattern, decoration));
                }
            }
        }
        out
    }
}

/// One label from each axis
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination {
    /// Color label
    pub color: String,
    /// Pattern label
    pub pattern: String,
    /// Decoration label
    pub decoration: String,
}

impl Combination {
    /// Create a combination from its three labels
    pub fn new(
        color: impl Into<String>,
        pattern: impl Into<String>,
        decoration: impl Into<String>,
    ) -> Self {
        Self {
            color: color.into(),
            pattern: pattern.into(),
            decoration: decoration.into(),
        }
    }

    /// Canonical key: labels joined by single spaces in axis order
    pub fn key(&self) -> String {
        format!("{} {} {}", self.color, self.pattern, self.decoration)
    }

    /// Label on the given axis
    pub fn label(&self, axis: Axis) -> &str {
        match axis {
            Axis::Color => &self.color,
            Axis::Pattern => &self.pattern,
            Axis::Decoration => &self.decoration,
        }
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.color, self.pattern, self.decoration)
    }
}
