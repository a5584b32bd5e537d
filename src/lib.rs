// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Festive dice: roll three dice until every Color × Pattern × Decoration
//! combination has been found, hearing each one spoken as it turns up.

pub mod audio;
pub mod config;
pub mod dice;
pub mod game;
pub mod ui;

pub use audio::{SequencedPlayer, DEGRADED_RETRY, STALE_INTERACTION};
pub use config::DiceFile;
pub use dice::{Axis, Combination, CombinationTracker, DiceSet, FaceSet, RollOutcome};
pub use game::{Game, HostEvent, RollRequest};
