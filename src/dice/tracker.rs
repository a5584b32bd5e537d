// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Combination tracking and fair sampling.
//!
//! Rolls are drawn uniformly from the combinations that have not been
//! discovered yet, so a full set is collected in exactly `total` rolls.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{Axis, Combination, DiceSet};

/// Result of a single roll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollOutcome {
    /// A newly discovered combination
    Found(Combination),
    /// Every combination has already been discovered
    Exhausted,
}

impl RollOutcome {
    /// The rolled combination, if any
    pub fn combination(&self) -> Option<&Combination> {
        match self {
            RollOutcome::Found(combo) => Some(combo),
            RollOutcome::Exhausted => None,
        }
    }
}

/// Tracker lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Undiscovered combinations remain
    Active,
    /// All combinations discovered
    Exhausted,
}

/// Discovery progress for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Number of discovered combinations
    pub found: usize,
    /// Size of the combination space
    pub total: usize,
}

/// Owns the face sets, the discovered set and the sampling RNG
pub struct CombinationTracker {
    dice: DiceSet,
    discovered: HashSet<Combination>,
    rng: StdRng,
}

impl CombinationTracker {
    /// Create a tracker seeded from OS entropy
    pub fn new(dice: DiceSet) -> Self {
        Self::with_rng(dice, StdRng::from_entropy())
    }

    /// Create a tracker with a reproducible roll sequence
    pub fn with_seed(dice: DiceSet, seed: u64) -> Self {
        Self::with_rng(dice, StdRng::seed_from_u64(seed))
    }

    fn with_rng(dice: DiceSet, rng: StdRng) -> Self {
        Self {
            dice,
            discovered: HashSet::new(),
            rng,
        }
    }

    /// Face sets this tracker samples from
    pub fn dice(&self) -> &DiceSet {
        &self.dice
    }

    /// Face labels of one die
    pub fn faces(&self, axis: Axis) -> &[String] {
        self.dice.get(axis).faces()
    }

    /// Combination shown before the first roll
    pub fn defaults(&self) -> Combination {
        self.dice.defaults()
    }

    /// Full Cartesian product, sorted by key
    pub fn all_combinations(&self) -> Vec<Combination> {
        let mut all = self.dice.product();
        // Labels may contain spaces, so equal keys are ordered by their parts
        all.sort_by_cached_key(|c| (c.key(), c.color.clone(), c.pattern.clone()));
        all
    }

    /// Combinations not yet discovered, sorted by key
    pub fn remaining(&self) -> Vec<Combination> {
        self.all_combinations()
            .into_iter()
            .filter(|c| !self.discovered.contains(c))
            .collect()
    }

    /// Roll the dice.
    ///
    /// Picks uniformly among the remaining combinations and marks the pick
    /// as discovered. Returns [`RollOutcome::Exhausted`] once nothing is left.
    pub fn roll_once(&mut self) -> RollOutcome {
        let mut remaining = self.remaining();
        if remaining.is_empty() {
            debug!("Roll requested with every combination discovered");
            return RollOutcome::Exhausted;
        }

        let index = self.rng.gen_range(0..remaining.len());
        let picked = remaining.swap_remove(index);
        self.discovered.insert(picked.clone());

        debug!(
            combination = %picked,
            found = self.discovered.len(),
            total = self.dice.total(),
            "Rolled new combination"
        );
        RollOutcome::Found(picked)
    }

    /// Found / total counts
    pub fn stats(&self) -> Stats {
        Stats {
            found: self.discovered.len(),
            total: self.dice.total(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> TrackerState {
        if self.remaining().is_empty() {
            TrackerState::Exhausted
        } else {
            TrackerState::Active
        }
    }

    /// Check whether a combination has been discovered
    pub fn is_discovered(&self, combination: &Combination) -> bool {
        self.discovered.contains(combination)
    }

    /// Forget every discovery and return to the active state
    pub fn reset(&mut self) {
        self.discovered.clear();
    }
}
