// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! A game session: one tracker and one player, driven by the front end.
//!
//! A roll is drawn immediately but only revealed once the short roll
//! animation has elapsed; the reveal is what gets displayed, counted and
//! spoken.

use std::time::{Duration, Instant};

use tracing::info;

use crate::audio::SequencedPlayer;
use crate::dice::{Combination, CombinationTracker, RollOutcome, Stats, TrackerState};

/// How long the dice tumble before the result is shown
pub const ROLL_ANIMATION: Duration = Duration::from_millis(500);

/// Host environment events forwarded to the audio player.
///
/// Terminals only report focus, so [`HostEvent::from_terminal_focus`] turns
/// a focus change into the matching focus and visibility events. `Shown` is
/// for hosts that can restore a suspended session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Key press or other direct input
    Interaction,
    /// Window gained focus
    FocusGained,
    /// Window lost focus
    FocusLost,
    /// Window hidden
    Hidden,
    /// Window visible again
    Visible,
    /// Page shown, possibly restored from cache
    Shown {
        /// Restored rather than freshly loaded
        persisted: bool,
    },
}

impl HostEvent {
    /// Events a terminal focus change stands for, in delivery order
    pub fn from_terminal_focus(gained: bool) -> [HostEvent; 2] {
        if gained {
            [HostEvent::Visible, HostEvent::FocusGained]
        } else {
            [HostEvent::FocusLost, HostEvent::Hidden]
        }
    }
}

/// Answer to a roll request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollRequest {
    /// Dice are tumbling
    Started,
    /// A roll is already in progress
    Busy,
    /// Nothing left to find
    Exhausted,
}

#[derive(Debug)]
struct PendingRoll {
    combination: Combination,
    reveal_at: Instant,
}

/// One player's session
pub struct Game {
    tracker: CombinationTracker,
    player: SequencedPlayer,
    showing: Combination,
    pending: Option<PendingRoll>,
}

impl Game {
    /// Start a session showing the default faces
    pub fn new(tracker: CombinationTracker, player: SequencedPlayer) -> Self {
        let showing = tracker.defaults();
        Self {
            tracker,
            player,
            showing,
            pending: None,
        }
    }

    /// Prepare audio: open the device when narration is on, otherwise
    /// just load the clips
    pub async fn start(&mut self) {
        if self.player.is_enabled() {
            self.player.ensure_running().await;
        } else {
            self.player.load().await;
        }
        let stats = self.tracker.stats();
        info!(total = stats.total, "Game started");
    }

    /// Ask for a roll
    pub fn request_roll(&mut self, now: Instant) -> RollRequest {
        if self.pending.is_some() {
            return RollRequest::Busy;
        }

        match self.tracker.roll_once() {
            RollOutcome::Found(combination) => {
                self.pending = Some(PendingRoll {
                    combination,
                    reveal_at: now + ROLL_ANIMATION,
                });
                RollRequest::Started
            }
            RollOutcome::Exhausted => RollRequest::Exhausted,
        }
    }

    /// Reveal a finished roll and speak it.
    ///
    /// Returns the combination revealed by this call, if any.
    pub async fn update(&mut self, now: Instant) -> Option<Combination> {
        if !self.pending.as_ref().is_some_and(|p| now >= p.reveal_at) {
            return None;
        }
        let revealed = self.pending.take()?.combination;
        self.showing = revealed.clone();

        let stats = self.stats();
        info!(
            combination = %revealed,
            found = stats.found,
            total = stats.total,
            "Combination revealed"
        );
        if self.is_complete() {
            info!(total = stats.total, "All combinations found");
        }

        self.player.play_combination(&revealed).await;
        Some(revealed)
    }

    /// Forward a host event to the audio player
    pub async fn host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Interaction => self.player.on_interaction().await,
            HostEvent::FocusGained => self.player.on_focus().await,
            HostEvent::FocusLost => self.player.on_blur(),
            HostEvent::Hidden => self.player.on_hidden(),
            HostEvent::Visible => self.player.on_visibility_regained().await,
            HostEvent::Shown { persisted } => self.player.on_page_show(persisted).await,
        }
    }

    /// Toggle narration, returning the new enabled state
    pub fn toggle_audio(&mut self) -> bool {
        self.player.toggle()
    }

    /// Faces currently on display
    pub fn showing(&self) -> &Combination {
        &self.showing
    }

    /// Whether the dice are tumbling
    pub fn is_rolling(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether another roll may be requested
    pub fn can_roll(&self) -> bool {
        self.pending.is_none() && self.tracker.state() == TrackerState::Active
    }

    /// Every combination has been revealed
    pub fn is_complete(&self) -> bool {
        self.pending.is_none() && self.tracker.state() == TrackerState::Exhausted
    }

    /// Revealed / total counts (a tumbling roll is not counted yet)
    pub fn stats(&self) -> Stats {
        let mut stats = self.tracker.stats();
        if self.pending.is_some() {
            stats.found -= 1;
        }
        stats
    }

    /// Whether a combination has been revealed
    pub fn is_revealed(&self, combination: &Combination) -> bool {
        let tumbling = self
            .pending
            .as_ref()
            .is_some_and(|p| p.combination == *combination);
        self.tracker.is_discovered(combination) && !tumbling
    }

    /// The underlying tracker
    pub fn tracker(&self) -> &CombinationTracker {
        &self.tracker
    }

    /// The audio player
    pub fn player(&self) -> &SequencedPlayer {
        &self.player
    }

    /// Stop audio and release the device
    pub fn shutdown(&mut self) {
        self.player.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioError, ClipSource, DeviceFactory, OutputDevice};
    use crate::config::DiceFile;
    use crate::dice::{Axis, DiceSet, FaceSet};

    struct NoDevice;

    impl DeviceFactory for NoDevice {
        fn create(&self) -> Result<Box<dyn OutputDevice>, AudioError> {
            Err(AudioError::NoDevice)
        }
    }

    fn silent_game(seed: u64) -> Game {
        let dice = DiceFile::default().dice_set().unwrap();
        let player = SequencedPlayer::new(ClipSource::new(), Box::new(NoDevice));
        Game::new(CombinationTracker::with_seed(dice, seed), player)
    }

    #[test]
    fn test_new_game_shows_defaults() {
        let game = silent_game(1);
        assert_eq!(game.showing().key(), "Red Plain Tree");
        assert!(game.can_roll());
        assert!(!game.is_rolling());
        assert_eq!(game.stats().found, 0);
    }

    #[tokio::test]
    async fn test_tumbling_roll_not_counted() {
        let mut game = silent_game(2);
        let now = Instant::now();

        assert_eq!(game.request_roll(now), RollRequest::Started);
        assert_eq!(game.request_roll(now), RollRequest::Busy);
        assert!(!game.can_roll());
        assert_eq!(game.stats().found, 0);
        assert_eq!(game.tracker().stats().found, 1);

        let early = now + ROLL_ANIMATION / 2;
        assert!(game.update(early).await.is_none());

        let revealed = game.update(now + ROLL_ANIMATION).await.unwrap();
        assert!(game.is_revealed(&revealed));
        assert_eq!(game.stats().found, 1);
        assert!(game.update(now + ROLL_ANIMATION * 2).await.is_none());
    }

    #[test]
    fn test_terminal_focus_maps_to_visibility() {
        assert_eq!(
            HostEvent::from_terminal_focus(true),
            [HostEvent::Visible, HostEvent::FocusGained]
        );
        assert_eq!(
            HostEvent::from_terminal_focus(false),
            [HostEvent::FocusLost, HostEvent::Hidden]
        );
    }

    #[tokio::test]
    async fn test_colliding_labels_complete_the_game() {
        let dice = DiceSet::new(
            FaceSet::new(Axis::Color, "Color", vec!["Light".into(), "Light Blue".into()], None)
                .unwrap(),
            FaceSet::new(Axis::Pattern, "Pattern", vec!["Blue Plain".into(), "Plain".into()], None)
                .unwrap(),
            FaceSet::new(Axis::Decoration, "Decoration", vec!["Tree".into()], None).unwrap(),
        )
        .unwrap();
        let player = SequencedPlayer::new(ClipSource::new(), Box::new(NoDevice));
        let mut game = Game::new(CombinationTracker::with_seed(dice, 4), player);

        let mut now = Instant::now();
        for _ in 0..4 {
            assert_eq!(game.request_roll(now), RollRequest::Started);
            now += ROLL_ANIMATION;
            assert!(game.update(now).await.is_some());
        }

        assert!(game.is_complete());
        assert!(!game.can_roll());
        assert_eq!(game.request_roll(now), RollRequest::Exhausted);
        assert_eq!(game.stats().found, 4);
    }

    #[test]
    fn test_toggle_audio() {
        let mut game = silent_game(3);
        assert!(game.player().is_enabled());
        assert!(!game.toggle_audio());
        assert!(game.toggle_audio());
    }
}
