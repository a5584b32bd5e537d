// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for the dice game
//!
//! These tests drive the configuration, tracker, player and game session
//! together through the public API, with a fake output device.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::{tempdir, TempDir};

use dice::audio::{AudioError, DeviceFactory, DeviceState, OutputDevice, SampleBuffer};
use dice::config::DiceFile;
use dice::dice::{CombinationTracker, RollOutcome, TrackerState};
use dice::game::{Game, HostEvent, RollRequest, ROLL_ANIMATION};
use dice::SequencedPlayer;

const RATE: u32 = 8000;

/// Length of one fixture clip after silence trimming
const TRIMMED_CLIP: usize = 399;

#[derive(Debug, Default)]
struct DeviceLog {
    created: usize,
    started: Vec<usize>,
    closed: usize,
}

struct FakeDevice {
    log: Rc<RefCell<DeviceLog>>,
    state: DeviceState,
    playing: bool,
}

impl OutputDevice for FakeDevice {
    fn state(&self) -> DeviceState {
        self.state
    }

    fn sample_rate(&self) -> u32 {
        RATE
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        self.state = DeviceState::Running;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), AudioError> {
        self.state = DeviceState::Suspended;
        Ok(())
    }

    fn start(&mut self, buffer: SampleBuffer) -> Result<(), AudioError> {
        self.log.borrow_mut().started.push(buffer.len());
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn close(&mut self) {
        self.state = DeviceState::Closed;
        self.log.borrow_mut().closed += 1;
    }
}

struct FakeFactory {
    log: Rc<RefCell<DeviceLog>>,
    available: bool,
}

impl DeviceFactory for FakeFactory {
    fn create(&self) -> Result<Box<dyn OutputDevice>, AudioError> {
        if !self.available {
            return Err(AudioError::NoDevice);
        }
        self.log.borrow_mut().created += 1;
        Ok(Box::new(FakeDevice {
            log: Rc::clone(&self.log),
            state: DeviceState::Running,
            playing: false,
        }))
    }
}

/// Silence, a burst, silence
fn write_clip(path: &Path) {
    let spec = WavSpec {
        channels: 1,
        sample_rate: RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..600 {
        let sample: i16 = if (200..400).contains(&i) { 12000 } else { 0 };
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

/// Built-in dice with a clip for every face in a scratch directory
fn default_setup() -> (TempDir, DiceFile) {
    let dir = tempdir().unwrap();
    let mut config = DiceFile::default();
    config.base_dir = dir.path().to_path_buf();

    let clip_dir = dir.path().join(&config.audio.clip_dir);
    fs::create_dir_all(&clip_dir).unwrap();
    for (_, path) in config.clip_source().unwrap().iter() {
        write_clip(path);
    }
    (dir, config)
}

fn new_game(
    config: &DiceFile,
    seed: u64,
    available: bool,
    enabled: bool,
) -> (Game, Rc<RefCell<DeviceLog>>) {
    let log = Rc::new(RefCell::new(DeviceLog::default()));
    let factory = FakeFactory {
        log: Rc::clone(&log),
        available,
    };
    let tracker = CombinationTracker::with_seed(config.dice_set().unwrap(), seed);
    let player = SequencedPlayer::new(config.clip_source().unwrap(), Box::new(factory))
        .with_enabled(enabled);
    (Game::new(tracker, player), log)
}

/// Roll and reveal one combination
async fn roll_and_reveal(game: &mut Game) -> Option<dice::Combination> {
    let now = Instant::now();
    assert_eq!(game.request_roll(now), RollRequest::Started);
    game.update(now + ROLL_ANIMATION).await
}

#[test]
fn test_default_dice_collect_all_36() {
    let config = DiceFile::default();
    let mut tracker = CombinationTracker::with_seed(config.dice_set().unwrap(), 7);

    let all = tracker.all_combinations();
    assert_eq!(all.len(), 36);
    assert_eq!(all[0].key(), "Green Plain Reindeer");
    assert_eq!(all[35].key(), "Yellow Stripy Tree");

    let mut seen = HashSet::new();
    for _ in 0..36 {
        match tracker.roll_once() {
            RollOutcome::Found(combination) => assert!(seen.insert(combination.key())),
            RollOutcome::Exhausted => panic!("exhausted early"),
        }
    }
    assert_eq!(seen.len(), 36);
    assert_eq!(tracker.state(), TrackerState::Exhausted);
    assert_eq!(tracker.roll_once(), RollOutcome::Exhausted);
}

#[test]
fn test_yaml_file_drives_tracker() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dice.yaml");
    fs::write(
        &path,
        r#"
dice:
  color:
    name: "Color"
    faces: ["Blue", "Gold"]
  pattern:
    name: "Pattern"
    faces: ["Plain"]
    default: "Plain"
  decoration:
    name: "Decoration"
    faces: ["Star", "Bell"]
    default: "Bell"
audio:
  clip_dir: "sounds"
"#,
    )
    .unwrap();

    let config = DiceFile::load(&path).unwrap();
    let tracker = CombinationTracker::new(config.dice_set().unwrap());
    assert_eq!(tracker.stats().total, 4);
    assert_eq!(tracker.defaults().key(), "Blue Plain Bell");

    let source = config.clip_source().unwrap();
    assert_eq!(source.len(), 5);
    assert!(source
        .iter()
        .all(|(_, clip)| clip.starts_with(dir.path().join("sounds"))));
}

#[tokio::test]
async fn test_roll_is_revealed_after_animation() {
    let (_dir, config) = default_setup();
    let (mut game, log) = new_game(&config, 1, true, true);
    game.start().await;
    assert_eq!(log.borrow().created, 1);
    assert_eq!(game.player().loaded_count(), 10);

    let shown_before = game.showing().clone();
    let now = Instant::now();
    assert_eq!(game.request_roll(now), RollRequest::Started);
    assert!(game.is_rolling());
    assert_eq!(game.request_roll(now), RollRequest::Busy);

    // Still tumbling
    assert!(game.update(now).await.is_none());
    assert_eq!(game.stats().found, 0);
    assert_eq!(game.showing(), &shown_before);
    assert!(log.borrow().started.is_empty());

    let revealed = game.update(now + ROLL_ANIMATION).await.unwrap();
    assert!(!game.is_rolling());
    assert_eq!(game.showing(), &revealed);
    assert_eq!(game.stats().found, 1);
    assert!(game.is_revealed(&revealed));
    assert_eq!(log.borrow().started, vec![3 * TRIMMED_CLIP]);
}

#[tokio::test]
async fn test_game_runs_to_completion() {
    let (_dir, config) = default_setup();
    let (mut game, log) = new_game(&config, 99, true, true);
    game.start().await;

    let mut revealed = HashSet::new();
    for _ in 0..36 {
        let combination = roll_and_reveal(&mut game).await.unwrap();
        assert!(revealed.insert(combination.key()));
    }

    assert!(game.is_complete());
    assert!(!game.can_roll());
    assert_eq!(game.request_roll(Instant::now()), RollRequest::Exhausted);
    assert_eq!(game.stats().found, 36);
    assert_eq!(log.borrow().started.len(), 36);
}

#[tokio::test]
async fn test_muted_game_stays_silent() {
    let (_dir, config) = default_setup();
    let (mut game, log) = new_game(&config, 3, true, false);
    game.start().await;

    // Clips are loaded up front even without a device
    assert_eq!(game.player().loaded_count(), 10);
    assert_eq!(log.borrow().created, 0);

    roll_and_reveal(&mut game).await.unwrap();
    assert!(log.borrow().started.is_empty());

    assert!(game.toggle_audio());
    roll_and_reveal(&mut game).await.unwrap();
    assert_eq!(log.borrow().created, 1);
    assert_eq!(log.borrow().started.len(), 1);
}

#[tokio::test]
async fn test_missing_device_degrades_to_silence() {
    let (_dir, config) = default_setup();
    let (mut game, log) = new_game(&config, 5, false, true);
    game.start().await;
    assert!(game.player().is_degraded());

    let combination = roll_and_reveal(&mut game).await.unwrap();
    assert!(game.is_revealed(&combination));
    assert!(log.borrow().started.is_empty());
}

#[tokio::test]
async fn test_visibility_after_idle_recreates_device() {
    let (_dir, config) = default_setup();
    let log = Rc::new(RefCell::new(DeviceLog::default()));
    let factory = FakeFactory {
        log: Rc::clone(&log),
        available: true,
    };
    let tracker = CombinationTracker::with_seed(config.dice_set().unwrap(), 11);
    let mut player = SequencedPlayer::new(config.clip_source().unwrap(), Box::new(factory));
    if let Some(long_ago) = Instant::now().checked_sub(Duration::from_secs(5)) {
        player.set_last_interaction(long_ago);
    }

    let mut game = Game::new(tracker, player);
    game.start().await;
    assert_eq!(log.borrow().created, 1);

    game.host_event(HostEvent::Hidden).await;
    game.host_event(HostEvent::Visible).await;
    assert_eq!(log.borrow().created, 2);
    assert_eq!(log.borrow().closed, 1);
    assert_eq!(game.player().device_state(), DeviceState::Running);

    // A fresh interaction means the device is only resumed
    game.host_event(HostEvent::Interaction).await;
    game.host_event(HostEvent::Shown { persisted: true }).await;
    game.host_event(HostEvent::FocusLost).await;
    game.host_event(HostEvent::FocusGained).await;
    assert_eq!(log.borrow().created, 2);
}

#[tokio::test]
async fn test_terminal_refocus_after_idle_recreates_device() {
    let (_dir, config) = default_setup();
    let log = Rc::new(RefCell::new(DeviceLog::default()));
    let factory = FakeFactory {
        log: Rc::clone(&log),
        available: true,
    };
    let tracker = CombinationTracker::with_seed(config.dice_set().unwrap(), 13);
    let mut player = SequencedPlayer::new(config.clip_source().unwrap(), Box::new(factory));
    if let Some(long_ago) = Instant::now().checked_sub(Duration::from_secs(5)) {
        player.set_last_interaction(long_ago);
    }

    let mut game = Game::new(tracker, player);
    game.start().await;
    assert_eq!(log.borrow().created, 1);

    for event in HostEvent::from_terminal_focus(false) {
        game.host_event(event).await;
    }
    assert_eq!(log.borrow().created, 1);

    // Regaining focus counts as becoming visible, so the idle device is replaced
    for event in HostEvent::from_terminal_focus(true) {
        game.host_event(event).await;
    }
    assert_eq!(log.borrow().created, 2);
    assert_eq!(log.borrow().closed, 1);
    assert_eq!(game.player().device_state(), DeviceState::Running);
}

#[tokio::test]
async fn test_shutdown_closes_device() {
    let (_dir, config) = default_setup();
    let (mut game, log) = new_game(&config, 2, true, true);
    game.start().await;

    game.shutdown();
    assert_eq!(log.borrow().closed, 1);
    assert_eq!(game.player().device_state(), DeviceState::Uninitialized);
}
