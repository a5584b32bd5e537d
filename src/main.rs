// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{Event, KeyEventKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dice::audio::{CpalDeviceFactory, SequencedPlayer};
use dice::config::{validate_config, DiceFile};
use dice::dice::{Axis, CombinationTracker, RollOutcome};
use dice::game::{Game, HostEvent, RollRequest};
use dice::ui::{App, KeyAction};

/// Roll festive dice until every combination has been found
#[derive(Parser, Debug)]
#[command(name = "dice", version, about)]
struct Cli {
    /// Dice configuration (YAML or TOML); built-in dice when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Where the interactive game writes its log
    #[arg(long, global = true, default_value = "dice.log")]
    log_file: PathBuf,

    /// Start with narration muted
    #[arg(long, global = true)]
    no_audio: bool,

    /// Output buffer size in frames
    #[arg(long, global = true)]
    buffer_size: Option<u32>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play in the terminal (default)
    Play {
        /// Seed for a reproducible session
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print every combination
    List,
    /// Roll without the terminal UI
    Roll {
        /// Number of rolls
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
        /// Keep rolling until every combination is found
        #[arg(long)]
        all: bool,
        /// Seed for a reproducible sequence
        #[arg(long)]
        seed: Option<u64>,
        /// Speak each roll through the default output device
        #[arg(long)]
        speak: bool,
    },
    /// Validate a configuration file and report missing clips
    CheckConfig {
        /// File to check (defaults to --config)
        path: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            init_logging(Some(&cli.log_file))?;
            play(&cli, None).await
        }
        Some(Commands::Play { seed }) => {
            init_logging(Some(&cli.log_file))?;
            play(&cli, seed).await
        }
        Some(Commands::List) => {
            init_logging(None)?;
            list(&cli)
        }
        Some(Commands::Roll {
            count,
            all,
            seed,
            speak,
        }) => {
            init_logging(None)?;
            roll(&cli, count, all, seed, speak).await
        }
        Some(Commands::CheckConfig { ref path }) => {
            init_logging(None)?;
            let path = path
                .as_ref()
                .or(cli.config.as_ref())
                .context("No configuration file given")?;
            check_config(path)
        }
    }
}

/// Log to a file while the terminal UI owns the screen, else to stderr
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to open log file: {:?}", path))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<DiceFile> {
    match &cli.config {
        Some(path) => DiceFile::load(path),
        None => Ok(DiceFile::default()),
    }
}

fn new_tracker(config: &DiceFile, seed: Option<u64>) -> Result<CombinationTracker> {
    let dice = config.dice_set()?;
    Ok(match seed {
        Some(seed) => CombinationTracker::with_seed(dice, seed),
        None => CombinationTracker::new(dice),
    })
}

fn new_player(cli: &Cli, config: &DiceFile) -> Result<SequencedPlayer> {
    let source = config.clip_source()?;
    let factory = CpalDeviceFactory::new(cli.buffer_size);
    let enabled = config.audio.enabled && !cli.no_audio;
    Ok(SequencedPlayer::new(source, Box::new(factory)).with_enabled(enabled))
}

async fn play(cli: &Cli, seed: Option<u64>) -> Result<()> {
    let config = load_config(cli)?;
    let tracker = new_tracker(&config, seed)?;
    let player = new_player(cli, &config)?;

    let mut game = Game::new(tracker, player);
    game.start().await;

    let mut app = App::new().context("Failed to initialise terminal")?;
    let result = run(&mut app, &mut game).await;

    game.shutdown();
    drop(app);
    result
}

async fn run(app: &mut App, game: &mut Game) -> Result<()> {
    while app.is_running() {
        app.draw(game)?;

        if let Some(event) = app.poll_event()? {
            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    game.host_event(HostEvent::Interaction).await;
                    match app.handle_key(key.code, key.modifiers) {
                        KeyAction::Roll => match game.request_roll(Instant::now()) {
                            RollRequest::Exhausted => {
                                let total = game.stats().total;
                                app.state_mut()
                                    .set_status(format!("All {} combinations already found", total));
                            }
                            RollRequest::Started | RollRequest::Busy => {}
                        },
                        KeyAction::ToggleAudio => {
                            let status = if game.toggle_audio() {
                                "Narration on"
                            } else {
                                "Narration muted"
                            };
                            app.state_mut().set_status(status);
                        }
                        KeyAction::Quit | KeyAction::ToggleHelp | KeyAction::None => {}
                    }
                }
                Event::FocusGained | Event::FocusLost => {
                    let gained = matches!(event, Event::FocusGained);
                    for host in HostEvent::from_terminal_focus(gained) {
                        game.host_event(host).await;
                    }
                }
                _ => {}
            }
        }

        game.update(Instant::now()).await;
    }

    info!(found = game.stats().found, "Quit");
    Ok(())
}

fn list(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let tracker = new_tracker(&config, None)?;
    let all = tracker.all_combinations();

    for (i, combination) in all.iter().enumerate() {
        println!("{:3}. {}", i + 1, combination);
    }
    println!("{} combinations", all.len());
    Ok(())
}

async fn roll(cli: &Cli, count: usize, all: bool, seed: Option<u64>, speak: bool) -> Result<()> {
    let config = load_config(cli)?;
    let mut tracker = new_tracker(&config, seed)?;

    let mut player = if speak {
        let mut player = new_player(cli, &config)?;
        player.ensure_running().await;
        Some(player)
    } else {
        None
    };

    let total = tracker.stats().total;
    let rolls = if all { total } else { count };

    for _ in 0..rolls {
        match tracker.roll_once() {
            RollOutcome::Found(combination) => {
                let stats = tracker.stats();
                println!("{} ({}/{})", combination, stats.found, stats.total);

                if let Some(player) = player.as_mut() {
                    player.play_combination(&combination).await;
                    while player.is_playing() {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    }
                }
            }
            RollOutcome::Exhausted => break,
        }
    }

    if tracker.stats().found == total {
        println!("All {} combinations found!", total);
    }

    if let Some(player) = player.as_mut() {
        player.shutdown();
    }
    Ok(())
}

fn check_config(path: &Path) -> Result<()> {
    let config = validate_config(path)?;
    let dice = config.dice_set()?;

    println!("Configuration: {:?}", path);
    for axis in Axis::ALL {
        let die = dice.get(axis);
        println!(
            "  {:<10} {} faces, default {}: {}",
            die.name(),
            die.len(),
            die.default_face(),
            die.faces().join(", ")
        );
    }
    println!("  {} combinations", dice.total());

    let source = config.clip_source()?;
    let missing: Vec<_> = source.iter().filter(|(_, path)| !path.exists()).collect();
    if missing.is_empty() {
        println!("  All {} clips present", source.len());
    } else {
        for (key, path) in &missing {
            println!("  Missing clip {}: {:?}", key, path);
        }
        println!(
            "  {} of {} clips missing; those faces will be silent",
            missing.len(),
            source.len()
        );
    }
    Ok(())
}
