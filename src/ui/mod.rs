// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal UI for the dice game.
//!
//! Provides a ratatui-based terminal interface with the three dice, a
//! progress gauge and a checklist of every combination.

mod checklist;
mod dice;

pub use self::checklist::{ChecklistEntry, ChecklistWidget};
pub use self::dice::{DiceWidget, DieFace};

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::seq::SliceRandom;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    Frame, Terminal,
};

use crate::dice::Axis;
use crate::game::Game;

/// How long a status message stays visible
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// UI-only state
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Help text visible
    pub show_help: bool,
    /// Status message
    pub status_message: Option<String>,
    /// Status message timestamp
    pub status_time: Option<Instant>,
}

impl UiState {
    /// Set a status message that will be displayed temporarily
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_time = Some(Instant::now());
    }

    /// Clear expired status message
    pub fn clear_expired_status(&mut self) {
        if let Some(time) = self.status_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_time = None;
            }
        }
    }

    /// Map a key press to an action, toggling help locally
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
        match (code, modifiers) {
            (KeyCode::Char('q'), KeyModifiers::NONE)
            | (KeyCode::Esc, _)
            | (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,

            (KeyCode::Char(' '), KeyModifiers::NONE)
            | (KeyCode::Char('r'), KeyModifiers::NONE)
            | (KeyCode::Enter, _) => KeyAction::Roll,

            (KeyCode::Char('m'), KeyModifiers::NONE) => KeyAction::ToggleAudio,

            (KeyCode::Char('?'), _) | (KeyCode::Char('h'), KeyModifiers::NONE) => {
                self.show_help = !self.show_help;
                KeyAction::ToggleHelp
            }

            _ => KeyAction::None,
        }
    }
}

/// Key event result
#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    /// No action needed
    None,
    /// Quit the application
    Quit,
    /// Roll the dice
    Roll,
    /// Mute or unmute narration
    ToggleAudio,
    /// Toggle help
    ToggleHelp,
}

/// Terminal UI application
pub struct App {
    state: UiState,
    terminal: Terminal<CrosstermBackend<Stdout>>,
    frame_rate: u32,
    running: bool,
}

impl App {
    /// Take over the terminal
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            state: UiState::default(),
            terminal,
            frame_rate: 30,
            running: true,
        })
    }

    /// UI state
    pub fn state_mut(&mut self) -> &mut UiState {
        &mut self.state
    }

    /// Check if running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the app
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Handle a key event
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
        let action = self.state.handle_key(code, modifiers);
        if action == KeyAction::Quit {
            self.quit();
        }
        action
    }

    /// Poll for events with timeout
    pub fn poll_event(&self) -> io::Result<Option<Event>> {
        let timeout = Duration::from_millis(1000 / self.frame_rate as u64);
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, game: &Game) -> io::Result<()> {
        self.state.clear_expired_status();
        let state = &self.state;

        let faces = die_faces(game);
        let entries = checklist_entries(game);

        self.terminal.draw(|frame| {
            let area = frame.area();

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Header
                    Constraint::Length(5), // Dice
                    Constraint::Length(3), // Progress
                    Constraint::Min(4),    // Checklist
                    Constraint::Length(1), // Status bar
                ])
                .split(area);

            render_header(frame, chunks[0], game);

            let dice = DiceWidget::new(&faces)
                .rolling(game.is_rolling())
                .block(Block::default().borders(Borders::ALL).title(" Dice "));
            frame.render_widget(dice, chunks[1]);

            render_progress(frame, chunks[2], game);

            let latest = (!game.is_rolling() && game.stats().found > 0).then(|| game.showing());
            let checklist = ChecklistWidget::new(&entries)
                .latest(latest)
                .block(Block::default().borders(Borders::ALL).title(" Combinations "));
            frame.render_widget(checklist, chunks[3]);

            render_status_bar(frame, chunks[4], state);

            if state.show_help {
                render_help_overlay(frame, area);
            }
        })?;

        Ok(())
    }

    /// Cleanup terminal on drop
    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableFocusChange
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Faces to draw: random ones while tumbling, the revealed roll otherwise
pub fn die_faces(game: &Game) -> Vec<DieFace> {
    let tracker = game.tracker();
    let mut rng = rand::thread_rng();

    Axis::ALL
        .iter()
        .map(|&axis| {
            let name = tracker.dice().get(axis).name();
            let label = if game.is_rolling() {
                tracker
                    .faces(axis)
                    .choose(&mut rng)
                    .map(String::as_str)
                    .unwrap_or_default()
            } else {
                game.showing().label(axis)
            };
            DieFace::new(name, label)
        })
        .collect()
}

/// Every combination in sorted order with its found flag
pub fn checklist_entries(game: &Game) -> Vec<ChecklistEntry> {
    game.tracker()
        .all_combinations()
        .into_iter()
        .map(|combination| ChecklistEntry {
            found: game.is_revealed(&combination),
            combination,
        })
        .collect()
}

/// Title, progress and narration state
fn render_header(frame: &mut Frame, area: Rect, game: &Game) {
    let block = Block::default().borders(Borders::ALL).title(" Festive Dice ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let stats = game.stats();
    let progress = if game.is_complete() {
        Span::styled(
            format!("All {} combinations found!", stats.total),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            format!("Found {} of {}", stats.found, stats.total),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )
    };

    let player = game.player();
    let narration = if !player.is_enabled() {
        Span::styled("  🔇 muted", Style::default().fg(Color::DarkGray))
    } else if player.is_degraded() {
        Span::styled("  no audio device", Style::default().fg(Color::Red))
    } else {
        Span::styled("  🔊 narration on", Style::default().fg(Color::Green))
    };

    frame.render_widget(Paragraph::new(Line::from(vec![progress, narration])), inner);
}

/// Gauge of found / total
fn render_progress(frame: &mut Frame, area: Rect, game: &Game) {
    let stats = game.stats();
    let ratio = if stats.total == 0 {
        0.0
    } else {
        stats.found as f64 / stats.total as f64
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Progress "))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{}/{}", stats.found, stats.total));
    frame.render_widget(gauge, area);
}

/// Render status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &UiState) {
    let text = if let Some(ref msg) = state.status_message {
        Span::styled(msg, Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            " Space/r: Roll | m: Narration | h: Help | q: Quit",
            Style::default().fg(Color::DarkGray),
        )
    };

    frame.render_widget(Paragraph::new(text), area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 44.min(area.width.saturating_sub(4));
    let height = 11.min(area.height.saturating_sub(4));
    let x = (area.width - width) / 2;
    let y = (area.height - height) / 2;
    let help_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let help_text = vec![
        Line::from(Span::styled("Dice", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  Space/r/Enter  Roll"),
        Line::from("  m              Narration on/off"),
        Line::from(""),
        Line::from(Span::styled("Other", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  h/?            Toggle help"),
        Line::from("  q/Esc/Ctrl+c   Quit"),
    ];

    frame.render_widget(Paragraph::new(help_text), inner);
}
