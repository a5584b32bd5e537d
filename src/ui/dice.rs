// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Dice display widget.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// One die as shown on screen
#[derive(Debug, Clone, PartialEq)]
pub struct DieFace {
    /// Die name, shown as the box title
    pub name: String,
    /// Face label currently up
    pub label: String,
}

impl DieFace {
    /// Create a die face
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

/// Widget showing the three dice side by side
pub struct DiceWidget<'a> {
    faces: &'a [DieFace],
    rolling: bool,
    block: Option<Block<'a>>,
}

impl<'a> DiceWidget<'a> {
    /// Create a new dice widget
    pub fn new(faces: &'a [DieFace]) -> Self {
        Self {
            faces,
            rolling: false,
            block: None,
        }
    }

    /// Show the dice mid-tumble
    pub fn rolling(mut self, rolling: bool) -> Self {
        self.rolling = rolling;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for DiceWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if self.faces.is_empty() {
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                self.faces
                    .iter()
                    .map(|_| Constraint::Ratio(1, self.faces.len() as u32))
                    .collect::<Vec<_>>(),
            )
            .split(area);

        for (face, chunk) in self.faces.iter().zip(chunks.iter()) {
            let border_style = if self.rolling {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            let die = Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!(" {} ", face.name));

            let style = if self.rolling {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC)
            } else {
                Style::default()
                    .fg(label_color(&face.label))
                    .add_modifier(Modifier::BOLD)
            };

            Paragraph::new(face.label.as_str())
                .style(style)
                .alignment(Alignment::Center)
                .block(die)
                .render(*chunk, buf);
        }
    }
}

/// Terminal color for a face label that names one
fn label_color(label: &str) -> Color {
    match label.to_ascii_lowercase().as_str() {
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" | "purple" => Color::Magenta,
        "cyan" => Color::Cyan,
        _ => Color::White,
    }
}
