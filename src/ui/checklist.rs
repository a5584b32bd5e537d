// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Checklist of every combination.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::dice::Combination;

/// A combination and whether it has been found
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistEntry {
    /// The combination
    pub combination: Combination,
    /// Found yet
    pub found: bool,
}

/// Widget listing all combinations in columns, filled top to bottom
pub struct ChecklistWidget<'a> {
    entries: &'a [ChecklistEntry],
    latest: Option<&'a Combination>,
    block: Option<Block<'a>>,
}

impl<'a> ChecklistWidget<'a> {
    /// Create a new checklist widget
    pub fn new(entries: &'a [ChecklistEntry]) -> Self {
        Self {
            entries,
            latest: None,
            block: None,
        }
    }

    /// Highlight the most recent find
    pub fn latest(mut self, combination: Option<&'a Combination>) -> Self {
        self.latest = combination;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Column width wide enough for the longest entry plus its marker
    fn column_width(&self) -> u16 {
        let longest = self
            .entries
            .iter()
            .map(|e| e.combination.key().chars().count())
            .max()
            .unwrap_or(0);
        (longest + 4) as u16
    }
}

impl Widget for ChecklistWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if self.entries.is_empty() {
            Paragraph::new("No combinations")
                .style(Style::default().fg(Color::DarkGray))
                .render(area, buf);
            return;
        }
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = self.column_width().min(area.width);
        let rows = area.height as usize;

        for (column, chunk) in self.entries.chunks(rows).enumerate() {
            let x = area.x + column as u16 * width;
            if x >= area.x + area.width {
                break;
            }
            let column_area = Rect::new(x, area.y, width.min(area.x + area.width - x), area.height);

            let lines: Vec<Line> = chunk
                .iter()
                .map(|entry| entry_line(entry, self.latest == Some(&entry.combination)))
                .collect();
            Paragraph::new(lines).render(column_area, buf);
        }
    }
}

fn entry_line(entry: &ChecklistEntry, latest: bool) -> Line<'static> {
    let (marker, style) = if latest {
        (
            "★ ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )
    } else if entry.found {
        ("✓ ", Style::default().fg(Color::Green))
    } else {
        ("· ", Style::default().fg(Color::DarkGray))
    };

    Line::from(vec![
        Span::styled(marker, style),
        Span::styled(entry.combination.key(), style),
    ])
}
