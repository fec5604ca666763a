//! Memory pane: a word dump of the flat image followed by the sparse cells
//!
//! Words belonging to the current instruction are highlighted. Sparse cells
//! (writes far past the program image) are listed individually, sorted by
//! address.

use crate::memory::{Address, Memory, Word};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::ops::Range;

/// Words shown per dump row
pub const WORDS_PER_ROW: usize = 8;

/// One row of the dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryRow {
    Cells { start: Address, values: Vec<Word> },
    Sparse { address: Address, value: Word },
}

/// Lay out `memory` as dump rows
pub fn memory_rows(memory: &Memory) -> Vec<MemoryRow> {
    let mut rows: Vec<MemoryRow> = memory
        .cells()
        .chunks(WORDS_PER_ROW)
        .enumerate()
        .map(|(index, chunk)| MemoryRow::Cells {
            start: index * WORDS_PER_ROW,
            values: chunk.to_vec(),
        })
        .collect();

    rows.extend(
        memory
            .overflow()
            .into_iter()
            .map(|(address, value)| MemoryRow::Sparse { address, value }),
    );
    rows
}

/// Render the memory pane
pub fn render_memory_pane(
    frame: &mut Frame,
    area: Rect,
    memory: &Memory,
    highlight: Range<Address>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Memory ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let rows = memory_rows(memory);
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    if rows.len() > visible_height {
        *scroll_offset = (*scroll_offset).min(rows.len() - visible_height);
    } else {
        *scroll_offset = 0;
    }

    let address_style = Style::default().fg(DEFAULT_THEME.comment);
    let value_style = Style::default().fg(DEFAULT_THEME.fg);
    let current_style = Style::default()
        .fg(DEFAULT_THEME.secondary)
        .bg(DEFAULT_THEME.current_line_bg)
        .add_modifier(Modifier::BOLD);

    let lines: Vec<Line> = rows
        .iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|row| match row {
            MemoryRow::Cells { start, values } => {
                let mut spans = vec![Span::styled(format!("{:6}│", start), address_style)];
                for (offset, value) in values.iter().enumerate() {
                    let style = if highlight.contains(&(start + offset)) {
                        current_style
                    } else {
                        value_style
                    };
                    spans.push(Span::styled(format!(" {:>6}", value), style));
                }
                Line::from(spans)
            }
            MemoryRow::Sparse { address, value } => Line::from(vec![
                Span::styled(format!("{:6}│", address), address_style),
                Span::styled(format!(" {:>6}", value), Style::default().fg(DEFAULT_THEME.relative)),
            ]),
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
