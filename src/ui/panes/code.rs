//! Code pane rendering with operand highlighting
//!
//! This module renders the disassembly of the machine's memory, with the
//! instruction at the current pointer highlighted and kept at a fixed row
//! while stepping.
//!
//! # Features
//!
//! - Operand colouring by addressing mode (`[a]`, `#v`, `rb+o`)
//! - Current instruction highlighting with arrow indicator
//! - Marker on the instruction that produced the current state
//! - Error and input-wait highlighting of the current instruction

use crate::interpreter::disasm::DisassembledLine;
use crate::memory::Address;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn operand_style(operand: &str) -> Style {
    match operand.chars().next() {
        Some('[') => Style::default().fg(DEFAULT_THEME.position),
        Some('#') => Style::default().fg(DEFAULT_THEME.immediate),
        Some('r') => Style::default().fg(DEFAULT_THEME.relative),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Split a disassembled line into styled spans
fn highlight_line(line: &DisassembledLine) -> Vec<Span<'static>> {
    if !line.is_instruction {
        return vec![Span::styled(
            line.text.clone(),
            Style::default().fg(DEFAULT_THEME.comment),
        )];
    }

    let (mnemonic, operands) = match line.text.split_once(' ') {
        Some((mnemonic, rest)) => (mnemonic, rest.trim_start()),
        None => (line.text.as_str(), ""),
    };

    let mut spans = vec![Span::styled(
        format!("{:<4}", mnemonic),
        Style::default()
            .fg(DEFAULT_THEME.mnemonic)
            .add_modifier(Modifier::BOLD),
    )];

    for (index, operand) in operands.split(", ").filter(|o| !o.is_empty()).enumerate() {
        if index > 0 {
            spans.push(Span::raw(", "));
        }
        spans.push(Span::styled(operand.to_string(), operand_style(operand)));
    }
    spans
}

/// Scroll state for the code pane
pub struct CodeScrollState {
    pub offset: usize,
    pub target_line_row: Option<usize>,
}

impl CodeScrollState {
    pub fn new() -> Self {
        CodeScrollState {
            offset: 0,
            target_line_row: None,
        }
    }
}

impl Default for CodeScrollState {
    fn default() -> Self {
        Self::new()
    }
}

/// What the code pane needs from the session
pub struct CodeRenderData<'a> {
    pub lines: &'a [DisassembledLine],
    pub ip: Address,
    pub last_executed: Option<Address>,
    pub is_error: bool,
    pub is_awaiting_input: bool,
}

/// Render the code pane
pub fn render_code_pane(
    frame: &mut Frame,
    area: Rect,
    data: &CodeRenderData,
    is_focused: bool,
    scroll_state: &mut CodeScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Code ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let total_lines = data.lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    if let Some(current_idx) = data.lines.iter().position(|line| line.address == data.ip) {
        scroll_state.offset = current_idx.saturating_sub(target_row);
        if total_lines > visible_height {
            scroll_state.offset = scroll_state.offset.min(total_lines - visible_height);
        } else {
            scroll_state.offset = 0;
        }
    }

    let visible_lines: Vec<Line> = data
        .lines
        .iter()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|line| {
            let is_current = line.address == data.ip;
            let was_executed = data.last_executed == Some(line.address);

            let marker = if is_current {
                "▶ "
            } else if was_executed {
                "· "
            } else {
                "  "
            };
            let address_str = format!("{}{:5} ", marker, line.address);

            let (num_style, content_style) = if is_current && data.is_error {
                (
                    Style::default()
                        .fg(DEFAULT_THEME.error)
                        .add_modifier(Modifier::BOLD),
                    Some(
                        Style::default()
                            .bg(DEFAULT_THEME.error)
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                )
            } else if is_current && data.is_awaiting_input {
                (
                    Style::default()
                        .fg(DEFAULT_THEME.secondary)
                        .add_modifier(Modifier::BOLD),
                    Some(
                        Style::default()
                            .bg(DEFAULT_THEME.secondary)
                            .fg(Color::Black)
                            .add_modifier(Modifier::BOLD),
                    ),
                )
            } else if is_current {
                (
                    Style::default()
                        .fg(DEFAULT_THEME.secondary)
                        .add_modifier(Modifier::BOLD),
                    None,
                )
            } else {
                (Style::default().fg(DEFAULT_THEME.comment), None)
            };

            let mut spans = highlight_line(line);
            match content_style {
                // Error and input lines override operand colours
                Some(style) => spans.iter_mut().for_each(|span| span.style = style),
                None if is_current => spans.iter_mut().for_each(|span| {
                    span.style = span.style.bg(DEFAULT_THEME.current_line_bg)
                }),
                None => {}
            }

            let mut final_spans = vec![Span::styled(address_str, num_style)];
            final_spans.extend(spans);
            Line::from(final_spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}
