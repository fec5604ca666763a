//! Output pane rendering
//!
//! Each emitted value is shown with the address of the output instruction
//! that produced it. Values in the printable ASCII range also show their
//! character, which makes text-producing programs readable while stepping.

use crate::snapshot::{OutputEntry, OutputLog};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

fn entry_line(entry: &OutputEntry, text: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("@{:<5} ", entry.ip),
            Style::default().fg(DEFAULT_THEME.comment),
        ),
        Span::styled(text.to_string(), Style::default().fg(DEFAULT_THEME.fg)),
    ])
}

/// Render the machine's output log
pub fn render_output_pane(
    frame: &mut Frame,
    area: Rect,
    output: &OutputLog,
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
        .title(format!(" Output ({}) ", output.len()))
        .borders(Borders::ALL)
        .border_style(border_style);

    if output.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let total = output.len();
    // usize::MAX (set after each step) pins the view to the newest value
    if total > visible_height {
        *scroll_offset = (*scroll_offset).min(total - visible_height);
    } else {
        *scroll_offset = 0;
    }

    let items: Vec<ListItem> = output
        .entries
        .iter()
        .zip(output.get_output())
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(entry, text)| ListItem::new(entry_line(entry, &text)))
        .collect();

    let list = List::new(items).block(block.padding(Padding::new(1, 0, 0, 0)));
    frame.render_widget(list, area);
}
