//! Status bar rendering with keybindings and state indicators

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Everything the status bar shows
pub struct StatusRenderData<'a> {
    pub message: &'a str,
    pub history_position: usize,
    pub total_snapshots: usize,
    pub is_error: bool,
    pub is_playing: bool,
    pub is_finished: bool,
    /// Text typed so far while the machine waits for input
    pub input_buffer: Option<&'a str>,
}

fn badge(text: &str, bg: Color) -> Span<'static> {
    Span::styled(
        format!(" {} ", text),
        Style::default()
            .bg(bg)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    )
}

/// Render the status bar at the bottom
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: &StatusRenderData) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let step_bg = if data.is_error {
        DEFAULT_THEME.error
    } else if data.input_buffer.is_some() {
        DEFAULT_THEME.secondary
    } else {
        DEFAULT_THEME.primary
    };

    let bar_style = Style::default().bg(DEFAULT_THEME.current_line_bg);
    let sep_style = bar_style.fg(DEFAULT_THEME.comment);

    let mut left_spans = vec![
        badge(
            &format!("Step {}/{}", data.history_position + 1, data.total_snapshots),
            step_bg,
        ),
        Span::styled(" | ", sep_style),
    ];

    match data.input_buffer {
        Some(buffer) => {
            left_spans.push(Span::styled(
                " Input: ",
                bar_style.fg(DEFAULT_THEME.secondary),
            ));
            left_spans.push(Span::styled(
                format!("{}▏", buffer),
                bar_style.fg(DEFAULT_THEME.fg).add_modifier(Modifier::BOLD),
            ));
        }
        None => left_spans.push(Span::styled(
            format!(" {} ", data.message),
            bar_style.fg(if data.is_error {
                DEFAULT_THEME.error
            } else {
                DEFAULT_THEME.fg
            }),
        )),
    }

    frame.render_widget(
        Paragraph::new(Line::from(left_spans))
            .style(bar_style)
            .alignment(Alignment::Left),
        layout[0],
    );

    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = bar_style.fg(DEFAULT_THEME.fg);

    let mut right_spans = Vec::new();
    for (index, (key, desc)) in [
        ("←/→", "step"),
        ("1-9", "n steps"),
        ("⎵", "play"),
        ("↵ / ⌫", "end/start"),
        ("tab", "focus"),
        ("q", "quit"),
    ]
    .iter()
    .enumerate()
    {
        if index > 0 {
            right_spans.push(Span::styled("│", sep_style));
            right_spans.push(Span::styled(" ", desc_style));
        }
        right_spans.push(Span::styled(format!(" {} ", key), key_style));
        right_spans.push(Span::styled(format!(" {} ", desc), desc_style));
    }

    let indicator = if data.input_buffer.is_some() {
        Some(badge("⌨ INPUT", DEFAULT_THEME.secondary))
    } else if data.is_playing {
        Some(badge("▶ PLAYING", DEFAULT_THEME.secondary))
    } else if data.is_error {
        Some(badge("ERROR", DEFAULT_THEME.error))
    } else if data.is_finished && data.history_position + 1 >= data.total_snapshots {
        Some(badge("HALTED", DEFAULT_THEME.error))
    } else if data.history_position == 0 {
        Some(badge("START", DEFAULT_THEME.success))
    } else {
        None
    };
    if let Some(indicator) = indicator {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(indicator);
    }

    frame.render_widget(
        Paragraph::new(Line::from(right_spans))
            .style(bar_style)
            .alignment(Alignment::Right),
        layout[1],
    );
}
