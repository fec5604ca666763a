//! Registers pane: instruction pointer, relative base and machine state

use crate::interpreter::engine::{Machine, MachineState};
use crate::interpreter::errors::RuntimeError;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn state_label(state: MachineState) -> (&'static str, Style) {
    match state {
        MachineState::Running => ("RUNNING", Style::default().fg(DEFAULT_THEME.success)),
        MachineState::AwaitingInput => ("AWAITING INPUT", Style::default().fg(DEFAULT_THEME.secondary)),
        MachineState::Halted => ("HALTED", Style::default().fg(DEFAULT_THEME.primary)),
        MachineState::Failed => ("FAILED", Style::default().fg(DEFAULT_THEME.error)),
    }
}

fn row<'a>(label: &'a str, value: String, value_style: Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), Style::default().fg(DEFAULT_THEME.comment)),
        Span::styled(value, value_style),
    ])
}

/// Render the registers pane
pub fn render_registers_pane(
    frame: &mut Frame,
    area: Rect,
    machine: &Machine,
    error: Option<&RuntimeError>,
    is_focused: bool,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Registers ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let value_style = Style::default().fg(DEFAULT_THEME.fg);
    let (state_text, state_style) = state_label(machine.state());

    let pending: Vec<String> = machine.pending_input().iter().map(|v| v.to_string()).collect();
    let pending_text = if pending.is_empty() {
        "-".to_string()
    } else {
        pending.join(", ")
    };

    let mut lines = vec![
        row(
            "ip",
            machine.ip().to_string(),
            Style::default()
                .fg(DEFAULT_THEME.secondary)
                .add_modifier(Modifier::BOLD),
        ),
        row(
            "rb",
            machine.relative_base().to_string(),
            Style::default().fg(DEFAULT_THEME.relative),
        ),
        row("state", state_text.to_string(), state_style.add_modifier(Modifier::BOLD)),
        row("steps", machine.steps().to_string(), value_style),
        row("input", pending_text, value_style),
        row(
            "memory",
            format!(
                "{} cells (+{} sparse)",
                machine.memory().len(),
                machine.memory().overflow_len()
            ),
            value_style,
        ),
    ];

    if let Some(err) = error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(DEFAULT_THEME.error),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
