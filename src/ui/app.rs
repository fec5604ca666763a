//! Main TUI application state and logic

use crate::interpreter::decode::Instruction;
use crate::interpreter::disasm::disassemble_window;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::session::Session;
use crate::memory::Word;
use crate::ui::panes::{self, CodeRenderData, CodeScrollState, StatusRenderData};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Instructions executed by Enter before giving up on reaching a halt
const JUMP_STEP_LIMIT: usize = 1_000_000;

const PLAY_INTERVAL: Duration = Duration::from_millis(250);

/// Words disassembled either side of an ip outside the program image
const CODE_CONTEXT: usize = 64;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Code,
    Output,
    Registers,
    Memory,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: code -> output -> registers -> memory)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Code => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Registers,
            FocusedPane::Registers => FocusedPane::Memory,
            FocusedPane::Memory => FocusedPane::Code,
        }
    }
}

/// The main application state
pub struct App {
    pub session: Session,

    pub focused_pane: FocusedPane,

    /// Per-pane scroll state
    pub code_scroll: CodeScrollState,
    pub memory_scroll: usize,
    pub output_scroll: usize,

    pub should_quit: bool,
    pub status_message: String,

    /// Digits typed while the machine waits for input
    pub input_buffer: String,

    pub is_playing: bool,
    pub last_play_time: Instant,
}

impl App {
    pub fn new(session: Session) -> Self {
        App {
            session,
            focused_pane: FocusedPane::Code,
            code_scroll: CodeScrollState::new(),
            memory_scroll: 0,
            output_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
            input_buffer: String::new(),
            is_playing: false,
            last_play_time: Instant::now(),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= PLAY_INTERVAL {
                if !self.step_forward() || self.session.needs_input() {
                    self.is_playing = false;
                }
                self.last_play_time = Instant::now();
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn is_input_mode(&self) -> bool {
        self.session.needs_input()
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[0]);

        // Left column: Code (top) | Output (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        // Right column: Registers (top) | Memory (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(10), Constraint::Min(0)])
            .split(columns[1]);

        let machine = self.session.machine();
        let memory = machine.memory();
        let ip = machine.ip();
        let lines = disassemble_window(memory, ip, CODE_CONTEXT);
        let width = Instruction::decode(memory.read(ip), ip)
            .map(|instr| instr.width())
            .unwrap_or(1);
        let is_error = self.session.error().is_some() && self.session.is_at_head();

        panes::render_code_pane(
            frame,
            left_rows[0],
            &CodeRenderData {
                lines: &lines,
                ip,
                last_executed: self.session.last_executed_ip(),
                is_error,
                is_awaiting_input: self.is_input_mode(),
            },
            self.focused_pane == FocusedPane::Code,
            &mut self.code_scroll,
        );

        panes::render_output_pane(
            frame,
            left_rows[1],
            self.session.output(),
            self.focused_pane == FocusedPane::Output,
            &mut self.output_scroll,
        );

        panes::render_registers_pane(
            frame,
            right_rows[0],
            machine,
            if self.session.is_at_head() {
                self.session.error()
            } else {
                None
            },
            self.focused_pane == FocusedPane::Registers,
        );

        panes::render_memory_pane(
            frame,
            right_rows[1],
            memory,
            ip..ip + width,
            self.focused_pane == FocusedPane::Memory,
            &mut self.memory_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            &StatusRenderData {
                message: &self.status_message,
                history_position: self.session.history_position(),
                total_snapshots: self.session.total_snapshots(),
                is_error,
                is_playing: self.is_playing,
                is_finished: self.session.is_finished(),
                input_buffer: if self.is_input_mode() {
                    Some(self.input_buffer.as_str())
                } else {
                    None
                },
            },
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        if self.is_input_mode() && self.handle_input_key(key.code) {
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1);
                let mut stepped = 0;
                for _ in 0..n {
                    if self.session.needs_input() || !self.step_forward() {
                        break;
                    }
                    stepped += 1;
                }
                if stepped > 0 {
                    self.status_message = format!("Stepped forward {} step(s)", stepped);
                }
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.step_backward();
            }
            KeyCode::Right => {
                self.is_playing = false;
                if self.step_forward() {
                    self.status_message = "Stepped forward".to_string();
                }
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Code => {
                    if let Some(row) = self.code_scroll.target_line_row {
                        self.code_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Memory => self.memory_scroll = self.memory_scroll.saturating_sub(1),
                FocusedPane::Output => self.output_scroll = self.output_scroll.saturating_sub(1),
                FocusedPane::Registers => {}
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Code => {
                    if let Some(row) = self.code_scroll.target_line_row {
                        self.code_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Memory => self.memory_scroll = self.memory_scroll.saturating_add(1),
                FocusedPane::Output => self.output_scroll = self.output_scroll.saturating_add(1),
                FocusedPane::Registers => {}
            },
            KeyCode::Char(' ') => {
                self.is_playing = !self.is_playing;
                if self.is_playing {
                    self.last_play_time = Instant::now()
                        .checked_sub(PLAY_INTERVAL)
                        .unwrap_or_else(Instant::now);
                    self.status_message = "Playing...".to_string();
                } else {
                    self.status_message = "Paused".to_string();
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                match self.session.run_to_end(JUMP_STEP_LIMIT) {
                    Ok(executed) => {
                        self.status_message = if self.session.needs_input() {
                            format!("Ran {} step(s), waiting for input", executed)
                        } else {
                            format!("Jumped to end ({} new step(s))", executed)
                        };
                    }
                    Err(err) => self.report_error(&err),
                }
                self.output_scroll = usize::MAX;
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                match self.session.rewind_to_start() {
                    Ok(()) => self.status_message = "Jumped to start".to_string(),
                    Err(err) => self.report_error(&err),
                }
                self.output_scroll = usize::MAX;
            }
            _ => {}
        }
    }

    /// Keys that edit the input buffer; returns false for keys left to the
    /// normal bindings
    fn handle_input_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.input_buffer.push(c);
                true
            }
            KeyCode::Char('-') if self.input_buffer.is_empty() => {
                self.input_buffer.push('-');
                true
            }
            KeyCode::Backspace if !self.input_buffer.is_empty() => {
                self.input_buffer.pop();
                true
            }
            KeyCode::Esc => {
                self.input_buffer.clear();
                true
            }
            KeyCode::Enter => {
                self.submit_input();
                true
            }
            _ => false,
        }
    }

    fn submit_input(&mut self) {
        let text = std::mem::take(&mut self.input_buffer);
        let value: Word = match text.parse() {
            Ok(value) => value,
            Err(_) => {
                self.status_message = format!("Not an integer: '{}'", text);
                return;
            }
        };
        match self.session.provide_input(value) {
            Ok(()) => self.status_message = format!("Queued input {}", value),
            Err(err) => self.report_error(&err),
        }
    }

    fn report_error(&mut self, err: &RuntimeError) {
        self.status_message = match err {
            RuntimeError::HistoryOperationFailed { message } => message.clone(),
            other => format!("Error: {}", other),
        };
    }

    /// Step forward once; returns whether the cursor moved
    fn step_forward(&mut self) -> bool {
        let before = self.session.history_position();
        match self.session.step_forward() {
            Ok(_) => {
                self.output_scroll = usize::MAX;
                if self.session.needs_input() {
                    self.status_message = "Waiting for input".to_string();
                }
                self.session.history_position() != before
            }
            Err(err) => {
                self.report_error(&err);
                false
            }
        }
    }

    fn step_backward(&mut self) {
        match self.session.step_backward() {
            Ok(()) => {
                self.status_message = "Stepped backward".to_string();
                self.output_scroll = usize::MAX;
            }
            Err(err) => self.report_error(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::engine::Machine;
    use crossterm::event::KeyModifiers;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app_for(program: Vec<Word>) -> App {
        let session = Session::new(Machine::new(program), 16 * 1024 * 1024).unwrap();
        App::new(session)
    }

    #[test]
    fn test_arrow_keys_move_through_history() {
        let mut app = app_for(vec![104, 1, 104, 2, 99]);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.session.history_position(), 2);
        assert_eq!(app.session.output().values(), vec![1, 2]);

        press(&mut app, KeyCode::Left);
        assert_eq!(app.session.history_position(), 1);
        assert_eq!(app.session.output().values(), vec![1]);
    }

    #[test]
    fn test_digit_steps_and_enter_runs_to_halt() {
        let mut app = app_for(vec![104, 1, 104, 2, 104, 3, 99]);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.session.history_position(), 2);

        press(&mut app, KeyCode::Enter);
        assert!(app.session.is_finished());
        assert_eq!(app.session.output().values(), vec![1, 2, 3]);

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.session.history_position(), 0);
    }

    #[test]
    fn test_input_mode_feeds_machine() {
        let mut app = app_for(vec![3, 0, 4, 0, 99]);
        press(&mut app, KeyCode::Right);
        assert!(app.session.needs_input());

        // Digits go to the buffer instead of stepping
        press(&mut app, KeyCode::Char('-'));
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.input_buffer, "-42");
        assert_eq!(app.session.history_position(), 0);

        press(&mut app, KeyCode::Enter);
        assert!(!app.session.needs_input());
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.output().values(), vec![-42]);
    }

    #[test]
    fn test_quit_and_focus() {
        let mut app = app_for(vec![99]);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_pane, FocusedPane::Output);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
