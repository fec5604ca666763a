//! Console I/O runner
//!
//! Drives a machine against a line-oriented reader and writer: every output
//! value is written as its own line, and whenever the machine runs dry on
//! input a line is read, optionally after printing a prompt. End of input
//! while the machine still wants a value is [`RuntimeError::InputExhausted`].

use crate::interpreter::constants::{HALT_MARKER, INPUT_PROMPT};
use crate::interpreter::engine::{Machine, Signal};
use crate::interpreter::errors::RuntimeError;
use crate::memory::Word;
use std::io::{BufRead, Write};

/// Connects a machine to a text reader and writer
pub struct Console<R, W> {
    reader: R,
    writer: W,
    prompt: bool,
    halt_marker: bool,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Console {
            reader,
            writer,
            prompt: false,
            halt_marker: false,
        }
    }

    /// Print a prompt before each read
    pub fn with_prompt(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }

    /// Write a final marker line when the machine halts
    pub fn with_halt_marker(mut self, halt_marker: bool) -> Self {
        self.halt_marker = halt_marker;
        self
    }

    /// Run the machine until it halts
    pub fn run(&mut self, machine: &mut Machine) -> Result<(), RuntimeError> {
        loop {
            let signal = machine.run();
            self.flush_output(machine)?;

            if signal? == Signal::Halted {
                if self.halt_marker {
                    writeln!(self.writer, "{}", HALT_MARKER)?;
                }
                self.writer.flush()?;
                return Ok(());
            }

            let value = self
                .read_value()?
                .ok_or(RuntimeError::InputExhausted { ip: machine.ip() })?;
            machine.push_input(value);
        }
    }

    fn flush_output(&mut self, machine: &mut Machine) -> Result<(), RuntimeError> {
        for value in machine.drain_output() {
            writeln!(self.writer, "{}", value)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Read the next non-blank line as a value; `None` at end of input
    fn read_value(&mut self) -> Result<Option<Word>, RuntimeError> {
        loop {
            if self.prompt {
                write!(self.writer, "{}", INPUT_PROMPT)?;
                self.writer.flush()?;
            }

            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }

            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            return text
                .parse::<Word>()
                .map(Some)
                .map_err(|_| RuntimeError::InvalidInput {
                    text: text.to_string(),
                });
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_console(program: Vec<Word>, stdin: &str, marker: bool) -> Result<String, RuntimeError> {
        let mut machine = Machine::new(program);
        let mut console =
            Console::new(Cursor::new(stdin.as_bytes()), Vec::new()).with_halt_marker(marker);
        console.run(&mut machine)?;
        Ok(String::from_utf8(console.into_writer()).unwrap())
    }

    #[test]
    fn test_echo_reads_line() {
        let out = run_console(vec![3, 0, 4, 0, 99], "42\n", false).unwrap();
        assert_eq!(out, "42\n");
    }

    #[test]
    fn test_halt_marker_written() {
        let out = run_console(vec![104, 5, 99], "", true).unwrap();
        assert_eq!(out, "5\nexit\n");
    }

    #[test]
    fn test_blank_lines_skipped() {
        let out = run_console(vec![3, 0, 4, 0, 99], "\n  \n-3\n", false).unwrap();
        assert_eq!(out, "-3\n");
    }

    #[test]
    fn test_end_of_input() {
        let err = run_console(vec![3, 0, 4, 0, 99], "", false).unwrap_err();
        assert_eq!(err, RuntimeError::InputExhausted { ip: 0 });
    }

    #[test]
    fn test_invalid_input() {
        let err = run_console(vec![3, 0, 99], "seven\n", false).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::InvalidInput {
                text: "seven".to_string()
            }
        );
    }

    #[test]
    fn test_prompt_precedes_read() {
        let mut machine = Machine::new(vec![3, 0, 4, 0, 99]);
        let mut console = Console::new(Cursor::new(&b"9\n"[..]), Vec::new()).with_prompt(true);
        console.run(&mut machine).unwrap();
        let out = String::from_utf8(console.into_writer()).unwrap();
        assert_eq!(out, format!("{}9\n", INPUT_PROMPT));
    }

    #[test]
    fn test_output_flushed_before_failure() {
        let mut machine = Machine::new(vec![104, 1, 42]);
        let mut console = Console::new(Cursor::new(&b""[..]), Vec::new());
        let err = console.run(&mut machine).unwrap_err();
        assert!(matches!(err, RuntimeError::UnsupportedOpcode { opcode: 42, .. }));
        assert_eq!(console.into_writer(), b"1\n".to_vec());
    }
}
