//! Instruction decoding
//!
//! An instruction word packs the opcode into its two lowest decimal digits
//! and one mode digit per parameter above that, read right to left:
//!
//! ```text
//!   1002   →   0 1 0 | 02
//!              │ │ │    └─ opcode 2 (multiply)
//!              │ │ └────── parameter 1: position
//!              │ └──────── parameter 2: immediate
//!              └────────── parameter 3: position (missing digits are zero)
//! ```
//!
//! Mode digits are kept raw here. They are only checked when an operand is
//! resolved, so an instruction with a bad mode on a parameter it never
//! touches still executes.

use super::constants::{MODE_DIGITS, OPCODE_MODULUS};
use super::errors::RuntimeError;
use crate::memory::{Address, Word};

/// Operand addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterMode {
    /// Operand is the address of the value
    Position,
    /// Operand is the value itself (read-only)
    Immediate,
    /// Operand is an offset from the relative base
    Relative,
}

impl ParameterMode {
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(ParameterMode::Position),
            1 => Some(ParameterMode::Immediate),
            2 => Some(ParameterMode::Relative),
            _ => None,
        }
    }
}

/// Operation selected by an instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Multiply,
    Input,
    Output,
    JumpIfTrue,
    JumpIfFalse,
    LessThan,
    Equals,
    AdjustRelativeBase,
    Halt,
}

impl Opcode {
    pub fn from_code(code: Word) -> Option<Self> {
        match code {
            1 => Some(Opcode::Add),
            2 => Some(Opcode::Multiply),
            3 => Some(Opcode::Input),
            4 => Some(Opcode::Output),
            5 => Some(Opcode::JumpIfTrue),
            6 => Some(Opcode::JumpIfFalse),
            7 => Some(Opcode::LessThan),
            8 => Some(Opcode::Equals),
            9 => Some(Opcode::AdjustRelativeBase),
            99 => Some(Opcode::Halt),
            _ => None,
        }
    }

    pub fn code(self) -> Word {
        match self {
            Opcode::Add => 1,
            Opcode::Multiply => 2,
            Opcode::Input => 3,
            Opcode::Output => 4,
            Opcode::JumpIfTrue => 5,
            Opcode::JumpIfFalse => 6,
            Opcode::LessThan => 7,
            Opcode::Equals => 8,
            Opcode::AdjustRelativeBase => 9,
            Opcode::Halt => 99,
        }
    }

    /// Number of parameters following the instruction word
    pub fn arity(self) -> usize {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => 3,
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => 2,
            Opcode::Input | Opcode::Output | Opcode::AdjustRelativeBase => 1,
            Opcode::Halt => 0,
        }
    }

    /// Index of the parameter this opcode writes to, if any
    pub fn write_parameter(self) -> Option<usize> {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => Some(2),
            Opcode::Input => Some(0),
            _ => None,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Multiply => "MUL",
            Opcode::Input => "IN",
            Opcode::Output => "OUT",
            Opcode::JumpIfTrue => "JNZ",
            Opcode::JumpIfFalse => "JZ",
            Opcode::LessThan => "LT",
            Opcode::Equals => "EQ",
            Opcode::AdjustRelativeBase => "ARB",
            Opcode::Halt => "HLT",
        }
    }
}

/// A decoded instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub word: Word,
    pub opcode: Opcode,
    /// Raw mode digits; index 0 is the first parameter
    pub modes: [u8; MODE_DIGITS],
}

impl Instruction {
    /// Decode an instruction word fetched from `ip`
    ///
    /// Fails on negative words and unknown opcodes. Mode digits beyond the
    /// third address no parameter and are ignored.
    pub fn decode(word: Word, ip: Address) -> Result<Self, RuntimeError> {
        let code = word % OPCODE_MODULUS;
        let opcode = if word < 0 {
            None
        } else {
            Opcode::from_code(code)
        };
        let opcode = opcode.ok_or(RuntimeError::UnsupportedOpcode {
            opcode: code,
            word,
            ip,
        })?;

        let mut modes = [0u8; MODE_DIGITS];
        let mut digits = word / OPCODE_MODULUS;
        for mode in modes.iter_mut() {
            *mode = (digits % 10) as u8;
            digits /= 10;
        }

        Ok(Instruction {
            word,
            opcode,
            modes,
        })
    }

    /// Raw mode digit for a parameter (0-based)
    pub fn mode_digit(&self, parameter: usize) -> u8 {
        self.modes.get(parameter).copied().unwrap_or(0)
    }

    /// Total length in words, instruction word included
    pub fn width(&self) -> usize {
        1 + self.opcode.arity()
    }
}
