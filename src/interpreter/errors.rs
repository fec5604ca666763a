//! Runtime error types for the Intcode machine
//!
//! This module defines [`RuntimeError`], which covers every failure a machine
//! can hit while executing (as opposed to program loading errors, see
//! [`crate::parser::ParseError`]).
//!
//! All runtime errors are fatal to the machine that raised them: the machine
//! moves to the failed state and reports the same error on every later step.

use crate::memory::{Address, Word};
use std::fmt;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// Instruction word whose opcode is not in the machine's instruction set
    UnsupportedOpcode { opcode: Word, word: Word, ip: Address },

    /// Parameter mode digit outside {0, 1, 2}, or not enabled for this machine
    InvalidParameterMode {
        mode: u8,
        parameter: usize,
        ip: Address,
    },

    /// Write parameter given in immediate mode
    ImmediateWrite { parameter: usize, ip: Address },

    /// Computed address is negative
    InvalidMemoryIndex { address: Word, ip: Address },

    /// Jump target is negative
    InvalidJumpTarget { target: Word, ip: Address },

    /// Input instruction reached with an empty queue on a non-suspending machine
    InputExhausted { ip: Address },

    /// Arithmetic result does not fit in a 64-bit word
    IntegerOverflow { operation: String, ip: Address },

    /// Configured step limit reached before the program halted
    StepLimitExceeded { limit: u64 },

    /// Console input line was not a signed integer
    InvalidInput { text: String },

    /// Console read or write failed
    Io { message: String },

    /// Snapshot history limit exceeded
    SnapshotLimitExceeded { current: usize, limit: usize },

    /// History/snapshot operation failed
    HistoryOperationFailed { message: String },
}

impl RuntimeError {
    /// Instruction pointer of the failing instruction, when there is one
    pub fn ip(&self) -> Option<Address> {
        match self {
            RuntimeError::UnsupportedOpcode { ip, .. } => Some(*ip),
            RuntimeError::InvalidParameterMode { ip, .. } => Some(*ip),
            RuntimeError::ImmediateWrite { ip, .. } => Some(*ip),
            RuntimeError::InvalidMemoryIndex { ip, .. } => Some(*ip),
            RuntimeError::InvalidJumpTarget { ip, .. } => Some(*ip),
            RuntimeError::InputExhausted { ip } => Some(*ip),
            RuntimeError::IntegerOverflow { ip, .. } => Some(*ip),
            RuntimeError::StepLimitExceeded { .. } => None,
            RuntimeError::InvalidInput { .. } => None,
            RuntimeError::Io { .. } => None,
            RuntimeError::SnapshotLimitExceeded { .. } => None,
            RuntimeError::HistoryOperationFailed { .. } => None,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UnsupportedOpcode { opcode, word, ip } => {
                write!(
                    f,
                    "Unsupported opcode {} (instruction {}) at ip {}",
                    opcode, word, ip
                )
            }
            RuntimeError::InvalidParameterMode {
                mode,
                parameter,
                ip,
            } => {
                write!(
                    f,
                    "Invalid parameter mode {} for parameter {} at ip {}",
                    mode, parameter, ip
                )
            }
            RuntimeError::ImmediateWrite { parameter, ip } => {
                write!(
                    f,
                    "Parameter {} is a write target but uses immediate mode at ip {}",
                    parameter, ip
                )
            }
            RuntimeError::InvalidMemoryIndex { address, ip } => {
                write!(f, "Invalid memory index {} at ip {}", address, ip)
            }
            RuntimeError::InvalidJumpTarget { target, ip } => {
                write!(f, "Invalid jump target {} at ip {}", target, ip)
            }
            RuntimeError::InputExhausted { ip } => {
                write!(f, "Input exhausted at ip {}", ip)
            }
            RuntimeError::IntegerOverflow { operation, ip } => {
                write!(f, "Integer overflow in {} at ip {}", operation, ip)
            }
            RuntimeError::StepLimitExceeded { limit } => {
                write!(f, "Step limit of {} instructions exceeded", limit)
            }
            RuntimeError::InvalidInput { text } => {
                write!(f, "Invalid input '{}' (expected a signed integer)", text)
            }
            RuntimeError::Io { message } => write!(f, "I/O error: {}", message),
            RuntimeError::SnapshotLimitExceeded { current, limit } => {
                write!(
                    f,
                    "Snapshot memory limit exceeded: {} bytes used, limit is {}",
                    current, limit
                )
            }
            RuntimeError::HistoryOperationFailed { message } => {
                write!(f, "History operation failed: {}", message)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        RuntimeError::Io {
            message: err.to_string(),
        }
    }
}
