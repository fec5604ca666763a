//! Intcode program loader
//!
//! Intcode programs are plain text: a comma-separated list of signed
//! integers, usually on a single line. This module turns that text into the
//! initial memory image for a [`Machine`](crate::interpreter::engine::Machine).
//!
//! - [`parse`]: [`ParseError`] plus [`parse_program`] and [`load_program`]

pub mod parse;

pub use parse::{load_program, parse_program, ParseError};
