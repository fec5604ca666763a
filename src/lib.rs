//! # Introduction
//!
//! An Intcode virtual machine with a time-travel debugger. Programs are
//! comma-separated integer images; a [`interpreter::engine::Machine`]
//! executes them one instruction at a time and can suspend when it runs out
//! of input, so several machines can be wired into pipelines and driven from
//! a single thread.
//!
//! ## Execution pipeline
//!
//! ```text
//! Text → Parser → Memory → Machine → Snapshots → TUI
//!                              ↘ Pipelines / Robot / Search
//! ```
//!
//! 1. [`parser`]: parses program text into a word vector.
//! 2. [`memory`]: program image plus a zero-default sparse overflow store.
//! 3. [`interpreter`]: decoding, the opcode dispatch table, the resumable
//!    machine, the console runner and the snapshot-backed session.
//! 4. [`snapshot`]: snapshot history with a memory budget and an output log.
//! 5. [`pipeline`]: amplifier chains and feedback rings.
//! 6. [`search`] and [`robot`]: drivers that patch memory or exchange values
//!    with a machine.
//! 7. [`ui`]: ratatui-based debugger; not part of the stable library API.
//!
//! ## Instruction set
//!
//! `1` add, `2` multiply, `3` input, `4` output, `5` jump-if-true,
//! `6` jump-if-false, `7` less-than, `8` equals, `9` adjust relative base,
//! `99` halt. Parameters are in position, immediate or relative mode.

pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod pipeline;
pub mod robot;
pub mod search;
pub mod snapshot;
pub mod ui;
