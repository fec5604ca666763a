//! Intcode execution engine
//!
//! This module provides the core execution logic:
//! - [`decode`]: Instruction words → opcode and parameter modes
//! - `ops`: Opcode dispatch table and handlers
//! - [`engine`]: The resumable [`Machine`](engine::Machine) and its configuration
//! - [`errors`]: Runtime error types
//! - [`console`]: Line-oriented console runner
//! - [`session`]: Snapshot-backed stepping for the debugger
//! - [`disasm`]: Instruction rendering for the debugger
//!
//! # Execution Model
//!
//! A machine fetches the word at its instruction pointer, decodes it, and
//! hands it to the handler registered for its opcode. The handler returns the
//! next pointer and an effect (output, input request, halt). When input runs
//! out, a suspending machine returns control to its caller with its pointer
//! still on the input instruction, and picks up there once fed.

pub mod console;
pub mod constants;
pub mod decode;
pub mod disasm;
pub mod engine;
pub mod errors;
pub(crate) mod ops;
pub mod session;
