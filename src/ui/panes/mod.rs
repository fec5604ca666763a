//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`code`]: Disassembly with the current instruction highlighted
//! - [`registers`]: Instruction pointer, relative base and machine state
//! - [`memory`]: Word dump of the program image and sparse cells
//! - [`output`]: Values emitted by the machine so far
//! - [`status`]: Status bar with keybindings and execution state
//!
//! Each pane module exports a primary `render_*` function. Panes hold no
//! state of their own; scroll offsets live in the [`App`](crate::ui::App).

pub mod code;
pub mod memory;
pub mod output;
pub mod registers;
pub mod status;

pub use code::{render_code_pane, CodeRenderData, CodeScrollState};
pub use memory::render_memory_pane;
pub use output::render_output_pane;
pub use registers::render_registers_pane;
pub use status::{render_status_bar, StatusRenderData};
