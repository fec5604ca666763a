//! Disassembler for the debugger's code pane
//!
//! Intcode has no separation between code and data, so disassembly is a
//! linear sweep that can fall out of step with the real instruction stream.
//! [`disassemble`] takes an anchor address (normally the instruction
//! pointer) and guarantees a line starts exactly there: any line that would
//! straddle the anchor is cut short and rendered as data.

use crate::interpreter::decode::{Instruction, ParameterMode};
use crate::memory::{Address, Memory, Word};

/// One rendered line of disassembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassembledLine {
    pub address: Address,
    pub words: Vec<Word>,
    pub text: String,
    pub is_instruction: bool,
}

fn format_operand(mode_digit: u8, raw: Word) -> String {
    match ParameterMode::from_digit(mode_digit) {
        Some(ParameterMode::Position) => format!("[{}]", raw),
        Some(ParameterMode::Immediate) => format!("#{}", raw),
        Some(ParameterMode::Relative) if raw < 0 => format!("rb{}", raw),
        Some(ParameterMode::Relative) => format!("rb+{}", raw),
        None => format!("?{}", raw),
    }
}

fn data_line(address: Address, words: Vec<Word>) -> DisassembledLine {
    let values: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    DisassembledLine {
        address,
        text: format!("DATA {}", values.join(", ")),
        words,
        is_instruction: false,
    }
}

/// Disassemble the instruction starting at `address`
pub fn disassemble_at(memory: &Memory, address: Address) -> DisassembledLine {
    let word = memory.read(address);
    match Instruction::decode(word, address) {
        Ok(instr) => {
            let words: Vec<Word> = (0..instr.width())
                .map(|offset| memory.read(address + offset))
                .collect();
            let operands: Vec<String> = words[1..]
                .iter()
                .enumerate()
                .map(|(index, raw)| format_operand(instr.mode_digit(index), *raw))
                .collect();
            let text = if operands.is_empty() {
                instr.opcode.mnemonic().to_string()
            } else {
                format!("{:<4}{}", instr.opcode.mnemonic(), operands.join(", "))
            };
            DisassembledLine {
                address,
                words,
                text,
                is_instruction: true,
            }
        }
        Err(_) => data_line(address, vec![word]),
    }
}

/// Linear-sweep disassembly of `memory` up to `end`, aligned on `anchor`
pub fn disassemble(memory: &Memory, anchor: Address, end: Address) -> Vec<DisassembledLine> {
    sweep(memory, 0, anchor, end)
}

/// Disassembly of the program image plus `context` words either side of
/// `anchor`
///
/// When the anchor is far past the image (a jump into sparse memory), the
/// gap between the image and the window is skipped instead of swept.
pub fn disassemble_window(memory: &Memory, anchor: Address, context: usize) -> Vec<DisassembledLine> {
    let image_end = memory.len();
    if anchor < image_end.saturating_add(context) {
        return sweep(memory, 0, anchor, image_end.max(anchor + 1));
    }

    let mut lines = sweep(memory, 0, image_end, image_end);
    lines.extend(sweep(
        memory,
        anchor - context,
        anchor,
        anchor.saturating_add(context),
    ));
    lines
}

fn sweep(memory: &Memory, start: Address, anchor: Address, end: Address) -> Vec<DisassembledLine> {
    let mut lines = Vec::new();
    let mut address = start;

    while address < end {
        let mut line = disassemble_at(memory, address);
        let next = address + line.words.len();

        if address < anchor && next > anchor {
            let words = line.words[..anchor - address].to_vec();
            line = data_line(address, words);
        }

        address += line.words.len();
        lines.push(line);
    }

    lines
}
