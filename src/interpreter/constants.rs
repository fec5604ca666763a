// Constants for the Intcode machine

/// Instruction words encode the opcode in their two lowest decimal digits
pub const OPCODE_MODULUS: i64 = 100;

/// Number of parameter mode digits decoded from an instruction word
pub const MODE_DIGITS: usize = 3;

/// Line written to the console output when a machine halts
pub const HALT_MARKER: &str = "exit";

/// Prompt shown when the console runner needs a value
pub const INPUT_PROMPT: &str = "Enter input (int): ";
