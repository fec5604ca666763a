//! Opcode handlers and the dispatch table
//!
//! Every opcode maps to one handler with the same signature: it receives the
//! machine and the decoded instruction, performs its reads and writes, and
//! returns the next instruction pointer plus any effect the engine must act
//! on. Handlers never touch `ip` themselves; the engine commits `next_ip`
//! only after the handler succeeded, so a failing instruction leaves the
//! pointer on itself.

use crate::interpreter::decode::{Instruction, Opcode};
use crate::interpreter::engine::Machine;
use crate::interpreter::errors::RuntimeError;
use crate::memory::{Address, Word};

/// Side effect of an executed instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Effect {
    Continue,
    Output(Word),
    NeedsInput,
    Halt,
}

/// Where execution continues and what happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Flow {
    pub next_ip: Address,
    pub effect: Effect,
}

impl Flow {
    fn advance(machine: &Machine, instr: &Instruction) -> Self {
        Flow {
            next_ip: machine.ip() + instr.width(),
            effect: Effect::Continue,
        }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }
}

pub(crate) type Handler = fn(&mut Machine, &Instruction) -> Result<Flow, RuntimeError>;

/// Look up the handler for an opcode
pub(crate) fn handler(opcode: Opcode) -> Handler {
    match opcode {
        Opcode::Add => op_add,
        Opcode::Multiply => op_multiply,
        Opcode::Input => op_input,
        Opcode::Output => op_output,
        Opcode::JumpIfTrue => op_jump_if_true,
        Opcode::JumpIfFalse => op_jump_if_false,
        Opcode::LessThan => op_less_than,
        Opcode::Equals => op_equals,
        Opcode::AdjustRelativeBase => op_adjust_relative_base,
        Opcode::Halt => op_halt,
    }
}

fn arithmetic(
    machine: &mut Machine,
    instr: &Instruction,
    symbol: &str,
    apply: fn(Word, Word) -> Option<Word>,
) -> Result<Flow, RuntimeError> {
    let lhs = machine.read_param(instr, 0)?;
    let rhs = machine.read_param(instr, 1)?;
    let result = apply(lhs, rhs).ok_or_else(|| RuntimeError::IntegerOverflow {
        operation: format!("{} {} {}", lhs, symbol, rhs),
        ip: machine.ip(),
    })?;
    machine.write_param(instr, 2, result)?;
    Ok(Flow::advance(machine, instr))
}

fn op_add(machine: &mut Machine, instr: &Instruction) -> Result<Flow, RuntimeError> {
    arithmetic(machine, instr, "+", Word::checked_add)
}

fn op_multiply(machine: &mut Machine, instr: &Instruction) -> Result<Flow, RuntimeError> {
    arithmetic(machine, instr, "*", Word::checked_mul)
}

fn op_input(machine: &mut Machine, instr: &Instruction) -> Result<Flow, RuntimeError> {
    match machine.next_input() {
        Some(value) => {
            machine.write_param(instr, 0, value)?;
            Ok(Flow::advance(machine, instr))
        }
        None if machine.suspends_on_input() => Ok(Flow {
            next_ip: machine.ip(),
            effect: Effect::NeedsInput,
        }),
        None => Err(RuntimeError::InputExhausted { ip: machine.ip() }),
    }
}

fn op_output(machine: &mut Machine, instr: &Instruction) -> Result<Flow, RuntimeError> {
    let value = machine.read_param(instr, 0)?;
    Ok(Flow::advance(machine, instr).with_effect(Effect::Output(value)))
}

fn jump_if(
    machine: &mut Machine,
    instr: &Instruction,
    when_nonzero: bool,
) -> Result<Flow, RuntimeError> {
    let condition = machine.read_param(instr, 0)?;
    let target = machine.read_param(instr, 1)?;
    if (condition != 0) == when_nonzero {
        Ok(Flow {
            next_ip: machine.jump_target(target)?,
            effect: Effect::Continue,
        })
    } else {
        Ok(Flow::advance(machine, instr))
    }
}

fn op_jump_if_true(machine: &mut Machine, instr: &Instruction) -> Result<Flow, RuntimeError> {
    jump_if(machine, instr, true)
}

fn op_jump_if_false(machine: &mut Machine, instr: &Instruction) -> Result<Flow, RuntimeError> {
    jump_if(machine, instr, false)
}

fn compare(
    machine: &mut Machine,
    instr: &Instruction,
    predicate: fn(&Word, &Word) -> bool,
) -> Result<Flow, RuntimeError> {
    let lhs = machine.read_param(instr, 0)?;
    let rhs = machine.read_param(instr, 1)?;
    machine.write_param(instr, 2, Word::from(predicate(&lhs, &rhs)))?;
    Ok(Flow::advance(machine, instr))
}

fn op_less_than(machine: &mut Machine, instr: &Instruction) -> Result<Flow, RuntimeError> {
    compare(machine, instr, Word::lt)
}

fn op_equals(machine: &mut Machine, instr: &Instruction) -> Result<Flow, RuntimeError> {
    compare(machine, instr, Word::eq)
}

fn op_adjust_relative_base(
    machine: &mut Machine,
    instr: &Instruction,
) -> Result<Flow, RuntimeError> {
    let delta = machine.read_param(instr, 0)?;
    machine.adjust_relative_base(delta)?;
    Ok(Flow::advance(machine, instr))
}

fn op_halt(machine: &mut Machine, _instr: &Instruction) -> Result<Flow, RuntimeError> {
    Ok(Flow {
        next_ip: machine.ip(),
        effect: Effect::Halt,
    })
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::{Machine, Signal};
    use crate::interpreter::errors::RuntimeError;

    fn run(program: Vec<i64>, inputs: &[i64]) -> Vec<i64> {
        Machine::new(program)
            .run_to_halt(inputs.iter().copied())
            .unwrap()
    }

    #[test]
    fn test_equals_position_mode() {
        let program = vec![3, 9, 8, 9, 10, 9, 4, 9, 99, -1, 8];
        assert_eq!(run(program.clone(), &[8]), vec![1]);
        assert_eq!(run(program, &[7]), vec![0]);
    }

    #[test]
    fn test_less_than_immediate_mode() {
        let program = vec![3, 3, 1107, -1, 8, 3, 4, 3, 99];
        assert_eq!(run(program.clone(), &[5]), vec![1]);
        assert_eq!(run(program, &[8]), vec![0]);
    }

    #[test]
    fn test_jumps() {
        let position = vec![3, 12, 6, 12, 15, 1, 13, 14, 13, 4, 13, 99, -1, 0, 1, 9];
        assert_eq!(run(position.clone(), &[0]), vec![0]);
        assert_eq!(run(position, &[3]), vec![1]);

        let immediate = vec![3, 3, 1105, -1, 9, 1101, 0, 0, 12, 4, 12, 99, 1];
        assert_eq!(run(immediate.clone(), &[0]), vec![0]);
        assert_eq!(run(immediate, &[-4]), vec![1]);
    }

    #[test]
    fn test_compare_against_eight() {
        let program = vec![
            3, 21, 1008, 21, 8, 20, 1005, 20, 22, 107, 8, 21, 20, 1006, 20, 31, 1106, 0, 36, 98,
            0, 0, 1002, 21, 125, 20, 4, 20, 1105, 1, 46, 104, 999, 1105, 1, 46, 1101, 1000, 1, 20,
            4, 20, 1105, 1, 46, 98, 99,
        ];
        assert_eq!(run(program.clone(), &[7]), vec![999]);
        assert_eq!(run(program.clone(), &[8]), vec![1000]);
        assert_eq!(run(program, &[9]), vec![1001]);
    }

    #[test]
    fn test_negative_immediate_add() {
        let mut machine = Machine::new(vec![1101, 100, -1, 4, 0]);
        assert_eq!(machine.run().unwrap(), Signal::Halted);
        assert_eq!(machine.memory().read(4), 99);
    }

    #[test]
    fn test_relative_write() {
        let mut machine = Machine::new(vec![109, 10, 21101, 3, 4, 0, 99]);
        machine.run().unwrap();
        assert_eq!(machine.memory().read(10), 7);
        assert_eq!(machine.relative_base(), 10);
    }

    #[test]
    fn test_immediate_write_rejected() {
        let mut machine = Machine::new(vec![11101, 1, 1, 0, 99]);
        assert_eq!(
            machine.run().unwrap_err(),
            RuntimeError::ImmediateWrite { parameter: 3, ip: 0 }
        );
        assert_eq!(machine.ip(), 0);
    }

    #[test]
    fn test_negative_write_address() {
        let mut machine = Machine::new(vec![1101, 1, 1, -5, 99]);
        assert_eq!(
            machine.run().unwrap_err(),
            RuntimeError::InvalidMemoryIndex { address: -5, ip: 0 }
        );
    }

    #[test]
    fn test_negative_relative_address() {
        let mut machine = Machine::new(vec![109, -3, 204, 0, 99]);
        assert_eq!(
            machine.run().unwrap_err(),
            RuntimeError::InvalidMemoryIndex { address: -3, ip: 2 }
        );
    }

    #[test]
    fn test_negative_jump_target() {
        let mut machine = Machine::new(vec![1105, 1, -1]);
        assert!(matches!(
            machine.run(),
            Err(RuntimeError::InvalidJumpTarget { target: -1, ip: 0 })
        ));
    }

    #[test]
    fn test_invalid_mode_digit() {
        let mut machine = Machine::new(vec![304, 0, 99]);
        assert_eq!(
            machine.run().unwrap_err(),
            RuntimeError::InvalidParameterMode {
                mode: 3,
                parameter: 1,
                ip: 0
            }
        );
    }

    #[test]
    fn test_multiply_overflow() {
        let mut machine = Machine::new(vec![1102, i64::MAX, 2, 0, 99]);
        assert!(matches!(
            machine.run(),
            Err(RuntimeError::IntegerOverflow { ip: 0, .. })
        ));
    }

    #[test]
    fn test_large_multiply() {
        let mut machine = Machine::new(vec![1102, 34915192, 34915192, 7, 4, 7, 99, 0]);
        machine.run().unwrap();
        let output = machine.drain_output();
        assert_eq!(output, vec![1219070632396864]);
        assert_eq!(output[0].to_string().len(), 16);
    }

    #[test]
    fn test_running_off_the_image_fails() {
        let mut machine = Machine::new(vec![1101, 1, 1, 5]);
        assert!(matches!(
            machine.run(),
            Err(RuntimeError::UnsupportedOpcode { opcode: 0, ip: 4, .. })
        ));
    }
}
