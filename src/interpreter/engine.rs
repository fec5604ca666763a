// Execution engine for the Intcode machine

use crate::interpreter::decode::{Instruction, Opcode, ParameterMode};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops::{self, Effect};
use crate::memory::{to_address, Address, Memory, Word};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Which opcodes and parameter modes a machine accepts
///
/// The interpreter grew in stages; older programs were written against a
/// smaller instruction set and are expected to fail loudly on anything newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionSet {
    /// Add, multiply and halt; position mode only
    Basic,
    /// Adds I/O, jumps and comparisons; position and immediate modes
    Extended,
    /// Adds relative mode and relative base adjustment
    Full,
}

impl InstructionSet {
    pub fn supports(self, opcode: Opcode) -> bool {
        match self {
            InstructionSet::Basic => {
                matches!(opcode, Opcode::Add | Opcode::Multiply | Opcode::Halt)
            }
            InstructionSet::Extended => opcode != Opcode::AdjustRelativeBase,
            InstructionSet::Full => true,
        }
    }

    pub fn supports_mode(self, mode: ParameterMode) -> bool {
        match self {
            InstructionSet::Basic => mode == ParameterMode::Position,
            InstructionSet::Extended => mode != ParameterMode::Relative,
            InstructionSet::Full => true,
        }
    }
}

/// Machine capabilities and guards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    pub instruction_set: InstructionSet,
    /// Suspend on an empty input queue instead of failing
    pub suspend_on_input: bool,
    /// Fail once this many instructions have executed
    pub step_limit: Option<u64>,
}

impl MachineConfig {
    /// Add/multiply machine without I/O
    pub fn day2() -> Self {
        MachineConfig {
            instruction_set: InstructionSet::Basic,
            suspend_on_input: false,
            step_limit: None,
        }
    }

    /// I/O, jumps and comparisons, no relative mode
    pub fn day5() -> Self {
        MachineConfig {
            instruction_set: InstructionSet::Extended,
            ..MachineConfig::full()
        }
    }

    /// Complete instruction set with suspension on input
    pub fn full() -> Self {
        MachineConfig {
            instruction_set: InstructionSet::Full,
            suspend_on_input: true,
            step_limit: None,
        }
    }

    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    pub fn with_suspension(mut self, suspend: bool) -> Self {
        self.suspend_on_input = suspend;
        self
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::full()
    }
}

/// Lifecycle state of a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    Running,
    AwaitingInput,
    Halted,
    Failed,
}

/// Result of executing a single instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Instruction executed, nothing observable happened
    Continue,
    /// Instruction appended a value to the output queue
    Output(Word),
    /// Input instruction found the queue empty; ip was not advanced
    NeedsInput,
    /// Halt instruction reached
    Halted,
}

/// Reason a run returned control to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Halted,
    NeedsInput,
    Output(Word),
}

/// A single Intcode machine
///
/// Owns its memory, instruction pointer, relative base and both I/O queues.
/// All of it survives suspension, so a machine that returned
/// [`Signal::NeedsInput`] resumes exactly where it stopped once fed.
#[derive(Debug, Clone)]
pub struct Machine {
    pub(crate) memory: Memory,
    pub(crate) ip: Address,
    pub(crate) relative_base: Word,
    pub(crate) input: VecDeque<Word>,
    pub(crate) output: VecDeque<Word>,
    state: MachineState,
    config: MachineConfig,
    steps: u64,
    failure: Option<RuntimeError>,
}

impl Machine {
    /// Create a machine with the full instruction set
    pub fn new(program: Vec<Word>) -> Self {
        Self::with_config(program, MachineConfig::default())
    }

    pub fn with_config(program: Vec<Word>, config: MachineConfig) -> Self {
        Machine {
            memory: Memory::new(program),
            ip: 0,
            relative_base: 0,
            input: VecDeque::new(),
            output: VecDeque::new(),
            state: MachineState::Running,
            config,
            steps: 0,
            failure: None,
        }
    }

    /// Queue one input value
    pub fn push_input(&mut self, value: Word) {
        self.input.push_back(value);
        if self.state == MachineState::AwaitingInput {
            self.state = MachineState::Running;
        }
    }

    /// Queue several input values in order
    pub fn extend_input<I: IntoIterator<Item = Word>>(&mut self, values: I) {
        for value in values {
            self.push_input(value);
        }
    }

    /// Remove and return the oldest queued output
    pub fn take_output(&mut self) -> Option<Word> {
        self.output.pop_front()
    }

    /// Remove and return all queued output
    pub fn drain_output(&mut self) -> Vec<Word> {
        self.output.drain(..).collect()
    }

    /// Execute one instruction
    ///
    /// A halted machine stays halted and reports [`StepOutcome::Halted`]
    /// again. A failed machine reports its first error again.
    pub fn step(&mut self) -> Result<StepOutcome, RuntimeError> {
        match self.state {
            MachineState::Halted => return Ok(StepOutcome::Halted),
            MachineState::Failed => {
                if let Some(err) = &self.failure {
                    return Err(err.clone());
                }
            }
            MachineState::Running | MachineState::AwaitingInput => {}
        }

        match self.execute_instruction() {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                debug!(ip = self.ip, error = %err, "machine failed");
                self.state = MachineState::Failed;
                self.failure = Some(err.clone());
                Err(err)
            }
        }
    }

    fn execute_instruction(&mut self) -> Result<StepOutcome, RuntimeError> {
        if let Some(limit) = self.config.step_limit {
            if self.steps >= limit {
                return Err(RuntimeError::StepLimitExceeded { limit });
            }
        }

        let word = self.memory.read(self.ip);
        let instr = Instruction::decode(word, self.ip)?;
        if !self.config.instruction_set.supports(instr.opcode) {
            return Err(RuntimeError::UnsupportedOpcode {
                opcode: instr.opcode.code(),
                word,
                ip: self.ip,
            });
        }

        trace!(
            ip = self.ip,
            word,
            op = instr.opcode.mnemonic(),
            relative_base = self.relative_base,
            "execute"
        );

        let handler = ops::handler(instr.opcode);
        let flow = handler(self, &instr)?;

        let outcome = match flow.effect {
            Effect::Continue => StepOutcome::Continue,
            Effect::Output(value) => {
                self.output.push_back(value);
                StepOutcome::Output(value)
            }
            Effect::NeedsInput => {
                debug!(ip = self.ip, "awaiting input");
                self.state = MachineState::AwaitingInput;
                return Ok(StepOutcome::NeedsInput);
            }
            Effect::Halt => {
                debug!(ip = self.ip, steps = self.steps + 1, "halted");
                self.state = MachineState::Halted;
                StepOutcome::Halted
            }
        };

        self.ip = flow.next_ip;
        self.steps += 1;
        Ok(outcome)
    }

    /// Run until the machine halts or needs input
    ///
    /// Output accumulates in the output queue. Never returns
    /// [`Signal::Output`].
    pub fn run(&mut self) -> Result<Signal, RuntimeError> {
        loop {
            match self.step()? {
                StepOutcome::Continue | StepOutcome::Output(_) => {}
                StepOutcome::NeedsInput => return Ok(Signal::NeedsInput),
                StepOutcome::Halted => return Ok(Signal::Halted),
            }
        }
    }

    /// Run until the next output, halt, or input request
    ///
    /// An emitted value is handed to the caller instead of staying queued.
    pub fn run_until_signal(&mut self) -> Result<Signal, RuntimeError> {
        loop {
            match self.step()? {
                StepOutcome::Continue => {}
                StepOutcome::Output(value) => {
                    self.output.pop_back();
                    return Ok(Signal::Output(value));
                }
                StepOutcome::NeedsInput => return Ok(Signal::NeedsInput),
                StepOutcome::Halted => return Ok(Signal::Halted),
            }
        }
    }

    /// Run a program to completion with the given inputs
    ///
    /// Running out of input is an error here rather than a suspension.
    pub fn run_to_halt<I: IntoIterator<Item = Word>>(
        &mut self,
        inputs: I,
    ) -> Result<Vec<Word>, RuntimeError> {
        self.extend_input(inputs);
        match self.run()? {
            Signal::Halted => Ok(self.drain_output()),
            _ => Err(RuntimeError::InputExhausted { ip: self.ip }),
        }
    }

    // ========== Operand access used by the opcode handlers ==========

    fn parameter(&self, index: usize) -> Word {
        self.memory.read(self.ip + 1 + index)
    }

    fn mode(&self, instr: &Instruction, index: usize) -> Result<ParameterMode, RuntimeError> {
        let digit = instr.mode_digit(index);
        ParameterMode::from_digit(digit)
            .filter(|mode| self.config.instruction_set.supports_mode(*mode))
            .ok_or(RuntimeError::InvalidParameterMode {
                mode: digit,
                parameter: index + 1,
                ip: self.ip,
            })
    }

    fn address(&self, value: Word) -> Result<Address, RuntimeError> {
        to_address(value).ok_or(RuntimeError::InvalidMemoryIndex {
            address: value,
            ip: self.ip,
        })
    }

    fn relative_address(&self, offset: Word) -> Result<Address, RuntimeError> {
        let address = offset.checked_add(self.relative_base).ok_or_else(|| {
            RuntimeError::IntegerOverflow {
                operation: format!("{} + relative base {}", offset, self.relative_base),
                ip: self.ip,
            }
        })?;
        self.address(address)
    }

    /// Resolve a parameter to the value it denotes
    pub(crate) fn read_param(
        &self,
        instr: &Instruction,
        index: usize,
    ) -> Result<Word, RuntimeError> {
        let raw = self.parameter(index);
        match self.mode(instr, index)? {
            ParameterMode::Position => Ok(self.memory.read(self.address(raw)?)),
            ParameterMode::Immediate => Ok(raw),
            ParameterMode::Relative => Ok(self.memory.read(self.relative_address(raw)?)),
        }
    }

    /// Write through a parameter, which must not be immediate
    pub(crate) fn write_param(
        &mut self,
        instr: &Instruction,
        index: usize,
        value: Word,
    ) -> Result<(), RuntimeError> {
        let raw = self.parameter(index);
        let address = match self.mode(instr, index)? {
            ParameterMode::Position => self.address(raw)?,
            ParameterMode::Relative => self.relative_address(raw)?,
            ParameterMode::Immediate => {
                return Err(RuntimeError::ImmediateWrite {
                    parameter: index + 1,
                    ip: self.ip,
                });
            }
        };
        trace!(address, value, "write");
        self.memory.write(address, value);
        Ok(())
    }

    pub(crate) fn jump_target(&self, target: Word) -> Result<Address, RuntimeError> {
        to_address(target).ok_or(RuntimeError::InvalidJumpTarget {
            target,
            ip: self.ip,
        })
    }

    pub(crate) fn adjust_relative_base(&mut self, delta: Word) -> Result<(), RuntimeError> {
        self.relative_base = self.relative_base.checked_add(delta).ok_or_else(|| {
            RuntimeError::IntegerOverflow {
                operation: format!("relative base {} + {}", self.relative_base, delta),
                ip: self.ip,
            }
        })?;
        Ok(())
    }

    pub(crate) fn next_input(&mut self) -> Option<Word> {
        self.input.pop_front()
    }

    pub(crate) fn suspends_on_input(&self) -> bool {
        self.config.suspend_on_input
    }

    // ========== Getters ==========

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Mutable memory access, for patching a program before it runs
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn ip(&self) -> Address {
        self.ip
    }

    pub fn relative_base(&self) -> Word {
        self.relative_base
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Number of instructions executed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn pending_input(&self) -> &VecDeque<Word> {
        &self.input
    }

    pub fn pending_output(&self) -> &VecDeque<Word> {
        &self.output
    }

    /// The error that stopped this machine, if it failed
    pub fn failure(&self) -> Option<&RuntimeError> {
        self.failure.as_ref()
    }

    pub fn is_halted(&self) -> bool {
        self.state == MachineState::Halted
    }

    /// Rough size of this machine in bytes, used for snapshot budgeting
    pub fn estimated_size(&self) -> usize {
        let word = std::mem::size_of::<Word>();
        self.memory.estimated_size() + (self.input.len() + self.output.len()) * word
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_in_place() {
        let mut machine = Machine::new(vec![1, 0, 0, 0, 99]);
        assert_eq!(machine.run().unwrap(), Signal::Halted);
        assert_eq!(machine.memory().read(0), 2);
        assert_eq!(machine.ip(), 4);
    }

    #[test]
    fn test_halted_machine_stays_halted() {
        let mut machine = Machine::new(vec![99]);
        assert_eq!(machine.step().unwrap(), StepOutcome::Halted);
        assert_eq!(machine.step().unwrap(), StepOutcome::Halted);
        assert_eq!(machine.steps(), 1);
        assert_eq!(machine.ip(), 0);
    }

    #[test]
    fn test_suspend_keeps_ip_on_input() {
        let mut machine = Machine::new(vec![3, 0, 4, 0, 99]);
        assert_eq!(machine.step().unwrap(), StepOutcome::NeedsInput);
        assert_eq!(machine.state(), MachineState::AwaitingInput);
        assert_eq!(machine.ip(), 0);
        assert_eq!(machine.steps(), 0);

        machine.push_input(5);
        assert_eq!(machine.state(), MachineState::Running);
        assert_eq!(machine.run().unwrap(), Signal::Halted);
        assert_eq!(machine.drain_output(), vec![5]);
    }

    #[test]
    fn test_input_exhausted_without_suspension() {
        let config = MachineConfig::full().with_suspension(false);
        let mut machine = Machine::with_config(vec![3, 0, 99], config);
        assert_eq!(
            machine.run().unwrap_err(),
            RuntimeError::InputExhausted { ip: 0 }
        );
        assert_eq!(machine.state(), MachineState::Failed);
    }

    #[test]
    fn test_failed_machine_repeats_error() {
        let mut machine = Machine::new(vec![42]);
        let first = machine.step().unwrap_err();
        let second = machine.step().unwrap_err();
        assert_eq!(first, second);
        assert_eq!(machine.failure(), Some(&first));
    }

    #[test]
    fn test_basic_set_rejects_io() {
        let mut machine = Machine::with_config(vec![3, 0, 99], MachineConfig::day2());
        assert!(matches!(
            machine.run(),
            Err(RuntimeError::UnsupportedOpcode { opcode: 3, ip: 0, .. })
        ));
    }

    #[test]
    fn test_basic_set_rejects_immediate_mode() {
        let mut machine = Machine::with_config(vec![1101, 1, 1, 0, 99], MachineConfig::day2());
        assert!(matches!(
            machine.run(),
            Err(RuntimeError::InvalidParameterMode { mode: 1, parameter: 1, .. })
        ));
    }

    #[test]
    fn test_extended_set_rejects_relative() {
        let mut machine = Machine::with_config(vec![109, 1, 99], MachineConfig::day5());
        assert!(matches!(
            machine.run(),
            Err(RuntimeError::UnsupportedOpcode { opcode: 9, .. })
        ));

        let mut machine = Machine::with_config(vec![204, 0, 99], MachineConfig::day5());
        assert!(matches!(
            machine.run(),
            Err(RuntimeError::InvalidParameterMode { mode: 2, .. })
        ));
    }

    #[test]
    fn test_step_limit() {
        // Jump to itself forever
        let config = MachineConfig::full().with_step_limit(10);
        let mut machine = Machine::with_config(vec![1105, 1, 0], config);
        assert_eq!(
            machine.run().unwrap_err(),
            RuntimeError::StepLimitExceeded { limit: 10 }
        );
        assert_eq!(machine.steps(), 10);
    }

    #[test]
    fn test_run_until_signal_hands_over_output() {
        let mut machine = Machine::new(vec![104, 7, 104, 8, 99]);
        assert_eq!(machine.run_until_signal().unwrap(), Signal::Output(7));
        assert!(machine.pending_output().is_empty());
        assert_eq!(machine.run_until_signal().unwrap(), Signal::Output(8));
        assert_eq!(machine.run_until_signal().unwrap(), Signal::Halted);
    }

    #[test]
    fn test_run_to_halt_requires_enough_input() {
        let mut machine = Machine::new(vec![3, 0, 3, 1, 99]);
        assert!(matches!(
            machine.run_to_halt([1]),
            Err(RuntimeError::InputExhausted { ip: 2 })
        ));
    }
}
