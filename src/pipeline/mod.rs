//! Multi-machine pipelines (amplifier chains)
//!
//! A [`Pipeline`] holds N machines running copies of one program, each seeded
//! with its own phase setting as first input. Two wirings are supported:
//!
//! - **Chain**: the signal passes through every machine once, in order.
//! - **Feedback**: the machines form a ring; the signal keeps circulating
//!   until the terminal machine (the last one unless configured otherwise)
//!   halts, and the terminal machine's last output is the result.
//!
//! Everything runs on the caller's thread. Each turn the orchestrator hands
//! the one value in flight to the next machine and resumes it from its saved
//! state until it emits a value, halts, or asks for more input.
//!
//! # Failure policy
//!
//! A machine error aborts the whole pipeline and is reported together with
//! the index of the machine that raised it. Nothing is retried or skipped.

use crate::interpreter::engine::{Machine, MachineConfig, Signal};
use crate::interpreter::errors::RuntimeError;
use crate::memory::Word;
use std::fmt;
use tracing::{debug, warn};

/// Errors raised while orchestrating a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// No phase settings were given
    Empty,

    /// Terminal machine index is outside the pipeline
    InvalidTerminal { index: usize, len: usize },

    /// A machine failed
    Machine { index: usize, source: RuntimeError },

    /// A machine stopped without producing the value the chain needed
    NoOutput { index: usize },

    /// A full round passed without any machine executing an instruction
    Deadlock { round: usize },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Empty => write!(f, "Pipeline has no machines"),
            PipelineError::InvalidTerminal { index, len } => {
                write!(
                    f,
                    "Terminal machine {} is out of range for a pipeline of {}",
                    index, len
                )
            }
            PipelineError::Machine { index, source } => {
                write!(f, "Machine {} failed: {}", index, source)
            }
            PipelineError::NoOutput { index } => {
                write!(f, "Machine {} stopped without producing output", index)
            }
            PipelineError::Deadlock { round } => {
                write!(f, "Pipeline deadlocked in round {}", round)
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Machine { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// How machines in a pipeline are wired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    Chain,
    Feedback,
}

/// What happened during one feedback round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundOutcome {
    /// The terminal machine halted; carries its last output
    Finished(Option<Word>),
    /// Round complete, at least one machine made progress
    Progressed,
    /// No machine executed anything
    Stalled,
}

/// A set of machines wired together by the orchestrator
pub struct Pipeline {
    machines: Vec<Machine>,
    terminal: usize,
    in_flight: Option<Word>,
    last_terminal_output: Option<Word>,
    rounds: usize,
}

impl Pipeline {
    /// One machine per phase setting, each seeded with its phase
    pub fn new(program: &[Word], phases: &[Word]) -> Result<Self, PipelineError> {
        Self::with_config(program, phases, MachineConfig::full())
    }

    pub fn with_config(
        program: &[Word],
        phases: &[Word],
        config: MachineConfig,
    ) -> Result<Self, PipelineError> {
        if phases.is_empty() {
            return Err(PipelineError::Empty);
        }
        let machines = phases
            .iter()
            .map(|phase| {
                let mut machine = Machine::with_config(program.to_vec(), config);
                machine.push_input(*phase);
                machine
            })
            .collect::<Vec<_>>();

        Ok(Pipeline {
            terminal: machines.len() - 1,
            machines,
            in_flight: None,
            last_terminal_output: None,
            rounds: 0,
        })
    }

    /// Designate the machine whose halt ends a feedback run
    pub fn with_terminal(mut self, index: usize) -> Result<Self, PipelineError> {
        if index >= self.machines.len() {
            return Err(PipelineError::InvalidTerminal {
                index,
                len: self.machines.len(),
            });
        }
        self.terminal = index;
        Ok(self)
    }

    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// Number of completed feedback rounds
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    fn resume(&mut self, index: usize) -> Result<Signal, PipelineError> {
        self.machines[index]
            .run_until_signal()
            .map_err(|source| {
                warn!(machine = index, error = %source, "machine failed, aborting pipeline");
                PipelineError::Machine { index, source }
            })
    }

    /// Pass `signal` through every machine once, in order
    pub fn run_chain(&mut self, signal: Word) -> Result<Word, PipelineError> {
        let mut signal = signal;
        for index in 0..self.machines.len() {
            self.machines[index].push_input(signal);
            match self.resume(index)? {
                Signal::Output(value) => {
                    debug!(machine = index, value, "chain hand-off");
                    signal = value;
                }
                Signal::Halted | Signal::NeedsInput => {
                    return Err(PipelineError::NoOutput { index });
                }
            }
        }
        Ok(signal)
    }

    /// Circulate `signal` around the ring until the terminal machine halts
    pub fn run_feedback(&mut self, signal: Word) -> Result<Word, PipelineError> {
        self.in_flight = Some(signal);
        loop {
            match self.step_round()? {
                RoundOutcome::Finished(Some(value)) => return Ok(value),
                RoundOutcome::Finished(None) => {
                    return Err(PipelineError::NoOutput {
                        index: self.terminal,
                    });
                }
                RoundOutcome::Progressed => {}
                RoundOutcome::Stalled => {
                    return Err(PipelineError::Deadlock { round: self.rounds });
                }
            }
        }
    }

    /// Give every machine one turn, in ring order
    fn step_round(&mut self) -> Result<RoundOutcome, PipelineError> {
        let mut progressed = false;

        for index in 0..self.machines.len() {
            if let Some(value) = self.in_flight.take() {
                self.machines[index].push_input(value);
            }

            if self.machines[index].is_halted() {
                if index == self.terminal {
                    return Ok(RoundOutcome::Finished(self.last_terminal_output));
                }
                continue;
            }

            let steps_before = self.machines[index].steps();
            let signal = self.resume(index)?;
            if self.machines[index].steps() != steps_before {
                progressed = true;
            }

            match signal {
                Signal::Output(value) => {
                    debug!(machine = index, value, round = self.rounds, "feedback hand-off");
                    if index == self.terminal {
                        self.last_terminal_output = Some(value);
                    }
                    self.in_flight = Some(value);
                }
                Signal::Halted if index == self.terminal => {
                    debug!(machine = index, round = self.rounds, "terminal machine halted");
                    return Ok(RoundOutcome::Finished(self.last_terminal_output));
                }
                Signal::Halted | Signal::NeedsInput => {}
            }
        }

        self.rounds += 1;
        if progressed {
            Ok(RoundOutcome::Progressed)
        } else {
            Ok(RoundOutcome::Stalled)
        }
    }
}

/// Run a fresh chain of machines, one per phase
pub fn run_chain(program: &[Word], phases: &[Word], signal: Word) -> Result<Word, PipelineError> {
    Pipeline::new(program, phases)?.run_chain(signal)
}

/// Run a fresh feedback ring of machines, one per phase
pub fn run_feedback(
    program: &[Word],
    phases: &[Word],
    signal: Word,
) -> Result<Word, PipelineError> {
    Pipeline::new(program, phases)?.run_feedback(signal)
}

/// Every ordering of `values` (Heap's algorithm)
pub fn permutations(values: &[Word]) -> Vec<Vec<Word>> {
    fn generate(k: usize, items: &mut Vec<Word>, out: &mut Vec<Vec<Word>>) {
        if k <= 1 {
            out.push(items.clone());
            return;
        }
        generate(k - 1, items, out);
        for i in 0..k - 1 {
            if k % 2 == 0 {
                items.swap(i, k - 1);
            } else {
                items.swap(0, k - 1);
            }
            generate(k - 1, items, out);
        }
    }

    let mut items = values.to_vec();
    let mut out = Vec::new();
    generate(items.len(), &mut items, &mut out);
    out
}

/// Best signal over every ordering of the phase values, with its ordering
pub fn max_signal(
    program: &[Word],
    phase_values: &[Word],
    mode: PipelineMode,
) -> Result<(Word, Vec<Word>), PipelineError> {
    let mut best: Option<(Word, Vec<Word>)> = None;

    for phases in permutations(phase_values) {
        let signal = match mode {
            PipelineMode::Chain => run_chain(program, &phases, 0)?,
            PipelineMode::Feedback => run_feedback(program, &phases, 0)?,
        };
        if best.as_ref().map_or(true, |(current, _)| signal > *current) {
            best = Some((signal, phases));
        }
    }

    best.ok_or(PipelineError::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN_43210: [Word; 17] = [3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0];

    const FEEDBACK_139629729: [Word; 29] = [
        3, 26, 1001, 26, -4, 26, 3, 27, 1002, 27, 2, 27, 1, 27, 26, 27, 4, 27, 1001, 28, -1, 28,
        1005, 28, 6, 99, 0, 0, 5,
    ];

    #[test]
    fn test_chain_single_ordering() {
        assert_eq!(run_chain(&CHAIN_43210, &[4, 3, 2, 1, 0], 0).unwrap(), 43210);
    }

    #[test]
    fn test_chain_max() {
        let (signal, phases) =
            max_signal(&CHAIN_43210, &[0, 1, 2, 3, 4], PipelineMode::Chain).unwrap();
        assert_eq!(signal, 43210);
        assert_eq!(phases, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_feedback_single_ordering() {
        let mut pipeline = Pipeline::new(&FEEDBACK_139629729, &[9, 8, 7, 6, 5]).unwrap();
        assert_eq!(pipeline.run_feedback(0).unwrap(), 139629729);
        assert_eq!(pipeline.rounds(), 5);
        assert!(pipeline.machines().iter().all(Machine::is_halted));
    }

    #[test]
    fn test_permutations() {
        let perms = permutations(&[1, 2, 3]);
        assert_eq!(perms.len(), 6);
        let mut sorted = perms.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 6);
        assert_eq!(permutations(&[]).len(), 1);
    }

    #[test]
    fn test_empty_pipeline() {
        assert!(matches!(
            Pipeline::new(&CHAIN_43210, &[]),
            Err(PipelineError::Empty)
        ));
    }

    #[test]
    fn test_invalid_terminal() {
        let result = Pipeline::new(&CHAIN_43210, &[0, 1]).unwrap().with_terminal(2);
        assert!(matches!(
            result,
            Err(PipelineError::InvalidTerminal { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_machine_failure_aborts() {
        // Phase 1 jumps to address 14, which holds an unknown opcode
        let program = [3, 20, 3, 21, 1008, 20, 1, 22, 1005, 22, 14, 4, 21, 99, 42];
        let err = run_chain(&program, &[0, 1], 5).unwrap_err();
        match err {
            PipelineError::Machine { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(source, RuntimeError::UnsupportedOpcode { .. }));
            }
            other => panic!("Expected machine failure, got {:?}", other),
        }
    }

    #[test]
    fn test_chain_without_output() {
        let err = run_chain(&[3, 0, 3, 0, 99], &[0, 1], 5).unwrap_err();
        assert_eq!(err, PipelineError::NoOutput { index: 0 });
    }

    #[test]
    fn test_feedback_deadlock() {
        // Each machine wants two extra inputs before emitting anything
        let program = [3, 0, 3, 0, 3, 0, 4, 0, 99];
        let err = run_feedback(&program, &[0, 0], 1).unwrap_err();
        assert!(matches!(err, PipelineError::Deadlock { .. }));
    }
}
