//! Time-travel debugging session
//!
//! A [`Session`] owns a machine and records a [`Snapshot`] before the first
//! instruction and after every executed one. The cursor can move backward
//! through that history freely; moving forward replays recorded snapshots
//! until the cursor reaches the newest one, and only then executes new
//! instructions.
//!
//! Input is only accepted at the head of history. Queued input is folded
//! into the head snapshot, so stepping back and forth again does not lose it.

use crate::interpreter::engine::{Machine, MachineState, StepOutcome};
use crate::interpreter::errors::RuntimeError;
use crate::memory::Word;
use crate::snapshot::{OutputLog, Snapshot, SnapshotManager};
use tracing::debug;

/// What a forward step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to an already recorded snapshot
    Replayed,
    /// Executed a new instruction at the head of history
    Executed(StepOutcome),
}

pub struct Session {
    machine: Machine,
    output: OutputLog,
    snapshot_manager: SnapshotManager,
    history_position: usize,
    error: Option<RuntimeError>,
}

impl Session {
    /// Start a session and record the initial state
    pub fn new(machine: Machine, snapshot_memory_limit: usize) -> Result<Self, RuntimeError> {
        let mut session = Session {
            machine,
            output: OutputLog::new(),
            snapshot_manager: SnapshotManager::new(snapshot_memory_limit),
            history_position: 0,
            error: None,
        };
        session.take_snapshot(None)?;
        Ok(session)
    }

    fn take_snapshot(&mut self, executed_ip: Option<usize>) -> Result<(), RuntimeError> {
        let snapshot = Snapshot::new(self.machine.clone(), self.output.clone(), executed_ip);
        self.snapshot_manager
            .push(snapshot)
            .map_err(|_| RuntimeError::SnapshotLimitExceeded {
                current: self.snapshot_manager.memory_usage(),
                limit: self.snapshot_manager.memory_limit(),
            })?;
        self.history_position = self.snapshot_manager.len() - 1;
        Ok(())
    }

    fn restore_snapshot(&mut self, index: usize) -> Result<(), RuntimeError> {
        let snapshot = self.snapshot_manager.get(index).ok_or_else(|| {
            RuntimeError::HistoryOperationFailed {
                message: "Snapshot not found in history".to_string(),
            }
        })?;
        self.machine = snapshot.machine.clone();
        self.output = snapshot.output.clone();
        self.history_position = index;
        Ok(())
    }

    fn at_head(&self) -> bool {
        self.history_position + 1 >= self.snapshot_manager.len()
    }

    /// Step forward, replaying history or executing one instruction
    pub fn step_forward(&mut self) -> Result<Advance, RuntimeError> {
        if !self.at_head() {
            self.restore_snapshot(self.history_position + 1)?;
            return Ok(Advance::Replayed);
        }

        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.machine.state() == MachineState::Halted {
            return Err(RuntimeError::HistoryOperationFailed {
                message: "Program has halted".to_string(),
            });
        }

        let ip = self.machine.ip();
        let steps = self.machine.steps();
        let outcome = match self.machine.step() {
            Ok(outcome) => outcome,
            Err(err) => {
                self.error = Some(err.clone());
                return Err(err);
            }
        };

        if let StepOutcome::NeedsInput = outcome {
            return Ok(Advance::Executed(outcome));
        }

        for value in self.machine.drain_output() {
            self.output.record(value, ip, steps + 1);
        }
        if let Err(err) = self.take_snapshot(Some(ip)) {
            self.error = Some(err.clone());
            return Err(err);
        }
        Ok(Advance::Executed(outcome))
    }

    /// Step backward to the previous snapshot
    pub fn step_backward(&mut self) -> Result<(), RuntimeError> {
        if self.history_position == 0 {
            return Err(RuntimeError::HistoryOperationFailed {
                message: "Already at the beginning of execution".to_string(),
            });
        }
        self.restore_snapshot(self.history_position - 1)
    }

    /// Rewind to the beginning of execution history
    pub fn rewind_to_start(&mut self) -> Result<(), RuntimeError> {
        self.restore_snapshot(0)
    }

    /// Move to the newest recorded snapshot without executing anything
    pub fn jump_to_end(&mut self) -> Result<(), RuntimeError> {
        let last = self.snapshot_manager.len().saturating_sub(1);
        self.restore_snapshot(last)
    }

    /// Execute until halt, input request, error, or `max_steps` new steps
    ///
    /// Returns the number of instructions executed.
    pub fn run_to_end(&mut self, max_steps: usize) -> Result<usize, RuntimeError> {
        self.jump_to_end()?;
        let mut executed = 0;
        while executed < max_steps {
            if self.machine.state() == MachineState::Halted {
                break;
            }
            match self.step_forward()? {
                Advance::Executed(StepOutcome::NeedsInput) => break,
                Advance::Executed(StepOutcome::Halted) => {
                    executed += 1;
                    break;
                }
                Advance::Executed(_) => executed += 1,
                Advance::Replayed => {}
            }
        }
        debug!(executed, position = self.history_position, "run to end");
        Ok(executed)
    }

    /// Queue an input value for the machine at the head of history
    pub fn provide_input(&mut self, value: Word) -> Result<(), RuntimeError> {
        if !self.at_head() {
            return Err(RuntimeError::HistoryOperationFailed {
                message: "Input can only be given at the end of history".to_string(),
            });
        }
        let mut machine = self.machine.clone();
        machine.push_input(value);
        let executed_ip = self
            .snapshot_manager
            .get(self.history_position)
            .and_then(|snapshot| snapshot.executed_ip);
        let snapshot = Snapshot::new(machine.clone(), self.output.clone(), executed_ip);
        self.snapshot_manager
            .replace_last(snapshot)
            .map_err(|_| RuntimeError::SnapshotLimitExceeded {
                current: self.snapshot_manager.memory_usage(),
                limit: self.snapshot_manager.memory_limit(),
            })?;

        // Live machine only changes once the head snapshot holds the input
        self.machine = machine;
        Ok(())
    }

    // ========== Getter methods for UI ==========

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn output(&self) -> &OutputLog {
        &self.output
    }

    /// Address of the instruction that produced the current state
    pub fn last_executed_ip(&self) -> Option<usize> {
        self.snapshot_manager
            .get(self.history_position)
            .and_then(|snapshot| snapshot.executed_ip)
    }

    pub fn history_position(&self) -> usize {
        self.history_position
    }

    pub fn total_snapshots(&self) -> usize {
        self.snapshot_manager.len()
    }

    pub fn is_at_head(&self) -> bool {
        self.at_head()
    }

    pub fn is_finished(&self) -> bool {
        self.machine.state() == MachineState::Halted
    }

    /// Whether the head of history is blocked on input
    pub fn needs_input(&self) -> bool {
        self.at_head()
            && self.error.is_none()
            && self.machine.state() == MachineState::AwaitingInput
            && self.machine.pending_input().is_empty()
    }

    /// Error that stopped execution at the head of history
    pub fn error(&self) -> Option<&RuntimeError> {
        self.error.as_ref()
    }
}
