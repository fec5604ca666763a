// Snapshot management for reverse execution

use crate::interpreter::engine::Machine;
use crate::memory::{Address, Word};

/// Log of every value a machine has emitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputLog {
    pub entries: Vec<OutputEntry>,
}

impl OutputLog {
    pub fn new() -> Self {
        OutputLog {
            entries: Vec::new(),
        }
    }

    /// Record a value emitted by the instruction at `ip` on step `step`
    pub fn record(&mut self, value: Word, ip: Address, step: u64) {
        self.entries.push(OutputEntry { value, ip, step });
    }

    /// All emitted values in order
    pub fn values(&self) -> Vec<Word> {
        self.entries.iter().map(|entry| entry.value).collect()
    }

    /// Output rendered one value per line, with printable ASCII values
    /// annotated as characters
    pub fn get_output(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| match u8::try_from(entry.value) {
                Ok(byte) if byte.is_ascii_graphic() => {
                    format!("{}  '{}'", entry.value, byte as char)
                }
                _ => entry.value.to_string(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A value emitted by an output instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputEntry {
    pub value: Word,
    pub ip: Address,
    pub step: u64,
}

/// Snapshot of execution state
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub machine: Machine,
    pub output: OutputLog,
    /// Address of the instruction executed to reach this state
    pub executed_ip: Option<Address>,
}

impl Snapshot {
    pub fn new(machine: Machine, output: OutputLog, executed_ip: Option<Address>) -> Self {
        Snapshot {
            machine,
            output,
            executed_ip,
        }
    }

    /// Estimate the memory usage of this snapshot in bytes
    pub fn estimated_size(&self) -> usize {
        self.machine.estimated_size()
            + self.output.len() * std::mem::size_of::<OutputEntry>()
            + std::mem::size_of::<Self>()
    }
}

/// Manages execution history for reverse execution
#[derive(Debug)]
pub struct SnapshotManager {
    snapshots: Vec<Snapshot>,
    max_memory: usize,
    current_memory: usize,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            snapshots: Vec::new(),
            max_memory,
            current_memory: 0,
        }
    }

    /// Add a snapshot to history
    pub fn push(&mut self, snapshot: Snapshot) -> Result<(), String> {
        let snapshot_size = snapshot.estimated_size();

        if self.current_memory + snapshot_size > self.max_memory {
            return Err(format!(
                "Snapshot memory limit exceeded: {} + {} > {}",
                self.current_memory, snapshot_size, self.max_memory
            ));
        }

        self.current_memory += snapshot_size;
        self.snapshots.push(snapshot);
        Ok(())
    }

    /// Replace the most recent snapshot, e.g. after queueing input at the head
    ///
    /// On failure the history is left untouched.
    pub fn replace_last(&mut self, snapshot: Snapshot) -> Result<(), String> {
        let old_size = self
            .snapshots
            .last()
            .map(Snapshot::estimated_size)
            .ok_or_else(|| "No snapshot to replace".to_string())?;
        let snapshot_size = snapshot.estimated_size();
        let remaining = self.current_memory - old_size;

        if remaining + snapshot_size > self.max_memory {
            return Err(format!(
                "Snapshot memory limit exceeded: {} + {} > {}",
                remaining, snapshot_size, self.max_memory
            ));
        }

        self.current_memory = remaining + snapshot_size;
        if let Some(last) = self.snapshots.last_mut() {
            *last = snapshot;
        }
        Ok(())
    }

    /// Get a snapshot by index
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    /// Get the number of snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Get current memory usage
    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    /// Get max memory limit
    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }
}
