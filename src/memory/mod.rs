//! Memory model for the Intcode machine
//!
//! Program memory is split in two:
//! - a statically sized `Vec` holding the program image it was loaded from
//! - a sparse overflow store for every address at or past the image length
//!
//! Any address that was never written reads as zero. Writes past the image
//! never grow the `Vec`; they land in the overflow store, so a program that
//! touches address `1_000_000_000` costs one map entry, not a gigabyte.
//!
//! Addresses are `usize`. Converting the signed values a program computes
//! into addresses (and rejecting negative ones) is the interpreter's job, see
//! [`to_address`].

use rustc_hash::FxHashMap;

/// Memory cell value
pub type Word = i64;

/// Memory address
pub type Address = usize;

/// Convert a computed signed address into a memory address
///
/// Returns `None` for negative values.
pub fn to_address(value: Word) -> Option<Address> {
    Address::try_from(value).ok()
}

/// Program memory: static image plus zero-default sparse overflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<Word>,
    overflow: FxHashMap<Address, Word>,
}

impl Memory {
    /// Create memory initialised with a program image
    pub fn new(cells: Vec<Word>) -> Self {
        Memory {
            cells,
            overflow: FxHashMap::default(),
        }
    }

    /// Read a cell; unset addresses read as zero
    pub fn read(&self, address: Address) -> Word {
        match self.cells.get(address) {
            Some(value) => *value,
            None => self.overflow.get(&address).copied().unwrap_or(0),
        }
    }

    /// Write a cell, spilling into the overflow store past the image
    pub fn write(&mut self, address: Address, value: Word) {
        if let Some(cell) = self.cells.get_mut(address) {
            *cell = value;
        } else {
            self.overflow.insert(address, value);
        }
    }

    /// Length of the static program image
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The static program image
    pub fn cells(&self) -> &[Word] {
        &self.cells
    }

    /// Copy of the static program image
    pub fn to_vec(&self) -> Vec<Word> {
        self.cells.clone()
    }

    /// Overflow entries sorted by address
    pub fn overflow(&self) -> Vec<(Address, Word)> {
        let mut entries: Vec<(Address, Word)> =
            self.overflow.iter().map(|(a, v)| (*a, *v)).collect();
        entries.sort_unstable_by_key(|(address, _)| *address);
        entries
    }

    /// Number of populated overflow entries
    pub fn overflow_len(&self) -> usize {
        self.overflow.len()
    }

    /// Highest address holding data (image end or highest overflow write)
    pub fn highest_address(&self) -> Option<Address> {
        let image_end = self.cells.len().checked_sub(1);
        let overflow_end = self.overflow.keys().max().copied();
        image_end.max(overflow_end)
    }

    /// Rough size of this memory in bytes, used for snapshot budgeting
    pub fn estimated_size(&self) -> usize {
        let word = std::mem::size_of::<Word>();
        let entry = std::mem::size_of::<Address>() + word;
        self.cells.len() * word + self.overflow.len() * entry
    }
}

impl From<Vec<Word>> for Memory {
    fn from(cells: Vec<Word>) -> Self {
        Memory::new(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_within_image() {
        let memory = Memory::new(vec![1, 2, 3]);
        assert_eq!(memory.read(0), 1);
        assert_eq!(memory.read(2), 3);
    }

    #[test]
    fn test_unset_overflow_reads_zero() {
        let memory = Memory::new(vec![1, 2, 3]);
        assert_eq!(memory.read(3), 0);
        assert_eq!(memory.read(1_000_000), 0);
        assert_eq!(memory.overflow_len(), 0);
    }

    #[test]
    fn test_write_past_image_uses_overflow() {
        let mut memory = Memory::new(vec![1, 2, 3]);
        memory.write(1000, 42);
        memory.write(5, -7);

        assert_eq!(memory.len(), 3);
        assert_eq!(memory.read(1000), 42);
        assert_eq!(memory.read(5), -7);
        assert_eq!(memory.overflow(), vec![(5, -7), (1000, 42)]);
        assert_eq!(memory.highest_address(), Some(1000));
    }

    #[test]
    fn test_write_within_image() {
        let mut memory = Memory::new(vec![1, 2, 3]);
        memory.write(1, 20);
        assert_eq!(memory.to_vec(), vec![1, 20, 3]);
        assert_eq!(memory.overflow_len(), 0);
    }

    #[test]
    fn test_highest_address_empty() {
        let memory = Memory::new(Vec::new());
        assert!(memory.is_empty());
        assert_eq!(memory.highest_address(), None);
    }

    #[test]
    fn test_to_address() {
        assert_eq!(to_address(0), Some(0));
        assert_eq!(to_address(17), Some(17));
        assert_eq!(to_address(-1), None);
    }
}
