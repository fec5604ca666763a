//! Noun/verb search
//!
//! Programs for the basic add/multiply machine take their two inputs by
//! patching memory: the *noun* goes into address 1 and the *verb* into
//! address 2, and the answer is read back from address 0 after the halt.
//! [`find_noun_verb`] brute-forces the pair that produces a target answer.

use crate::interpreter::engine::{Machine, MachineConfig};
use crate::interpreter::errors::RuntimeError;
use crate::memory::Word;
use tracing::debug;

/// Address patched with the noun
pub const NOUN_ADDRESS: usize = 1;

/// Address patched with the verb
pub const VERB_ADDRESS: usize = 2;

/// Run `program` with address 1 and 2 patched, returning memory[0]
pub fn run_with_noun_verb(program: &[Word], noun: Word, verb: Word) -> Result<Word, RuntimeError> {
    let mut machine = Machine::with_config(program.to_vec(), MachineConfig::day2());
    machine.memory_mut().write(NOUN_ADDRESS, noun);
    machine.memory_mut().write(VERB_ADDRESS, verb);
    machine.run_to_halt(std::iter::empty())?;
    Ok(machine.memory().read(0))
}

/// First (noun, verb) pair in `0..range` whose run leaves `target` at address 0
///
/// Nouns are tried in the outer loop. A failing run aborts the search.
pub fn find_noun_verb(
    program: &[Word],
    target: Word,
    range: Word,
) -> Result<Option<(Word, Word)>, RuntimeError> {
    for noun in 0..range {
        for verb in 0..range {
            if run_with_noun_verb(program, noun, verb)? == target {
                debug!(noun, verb, target, "noun/verb found");
                return Ok(Some((noun, verb)));
            }
        }
    }
    Ok(None)
}

/// Combined puzzle answer for a pair
pub fn answer(noun: Word, verb: Word) -> Word {
    100 * noun + verb
}

#[cfg(test)]
mod tests {
    use super::*;

    // [0] = [noun] + [verb]
    const PROGRAM: [Word; 10] = [1, 0, 0, 0, 99, 10, 20, 30, 40, 50];

    #[test]
    fn test_run_with_noun_verb() {
        assert_eq!(run_with_noun_verb(&PROGRAM, 5, 9).unwrap(), 60);
        assert_eq!(run_with_noun_verb(&PROGRAM, 0, 4).unwrap(), 100);
    }

    #[test]
    fn test_find_noun_verb() {
        assert_eq!(find_noun_verb(&PROGRAM, 70, 10).unwrap(), Some((6, 9)));
    }

    #[test]
    fn test_find_noun_verb_missing() {
        assert_eq!(find_noun_verb(&PROGRAM, 12345, 10).unwrap(), None);
    }

    #[test]
    fn test_search_propagates_failures() {
        // Runs into an unknown opcode right after the add
        let program = [1, 0, 0, 0, 42];
        assert!(find_noun_verb(&program, 7, 3).is_err());
    }

    #[test]
    fn test_answer() {
        assert_eq!(answer(12, 2), 1202);
    }
}
