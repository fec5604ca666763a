use intcode::interpreter::errors::RuntimeError;
use intcode::memory::Word;
use intcode::pipeline::{max_signal, run_chain, run_feedback, Pipeline, PipelineError, PipelineMode};
use intcode::robot::{Colour, HullRobot};
use intcode::search::{answer, find_noun_verb};

const CHAIN_54321: [Word; 25] = [
    3, 23, 3, 24, 1002, 24, 10, 24, 1002, 23, -1, 23, 101, 5, 23, 23, 1, 24, 23, 23, 4, 23, 99,
    0, 0,
];

const FEEDBACK_18216: [Word; 57] = [
    3, 52, 1001, 52, -5, 52, 3, 53, 1, 52, 56, 54, 1007, 54, 5, 55, 1005, 55, 26, 1001, 54, -5,
    54, 1105, 1, 12, 1, 53, 54, 53, 1008, 54, 0, 55, 1001, 55, 1, 55, 2, 53, 55, 53, 4, 53, 1001,
    56, -1, 56, 1005, 56, 6, 99, 0, 0, 0, 0, 10,
];

#[test]
fn test_chain_best_ordering() {
    let (signal, phases) = max_signal(&CHAIN_54321, &[0, 1, 2, 3, 4], PipelineMode::Chain)
        .expect("Pipeline failed");
    assert_eq!(signal, 54321);
    assert_eq!(phases, vec![0, 1, 2, 3, 4]);
    assert_eq!(run_chain(&CHAIN_54321, &phases, 0).unwrap(), 54321);
}

#[test]
fn test_feedback_ring() {
    assert_eq!(
        run_feedback(&FEEDBACK_18216, &[9, 7, 8, 5, 6], 0).unwrap(),
        18216
    );
}

#[test]
fn test_feedback_best_ordering() {
    let (signal, phases) = max_signal(&FEEDBACK_18216, &[5, 6, 7, 8, 9], PipelineMode::Feedback)
        .expect("Pipeline failed");
    assert_eq!(signal, 18216);
    assert_eq!(phases, vec![9, 7, 8, 5, 6]);
}

#[test]
fn test_pipeline_machines_halt() {
    let mut pipeline = Pipeline::new(&FEEDBACK_18216, &[9, 7, 8, 5, 6]).unwrap();
    pipeline.run_feedback(0).unwrap();
    assert!(pipeline.machines().iter().all(|m| m.is_halted()));
    assert!(pipeline.rounds() > 1);
}

#[test]
fn test_failure_names_machine() {
    let err = run_feedback(&[3, 0, 77], &[5, 6], 0).unwrap_err();
    match err {
        PipelineError::Machine { index, source } => {
            assert_eq!(index, 0);
            assert!(matches!(source, RuntimeError::UnsupportedOpcode { .. }));
        }
        other => panic!("Expected machine failure, got {:?}", other),
    }
}

#[test]
fn test_empty_pipeline() {
    assert_eq!(run_chain(&CHAIN_54321, &[], 0), Err(PipelineError::Empty));
}

#[test]
fn test_noun_verb_search() {
    // [0] = [noun] * [verb]
    let program = [2, 0, 0, 0, 99, 3, 5, 7, 11, 13];
    let (noun, verb) = find_noun_verb(&program, 77, 10).unwrap().unwrap();
    assert_eq!((noun, verb), (7, 8));
    assert_eq!(answer(noun, verb), 708);
}

#[test]
fn test_robot_paints_until_halt() {
    // Paint white and turn left, twice, then halt
    let program = [3, 50, 104, 1, 104, 0, 3, 50, 104, 1, 104, 0, 99];
    let robot = HullRobot::run(&program, Colour::Black).unwrap();
    assert_eq!(robot.painted_count(), 2);
    assert_eq!(robot.colour_at((0, 0)), Colour::White);
    assert_eq!(robot.colour_at((-1, 0)), Colour::White);
    assert_eq!(robot.render(), vec!["##".to_string()]);
}
