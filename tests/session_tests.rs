use intcode::interpreter::console::Console;
use intcode::interpreter::disasm::disassemble;
use intcode::interpreter::engine::Machine;
use intcode::interpreter::errors::RuntimeError;
use intcode::interpreter::session::{Advance, Session};
use intcode::parser::{load_program, parse_program, ParseError};
use std::io::Cursor;

const LIMIT: usize = 16 * 1024 * 1024;

#[test]
fn test_console_echo_with_halt_marker() {
    let mut machine = Machine::new(vec![3, 0, 4, 0, 99]);
    let mut console = Console::new(Cursor::new("\n  17 \n"), Vec::new()).with_halt_marker(true);
    console.run(&mut machine).expect("Execution failed");

    let written = String::from_utf8(console.into_writer()).unwrap();
    assert_eq!(written, "17\nexit\n");
}

#[test]
fn test_console_rejects_bad_input() {
    let mut machine = Machine::new(vec![3, 0, 4, 0, 99]);
    let mut console = Console::new(Cursor::new("seven\n"), Vec::new());
    let err = console.run(&mut machine).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::InvalidInput {
            text: "seven".to_string()
        }
    );
}

#[test]
fn test_console_end_of_input() {
    let mut machine = Machine::new(vec![3, 0, 99]);
    let mut console = Console::new(Cursor::new(""), Vec::new());
    assert!(matches!(
        console.run(&mut machine),
        Err(RuntimeError::InputExhausted { .. })
    ));
}

#[test]
fn test_session_time_travel() {
    let program = parse_program("104,1,104,2,1101,3,4,20,4,20,99").unwrap();
    let mut session = Session::new(Machine::new(program), LIMIT).unwrap();

    let executed = session.run_to_end(100).unwrap();
    assert_eq!(executed, 5);
    assert!(session.is_finished());
    assert_eq!(session.output().values(), vec![1, 2, 7]);
    assert_eq!(session.total_snapshots(), 6);

    session.rewind_to_start().unwrap();
    assert_eq!(session.machine().ip(), 0);
    assert!(session.output().is_empty());

    // Replaying does not execute anything new
    assert_eq!(session.step_forward().unwrap(), Advance::Replayed);
    assert_eq!(session.step_forward().unwrap(), Advance::Replayed);
    assert_eq!(session.output().values(), vec![1, 2]);
    assert_eq!(session.last_executed_ip(), Some(2));
    assert_eq!(session.total_snapshots(), 6);

    session.jump_to_end().unwrap();
    assert_eq!(session.output().values(), vec![1, 2, 7]);
}

#[test]
fn test_session_input_at_head() {
    let mut session = Session::new(Machine::new(vec![3, 0, 4, 0, 99]), LIMIT).unwrap();
    session.run_to_end(10).unwrap();
    assert!(session.needs_input());

    session.provide_input(9).unwrap();
    session.run_to_end(10).unwrap();
    assert_eq!(session.output().values(), vec![9]);

    session.rewind_to_start().unwrap();
    assert!(session.provide_input(1).is_err());
}

#[test]
fn test_session_records_errors() {
    let mut session = Session::new(Machine::new(vec![104, 5, 0]), LIMIT).unwrap();
    assert!(session.run_to_end(10).is_err());
    assert!(matches!(
        session.error(),
        Some(RuntimeError::UnsupportedOpcode { ip: 2, .. })
    ));
    // History up to the failure is still navigable
    session.step_backward().unwrap();
    assert_eq!(session.machine().ip(), 0);
}

#[test]
fn test_disassemble_program() {
    let machine = Machine::new(vec![109, 1, 204, -1, 1001, 100, 1, 100, 99]);
    let lines = disassemble(machine.memory(), 0, machine.memory().len());
    let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["ARB #1", "OUT rb-1", "ADD [100], #1, [100]", "HLT"]);
}

#[test]
fn test_load_program_from_file() {
    let path = std::env::temp_dir().join(format!("intcode-load-{}.txt", std::process::id()));
    std::fs::write(&path, "1,0,0,0,99,\n").unwrap();
    let program = load_program(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(program, vec![1, 0, 0, 0, 99]);

    assert!(matches!(
        load_program(path.with_extension("missing")),
        Err(ParseError::Io { .. })
    ));
}
