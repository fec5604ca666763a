//! Hull-painting robot
//!
//! A machine steers a robot across an unbounded grid of panels. Each cycle
//! the robot feeds the colour of the panel under it to the machine, which
//! answers with two values: the colour to paint that panel, then the
//! direction to turn (0 = left, 1 = right). The robot then moves one panel
//! forward. The run ends when the machine halts.
//!
//! Coordinates are `(x, y)` with `y` growing downwards, so [`HullRobot::render`]
//! prints rows top to bottom.

use crate::interpreter::engine::{Machine, MachineConfig, Signal};
use crate::interpreter::errors::RuntimeError;
use crate::memory::Word;
use rustc_hash::FxHashMap;
use std::fmt;
use tracing::debug;

/// Camera readings fed to the machine before [`HullRobot::run`] gives up
pub const MAX_CYCLES: usize = 100_000;

/// Panel colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    Black,
    White,
}

impl Colour {
    pub fn from_word(value: Word) -> Option<Self> {
        match value {
            0 => Some(Colour::Black),
            1 => Some(Colour::White),
            _ => None,
        }
    }

    pub fn to_word(self) -> Word {
        match self {
            Colour::Black => 0,
            Colour::White => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    fn turn_left(self) -> Self {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    fn turn_right(self) -> Self {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    fn delta(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }
}

/// Errors raised while driving the robot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotError {
    Machine(RuntimeError),
    InvalidColour { value: Word },
    InvalidTurn { value: Word },
    CycleLimitExceeded { limit: usize },
}

impl fmt::Display for RobotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RobotError::Machine(err) => write!(f, "Robot program failed: {}", err),
            RobotError::InvalidColour { value } => {
                write!(f, "Invalid paint colour {} (expected 0 or 1)", value)
            }
            RobotError::InvalidTurn { value } => {
                write!(f, "Invalid turn {} (expected 0 or 1)", value)
            }
            RobotError::CycleLimitExceeded { limit } => {
                write!(f, "Robot program did not halt within {} cycles", limit)
            }
        }
    }
}

impl std::error::Error for RobotError {}

impl From<RuntimeError> for RobotError {
    fn from(err: RuntimeError) -> Self {
        RobotError::Machine(err)
    }
}

pub type Position = (i64, i64);

/// Robot position, heading and every panel it has painted
#[derive(Debug, Clone)]
pub struct HullRobot {
    position: Position,
    direction: Direction,
    panels: FxHashMap<Position, Colour>,
    pending_paint: Option<Colour>,
}

impl HullRobot {
    /// Robot at the origin facing up, on a hull whose start panel has `start`
    pub fn new(start: Colour) -> Self {
        let mut panels = FxHashMap::default();
        if start == Colour::White {
            panels.insert((0, 0), Colour::White);
        }
        HullRobot {
            position: (0, 0),
            direction: Direction::Up,
            panels,
            pending_paint: None,
        }
    }

    /// Drive the robot with `program` until the machine halts
    pub fn run(program: &[Word], start: Colour) -> Result<Self, RobotError> {
        Self::run_with_config(program, start, MachineConfig::full(), MAX_CYCLES)
    }

    /// Drive the robot, feeding the camera at most `max_cycles` times
    pub fn run_with_config(
        program: &[Word],
        start: Colour,
        config: MachineConfig,
        max_cycles: usize,
    ) -> Result<Self, RobotError> {
        let mut robot = HullRobot::new(start);
        let mut machine = Machine::with_config(program.to_vec(), config.with_suspension(true));
        let mut cycles = 0;

        loop {
            let halted = machine.run()? == Signal::Halted;
            for value in machine.drain_output() {
                robot.apply(value)?;
            }
            if halted {
                break;
            }

            if cycles == max_cycles {
                return Err(RobotError::CycleLimitExceeded { limit: max_cycles });
            }
            cycles += 1;
            machine.push_input(robot.current_colour().to_word());
        }

        debug!(painted = robot.painted_count(), "robot finished");
        Ok(robot)
    }

    /// Feed one machine output: a paint colour, then a turn
    pub fn apply(&mut self, value: Word) -> Result<(), RobotError> {
        match self.pending_paint.take() {
            None => {
                let colour = Colour::from_word(value).ok_or(RobotError::InvalidColour { value })?;
                self.pending_paint = Some(colour);
            }
            Some(colour) => {
                self.direction = match value {
                    0 => self.direction.turn_left(),
                    1 => self.direction.turn_right(),
                    _ => return Err(RobotError::InvalidTurn { value }),
                };
                self.panels.insert(self.position, colour);
                let (dx, dy) = self.direction.delta();
                self.position = (self.position.0 + dx, self.position.1 + dy);
            }
        }
        Ok(())
    }

    pub fn colour_at(&self, position: Position) -> Colour {
        self.panels.get(&position).copied().unwrap_or(Colour::Black)
    }

    pub fn current_colour(&self) -> Colour {
        self.colour_at(self.position)
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of distinct panels painted at least once
    pub fn painted_count(&self) -> usize {
        self.panels.len()
    }

    /// Painted area as text rows, `#` for white and `.` for black
    pub fn render(&self) -> Vec<String> {
        let whites: Vec<Position> = self
            .panels
            .iter()
            .filter(|(_, colour)| **colour == Colour::White)
            .map(|(position, _)| *position)
            .collect();
        if whites.is_empty() {
            return Vec::new();
        }

        let min_x = whites.iter().map(|p| p.0).min().unwrap_or(0);
        let max_x = whites.iter().map(|p| p.0).max().unwrap_or(0);
        let min_y = whites.iter().map(|p| p.1).min().unwrap_or(0);
        let max_y = whites.iter().map(|p| p.1).max().unwrap_or(0);

        (min_y..=max_y)
            .map(|y| {
                (min_x..=max_x)
                    .map(|x| match self.colour_at((x, y)) {
                        Colour::White => '#',
                        Colour::Black => '.',
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_sequence() {
        // Outputs from the worked example: (1,0) (0,0) (1,0) (1,0) (0,1) (1,0) (1,0)
        let mut robot = HullRobot::new(Colour::Black);
        for value in [1, 0, 0, 0, 1, 0, 1, 0, 0, 1, 1, 0, 1, 0] {
            robot.apply(value).unwrap();
        }
        assert_eq!(robot.painted_count(), 6);
        assert_eq!(robot.position(), (0, -1));
        assert_eq!(robot.direction(), Direction::Left);
        assert_eq!(robot.current_colour(), Colour::Black);
    }

    #[test]
    fn test_invalid_outputs() {
        let mut robot = HullRobot::new(Colour::Black);
        assert_eq!(robot.apply(5), Err(RobotError::InvalidColour { value: 5 }));

        robot.apply(1).unwrap();
        assert_eq!(robot.apply(2), Err(RobotError::InvalidTurn { value: 2 }));
    }

    #[test]
    fn test_run_paints_start_panel() {
        // Read colour, paint it inverted, turn right, halt
        let program = [3, 100, 1001, 100, -1, 101, 1002, 101, -1, 101, 4, 101, 104, 1, 99];
        let robot = HullRobot::run(&program, Colour::Black).unwrap();
        assert_eq!(robot.painted_count(), 1);
        assert_eq!(robot.colour_at((0, 0)), Colour::White);
        assert_eq!(robot.position(), (1, 0));
        assert_eq!(robot.render(), vec!["#".to_string()]);
    }

    #[test]
    fn test_render_rows() {
        let mut robot = HullRobot::new(Colour::White);
        // (0,0) white, (1,0) black, (1,1) white
        for value in [1, 1, 0, 1, 1, 0] {
            robot.apply(value).unwrap();
        }
        assert_eq!(robot.render(), vec!["#.".to_string(), ".#".to_string()]);
    }

    #[test]
    fn test_cycle_limit() {
        // Reads the camera forever without painting
        let program = [3, 5, 1105, 1, 0];
        let err = HullRobot::run_with_config(&program, Colour::Black, MachineConfig::full(), 50)
            .unwrap_err();
        assert_eq!(err, RobotError::CycleLimitExceeded { limit: 50 });
    }

    #[test]
    fn test_machine_failure() {
        let err = HullRobot::run(&[3, 0, 42], Colour::Black).unwrap_err();
        assert!(matches!(err, RobotError::Machine(RuntimeError::UnsupportedOpcode { .. })));
    }
}
