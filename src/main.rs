// intcode: Intcode virtual machine with a time-travel debugger

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use intcode::interpreter::console::Console;
use intcode::interpreter::engine::{Machine, MachineConfig};
use intcode::interpreter::session::Session;
use intcode::memory::Word;
use intcode::parser::load_program;
use intcode::pipeline::{max_signal, PipelineMode};
use intcode::robot::{Colour, HullRobot};
use intcode::search::{answer, find_noun_verb};
use intcode::ui::App;

/// Snapshot history budget for the debugger (256 MiB)
const SNAPSHOT_LIMIT: usize = 256 * 1024 * 1024;

/// Nouns and verbs tried by `search`
const SEARCH_RANGE: Word = 100;

#[derive(Parser)]
#[command(name = "intcode", version, about = "Intcode virtual machine and time-travel debugger")]
struct Cli {
    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program, reading missing input from stdin
    Run {
        file: PathBuf,

        #[command(flatten)]
        inputs: InputArgs,

        /// Only add, multiply and halt
        #[arg(long, conflicts_with = "no_relative")]
        day2: bool,

        /// Disable relative mode and opcode 9
        #[arg(long)]
        no_relative: bool,

        /// Print "exit" when the program halts (off by default; stdout then
        /// carries only output values)
        #[arg(long)]
        halt_marker: bool,

        /// Abort after this many instructions
        #[arg(long)]
        step_limit: Option<u64>,
    },
    /// Step through a program in the terminal debugger
    Debug {
        file: PathBuf,

        #[command(flatten)]
        inputs: InputArgs,
    },
    /// Find the phase ordering with the highest amplifier signal
    Amplify {
        file: PathBuf,

        /// Wire the amplifiers into a feedback ring
        #[arg(long)]
        feedback: bool,

        /// Phase values to permute (defaults to 0-4, or 5-9 with --feedback)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        phases: Option<Vec<Word>>,
    },
    /// Run the hull-painting robot and draw the hull
    Paint {
        file: PathBuf,

        /// Start on a white panel
        #[arg(long)]
        start_white: bool,
    },
    /// Find the noun and verb that produce a target value
    Search {
        file: PathBuf,

        #[arg(long, allow_hyphen_values = true)]
        target: Word,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Queue an input value (repeatable)
    #[arg(short, long = "input", allow_hyphen_values = true)]
    input: Vec<Word>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute_command(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn execute_command(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Run {
            file,
            inputs,
            day2,
            no_relative,
            halt_marker,
            step_limit,
        } => {
            let program = load_program(&file)?;
            let mut config = if day2 {
                MachineConfig::day2()
            } else if no_relative {
                MachineConfig::day5()
            } else {
                MachineConfig::full()
            };
            if let Some(limit) = step_limit {
                config = config.with_step_limit(limit);
            }

            let mut machine = Machine::with_config(program, config);
            machine.extend_input(inputs.input);

            let stdin = io::stdin();
            let mut console = Console::new(stdin.lock(), io::stdout().lock())
                .with_prompt(stdin.is_terminal())
                .with_halt_marker(halt_marker);
            console.run(&mut machine)?;
            debug!(steps = machine.steps(), "program halted");
        }
        Commands::Debug { file, inputs } => {
            let program = load_program(&file)?;
            let mut machine = Machine::new(program);
            machine.extend_input(inputs.input);
            let session = Session::new(machine, SNAPSHOT_LIMIT)?;
            run_debugger(session)?;
        }
        Commands::Amplify {
            file,
            feedback,
            phases,
        } => {
            let program = load_program(&file)?;
            let (mode, default_phases) = if feedback {
                (PipelineMode::Feedback, vec![5, 6, 7, 8, 9])
            } else {
                (PipelineMode::Chain, vec![0, 1, 2, 3, 4])
            };
            let phases = phases.unwrap_or(default_phases);
            let (signal, order) = max_signal(&program, &phases, mode)?;
            info!(?order, "best phase ordering");
            println!("{}", signal);
        }
        Commands::Paint { file, start_white } => {
            let program = load_program(&file)?;
            let start = if start_white {
                Colour::White
            } else {
                Colour::Black
            };
            let robot = HullRobot::run(&program, start)?;
            println!("{}", robot.painted_count());
            for row in robot.render() {
                println!("{}", row);
            }
        }
        Commands::Search { file, target } => {
            let program = load_program(&file)?;
            match find_noun_verb(&program, target, SEARCH_RANGE)? {
                Some((noun, verb)) => println!("{}", answer(noun, verb)),
                None => return Err(format!("no noun/verb pair produces {}", target).into()),
            }
        }
    }
    Ok(())
}

fn run_debugger(session: Session) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}
