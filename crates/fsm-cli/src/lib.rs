// fsm-cli: shared utilities for CLI tools.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, ValueEnum};
use fsm_core::CompactMealy;
use fsm_io::{EdgeSemantics, FsmError};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as log_fmt};

/// Environment variable consulted for the log filter when no `-v` is given.
pub const LOG_ENV: &str = "FSM_LOG";

/// Edge semantics as a command-line value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SemanticsArg {
    /// `<from> <to> "<input>" "<output>"`
    #[default]
    Direct,
    /// `<from> <to> "<label>"`, labels alternating between input and output
    Alternating,
}

impl From<SemanticsArg> for EdgeSemantics {
    fn from(arg: SemanticsArg) -> Self {
        match arg {
            SemanticsArg::Direct => EdgeSemantics::Direct,
            SemanticsArg::Alternating => EdgeSemantics::Alternating,
        }
    }
}

/// Arguments shared by every tool: the source file and how to read it.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// FSM source file
    pub file: PathBuf,

    /// How transition lines are interpreted
    #[arg(short, long, value_enum, default_value_t = SemanticsArg::Direct)]
    pub semantics: SemanticsArg,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl SourceArgs {
    /// Install logging and parse the source file, exiting on failure.
    pub fn load_or_exit(&self) -> CompactMealy<String, String> {
        init_logging(self.verbose);
        load_mealy(&self.file, self.semantics.into())
            .unwrap_or_else(|e| fatal(&format!("{}: {e}", self.file.display())))
    }
}

/// Install a stderr log subscriber.
///
/// `-v` selects info, `-vv` debug and `-vvv` trace; without `-v` the filter
/// comes from `FSM_LOG`, defaulting to `warn`.
pub fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // a second initialization (tests) is ignored
    let _ = log_fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Parse an FSM file with string labels.
pub fn load_mealy(
    path: &Path,
    semantics: EdgeSemantics,
) -> Result<CompactMealy<String, String>, FsmError> {
    info!(path = %path.display(), %semantics, "parsing FSM source");
    let mealy = fsm_io::parse_mealy_file(path, semantics)?;
    info!(
        states = mealy.size(),
        transitions = mealy.transition_count(),
        "parsed Mealy machine"
    );
    Ok(mealy)
}

/// Split an input line into a word of symbols.
pub fn parse_word(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Shape of a parsed machine, as printed by `fsm-check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealySummary {
    pub file: String,
    pub semantics: String,
    pub states: usize,
    pub inputs: Vec<String>,
    pub transitions: usize,
    pub initial_state: Option<usize>,
}

impl MealySummary {
    pub fn new(file: &Path, semantics: EdgeSemantics, mealy: &CompactMealy<String, String>) -> Self {
        MealySummary {
            file: file.display().to_string(),
            semantics: semantics.to_string(),
            states: mealy.size(),
            inputs: mealy.input_alphabet().iter().cloned().collect(),
            transitions: mealy.transition_count(),
            initial_state: mealy.initial_state(),
        }
    }
}

impl fmt::Display for MealySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "file: {}", self.file)?;
        writeln!(f, "semantics: {}", self.semantics)?;
        writeln!(f, "states: {}", self.states)?;
        writeln!(f, "inputs: {} ({})", self.inputs.len(), self.inputs.join(", "))?;
        writeln!(f, "transitions: {}", self.transitions)?;
        match self.initial_state {
            Some(state) => write!(f, "initial state: {state}"),
            None => write!(f, "initial state: none"),
        }
    }
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}
