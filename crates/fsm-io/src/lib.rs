//! Readers and writers for textual automaton exchange formats.
//!
//! The FSM format is a three-part text file: data definitions, state vectors
//! and transitions, separated by lines holding only `---`. This crate turns an
//! FSM source into a validated [`CompactMealy`], under one of two
//! interpretations of the transition lines (see [`EdgeSemantics`]), and can
//! write a Mealy machine out in the tag-based ETF format.
//!
//! # Architecture
//!
//! - [`tokenizer`] -- Character classes and the lazy, line-aware token stream
//! - [`phase`] -- The part-driven parse loop and the [`phase::PhaseHandler`] hooks
//! - [`draft`] -- Shared parse state and materialization into a [`CompactMealy`]
//! - [`direct`] -- Transition lines carrying both an input and an output label
//! - [`alternating`] -- Transition lines whose labels alternate between input and output
//! - [`etf`] -- ETF writer for Mealy machines

pub mod alternating;
pub mod direct;
pub mod draft;
pub mod etf;
pub mod phase;
pub mod tokenizer;

use std::fmt;
use std::fs::File;
use std::hash::Hash;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use fsm_core::{AutomatonError, CompactMealy};

pub use tokenizer::Position;

/// What a parser was looking for when it hit an unexpected token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// A decimal state number.
    Number,
    /// A double-quoted edge label.
    String,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Number => f.write_str("number expected"),
            Expected::String => f.write_str("expecting string"),
        }
    }
}

/// Error type for reading FSM sources.
#[derive(Debug, thiserror::Error)]
pub enum FsmError {
    #[error("failed to read FSM source: {0}")]
    Io(#[from] std::io::Error),
    #[error("{expected} at {position} (found {found})")]
    Unexpected {
        expected: Expected,
        found: String,
        position: Position,
    },
    #[error("state with number {state} is undefined at {position}")]
    UndefinedState { state: u32, position: Position },
    #[error("non-determinism detected (previous value: {previous}) at {position}")]
    NonDeterminism { previous: String, position: Position },
    #[error("no initial state found at {position}")]
    NoInitialState { position: Position },
    #[error("multiple initial states found: {candidates:?} at {position}")]
    MultipleInitialStates {
        candidates: Vec<u32>,
        position: Position,
    },
    #[error(
        "FSM transition relation is incomplete: could not reach states {unreached:?}, \
         from initial state {initial} at {position}"
    )]
    PartialFsm {
        unreached: Vec<u32>,
        initial: u32,
        position: Position,
    },
    #[error("failed to build automaton: {0}")]
    Automaton(#[from] AutomatonError),
}

/// Coarse classification of [`FsmError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A number or quoted string was required but something else was found.
    Lexical,
    /// A transition names a state that was never declared.
    Referential,
    /// A key was defined twice.
    NonDeterminism,
    /// Zero or several initial-state candidates.
    InitialState,
    /// Declared states unreachable from the initial state.
    PartialGraph,
    /// The source could not be read.
    Io,
    /// The validated machine could not be materialized.
    Build,
}

impl FsmError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FsmError::Io(_) => ErrorCategory::Io,
            FsmError::Unexpected { .. } => ErrorCategory::Lexical,
            FsmError::UndefinedState { .. } => ErrorCategory::Referential,
            FsmError::NonDeterminism { .. } => ErrorCategory::NonDeterminism,
            FsmError::NoInitialState { .. } | FsmError::MultipleInitialStates { .. } => {
                ErrorCategory::InitialState
            }
            FsmError::PartialFsm { .. } => ErrorCategory::PartialGraph,
            FsmError::Automaton(_) => ErrorCategory::Build,
        }
    }

    /// Source position of the offending token, for parse errors.
    pub fn position(&self) -> Option<Position> {
        match self {
            FsmError::Io(_) | FsmError::Automaton(_) => None,
            FsmError::Unexpected { position, .. }
            | FsmError::UndefinedState { position, .. }
            | FsmError::NonDeterminism { position, .. }
            | FsmError::NoInitialState { position }
            | FsmError::MultipleInitialStates { position, .. }
            | FsmError::PartialFsm { position, .. } => Some(*position),
        }
    }
}

/// How the labels on FSM transition lines are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgeSemantics {
    /// `<from> <to> "<input>" "<output>"`: each line is one Mealy transition.
    #[default]
    Direct,
    /// `<from> <to> "<label>"`: labels alternate between input and output
    /// along paths from the initial state.
    Alternating,
}

impl fmt::Display for EdgeSemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeSemantics::Direct => f.write_str("direct"),
            EdgeSemantics::Alternating => f.write_str("alternating"),
        }
    }
}

impl FromStr for EdgeSemantics {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" | "io" => Ok(EdgeSemantics::Direct),
            "alternating" => Ok(EdgeSemantics::Alternating),
            other => Err(format!("unknown edge semantics: {other:?}")),
        }
    }
}

/// Parse a Mealy machine from an FSM source.
///
/// `input_parser` and `output_parser` turn edge labels into symbols. The
/// reader is owned by the parse and dropped when this call returns, on
/// success and on failure alike.
pub fn parse_mealy<R, I, O, FI, FO>(
    reader: R,
    semantics: EdgeSemantics,
    input_parser: FI,
    output_parser: FO,
) -> Result<CompactMealy<I, O>, FsmError>
where
    R: Read,
    I: Clone + Eq + Hash + fmt::Debug,
    O: Clone + fmt::Debug,
    FI: FnMut(&str) -> I,
    FO: FnMut(&str) -> O,
{
    match semantics {
        EdgeSemantics::Direct => direct::parse(reader, input_parser, output_parser),
        EdgeSemantics::Alternating => alternating::parse(reader, input_parser, output_parser),
    }
}

/// Parse an FSM source held in memory, keeping labels as strings.
pub fn parse_mealy_str(
    source: &str,
    semantics: EdgeSemantics,
) -> Result<CompactMealy<String, String>, FsmError> {
    parse_mealy(source.as_bytes(), semantics, str::to_owned, str::to_owned)
}

/// Parse an FSM file, keeping labels as strings.
pub fn parse_mealy_file(
    path: impl AsRef<Path>,
    semantics: EdgeSemantics,
) -> Result<CompactMealy<String, String>, FsmError> {
    let file = File::open(path.as_ref())?;
    parse_mealy(file, semantics, str::to_owned, str::to_owned)
}
