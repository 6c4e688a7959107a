//! Shared automaton types for the FSM tools.
//!
//! The parsers in `fsm-io` populate a [`CompactMealy`] through its builder
//! methods (allocate a state, set the initial state, add a transition) and hand
//! the finished machine to the caller.
//!
//! # Architecture
//!
//! - [`alphabet`] -- Ordered symbol set with stable indices
//! - [`mealy`] -- Table-backed Mealy machine (input/output transducer)

pub mod alphabet;
pub mod mealy;

pub use alphabet::Alphabet;
pub use mealy::{CompactMealy, MealyTransition};

/// Error type for building a [`CompactMealy`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutomatonError {
    #[error("state {state} does not exist (automaton has {size} states)")]
    UnknownState { state: usize, size: usize },
    #[error("symbol {0} is not part of the input alphabet")]
    UnknownSymbol(String),
}
