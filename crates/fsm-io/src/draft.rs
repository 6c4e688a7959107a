// Parse state shared by both edge semantics, and materialization of a
// validated draft into a CompactMealy.

use std::fmt::Debug;
use std::hash::Hash;

use fsm_core::{Alphabet, CompactMealy};
use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, HashSet};
use tracing::debug;

use crate::{FsmError, Position};

/// A resolved Mealy transition between source-numbered states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTransition<I, O> {
    pub from: u32,
    pub input: I,
    pub output: O,
    pub to: u32,
}

/// Everything a parse has established so far.
///
/// - `states`: states declared in the state-vector part
/// - `inputs`: input symbols in first-seen order
/// - `transitions`: the `(from, input) -> (output, to)` function, in insertion order
/// - `initial_state`: set once the transition part has been checked
#[derive(Debug)]
pub struct MealyDraft<I, O> {
    states: HashSet<u32>,
    inputs: Alphabet<I>,
    transitions: Vec<ResolvedTransition<I, O>>,
    index: HashMap<(u32, I), usize>,
    initial_state: Option<u32>,
}

impl<I, O> Default for MealyDraft<I, O> {
    fn default() -> Self {
        Self {
            states: HashSet::new(),
            inputs: Alphabet::default(),
            transitions: Vec::new(),
            index: HashMap::new(),
            initial_state: None,
        }
    }
}

impl<I: Clone + Eq + Hash + Debug, O: Debug> MealyDraft<I, O> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_state(&mut self, state: u32) {
        self.states.insert(state);
    }

    pub fn states(&self) -> &HashSet<u32> {
        &self.states
    }

    /// Fail if `state` was not declared. Nothing is checked while the
    /// declared state set is empty.
    pub fn check_declared(&self, state: u32, position: Position) -> Result<(), FsmError> {
        if self.states.is_empty() || self.states.contains(&state) {
            Ok(())
        } else {
            Err(FsmError::UndefinedState { state, position })
        }
    }

    /// Add an input symbol to the alphabet.
    pub fn record_input(&mut self, input: I) {
        self.inputs.push(input);
    }

    pub fn inputs(&self) -> &Alphabet<I> {
        &self.inputs
    }

    /// Record `(from, input) -> (output, to)`.
    ///
    /// A second transition for the same `(from, input)` is a non-determinism
    /// error reporting the stored `(output, to)`.
    pub fn insert_transition(
        &mut self,
        from: u32,
        input: I,
        output: O,
        to: u32,
        position: Position,
    ) -> Result<(), FsmError> {
        match self.index.entry((from, input.clone())) {
            Entry::Occupied(slot) => {
                let previous = &self.transitions[*slot.get()];
                Err(FsmError::NonDeterminism {
                    previous: format!("({:?}, {})", previous.output, previous.to),
                    position,
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(self.transitions.len());
                self.transitions.push(ResolvedTransition {
                    from,
                    input,
                    output,
                    to,
                });
                Ok(())
            }
        }
    }

    pub fn transitions(&self) -> &[ResolvedTransition<I, O>] {
        &self.transitions
    }

    /// Pick the unique declared state that is not among `targets`.
    pub fn infer_initial_state(
        &mut self,
        targets: impl IntoIterator<Item = u32>,
        position: Position,
    ) -> Result<u32, FsmError> {
        let mut candidates = self.states.clone();
        for target in targets {
            candidates.remove(&target);
        }
        let mut candidates: Vec<u32> = candidates.into_iter().collect();
        candidates.sort_unstable();
        match candidates.as_slice() {
            [] => Err(FsmError::NoInitialState { position }),
            [initial] => {
                self.initial_state = Some(*initial);
                Ok(*initial)
            }
            _ => Err(FsmError::MultipleInitialStates {
                candidates,
                position,
            }),
        }
    }

    pub fn initial_state(&self) -> Option<u32> {
        self.initial_state
    }

    /// Build the machine.
    ///
    /// Target states are allocated the first time a source state is
    /// referenced: the initial state first, then transition endpoints in
    /// insertion order. Declared states that no transition touches are not
    /// materialized.
    pub fn into_mealy(self) -> Result<CompactMealy<I, O>, FsmError> {
        let initial = self.initial_state.ok_or(FsmError::NoInitialState {
            position: Position::default(),
        })?;

        let mut mealy = CompactMealy::new(self.inputs);
        let mut state_map: HashMap<u32, usize> = HashMap::new();

        let target = *state_map.entry(initial).or_insert_with(|| mealy.add_state());
        mealy.set_initial_state(target)?;

        for transition in self.transitions {
            let from = *state_map
                .entry(transition.from)
                .or_insert_with(|| mealy.add_state());
            let to = *state_map
                .entry(transition.to)
                .or_insert_with(|| mealy.add_state());
            mealy.add_transition(from, &transition.input, to, transition.output)?;
        }

        debug!(
            states = mealy.size(),
            inputs = mealy.input_alphabet().size(),
            transitions = mealy.transition_count(),
            "materialized Mealy machine"
        );
        Ok(mealy)
    }
}
