// Compact Mealy machine: a dense transition table indexed by
// (state, input symbol index).

use std::fmt::Debug;
use std::hash::Hash;
use std::ops::Range;

use crate::AutomatonError;
use crate::alphabet::Alphabet;

/// Target and output of a single Mealy transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealyTransition<O> {
    pub successor: usize,
    pub output: O,
}

/// A deterministic input/output transducer over a fixed input alphabet.
///
/// States are dense integers allocated by [`add_state`](Self::add_state).
/// The transition table is stored row-major: the slot for `(state, symbol)`
/// lives at `state * alphabet.size() + symbol`. Undefined transitions are
/// `None`, so partial machines are representable.
#[derive(Debug, Clone)]
pub struct CompactMealy<I, O> {
    alphabet: Alphabet<I>,
    initial_state: Option<usize>,
    state_count: usize,
    transitions: Vec<Option<MealyTransition<O>>>,
}

impl<I, O> CompactMealy<I, O> {
    /// Create an empty machine over `alphabet`.
    pub fn new(alphabet: Alphabet<I>) -> Self {
        Self {
            alphabet,
            initial_state: None,
            state_count: 0,
            transitions: Vec::new(),
        }
    }

    /// Allocate a new state and return its id.
    pub fn add_state(&mut self) -> usize {
        let state = self.state_count;
        self.state_count += 1;
        self.transitions.extend((0..self.alphabet.size()).map(|_| None));
        state
    }

    pub fn set_initial_state(&mut self, state: usize) -> Result<(), AutomatonError> {
        self.check_state(state)?;
        self.initial_state = Some(state);
        Ok(())
    }

    pub fn initial_state(&self) -> Option<usize> {
        self.initial_state
    }

    /// Number of allocated states.
    pub fn size(&self) -> usize {
        self.state_count
    }

    pub fn states(&self) -> Range<usize> {
        0..self.state_count
    }

    pub fn input_alphabet(&self) -> &Alphabet<I> {
        &self.alphabet
    }

    /// Number of defined transitions.
    pub fn transition_count(&self) -> usize {
        self.transitions.iter().filter(|t| t.is_some()).count()
    }

    /// Iterate over all defined transitions as `(state, input, transition)`,
    /// ordered by state and then by input index.
    pub fn transitions(&self) -> impl Iterator<Item = (usize, &I, &MealyTransition<O>)> + '_ {
        let width = self.alphabet.size();
        self.transitions
            .iter()
            .enumerate()
            .filter_map(move |(slot, transition)| {
                let transition = transition.as_ref()?;
                let input = self.alphabet.symbol(slot % width)?;
                Some((slot / width, input, transition))
            })
    }

    fn check_state(&self, state: usize) -> Result<(), AutomatonError> {
        if state < self.state_count {
            Ok(())
        } else {
            Err(AutomatonError::UnknownState {
                state,
                size: self.state_count,
            })
        }
    }

    fn slot(&self, state: usize, symbol: usize) -> usize {
        state * self.alphabet.size() + symbol
    }
}

impl<I: Clone + Eq + Hash, O> CompactMealy<I, O> {
    /// Define the transition `(from, input) -> (output, to)`.
    ///
    /// Returns the transition previously stored in that slot, if any.
    pub fn add_transition(
        &mut self,
        from: usize,
        input: &I,
        to: usize,
        output: O,
    ) -> Result<Option<MealyTransition<O>>, AutomatonError>
    where
        I: Debug,
    {
        self.check_state(from)?;
        self.check_state(to)?;
        let symbol = self
            .alphabet
            .index_of(input)
            .ok_or_else(|| AutomatonError::UnknownSymbol(format!("{input:?}")))?;
        let slot = self.slot(from, symbol);
        Ok(self.transitions[slot].replace(MealyTransition {
            successor: to,
            output,
        }))
    }

    pub fn transition(&self, state: usize, input: &I) -> Option<&MealyTransition<O>> {
        if state >= self.state_count {
            return None;
        }
        let symbol = self.alphabet.index_of(input)?;
        self.transitions[self.slot(state, symbol)].as_ref()
    }

    pub fn successor(&self, state: usize, input: &I) -> Option<usize> {
        self.transition(state, input).map(|t| t.successor)
    }

    pub fn output(&self, state: usize, input: &I) -> Option<&O> {
        self.transition(state, input).map(|t| &t.output)
    }

    /// Run `word` from the initial state and collect the produced outputs.
    ///
    /// Returns `None` if there is no initial state or if some transition
    /// along the way is undefined.
    pub fn compute_output<'a>(&self, word: impl IntoIterator<Item = &'a I>) -> Option<Vec<O>>
    where
        I: 'a,
        O: Clone,
    {
        let mut state = self.initial_state?;
        let mut outputs = Vec::new();
        for input in word {
            let transition = self.transition(state, input)?;
            outputs.push(transition.output.clone());
            state = transition.successor;
        }
        Some(outputs)
    }
}
