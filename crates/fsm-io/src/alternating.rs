// Alternating edge semantics: `<from> <to> "<label>"`.
//
// Transition lines are kept as raw labelled edges until the whole source has
// been read. Roles are then assigned by a depth-first walk from the initial
// state: edges leaving a state entered in input role are inputs, edges leaving
// a state entered in output role are outputs, and every input hop followed by
// an output hop closes one Mealy transition.

use std::fmt::Debug;
use std::hash::Hash;
use std::io::{BufRead, BufReader, Read};

use fsm_core::CompactMealy;
use hashbrown::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::FsmError;
use crate::draft::MealyDraft;
use crate::phase::{self, PhaseHandler};
use crate::tokenizer::{Position, Tokenizer};

/// An edge as written in the source, before its role is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEdge {
    pub label: String,
    pub to: u32,
}

enum Role<I> {
    Input,
    /// Entered through the input hop `(from, input)`.
    Output { from: u32, input: I },
}

struct Frame<I> {
    state: u32,
    role: Role<I>,
    next_edge: usize,
}

/// Phase hooks for single-label transition lines.
pub struct AlternatingHandler<I, O, FI, FO> {
    draft: MealyDraft<I, O>,
    /// Outgoing raw edges per source state, in line order.
    edges: HashMap<u32, Vec<RawEdge>>,
    input_parser: FI,
    output_parser: FO,
}

impl<I, O, FI, FO> AlternatingHandler<I, O, FI, FO>
where
    I: Clone + Eq + Hash + Debug,
    O: Debug,
    FI: FnMut(&str) -> I,
    FO: FnMut(&str) -> O,
{
    pub fn new(input_parser: FI, output_parser: FO) -> Self {
        Self {
            draft: MealyDraft::new(),
            edges: HashMap::new(),
            input_parser,
            output_parser,
        }
    }

    pub fn raw_edges(&self, from: u32) -> &[RawEdge] {
        self.edges.get(&from).map_or(&[], Vec::as_slice)
    }

    pub fn draft(&self) -> &MealyDraft<I, O> {
        &self.draft
    }

    pub fn into_draft(self) -> MealyDraft<I, O> {
        self.draft
    }

    /// Walk the raw edges from `initial`, recording resolved transitions.
    /// Returns the declared states that were never entered, sorted.
    fn resolve(&mut self, initial: u32, position: Position) -> Result<Vec<u32>, FsmError> {
        let Self {
            draft,
            edges,
            input_parser,
            output_parser,
        } = self;

        let mut unvisited: HashSet<u32> = draft.states().clone();
        unvisited.remove(&initial);
        let mut stack = vec![Frame {
            state: initial,
            role: Role::Input,
            next_edge: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(edge) = edges
                .get(&frame.state)
                .and_then(|out| out.get(frame.next_edge))
            else {
                stack.pop();
                continue;
            };
            frame.next_edge += 1;

            match &frame.role {
                Role::Input => {
                    let input = input_parser(&edge.label);
                    draft.record_input(input.clone());
                    trace!(from = frame.state, to = edge.to, label = %edge.label, "input hop");
                    let from = frame.state;
                    unvisited.remove(&edge.to);
                    stack.push(Frame {
                        state: edge.to,
                        role: Role::Output { from, input },
                        next_edge: 0,
                    });
                }
                Role::Output { from, input } => {
                    let output = output_parser(&edge.label);
                    trace!(from = frame.state, to = edge.to, label = %edge.label, "output hop");
                    draft.insert_transition(*from, input.clone(), output, edge.to, position)?;
                    if unvisited.remove(&edge.to) {
                        stack.push(Frame {
                            state: edge.to,
                            role: Role::Input,
                            next_edge: 0,
                        });
                    }
                }
            }
        }

        let mut unreached: Vec<u32> = unvisited.into_iter().collect();
        unreached.sort_unstable();
        Ok(unreached)
    }
}

impl<I, O, FI, FO> PhaseHandler for AlternatingHandler<I, O, FI, FO>
where
    I: Clone + Eq + Hash + Debug,
    O: Debug,
    FI: FnMut(&str) -> I,
    FO: FnMut(&str) -> O,
{
    fn parse_state_vector<R: BufRead>(
        &mut self,
        _tokens: &mut Tokenizer<R>,
        line: u32,
    ) -> Result<(), FsmError> {
        self.draft.declare_state(line);
        Ok(())
    }

    fn parse_transition<R: BufRead>(
        &mut self,
        tokens: &mut Tokenizer<R>,
        _line: u32,
    ) -> Result<(), FsmError> {
        let (from, from_position) = tokens.expect_number()?;
        self.draft.check_declared(from, from_position)?;
        let (to, to_position) = tokens.expect_number()?;
        self.draft.check_declared(to, to_position)?;
        let (label, _) = tokens.expect_quoted()?;

        let out = self.edges.entry(from).or_default();
        if let Some(previous) = out.iter().find(|edge| edge.label == label) {
            return Err(FsmError::NonDeterminism {
                previous: format!("({:?}, {})", previous.label, previous.to),
                position: from_position,
            });
        }
        out.push(RawEdge { label, to });
        Ok(())
    }

    fn check_transitions(&mut self, position: Position) -> Result<(), FsmError> {
        let targets: Vec<u32> = self
            .edges
            .values()
            .flat_map(|out| out.iter().map(|edge| edge.to))
            .collect();
        let initial = self.draft.infer_initial_state(targets, position)?;

        let unreached = self.resolve(initial, position)?;
        if !unreached.is_empty() {
            return Err(FsmError::PartialFsm {
                unreached,
                initial,
                position,
            });
        }
        debug!(
            initial,
            transitions = self.draft.transitions().len(),
            "alternating edges resolved"
        );
        Ok(())
    }
}

/// Parse an FSM source whose transition lines alternate between input and
/// output labels.
pub fn parse<R, I, O, FI, FO>(
    reader: R,
    input_parser: FI,
    output_parser: FO,
) -> Result<CompactMealy<I, O>, FsmError>
where
    R: Read,
    I: Clone + Eq + Hash + Debug,
    O: Debug,
    FI: FnMut(&str) -> I,
    FO: FnMut(&str) -> O,
{
    let mut handler = AlternatingHandler::new(input_parser, output_parser);
    phase::run(Tokenizer::new(BufReader::new(reader)), &mut handler)?;
    handler.into_draft().into_mealy()
}
