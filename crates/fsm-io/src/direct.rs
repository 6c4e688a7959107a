// Direct edge semantics: `<from> <to> "<input>" "<output>"`.

use std::fmt::Debug;
use std::hash::Hash;
use std::io::{BufRead, BufReader, Read};

use fsm_core::CompactMealy;
use tracing::debug;

use crate::FsmError;
use crate::draft::MealyDraft;
use crate::phase::{self, PhaseHandler};
use crate::tokenizer::{Position, Tokenizer};

/// Phase hooks for transition lines that carry an input and an output label.
pub struct DirectHandler<I, O, FI, FO> {
    draft: MealyDraft<I, O>,
    input_parser: FI,
    output_parser: FO,
}

impl<I, O, FI, FO> DirectHandler<I, O, FI, FO>
where
    I: Clone + Eq + Hash + Debug,
    O: Debug,
    FI: FnMut(&str) -> I,
    FO: FnMut(&str) -> O,
{
    pub fn new(input_parser: FI, output_parser: FO) -> Self {
        Self {
            draft: MealyDraft::new(),
            input_parser,
            output_parser,
        }
    }

    pub fn draft(&self) -> &MealyDraft<I, O> {
        &self.draft
    }

    pub fn into_draft(self) -> MealyDraft<I, O> {
        self.draft
    }
}

impl<I, O, FI, FO> PhaseHandler for DirectHandler<I, O, FI, FO>
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

        let (input, _) = tokens.expect_quoted()?;
        let input = (self.input_parser)(&input);
        self.draft.record_input(input.clone());
        let (output, _) = tokens.expect_quoted()?;
        let output = (self.output_parser)(&output);

        self.draft
            .insert_transition(from, input, output, to, from_position)
    }

    fn check_transitions(&mut self, position: Position) -> Result<(), FsmError> {
        let targets: Vec<u32> = self.draft.transitions().iter().map(|t| t.to).collect();
        let initial = self.draft.infer_initial_state(targets, position)?;
        debug!(
            initial,
            transitions = self.draft.transitions().len(),
            "direct transitions checked"
        );
        Ok(())
    }
}

/// Parse an FSM source whose transition lines carry both labels.
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
    let mut handler = DirectHandler::new(input_parser, output_parser);
    phase::run(Tokenizer::new(BufReader::new(reader)), &mut handler)?;
    handler.into_draft().into_mealy()
}
