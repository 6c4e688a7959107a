// Part-driven parse loop for FSM sources.
//
// An FSM source has three parts in fixed order: data definitions, state
// vectors and transitions. A line holding only `---` ends the first two parts;
// the transition part runs to the end of input. The loop owns control flow
// (part tracking, line counting, separator detection, end-of-line skipping)
// and hands every other line to a PhaseHandler.

use std::io::BufRead;

use tracing::{debug, trace};

use crate::FsmError;
use crate::tokenizer::{Position, Token, Tokenizer};

/// The separator between parts.
pub const SEPARATOR: &str = "---";

/// The three parts of an FSM source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Part {
    DataDefinition,
    StateVectors,
    Transitions,
}

impl Part {
    fn next(self) -> Part {
        match self {
            Part::DataDefinition => Part::StateVectors,
            Part::StateVectors | Part::Transitions => Part::Transitions,
        }
    }
}

/// Per-part hooks invoked by [`run`].
///
/// `line` is the zero-based line number within the current part. Line-level
/// hooks may read any number of tokens; whatever they leave on the line is
/// discarded by the loop. The `check_*` hooks run once, when their part ends,
/// with the position of the token that ended it.
pub trait PhaseHandler {
    fn parse_data_definition<R: BufRead>(
        &mut self,
        _tokens: &mut Tokenizer<R>,
        _line: u32,
    ) -> Result<(), FsmError> {
        Ok(())
    }

    fn check_data_definitions(&mut self, _position: Position) -> Result<(), FsmError> {
        Ok(())
    }

    fn parse_state_vector<R: BufRead>(
        &mut self,
        tokens: &mut Tokenizer<R>,
        line: u32,
    ) -> Result<(), FsmError>;

    fn check_state_vectors(&mut self, _position: Position) -> Result<(), FsmError> {
        Ok(())
    }

    fn parse_transition<R: BufRead>(
        &mut self,
        tokens: &mut Tokenizer<R>,
        line: u32,
    ) -> Result<(), FsmError>;

    fn check_transitions(&mut self, position: Position) -> Result<(), FsmError>;
}

/// Drive `handler` over the whole source.
///
/// The tokenizer, and with it the underlying reader, is consumed: it is
/// dropped when this function returns, whether a hook failed or not.
pub fn run<R: BufRead, H: PhaseHandler>(
    mut tokens: Tokenizer<R>,
    handler: &mut H,
) -> Result<(), FsmError> {
    let mut part = Part::DataDefinition;
    let mut line: u32 = 0;

    loop {
        let token = tokens.next_token()?;
        if token.token == Token::Eof {
            break;
        }

        let is_separator = matches!(&token.token, Token::Word(word) if word == SEPARATOR);
        if is_separator && part != Part::Transitions {
            match part {
                Part::DataDefinition => handler.check_data_definitions(token.position)?,
                _ => handler.check_state_vectors(token.position)?,
            }
            debug!(finished = ?part, lines = line, "FSM part complete");
            part = part.next();
            line = 0;
            tokens.skip_line()?;
            continue;
        }

        tokens.push_back(token);
        trace!(?part, line, "dispatching line");
        match part {
            Part::DataDefinition => handler.parse_data_definition(&mut tokens, line)?,
            Part::StateVectors => handler.parse_state_vector(&mut tokens, line)?,
            Part::Transitions => handler.parse_transition(&mut tokens, line)?,
        }
        tokens.skip_line()?;
        line += 1;
    }

    debug!(?part, lines = line, "end of FSM source");
    handler.check_transitions(tokens.position())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every hook call as a string.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        fail_on_transition: Option<u32>,
    }

    impl PhaseHandler for Recorder {
        fn parse_data_definition<R: BufRead>(
            &mut self,
            tokens: &mut Tokenizer<R>,
            line: u32,
        ) -> Result<(), FsmError> {
            let first = tokens.next_token()?.token;
            self.calls.push(format!("data {line} {first}"));
            Ok(())
        }

        fn check_data_definitions(&mut self, position: Position) -> Result<(), FsmError> {
            self.calls.push(format!("check data @{}", position.line));
            Ok(())
        }

        fn parse_state_vector<R: BufRead>(
            &mut self,
            _tokens: &mut Tokenizer<R>,
            line: u32,
        ) -> Result<(), FsmError> {
            self.calls.push(format!("state {line}"));
            Ok(())
        }

        fn check_state_vectors(&mut self, position: Position) -> Result<(), FsmError> {
            self.calls.push(format!("check states @{}", position.line));
            Ok(())
        }

        fn parse_transition<R: BufRead>(
            &mut self,
            tokens: &mut Tokenizer<R>,
            line: u32,
        ) -> Result<(), FsmError> {
            if self.fail_on_transition == Some(line) {
                return Err(FsmError::NoInitialState {
                    position: tokens.position(),
                });
            }
            let (from, _) = tokens.expect_number()?;
            self.calls.push(format!("transition {line} from {from}"));
            Ok(())
        }

        fn check_transitions(&mut self, position: Position) -> Result<(), FsmError> {
            self.calls.push(format!("check transitions @{}", position.line));
            Ok(())
        }
    }

    fn record(source: &str) -> Result<Vec<String>, FsmError> {
        let mut recorder = Recorder::default();
        run(Tokenizer::new(source.as_bytes()), &mut recorder)?;
        Ok(recorder.calls)
    }

    #[test]
    fn three_parts_in_order() {
        let calls = record("a(2) x\nb(3)\n---\nv\nw\n---\n0 1\n1 0 extra tokens\n").unwrap();
        assert_eq!(
            calls,
            vec![
                "data 0 word \"a\"",
                "data 1 word \"b\"",
                "check data @3",
                "state 0",
                "state 1",
                "check states @6",
                "transition 0 from 0",
                "transition 1 from 1",
                "check transitions @9",
            ]
        );
    }

    #[test]
    fn separator_in_transition_part_is_a_transition() {
        let err = record("---\n---\n---\n").unwrap_err();
        assert!(matches!(err, FsmError::Unexpected { .. }));
    }

    #[test]
    fn blank_state_vector_lines_count() {
        let calls = record("---\n\n\n\n---\n").unwrap();
        assert_eq!(
            calls,
            vec![
                "check data @1",
                "state 0",
                "state 1",
                "state 2",
                "check states @5",
                "check transitions @6",
            ]
        );
    }

    #[test]
    fn separator_must_be_first_token() {
        // `x ---` is an ordinary data definition line
        let calls = record("x ---\n---\n").unwrap();
        assert_eq!(calls[0], "data 0 word \"x\"");
        assert_eq!(calls[1], "check data @2");
    }

    #[test]
    fn missing_trailing_newline() {
        let calls = record("---\ns\n---\n4 5").unwrap();
        assert_eq!(calls[3], "transition 0 from 4");
        assert_eq!(calls.len(), 5);
    }

    #[test]
    fn empty_source_only_runs_final_check() {
        assert_eq!(record("").unwrap(), vec!["check transitions @1"]);
    }

    #[test]
    fn hook_failure_aborts_and_releases_reader() {
        use std::cell::Cell;
        use std::io::{self, Read};
        use std::rc::Rc;

        // Reader that flips a flag when dropped.
        struct Tracked {
            inner: io::Cursor<Vec<u8>>,
            dropped: Rc<Cell<bool>>,
        }
        impl Read for Tracked {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                self.inner.read(buf)
            }
        }
        impl Drop for Tracked {
            fn drop(&mut self) {
                self.dropped.set(true);
            }
        }

        let dropped = Rc::new(Cell::new(false));
        let reader = Tracked {
            inner: io::Cursor::new(b"---\n---\n0 1\n1 2\n2 3\n".to_vec()),
            dropped: Rc::clone(&dropped),
        };
        let mut recorder = Recorder {
            fail_on_transition: Some(1),
            ..Recorder::default()
        };
        let result = run(Tokenizer::new(io::BufReader::new(reader)), &mut recorder);
        assert!(result.is_err());
        assert!(dropped.get());
        assert_eq!(recorder.calls.last().unwrap(), "transition 0 from 0");
    }
}
