// ETF writer for Mealy machines.
//
// ETF is a tag-based format of `begin <section>` / `end <section>` blocks. A
// Mealy machine is written with one state slot (`id`) and two edge labels
// (`input`, `output`), each label referring to a sort by index.

use std::fmt::Display;
use std::hash::Hash;
use std::io::{self, Write};

use fsm_core::{Alphabet, CompactMealy};
use tracing::debug;

/// Write `mealy` as ETF.
///
/// Output labels are numbered in first-seen order while walking states
/// ascending and inputs in alphabet order. Labels are written verbatim
/// between double quotes.
pub fn write_mealy<W, I, O>(mut writer: W, mealy: &CompactMealy<I, O>) -> io::Result<()>
where
    W: Write,
    I: Display + Clone + Eq + Hash,
    O: Display + Clone + Eq + Hash,
{
    writeln!(writer, "begin state")?;
    writeln!(writer, "id:id")?;
    writeln!(writer, "end state")?;

    writeln!(writer, "begin edge")?;
    writeln!(writer, "input:input")?;
    writeln!(writer, "output:output")?;
    writeln!(writer, "end edge")?;

    if let Some(initial) = mealy.initial_state() {
        writeln!(writer, "begin init")?;
        writeln!(writer, "{initial}")?;
        writeln!(writer, "end init")?;
    }

    writeln!(writer, "begin sort id")?;
    for state in mealy.states() {
        writeln!(writer, "\"{state}\"")?;
    }
    writeln!(writer, "end sort")?;

    let inputs = mealy.input_alphabet();
    let mut outputs: Alphabet<O> = Alphabet::new();
    writeln!(writer, "begin trans")?;
    for (state, input, transition) in mealy.transitions() {
        let output_index = outputs.push(transition.output.clone());
        // every input of a listed transition is in the alphabet
        let input_index = inputs.index_of(input).unwrap_or_default();
        writeln!(
            writer,
            "{state}/{} {input_index} {output_index}",
            transition.successor
        )?;
    }
    writeln!(writer, "end trans")?;

    writeln!(writer, "begin sort input")?;
    for input in inputs {
        writeln!(writer, "\"{input}\"")?;
    }
    writeln!(writer, "end sort")?;

    writeln!(writer, "begin sort output")?;
    for output in &outputs {
        writeln!(writer, "\"{output}\"")?;
    }
    writeln!(writer, "end sort")?;

    debug!(
        states = mealy.size(),
        inputs = inputs.size(),
        outputs = outputs.size(),
        "wrote ETF"
    );
    writer.flush()
}

/// Render `mealy` as an ETF string.
pub fn to_etf_string<I, O>(mealy: &CompactMealy<I, O>) -> String
where
    I: Display + Clone + Eq + Hash,
    O: Display + Clone + Eq + Hash,
{
    let mut buffer = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_mealy(&mut buffer, mealy);
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeSemantics, parse_mealy_str};

    #[test]
    fn toggle_machine() {
        let source = "---\n\n\n---\n0 1 \"a\" \"x\"\n1 1 \"b\" \"y\"\n1 1 \"a\" \"x\"\n";
        let mealy = parse_mealy_str(source, EdgeSemantics::Direct).unwrap();
        let expected = "\
begin state
id:id
end state
begin edge
input:input
output:output
end edge
begin init
0
end init
begin sort id
\"0\"
\"1\"
end sort
begin trans
0/1 0 0
1/1 0 0
1/1 1 1
end trans
begin sort input
\"a\"
\"b\"
end sort
begin sort output
\"x\"
\"y\"
end sort
";
        assert_eq!(to_etf_string(&mealy), expected);
    }

    #[test]
    fn machine_without_initial_state_has_no_init_block() {
        let alphabet: Alphabet<char> = ['a'].into_iter().collect();
        let mut mealy: CompactMealy<char, u32> = CompactMealy::new(alphabet);
        let state = mealy.add_state();
        mealy.add_transition(state, &'a', state, 7).unwrap();
        let etf = to_etf_string(&mealy);
        assert!(!etf.contains("begin init"));
        assert!(etf.contains("begin trans\n0/0 0 0\nend trans\n"));
        assert!(etf.ends_with("begin sort output\n\"7\"\nend sort\n"));
    }

    #[test]
    fn write_error_propagates() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let mealy: CompactMealy<char, char> = CompactMealy::new(Alphabet::new());
        assert!(write_mealy(Broken, &mealy).is_err());
    }
}
