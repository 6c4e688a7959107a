// fsm-trace: Run input words through an FSM Mealy machine.
//
// Each WORD argument is one whitespace-separated input word. Without WORD
// arguments, words are read from stdin, one per line. For every word the
// output word is printed, or `(undefined)` if some transition is missing.
//
// Usage:
//   fsm-trace [OPTIONS] FILE [WORD...]
//
// Options:
//   -s, --semantics direct|alternating   How transition lines are read
//   -v, --verbose                        Log to stderr (repeat for more)

use std::io::{self, BufRead, Write};

use clap::Parser;
use fsm_cli::{SourceArgs, parse_word};
use fsm_core::CompactMealy;
use tracing::debug;

/// Run input words through an FSM Mealy machine.
#[derive(Parser)]
#[command(name = "fsm-trace", version)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    /// Input words, symbols separated by spaces (default: read stdin)
    words: Vec<String>,
}

fn trace(mealy: &CompactMealy<String, String>, line: &str) -> String {
    let word = parse_word(line);
    match mealy.compute_output(&word) {
        Some(output) => output.join(" "),
        None => {
            debug!(word = line, "undefined transition on word");
            "(undefined)".to_string()
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let mealy = cli.source.load_or_exit();

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    if !cli.words.is_empty() {
        for word in &cli.words {
            let _ = writeln!(out, "{}", trace(&mealy, word));
        }
        return;
    }

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("error reading stdin: {e}");
                break;
            }
        };
        let _ = writeln!(out, "{}", trace(&mealy, &line));
    }
}
