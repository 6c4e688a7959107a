// fsm-check: Parse an FSM source and summarize the resulting Mealy machine.
//
// Usage:
//   fsm-check [OPTIONS] FILE
//
// Options:
//   -s, --semantics direct|alternating   How transition lines are read
//   --json                               Print the summary as JSON
//   -v, --verbose                        Log to stderr (repeat for more)
//
// Exits with status 1 and an `error:` line when the source is rejected.

use clap::Parser;
use fsm_cli::{MealySummary, SourceArgs};

/// Parse an FSM source and print a summary of the Mealy machine.
#[derive(Parser)]
#[command(name = "fsm-check", version)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    let mealy = cli.source.load_or_exit();
    let summary = MealySummary::new(&cli.source.file, cli.source.semantics.into(), &mealy);

    if cli.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => fsm_cli::fatal(&format!("failed to serialize summary: {e}")),
        }
    } else {
        println!("{summary}");
    }
}
