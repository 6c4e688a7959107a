// fsm2etf: Convert an FSM source to ETF.
//
// Usage:
//   fsm2etf [OPTIONS] FILE
//
// Options:
//   -o, --output PATH                    Write to PATH instead of stdout
//   -s, --semantics direct|alternating   How transition lines are read
//   -v, --verbose                        Log to stderr (repeat for more)

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use clap::Parser;
use fsm_cli::SourceArgs;
use fsm_io::etf;

/// Convert an FSM source to ETF.
#[derive(Parser)]
#[command(name = "fsm2etf", version)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let mealy = cli.source.load_or_exit();

    let result = match &cli.output {
        Some(path) => File::create(path)
            .and_then(|file| etf::write_mealy(BufWriter::new(file), &mealy))
            .map_err(|e| format!("{}: {e}", path.display())),
        None => etf::write_mealy(BufWriter::new(io::stdout().lock()), &mealy)
            .map_err(|e| format!("stdout: {e}")),
    };
    if let Err(msg) = result {
        fsm_cli::fatal(&msg);
    }
}
