//! SDDL compiler CLI.
//!
//! Reads a data description from stdin and writes the compiled CBOR
//! document to stdout. Diagnostics and logs go to stderr, so the output
//! stream stays clean for piping.

use std::io::{Read, Write};
use std::process::ExitCode;

use sddl_compiler::{Compiler, Options};

const USAGE: &str = "\
Usage: sddlc [-v]... [-q]... < description.sddl > description.cbor

Compiles an SDDL data description read from stdin into its binary document
on stdout.

Options:
  -v          Increase verbosity (repeatable)
  -q          Decrease verbosity (repeatable)
  -h, --help  Print this help
";

fn init_tracing(verbosity: i32) {
    use tracing_subscriber::filter::LevelFilter;

    let level = match verbosity {
        i32::MIN..=-1 => LevelFilter::OFF,
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let mut verbosity = 0i32;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-v" => verbosity += 1,
            "-q" => verbosity -= 1,
            "-h" | "--help" => {
                print!("{USAGE}");
                return ExitCode::SUCCESS;
            }
            other => {
                eprintln!("sddlc: unrecognized argument '{other}'");
                eprint!("{USAGE}");
                return ExitCode::from(2);
            }
        }
    }

    init_tracing(verbosity);

    let mut text = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut text) {
        eprintln!("sddlc: failed to read stdin: {e}");
        return ExitCode::from(1);
    }

    let compiler = Compiler::new(Options::default().with_verbosity(verbosity));
    match compiler.compile(&text, "[stdin]") {
        Ok(bytes) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(&bytes).and_then(|()| stdout.flush()) {
                eprintln!("sddlc: failed to write output: {e}");
                return ExitCode::from(1);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            // Nothing reaches stdout on failure.
            if verbosity >= -1 {
                eprintln!("Compilation failed:\n{}", err.render());
            }
            ExitCode::from(1)
        }
    }
}
