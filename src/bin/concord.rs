//! concord - span-level agreement between annotation tracks
//!
//! # Usage
//!
//! ```bash
//! # Agreement report for one file
//! concord score annotations.jsonl
//!
//! # Every *.jsonl below a directory, two projects only, markdown
//! concord score corpus/ -f medtype -f scigraph --format markdown
//!
//! # Which regions did several annotators mark?
//! concord clusters annotations.jsonl --limit 3
//! ```
//!
//! Logging goes to stderr; `-v`/`-vv` raise the level, `RUST_LOG` overrides it.

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;

use concord::cli::commands;
use concord::cli::{color, log_level, stderr_is_terminal, Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level(cli.verbose)),
    )
    .format_timestamp(None)
    .init();

    let result: Result<(), String> = match cli.command {
        Commands::Score(args) => commands::score::run(args),
        Commands::Clusters(args) => commands::clusters::run(args),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "concord", &mut io::stdout());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", color("31", "error:", stderr_is_terminal()), e);
            ExitCode::FAILURE
        }
    }
}
