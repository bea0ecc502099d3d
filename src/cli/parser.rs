//! CLI argument parsing and structure definitions

use clap::{ArgAction, Parser, Subcommand};

use crate::cli::commands;

/// Span-level agreement between annotation tracks
#[derive(Parser)]
#[command(name = "concord")]
#[command(
    author,
    version,
    about = "Span-level agreement between annotation tracks",
    long_about = r#"
concord - compare independently produced span annotations

Each input line is a JSON document with one or more annotation tracks.
Overlapping denotations are grouped into span clusters; for every ordered
pair of projects concord counts the clusters each one marks and how often
they agree on linked identifiers and categories.

INPUT:
  A JSONL file, a directory (scanned with --pattern), or '-' for stdin.

EXAMPLES:
  concord score data/annotations.jsonl
  concord score corpus/ --filter medtype --filter scigraph --format markdown
  concord clusters doc.jsonl --limit 5
  concord completions bash > concord.bash
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Top-level subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Score pairwise agreement between projects
    #[command(visible_alias = "s")]
    Score(commands::ScoreArgs),

    /// List span clusters annotated more than once
    #[command(visible_alias = "c")]
    Clusters(commands::ClustersArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Log filter for a `-v` count.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_score_flags() {
        let cli = Cli::try_parse_from([
            "concord", "-vv", "score", "in.jsonl", "-f", "a", "--filter", "b", "--limit", "10",
            "--format", "tsv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Score(args) => {
                assert_eq!(args.input, "in.jsonl");
                assert_eq!(args.filter, vec!["a", "b"]);
                assert_eq!(args.limit, Some(10));
                assert_eq!(args.format, Some(crate::ReportFormat::Tsv));
            }
            _ => panic!("expected score"),
        }
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(0), "warn");
        assert_eq!(log_level(1), "info");
        assert_eq!(log_level(9), "trace");
    }
}
