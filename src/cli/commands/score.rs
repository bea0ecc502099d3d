//! Score command - pairwise agreement report

use std::path::PathBuf;

use clap::Parser;

use crate::cli::output::{log_info, plural, stdout_is_terminal, write_output};
use crate::cli::utils::{load_config, resolve_input};
use crate::pipeline;
use crate::report::{ReportFormat, Reporter};

/// Score pairwise agreement between annotation projects
#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// JSONL file, directory, or '-' for stdin
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Only consider these projects (repeatable; default: all)
    #[arg(short, long = "filter", value_name = "NAME")]
    pub filter: Vec<String>,

    /// Maximum records read per file
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short = 'O', long, value_name = "PATH")]
    pub output: Option<String>,

    /// Glob selecting files inside a directory input
    #[arg(long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Worker threads for directory inputs (0 = one per core, 1 = sequential)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// TOML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the score command.
pub fn run(args: ScoreArgs) -> Result<(), String> {
    let mut config = load_config(args.config.as_deref())?;
    if !args.filter.is_empty() {
        config = config.with_filter(args.filter);
    }
    if let Some(limit) = args.limit {
        config = config.with_limit(limit);
    }
    if let Some(format) = args.format {
        config = config.with_format(format);
    }
    if let Some(pattern) = args.pattern {
        config = config.with_pattern(pattern);
    }
    if let Some(jobs) = args.jobs {
        config = config.with_jobs(jobs);
    }

    let source = resolve_input(&args.input)?;
    log_info(&format!("Scoring {}...", source.label()), args.quiet);

    let run = pipeline::score_input(&source, &config).map_err(|e| e.to_string())?;

    let colored =
        config.format == ReportFormat::Table && args.output.is_none() && stdout_is_terminal();
    let report = Reporter::new(config.format)
        .with_color(colored)
        .render(&run)
        .map_err(|e| e.to_string())?;
    write_output(&report, args.output.as_deref())?;

    log_info(
        &format!(
            "Compared {} across {}",
            plural(run.projects().len(), "project"),
            plural(run.len(), "pair")
        ),
        args.quiet,
    );
    if let Some(path) = &args.output {
        log_info(&format!("Report written to {}", path), args.quiet);
    }
    Ok(())
}
