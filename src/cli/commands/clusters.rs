//! Clusters command - inspect span clusters per document

use std::io::{self, Write};

use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::cli::output::{color, log_info, open_output, plural, stdout_is_terminal};
use crate::cli::utils::{load_config, resolve_input};
use crate::cluster::{SpanCluster, SpanClusters};
use crate::filter::ProjectFilter;
use crate::ingest::RecordReader;
use crate::pipeline;

/// Output format for cluster listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ClusterFormat {
    /// Indented listing
    #[default]
    Text,
    /// One JSON object per document (JSONL)
    Json,
}

/// List span clusters annotated by more than one denotation
#[derive(Parser, Debug)]
pub struct ClustersArgs {
    /// JSONL file, directory, or '-' for stdin
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Only consider these projects (repeatable; default: all)
    #[arg(short, long = "filter", value_name = "NAME")]
    pub filter: Vec<String>,

    /// Maximum records read per file
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: ClusterFormat,

    /// Include single-member clusters
    #[arg(long)]
    pub all: bool,

    /// Write output to a file instead of stdout
    #[arg(short = 'O', long, value_name = "PATH")]
    pub output: Option<String>,

    /// Glob selecting files inside a directory input
    #[arg(long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Suppress status messages
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Serialize)]
struct DocumentClusters<'a> {
    source_url: &'a str,
    clusters: &'a SpanClusters,
}

/// Execute the clusters command.
pub fn run(args: ClustersArgs) -> Result<(), String> {
    let config = load_config(None)?;
    let pattern = args.pattern.as_deref().unwrap_or(&config.pattern);
    let filter: ProjectFilter = if args.filter.is_empty() {
        config.project_filter()
    } else {
        args.filter.iter().cloned().collect()
    };
    let limit = args.limit.or(config.limit).filter(|&n| n > 0);

    let source = resolve_input(&args.input)?;
    let streams = crate::cli::utils::open_streams(&source, pattern)?;
    let colored = args.output.is_none() && stdout_is_terminal();
    let mut out = open_output(args.output.as_deref())?;
    let write_err = |e: io::Error| format!("Failed to write output: {}", e);

    let mut documents = 0usize;
    let mut listed = 0usize;
    for (name, stream) in streams {
        let records = RecordReader::new(stream, name).with_limit(limit);
        for clustered in pipeline::cluster_records(records, &filter) {
            let (record, clusters) = clustered.map_err(|e| e.to_string())?;
            documents += 1;
            listed += match args.format {
                ClusterFormat::Json => {
                    let document = DocumentClusters {
                        source_url: &record.source_url,
                        clusters: &clusters,
                    };
                    serde_json::to_writer(&mut out, &document)
                        .map_err(|e| format!("Failed to serialize clusters: {}", e))?;
                    writeln!(out).map_err(write_err)?;
                    clusters.len()
                }
                ClusterFormat::Text => {
                    render_text(&mut out, &record.source_url, &clusters, args.all, colored)
                        .map_err(write_err)?
                }
            };
        }
    }
    out.flush().map_err(write_err)?;

    log_info(
        &format!("Listed {} from {}", plural(listed, "cluster"), plural(documents, "document")),
        args.quiet,
    );
    Ok(())
}

/// Write the text listing for one document; returns how many clusters it showed.
fn render_text(
    out: &mut dyn Write,
    source_url: &str,
    clusters: &SpanClusters,
    all: bool,
    colored: bool,
) -> io::Result<usize> {
    let shown: Vec<&SpanCluster> = if all {
        clusters.iter().collect()
    } else {
        clusters.multi_member().collect()
    };
    let label = if source_url.is_empty() { "(no source_url)" } else { source_url };
    writeln!(
        out,
        "{} ({}, {} shown)",
        label,
        plural(clusters.len(), "cluster"),
        shown.len()
    )?;
    for cluster in &shown {
        writeln!(out, "  {} ({}):", cluster.key(), plural(cluster.len(), "annotation"))?;
        for member in cluster.members() {
            let d = &member.denotation;
            let marker = if member.is_generic() {
                format!("{} ", color("33", "[generic]", colored))
            } else {
                String::new()
            };
            writeln!(
                out,
                "    {}[{}] {:?} {} {}",
                marker,
                member.project,
                d.text,
                if d.obj.is_empty() { "-".to_string() } else { d.obj.join("|") },
                if d.link_ids.is_empty() { "-".to_string() } else { d.link_ids.join(",") },
            )?;
        }
    }
    Ok(shown.len())
}
