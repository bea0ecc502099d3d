//! Agreement report rendering.
//!
//! For every ordered pair with `total_spans > 0` the report shows:
//!
//! - the share of spans only the first project found,
//! - the share only the second project found,
//! - the share both found,
//! - and, when some spans are shared, how many of the shared spans agree on
//!   linked identifiers and on categories.
//!
//! Percentages over a zero denominator are suppressed, never computed.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::aggregate::RunResult;
use crate::error::{Error, Result};
use crate::score::PairwiseResult;

/// Output format for agreement reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Aligned columns for the terminal (default)
    #[default]
    Table,
    /// Markdown table
    Markdown,
    /// Tab-separated values with a header row
    Tsv,
    /// JSON array with raw counters and percentages
    Json,
}

/// `part / whole` as a percentage, `None` when `whole` is zero.
#[must_use]
pub fn percent(part: u64, whole: u64) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(part as f64 * 100.0 / whole as f64)
    }
}

/// One rendered row of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairReport<'a> {
    /// First project
    pub project_1: &'a str,
    /// Second project
    pub project_2: &'a str,
    /// Raw counters
    pub counts: PairwiseResult,
    /// % of spans found only by the first project
    pub unique_to_1: Option<f64>,
    /// % of spans found only by the second project
    pub unique_to_2: Option<f64>,
    /// % of spans found by both
    pub shared: Option<f64>,
    /// % of shared spans with a link id in common
    pub identical_link_ids: Option<f64>,
    /// % of shared spans with a category in common
    pub identical_obj: Option<f64>,
}

impl<'a> PairReport<'a> {
    /// Compute the percentages for one pair.
    #[must_use]
    pub fn new(project_1: &'a str, project_2: &'a str, counts: &PairwiseResult) -> Self {
        Self {
            project_1,
            project_2,
            counts: *counts,
            unique_to_1: percent(counts.spans_in_1_not_2, counts.total_spans),
            unique_to_2: percent(counts.spans_in_2_not_1, counts.total_spans),
            shared: percent(counts.shared_spans, counts.total_spans),
            identical_link_ids: percent(counts.identical_link_ids, counts.shared_spans),
            identical_obj: percent(counts.identical_obj, counts.shared_spans),
        }
    }
}

/// Renders a [`RunResult`] in one of the [`ReportFormat`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    format: ReportFormat,
    colored: bool,
}

impl Reporter {
    /// Reporter for `format`, without color.
    #[must_use]
    pub fn new(format: ReportFormat) -> Self {
        Self {
            format,
            colored: false,
        }
    }

    /// Enable ANSI colors in table output.
    #[must_use]
    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Rows for every pair, including empty ones.
    #[must_use]
    pub fn rows<'a>(&self, run: &'a RunResult) -> Vec<PairReport<'a>> {
        run.pairs()
            .map(|(first, second, counts)| PairReport::new(first, second, counts))
            .collect()
    }

    /// Render the whole matrix.
    pub fn render(&self, run: &RunResult) -> Result<String> {
        let rows = self.rows(run);
        match self.format {
            ReportFormat::Json => serde_json::to_string_pretty(&rows)
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .map_err(|e| Error::invariant(format!("failed to serialize report: {}", e))),
            ReportFormat::Table => Ok(self.render_table(&rows)),
            ReportFormat::Markdown => Ok(render_markdown(&rows)),
            ReportFormat::Tsv => Ok(render_tsv(&rows)),
        }
    }

    fn render_table(&self, rows: &[PairReport<'_>]) -> String {
        let rows: Vec<_> = rows.iter().filter(|r| r.counts.total_spans > 0).collect();
        if rows.is_empty() {
            return "No overlapping tracks to compare.\n".to_string();
        }
        let w1 = rows.iter().map(|r| r.project_1.len()).max().unwrap_or(0).max(9);
        let w2 = rows.iter().map(|r| r.project_2.len()).max().unwrap_or(0).max(9);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<w1$}  {:<w2$}  {:>7}  {:>7}  {:>7}  {:>7}  {:>7}  {:>7}",
            "Project 1", "Project 2", "Spans", "Only 1", "Only 2", "Shared", "Links", "Types",
        );
        let _ = writeln!(out, "{}", "-".repeat(w1 + w2 + 4 + 6 * 9));
        for r in rows {
            let _ = writeln!(
                out,
                "{:<w1$}  {:<w2$}  {:>7}  {}  {}  {}  {}  {}",
                r.project_1,
                r.project_2,
                r.counts.total_spans,
                self.cell(r.unique_to_1, false),
                self.cell(r.unique_to_2, false),
                self.cell(r.shared, true),
                self.cell(r.identical_link_ids, true),
                self.cell(r.identical_obj, true),
            );
        }
        out
    }

    fn cell(&self, value: Option<f64>, higher_is_better: bool) -> String {
        let text = fmt_pct(value, 7);
        match value {
            Some(v) if self.colored && higher_is_better => {
                let code = if v >= 90.0 {
                    "1;32"
                } else if v >= 70.0 {
                    "1;33"
                } else if v >= 50.0 {
                    "33"
                } else {
                    "1;31"
                };
                format!("\x1b[{}m{}\x1b[0m", code, text)
            }
            _ => text,
        }
    }
}

fn fmt_pct(value: Option<f64>, width: usize) -> String {
    match value {
        Some(v) => format!("{:>width$}", format!("{:.1}%", v)),
        None => format!("{:>width$}", "-"),
    }
}

fn render_markdown(rows: &[PairReport<'_>]) -> String {
    let mut out = String::from(
        "| Project 1 | Project 2 | Spans | Only 1 | Only 2 | Shared | Identical links | Identical types |\n\
         |-----------|-----------|-------|--------|--------|--------|-----------------|-----------------|\n",
    );
    for r in rows.iter().filter(|r| r.counts.total_spans > 0) {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} | {} |",
            r.project_1,
            r.project_2,
            r.counts.total_spans,
            fmt_pct(r.unique_to_1, 0),
            fmt_pct(r.unique_to_2, 0),
            fmt_pct(r.shared, 0),
            fmt_pct(r.identical_link_ids, 0),
            fmt_pct(r.identical_obj, 0),
        );
    }
    out
}

fn render_tsv(rows: &[PairReport<'_>]) -> String {
    let mut out = String::from(
        "project_1\tproject_2\ttotal_spans\tshared_spans\tspans_in_1_not_2\tspans_in_2_not_1\t\
         identical_link_ids\tidentical_obj\tpct_unique_1\tpct_unique_2\tpct_shared\t\
         pct_identical_link_ids\tpct_identical_obj\n",
    );
    let tsv_pct = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_default();
    for r in rows.iter().filter(|r| r.counts.total_spans > 0) {
        let c = &r.counts;
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            r.project_1,
            r.project_2,
            c.total_spans,
            c.shared_spans,
            c.spans_in_1_not_2,
            c.spans_in_2_not_1,
            c.identical_link_ids,
            c.identical_obj,
            tsv_pct(r.unique_to_1),
            tsv_pct(r.unique_to_2),
            tsv_pct(r.shared),
            tsv_pct(r.identical_link_ids),
            tsv_pct(r.identical_obj),
        );
    }
    out
}
