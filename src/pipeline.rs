//! End-to-end scoring: read records, cluster, score, aggregate.
//!
//! Each file gets its own [`AgreementScorer`] and produces its own partial
//! [`RunResult`]. Partials are reduced with [`RunResult::merge`]. With the
//! `parallel` feature, directory runs score files on a rayon pool; the
//! reduction order does not affect the totals.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use concord_core::DocumentRecord;

use crate::aggregate::RunResult;
use crate::cluster::SpanClusters;
use crate::config::ScoreConfig;
use crate::error::Result;
use crate::filter::ProjectFilter;
use crate::ingest::{collect_input_files, InputSource, RecordReader};
use crate::score::AgreementScorer;

/// Score a stream of records as one unit (one file).
pub fn score_records<I>(records: I, filter: &ProjectFilter) -> Result<RunResult>
where
    I: IntoIterator<Item = Result<DocumentRecord>>,
{
    let mut scorer = AgreementScorer::new(filter.clone());
    let mut run = RunResult::new();
    let mut documents = 0usize;
    for record in records {
        let record = record?;
        let (clusters, partial) = scorer.score_document(&record);
        log::debug!(
            "{}: {} denotation(s) in {} cluster(s)",
            record.source_url,
            clusters.denotation_count(),
            clusters.len()
        );
        run.merge(&partial)?;
        documents += 1;
    }
    log::debug!("scored {} document(s)", documents);
    Ok(run)
}

/// Score one JSONL file.
pub fn score_file(path: &Path, config: &ScoreConfig) -> Result<RunResult> {
    log::info!("scoring {}", path.display());
    let reader = RecordReader::open(path)?.with_limit(config.limit);
    score_records(reader, &config.project_filter())
}

/// Score records read from any buffered reader.
pub fn score_reader<R: BufRead>(
    reader: R,
    source_name: &str,
    config: &ScoreConfig,
) -> Result<RunResult> {
    let reader = RecordReader::new(reader, source_name).with_limit(config.limit);
    score_records(reader, &config.project_filter())
}

/// Score a list of files independently and merge the results.
pub fn score_files(files: &[PathBuf], config: &ScoreConfig) -> Result<RunResult> {
    #[cfg(feature = "parallel")]
    if config.jobs != 1 && files.len() > 1 {
        return score_files_parallel(files, config);
    }

    files
        .iter()
        .try_fold(RunResult::new(), |run, path| run.merged(score_file(path, config)?))
}

#[cfg(feature = "parallel")]
fn score_files_parallel(files: &[PathBuf], config: &ScoreConfig) -> Result<RunResult> {
    use rayon::prelude::*;

    let reduce = || {
        files
            .par_iter()
            .map(|path| score_file(path, config))
            .try_reduce(RunResult::new, RunResult::merged)
    };

    if config.jobs == 0 {
        return reduce();
    }
    match rayon::ThreadPoolBuilder::new().num_threads(config.jobs).build() {
        Ok(pool) => pool.install(reduce),
        Err(e) => {
            log::warn!("could not build a {}-thread pool ({}), using the global pool", config.jobs, e);
            reduce()
        }
    }
}

/// Score whatever `source` points at.
pub fn score_input(source: &InputSource, config: &ScoreConfig) -> Result<RunResult> {
    match source {
        InputSource::Stdin => score_reader(io::stdin().lock(), "-", config),
        InputSource::File(path) => score_file(path, config),
        InputSource::Directory(dir) => {
            let files = collect_input_files(dir, &config.pattern)?;
            score_files(&files, config)
        }
    }
}

/// Cluster every record of a stream, keeping the document with its clusters.
///
/// Lazy: each record is read and clustered only when the iterator is
/// advanced, so a listing can be written one document at a time. No scoring
/// happens here.
pub fn cluster_records<'f, I>(
    records: I,
    filter: &'f ProjectFilter,
) -> impl Iterator<Item = Result<(DocumentRecord, SpanClusters)>> + 'f
where
    I: IntoIterator<Item = Result<DocumentRecord>>,
    I::IntoIter: 'f,
{
    records.into_iter().map(move |record| {
        let record = record?;
        let clusters = crate::cluster::cluster_document(&record, filter);
        Ok((record, clusters))
    })
}
