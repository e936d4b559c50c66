use crate::core::io::compress;
use crate::core::io::distance_report::read_distance_report;
use crate::core::io::fasta::{AnnotatedChain, write_annotations};
use crate::core::models::record::PairwiseRecord;
use crate::engine::aggregate::aggregate;
use crate::engine::config::AggregationMetric;
use crate::engine::error::EngineError;
use std::io::Write;
use std::path::Path;
use tracing::{info, instrument};

/// Aggregates `records` under `metric` and writes one annotated entry per
/// chain to `output` (gzipped when it ends in `.gz`).
#[instrument(skip_all, name = "annotate_workflow", fields(metric = %metric))]
pub fn create_fasta(
    records: &[PairwiseRecord],
    output: &Path,
    metric: AggregationMetric,
    cutoff: f64,
) -> Result<Vec<AnnotatedChain>, EngineError> {
    let chains = aggregate(records, metric, cutoff)?;

    let io_err = |e: std::io::Error| EngineError::Io {
        path: output.to_string_lossy().to_string(),
        source: e,
    };
    let mut out = compress::create_file(output).map_err(io_err)?;
    write_annotations(&mut out, &chains).map_err(io_err)?;
    out.finish().map_err(io_err)?.flush().map_err(io_err)?;

    info!(
        "Wrote {} annotated chains ({}) to '{}'.",
        chains.len(),
        metric,
        output.display()
    );
    Ok(chains)
}

/// [`create_fasta`] over a distance report written earlier.
pub fn annotate_report(
    report: &Path,
    output: &Path,
    metric: AggregationMetric,
    cutoff: f64,
) -> Result<Vec<AnnotatedChain>, EngineError> {
    let records = read_distance_report(report)?;
    info!("Read {} records from '{}'.", records.len(), report.display());
    create_fasta(&records, output, metric, cutoff)
}
