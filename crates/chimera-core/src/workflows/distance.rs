use crate::core::io::distance_report::write_distance_report;
use crate::core::models::record::PairwiseRecord;
use crate::core::radii::ElementRadiusTable;
use crate::engine::config::DistanceConfig;
use crate::engine::distance::{DistanceJob, compute_pairwise_records};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct DistanceResult {
    /// Path actually written; carries `.gz` when compression was requested.
    pub path: PathBuf,
    pub records: Vec<PairwiseRecord>,
}

/// Computes all receptor-ligand atom pairs of `jobs` and writes them as a
/// distance report at `output`.
#[instrument(skip_all, name = "distance_workflow", fields(pdb_id = %pdb_id))]
pub fn create_distance_file(
    pdb_id: &str,
    jobs: &[DistanceJob],
    output: &Path,
    config: &DistanceConfig,
    radii: &ElementRadiusTable,
    reporter: &ProgressReporter,
) -> Result<DistanceResult, EngineError> {
    let records = compute_pairwise_records(pdb_id, jobs, config, radii, reporter)?;

    reporter.report(Progress::PhaseStart {
        name: "Writing Report",
    });
    let path = write_distance_report(output, pdb_id, &records, config.compressed)?;
    reporter.report(Progress::PhaseFinish);

    info!(
        "Wrote {} records for {} to '{}'.",
        records.len(),
        pdb_id,
        path.display()
    );
    Ok(DistanceResult { path, records })
}
