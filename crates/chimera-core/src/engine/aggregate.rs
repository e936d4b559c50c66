use super::config::{AggregationMetric, OverlapKind};
use crate::core::io::fasta::{AnnotatedChain, BindingSiteEntry};
use crate::core::models::record::{AtomOrdinal, PairwiseRecord};
use crate::core::overlap::Integral;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, instrument};

/// Distance below which a receptor atom counts as contacting the ligand.
pub const CONTACT_DISTANCE: f64 = 4.0;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum AggregationError {
    #[error(
        "Metric '{metric}' needs overlap values but record {row} of chain '{receptor_id}' has none"
    )]
    MissingOverlap {
        metric: AggregationMetric,
        receptor_id: String,
        row: usize,
    },
}

fn overlap_of(record: &PairwiseRecord, kind: OverlapKind) -> Option<Integral> {
    match kind {
        OverlapKind::Vdw => record.overlap_vdw,
        OverlapKind::Fixed => record.overlap_fixed,
    }
}

fn overlap_value(record: &PairwiseRecord, kind: OverlapKind) -> f64 {
    overlap_of(record, kind).map(|i| i.value).unwrap_or(0.0)
}

/// Distinct atom ordinals in order of first appearance.
fn unique_ordinals(rows: &[&PairwiseRecord]) -> Vec<AtomOrdinal> {
    let mut seen = Vec::new();
    for r in rows {
        if !seen.contains(&r.atom_ordinal) {
            seen.push(r.atom_ordinal);
        }
    }
    seen
}

fn per_atom_sum(rows: &[&PairwiseRecord], kind: OverlapKind) -> BTreeMap<AtomOrdinal, f64> {
    let mut sums = BTreeMap::new();
    for r in rows {
        *sums.entry(r.atom_ordinal).or_insert(0.0) += overlap_value(r, kind);
    }
    sums
}

fn per_atom_min_distance(rows: &[&PairwiseRecord]) -> BTreeMap<AtomOrdinal, f64> {
    let mut mins: BTreeMap<AtomOrdinal, f64> = BTreeMap::new();
    for r in rows {
        mins.entry(r.atom_ordinal)
            .and_modify(|d| *d = d.min(r.distance))
            .or_insert(r.distance);
    }
    mins
}

fn max_atom_overlap(rows: &[&PairwiseRecord], kind: OverlapKind) -> f64 {
    per_atom_sum(rows, kind)
        .into_values()
        .fold(f64::NEG_INFINITY, f64::max)
}

fn total_overlap(rows: &[&PairwiseRecord], kind: OverlapKind) -> f64 {
    rows.iter().map(|r| overlap_value(r, kind)).sum()
}

/// Scores one (residue, ligand) group.
///
/// `residue_ordinals` are the distinct atoms of the residue across all
/// ligands, after the overlap-quality filter.
fn score(
    metric: AggregationMetric,
    rows: &[&PairwiseRecord],
    residue_ordinals: &[AtomOrdinal],
    cutoff: f64,
) -> f64 {
    use AggregationMetric as M;
    use OverlapKind::{Fixed, Vdw};

    match metric {
        M::MaxStd => max_atom_overlap(rows, Fixed),
        M::MaxVdw => max_atom_overlap(rows, Vdw),
        M::MeanStd => total_overlap(rows, Fixed) / residue_ordinals.len() as f64,
        M::MeanVdw => total_overlap(rows, Vdw) / residue_ordinals.len() as f64,
        M::SumStd => total_overlap(rows, Fixed),
        M::SumVdw => total_overlap(rows, Vdw),
        M::MinDist => rows
            .iter()
            .map(|r| r.distance)
            .fold(f64::INFINITY, f64::min),
        M::MeanDist => {
            let mins = per_atom_min_distance(rows);
            let total: f64 = residue_ordinals
                .iter()
                .map(|o| mins.get(o).copied().unwrap_or(cutoff))
                .sum();
            total / residue_ordinals.len() as f64
        }
        M::FracIn4 => {
            let atom_count = rows.first().map(|r| r.atom_ordinal.count).unwrap_or(0);
            if atom_count == 0 {
                return 0.0;
            }
            let near = per_atom_min_distance(rows)
                .into_values()
                .filter(|d| *d < CONTACT_DISTANCE)
                .count();
            near as f64 / atom_count as f64
        }
    }
}

/// Reduces pairwise records to one score per (chain, residue, ligand).
///
/// Chains come out sorted by receptor id; each chain's entries are sorted by
/// residue position, then ligand id. Overlap metrics drop pairs whose
/// integration error is not below the overlap value. Distance metrics work
/// on records without overlaps.
#[instrument(skip_all, name = "aggregate", fields(metric = %metric))]
pub fn aggregate(
    records: &[PairwiseRecord],
    metric: AggregationMetric,
    cutoff: f64,
) -> Result<Vec<AnnotatedChain>, AggregationError> {
    let kind = metric.overlap_kind();
    if let Some(kind) = kind {
        if let Some((row, r)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| overlap_of(r, kind).is_none())
        {
            return Err(AggregationError::MissingOverlap {
                metric,
                receptor_id: r.receptor_id.clone(),
                row: row + 1,
            });
        }
    }

    let mut chains: BTreeMap<&str, Vec<&PairwiseRecord>> = BTreeMap::new();
    for r in records {
        chains.entry(r.receptor_id.as_str()).or_default().push(r);
    }

    let mut annotated = Vec::with_capacity(chains.len());
    for (receptor_id, rows) in chains {
        let sequence = rows
            .iter()
            .map(|r| r.full_sequence.as_str())
            .find(|s| !s.is_empty())
            .unwrap_or("")
            .to_string();

        let kept: Vec<&PairwiseRecord> = match kind {
            Some(kind) => rows
                .into_iter()
                .filter(|r| overlap_of(r, kind).is_some_and(|i| i.error < i.value))
                .collect(),
            None => rows,
        };

        let mut residues: BTreeMap<isize, Vec<&PairwiseRecord>> = BTreeMap::new();
        for r in kept {
            residues.entry(r.residue_index).or_default().push(r);
        }

        let mut entries = Vec::new();
        for (position, residue_rows) in residues {
            let ordinals = unique_ordinals(&residue_rows);
            let mut ligands: BTreeMap<&str, Vec<&PairwiseRecord>> = BTreeMap::new();
            for r in &residue_rows {
                ligands.entry(r.ligand_id.as_str()).or_default().push(r);
            }
            for (ligand_id, ligand_rows) in ligands {
                entries.push(BindingSiteEntry {
                    position,
                    ligand_id: ligand_id.to_string(),
                    score: score(metric, &ligand_rows, &ordinals, cutoff),
                });
            }
        }

        debug!("{}: {} binding-site entries.", receptor_id, entries.len());
        annotated.push(AnnotatedChain {
            chain_id: receptor_id.to_string(),
            sequence,
            entries,
        });
    }
    Ok(annotated)
}
