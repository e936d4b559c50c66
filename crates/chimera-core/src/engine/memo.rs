use super::error::EngineError;
use crate::core::models::record::PairwiseRecord;
use crate::core::overlap::{FIXED_RADIUS, Integral};
use std::collections::HashMap;
use tracing::debug;

type MemoKey = (u64, u64, u64);

fn key(distance: f64, sd1: f64, sd2: f64) -> MemoKey {
    (distance.to_bits(), sd1.to_bits(), sd2.to_bits())
}

fn sorted_pair(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Rewrites every record's overlaps from one table keyed by
/// `(distance, sorted radius pair)`, filled in record order with both the
/// radius-based and the fixed-radius integrals.
///
/// Both kinds share the table, so a pair whose radii are both 1.5 receives the
/// fixed-radius value of the last record at the same distance, and later
/// records at an equal key overwrite earlier ones. This reproduces reports
/// generated by the historical pipeline. Returns how many records changed.
pub(crate) fn reuse_overlaps(
    records: &mut [PairwiseRecord],
    radius_pairs: &[(f64, f64)],
) -> Result<usize, EngineError> {
    if records.len() != radius_pairs.len() {
        return Err(EngineError::Internal(format!(
            "{} records but {} radius pairs",
            records.len(),
            radius_pairs.len()
        )));
    }

    let mut memo: HashMap<MemoKey, Integral> = HashMap::new();
    for (record, &(r1, r2)) in records.iter().zip(radius_pairs) {
        let (Some(vdw), Some(fixed)) = (record.overlap_vdw, record.overlap_fixed) else {
            return Err(EngineError::Internal(
                "overlap reuse requested before overlaps were computed".to_string(),
            ));
        };
        let (lo, hi) = sorted_pair(r1, r2);
        memo.insert(key(record.distance, lo, hi), vdw);
        memo.insert(key(record.distance, FIXED_RADIUS, FIXED_RADIUS), fixed);
    }

    let lookup = |k: MemoKey| {
        memo.get(&k)
            .copied()
            .ok_or_else(|| EngineError::Internal("overlap table is missing a key".to_string()))
    };

    let mut changed = 0;
    for (record, &(r1, r2)) in records.iter_mut().zip(radius_pairs) {
        let (lo, hi) = sorted_pair(r1, r2);
        let vdw = lookup(key(record.distance, lo, hi))?;
        let fixed = lookup(key(record.distance, FIXED_RADIUS, FIXED_RADIUS))?;
        if record.overlap_vdw != Some(vdw) || record.overlap_fixed != Some(fixed) {
            changed += 1;
        }
        record.overlap_vdw = Some(vdw);
        record.overlap_fixed = Some(fixed);
    }
    debug!(
        "Overlap reuse rewrote {} of {} records ({} table entries).",
        changed,
        records.len(),
        memo.len()
    );
    Ok(changed)
}
