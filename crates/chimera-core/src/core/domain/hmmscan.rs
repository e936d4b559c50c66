use super::alignments::{AlignmentMap, read_alignments};
use super::domtab::{DomtabRow, read_domtab};
use super::process::run_tool;
use super::{DomainError, DomainFinder, DomainHit, write_query_fasta};
use crate::core::io::fasta::SequenceRecord;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tracing::{info, instrument};

/// Joins domain-table rows with their aligned query strings.
pub(crate) fn attach_alignments(
    rows: Vec<DomtabRow>,
    alignments: &AlignmentMap,
) -> Result<Vec<DomainHit>, DomainError> {
    rows.into_iter()
        .map(|row| {
            let key = row.alignment_key();
            let aligned = alignments
                .get(&key)
                .ok_or_else(|| DomainError::MissingAlignment(key.to_string()))?;
            Ok(DomainHit {
                query_id: row.query_name,
                model_accession: row.target_accession,
                model_name: row.target_name,
                target_start: row.ali_from,
                target_end: row.ali_to,
                model_start: row.hmm_from,
                model_end: row.hmm_to,
                model_length: row.target_length,
                bit_score: row.score,
                e_value: row.i_evalue,
                aligned_sequence: aligned.clone(),
            })
        })
        .collect()
}

/// Local `hmmscan --cut_ga` against Pfam-A.
pub struct HmmscanFinder {
    hmmscan_bin: PathBuf,
    pfam_hmm: PathBuf,
    timeout: Duration,
}

impl HmmscanFinder {
    pub fn new(hmmscan_bin: PathBuf, pfam_hmm: PathBuf, timeout: Duration) -> Self {
        Self {
            hmmscan_bin,
            pfam_hmm,
            timeout,
        }
    }
}

impl DomainFinder for HmmscanFinder {
    fn name(&self) -> &'static str {
        "hmmscan"
    }

    #[instrument(skip_all, name = "hmmscan", fields(sequences = sequences.len()))]
    fn find_domains(&self, sequences: &[SequenceRecord]) -> Result<Vec<DomainHit>, DomainError> {
        let workdir = tempfile::tempdir().map_err(|e| DomainError::io(&std::env::temp_dir(), e))?;
        let fasta = write_query_fasta(workdir.path(), sequences)?;
        let alignments_path = workdir.path().join("hmmscan.out");
        let domtab_path = workdir.path().join("hmmscan.domtab");

        run_tool(
            Command::new(&self.hmmscan_bin)
                .arg("--cut_ga")
                .arg("-o")
                .arg(&alignments_path)
                .arg("--domtblout")
                .arg(&domtab_path)
                .arg(&self.pfam_hmm)
                .arg(&fasta),
            "hmmscan",
            self.timeout,
        )?;

        let alignments = read_alignments(&alignments_path)?;
        let hits = attach_alignments(read_domtab(&domtab_path)?, &alignments)?;
        let total = hits.len();
        let kept: Vec<DomainHit> = hits.into_iter().filter(|h| h.bit_score > 0.0).collect();
        info!("hmmscan reported {} domains; {} with a positive bit score.", total, kept.len());
        Ok(kept)
    }
}
