//! Protein domain search against Pfam profile HMMs.
//!
//! Every backend implements [`DomainFinder`]. Local backends shell out to
//! HMMER (optionally followed by a context filter such as dPUC2) and join
//! the `--domtblout` rows with the aligned query strings from the main
//! hmmscan output; the web backend reads the EBI JSON response directly.

pub mod alignments;
pub mod domtab;
pub mod filtered;
pub mod hmmscan;
pub mod process;
pub mod web;

use crate::core::io::fasta::{SequenceRecord, write_sequences};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },
    #[error("{tool} failed ({status}): {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },
    #[error("{tool} did not finish within {seconds} s")]
    Timeout { tool: String, seconds: u64 },
    #[error("HMMER web request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed {format} output (line {line}): {message}")]
    Parse {
        format: &'static str,
        line: usize,
        message: String,
    },
    #[error("No alignment found for {0}")]
    MissingAlignment(String),
    #[error("Duplicate alignment for {0}")]
    DuplicateAlignment(String),
}

impl DomainError {
    /// Whether repeating the same search may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            DomainError::Timeout { .. } => true,
            DomainError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            _ => false,
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        DomainError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        }
    }
}

/// A single domain instance found on a query sequence.
///
/// Coordinates are 1-based and inclusive on both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainHit {
    pub query_id: String,
    /// Versioned Pfam accession, e.g. "PF13465.6".
    pub model_accession: String,
    pub model_name: String,
    pub target_start: usize,
    pub target_end: usize,
    pub model_start: usize,
    pub model_end: usize,
    pub model_length: usize,
    pub bit_score: f64,
    pub e_value: f64,
    /// Query side of the alignment: lowercase for insertions, '-' for deletions.
    pub aligned_sequence: String,
}

impl DomainHit {
    pub fn spans_full_model(&self) -> bool {
        self.model_start == 1 && self.model_end == self.model_length
    }
}

/// Tabulated form of a [`DomainHit`], keyed by `pfam_domain`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainRow {
    pub query_id: String,
    /// Unversioned accession and model name, e.g. "PF13465_zf-H2C2_2".
    pub pfam_domain: String,
    pub target_start: usize,
    pub target_end: usize,
    pub hmm_start: usize,
    pub hmm_end: usize,
    pub domain_length: usize,
    pub bit_score: f64,
    pub e_value: f64,
    pub aliseq: String,
}

pub fn pfam_domain_key(accession: &str, name: &str) -> String {
    let prefix: String = accession.chars().take(7).collect();
    format!("{}_{}", prefix, name)
}

impl From<&DomainHit> for DomainRow {
    fn from(hit: &DomainHit) -> Self {
        Self {
            query_id: hit.query_id.clone(),
            pfam_domain: pfam_domain_key(&hit.model_accession, &hit.model_name),
            target_start: hit.target_start,
            target_end: hit.target_end,
            hmm_start: hit.model_start,
            hmm_end: hit.model_end,
            domain_length: hit.model_length,
            bit_score: hit.bit_score,
            e_value: hit.e_value,
            aliseq: hit.aligned_sequence.clone(),
        }
    }
}

pub trait DomainFinder {
    /// Short backend name for log messages.
    fn name(&self) -> &'static str;

    fn find_domains(&self, sequences: &[SequenceRecord]) -> Result<Vec<DomainHit>, DomainError>;

    /// Runs [`DomainFinder::find_domains`] and tabulates the hits. With
    /// `full_domains`, hits not covering the whole profile are dropped.
    fn domain_table(
        &self,
        sequences: &[SequenceRecord],
        full_domains: bool,
    ) -> Result<Vec<DomainRow>, DomainError> {
        Ok(self
            .find_domains(sequences)?
            .iter()
            .filter(|hit| !full_domains || hit.spans_full_model())
            .map(DomainRow::from)
            .collect())
    }
}

/// Writes `sequences` as FASTA into `dir` for the external tools.
pub(crate) fn write_query_fasta(
    dir: &Path,
    sequences: &[SequenceRecord],
) -> Result<PathBuf, DomainError> {
    let path = dir.join("query.fa");
    let io_err = |e| DomainError::io(&path, e);
    let mut writer = BufWriter::new(File::create(&path).map_err(io_err)?);
    write_sequences(&mut writer, sequences).map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    Ok(path)
}
