//! hmmscan followed by a context-aware filter (dPUC2 or DomStratStats).
//!
//! Both pipelines are Perl script suites run from their install directory.
//! Each leaves a filtered domain table listing the (query, target, domain
//! index) triples it retained. Those are looked up in the unfiltered hmmscan
//! table, whose rows are joined with the hmmscan alignments.

use super::alignments::read_alignments;
use super::domtab::{read_domtab, read_filtered_domtab, select_rows};
use super::hmmscan::attach_alignments;
use super::process::run_tool;
use super::{DomainError, DomainFinder, DomainHit, write_query_fasta};
use crate::core::io::fasta::SequenceRecord;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{info, instrument};

const PERL: &str = "perl";
const RUN_HMMSCAN_SCRIPT: &str = "0runHmmscan.pl";

/// Paths shared by both filtering pipelines.
#[derive(Debug, Clone)]
pub struct HmmerPaths {
    pub hmmscan_bin: PathBuf,
    pub pfam_hmm: PathBuf,
    pub pfam_hmm_dat: PathBuf,
}

fn perl_script(dir: &Path, script: &str) -> Command {
    let mut command = Command::new(PERL);
    command.current_dir(dir).arg(script);
    command
}

/// `0runHmmscan.pl <hmmscan> <Pfam-A.hmm> <fasta> <domtab> <alignments>`.
fn run_hmmscan_script(
    script_dir: &Path,
    paths: &HmmerPaths,
    fasta: &Path,
    domtab: &Path,
    alignments: &Path,
    timeout: Duration,
) -> Result<(), DomainError> {
    run_tool(
        perl_script(script_dir, RUN_HMMSCAN_SCRIPT)
            .arg(&paths.hmmscan_bin)
            .arg(&paths.pfam_hmm)
            .arg(fasta)
            .arg(domtab)
            .arg(alignments),
        RUN_HMMSCAN_SCRIPT,
        timeout,
    )
}

pub struct Dpuc2Finder {
    paths: HmmerPaths,
    dpuc2_dir: PathBuf,
    dpuc2_net: PathBuf,
    timeout: Duration,
}

impl Dpuc2Finder {
    pub fn new(paths: HmmerPaths, dpuc2_dir: PathBuf, dpuc2_net: PathBuf, timeout: Duration) -> Self {
        Self {
            paths,
            dpuc2_dir,
            dpuc2_net,
            timeout,
        }
    }
}

impl DomainFinder for Dpuc2Finder {
    fn name(&self) -> &'static str {
        "dpuc2"
    }

    #[instrument(skip_all, name = "dpuc2", fields(sequences = sequences.len()))]
    fn find_domains(&self, sequences: &[SequenceRecord]) -> Result<Vec<DomainHit>, DomainError> {
        let workdir = tempfile::tempdir().map_err(|e| DomainError::io(&std::env::temp_dir(), e))?;
        let fasta = write_query_fasta(workdir.path(), sequences)?;
        let domtab = workdir.path().join("hmmscan.domtab");
        let alignments_path = workdir.path().join("hmmscan.out");
        let filtered = workdir.path().join("dpuc2.domtab");

        run_hmmscan_script(
            &self.dpuc2_dir,
            &self.paths,
            &fasta,
            &domtab,
            &alignments_path,
            self.timeout,
        )?;
        let alignments = read_alignments(&alignments_path)?;

        run_tool(
            perl_script(&self.dpuc2_dir, "1dpuc2.pl")
                .arg(&self.paths.pfam_hmm_dat)
                .arg(&self.dpuc2_net)
                .arg(&domtab)
                .arg(&filtered)
                .arg("--noGzip"),
            "1dpuc2.pl",
            self.timeout,
        )?;

        let selection = read_filtered_domtab(&filtered)?;
        let rows = select_rows(read_domtab(&domtab)?, &selection);
        info!("dPUC2 kept {} domains.", rows.len());
        attach_alignments(rows, &alignments)
    }
}

pub struct DomStratStatsFinder {
    paths: HmmerPaths,
    script_dir: PathBuf,
    timeout: Duration,
}

impl DomStratStatsFinder {
    pub fn new(paths: HmmerPaths, script_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            paths,
            script_dir,
            timeout,
        }
    }
}

impl DomainFinder for DomStratStatsFinder {
    fn name(&self) -> &'static str {
        "domstratstats"
    }

    /// The scripts append `.gz` to some outputs and refuse to overwrite
    /// existing files, so every output path points into a fresh directory and
    /// is resolved with or without the suffix afterwards.
    #[instrument(skip_all, name = "domstratstats", fields(sequences = sequences.len()))]
    fn find_domains(&self, sequences: &[SequenceRecord]) -> Result<Vec<DomainHit>, DomainError> {
        let workdir = tempfile::tempdir().map_err(|e| DomainError::io(&std::env::temp_dir(), e))?;
        let fasta = write_query_fasta(workdir.path(), sequences)?;
        let domtab = workdir.path().join("hmmscan.domtab");
        let no_overlaps = workdir.path().join("no_overlaps.domtab");
        let alignments_path = workdir.path().join("hmmscan.out");
        let filtered = workdir.path().join("domstratstats.domtab");

        run_hmmscan_script(
            &self.script_dir,
            &self.paths,
            &fasta,
            &domtab,
            &alignments_path,
            self.timeout,
        )?;
        let alignments = read_alignments(&alignments_path)?;

        run_tool(
            perl_script(&self.script_dir, "1noOvs.pl")
                .arg(&domtab)
                .arg(&no_overlaps)
                .arg(&self.paths.pfam_hmm_dat),
            "1noOvs.pl",
            self.timeout,
        )?;
        run_tool(
            perl_script(&self.script_dir, "2domStratStats.pl")
                .arg(&fasta)
                .arg(&no_overlaps)
                .arg(&filtered),
            "2domStratStats.pl",
            self.timeout,
        )?;

        let selection = read_filtered_domtab(&filtered)?;
        let rows = select_rows(read_domtab(&domtab)?, &selection);
        info!("DomStratStats kept {} domains.", rows.len());
        attach_alignments(rows, &alignments)
    }
}
