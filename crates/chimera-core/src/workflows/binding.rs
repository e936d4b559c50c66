use crate::core::alignment::matchstate::seq_to_matchstates;
use crate::core::domain::filtered::{DomStratStatsFinder, Dpuc2Finder, HmmerPaths};
use crate::core::domain::hmmscan::HmmscanFinder;
use crate::core::domain::web::HmmerWebFinder;
use crate::core::domain::{DomainFinder, DomainRow};
use crate::core::io::binding::BindingFrequencyTable;
use crate::core::io::compress;
use crate::core::io::fasta::SequenceRecord;
use crate::engine::config::{ConfigError, DomainBackend, DomainSearchConfig};
use crate::engine::error::EngineError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::{info, instrument};

/// A domain match state of a query residue that has a known binding frequency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingMatch {
    pub query_id: String,
    pub pfam_domain: String,
    pub match_state: usize,
    /// 1-based position in the query sequence.
    pub seq_index: usize,
    pub ligand_type: String,
    pub binding_frequency: f64,
}

#[derive(Debug, Clone)]
pub struct BindingReport {
    pub domains: Vec<DomainRow>,
    pub matches: Vec<BindingMatch>,
}

/// Instantiates the domain finder selected by `config.backend`.
pub fn build_domain_finder(
    config: &DomainSearchConfig,
) -> Result<Box<dyn DomainFinder>, EngineError> {
    let paths = HmmerPaths {
        hmmscan_bin: config.hmmscan_bin.clone(),
        pfam_hmm: config.pfam_hmm(),
        pfam_hmm_dat: config.pfam_hmm_dat(),
    };
    let finder: Box<dyn DomainFinder> = match config.backend {
        DomainBackend::Hmmscan => Box::new(HmmscanFinder::new(
            paths.hmmscan_bin,
            paths.pfam_hmm,
            config.timeout,
        )),
        DomainBackend::HmmerWeb => Box::new(HmmerWebFinder::new(&config.web_url, config.timeout)?),
        DomainBackend::Dpuc2 => {
            let dir = config
                .dpuc2_dir
                .clone()
                .ok_or(ConfigError::MissingParameter("dpuc2_dir"))?;
            let net = config
                .dpuc2_net
                .clone()
                .ok_or(ConfigError::MissingParameter("dpuc2_net"))?;
            Box::new(Dpuc2Finder::new(paths, dir, net, config.timeout))
        }
        DomainBackend::DomStratStats => {
            let dir = config
                .domstratstats_dir
                .clone()
                .ok_or(ConfigError::MissingParameter("domstratstats_dir"))?;
            Box::new(DomStratStatsFinder::new(paths, dir, config.timeout))
        }
    };
    Ok(finder)
}

/// Expands every domain row into its (match state, sequence index) pairs and
/// joins them with `table` on (Pfam id, match state).
///
/// Rows are visited grouped by (query, Pfam domain) in sorted order; within a
/// group they keep their input order. Match states without a recorded
/// frequency are dropped.
pub fn query(
    domains: &[DomainRow],
    table: &BindingFrequencyTable,
) -> Result<Vec<BindingMatch>, EngineError> {
    let mut groups: BTreeMap<(&str, &str), Vec<&DomainRow>> = BTreeMap::new();
    for row in domains {
        groups
            .entry((row.query_id.as_str(), row.pfam_domain.as_str()))
            .or_default()
            .push(row);
    }

    let mut matches = Vec::new();
    for ((query_id, pfam_domain), rows) in groups {
        for row in rows {
            for state in seq_to_matchstates(&row.aliseq, row.target_start, row.target_end)? {
                for frequency in table.lookup(pfam_domain, state.match_state) {
                    matches.push(BindingMatch {
                        query_id: query_id.to_string(),
                        pfam_domain: pfam_domain.to_string(),
                        match_state: state.match_state,
                        seq_index: state.seq_index,
                        ligand_type: frequency.ligand_type.clone(),
                        binding_frequency: frequency.binding_frequency,
                    });
                }
            }
        }
    }
    Ok(matches)
}

/// Searches `sequences` for domains and maps them onto binding frequencies.
#[instrument(skip_all, name = "binding_workflow", fields(backend = finder.name(), sequences = sequences.len()))]
pub fn find_bindings(
    sequences: &[SequenceRecord],
    finder: &dyn DomainFinder,
    table: &BindingFrequencyTable,
    full_domains: bool,
) -> Result<BindingReport, EngineError> {
    let domains = finder.domain_table(sequences, full_domains)?;
    info!("{} found {} domains.", finder.name(), domains.len());
    let matches = query(&domains, table)?;
    info!("{} match states carry binding frequencies.", matches.len());
    Ok(BindingReport { domains, matches })
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), EngineError> {
    let io_err = |e: std::io::Error| EngineError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    };
    let out = compress::create_file(path).map_err(io_err)?;
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| io_err(std::io::Error::other(e.to_string())))?;
    }
    let out = writer
        .into_inner()
        .map_err(|e| io_err(std::io::Error::other(e.to_string())))?;
    out.finish().map_err(io_err)?.flush().map_err(io_err)?;
    Ok(())
}

pub fn write_binding_matches(path: &Path, matches: &[BindingMatch]) -> Result<(), EngineError> {
    write_csv(path, matches)
}

pub fn write_domain_rows(path: &Path, domains: &[DomainRow]) -> Result<(), EngineError> {
    write_csv(path, domains)
}
