//! HMMER `--domtblout` tables, full and filtered.

use super::DomainError;
use super::alignments::AlignmentKey;
use crate::core::io::compress;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

const FORMAT: &str = "domtblout";
const MIN_COLUMNS: usize = 19;

/// One per-domain line of an hmmscan `--domtblout` file.
#[derive(Debug, Clone, PartialEq)]
pub struct DomtabRow {
    pub target_name: String,
    pub target_accession: String,
    pub target_length: usize,
    pub query_name: String,
    pub domain_index: usize,
    pub i_evalue: f64,
    pub score: f64,
    pub hmm_from: usize,
    pub hmm_to: usize,
    pub ali_from: usize,
    pub ali_to: usize,
}

impl DomtabRow {
    pub fn alignment_key(&self) -> AlignmentKey {
        AlignmentKey {
            query: self.query_name.clone(),
            hit: self.target_name.clone(),
            hmm_from: self.hmm_from,
            hmm_to: self.hmm_to,
            ali_from: self.ali_from,
            ali_to: self.ali_to,
        }
    }
}

/// query name -> target name -> retained domain indices.
pub type DomainSelection = HashMap<String, HashMap<String, Vec<usize>>>;

fn data_lines<R: BufRead>(reader: R) -> impl Iterator<Item = (usize, std::io::Result<String>)> {
    reader
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| match line {
            Ok(l) => {
                let l = l.trim();
                !l.is_empty() && !l.starts_with('#')
            }
            Err(_) => true,
        })
}

fn parse_field<T: std::str::FromStr>(cols: &[&str], i: usize, line: usize) -> Result<T, DomainError> {
    cols[i].parse().map_err(|_| DomainError::Parse {
        format: FORMAT,
        line,
        message: format!("column {} ('{}') is not a valid number", i + 1, cols[i]),
    })
}

pub fn parse_domtab<R: BufRead>(reader: R, source: &Path) -> Result<Vec<DomtabRow>, DomainError> {
    let mut rows = Vec::new();
    for (line_no, line) in data_lines(reader) {
        let line = line.map_err(|e| DomainError::io(source, e))?;
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < MIN_COLUMNS {
            return Err(DomainError::Parse {
                format: FORMAT,
                line: line_no,
                message: format!("expected at least {} columns, found {}", MIN_COLUMNS, cols.len()),
            });
        }
        rows.push(DomtabRow {
            target_name: cols[0].to_string(),
            target_accession: cols[1].to_string(),
            target_length: parse_field(&cols, 2, line_no)?,
            query_name: cols[3].to_string(),
            domain_index: parse_field(&cols, 9, line_no)?,
            i_evalue: parse_field(&cols, 12, line_no)?,
            score: parse_field(&cols, 13, line_no)?,
            hmm_from: parse_field(&cols, 15, line_no)?,
            hmm_to: parse_field(&cols, 16, line_no)?,
            ali_from: parse_field(&cols, 17, line_no)?,
            ali_to: parse_field(&cols, 18, line_no)?,
        });
    }
    Ok(rows)
}

/// Reads a filtered table (rows removed arbitrarily, as dPUC2 and
/// DomStratStats write them). Only target, query and domain index are used.
pub fn parse_filtered_domtab<R: BufRead>(
    reader: R,
    source: &Path,
) -> Result<DomainSelection, DomainError> {
    let mut selection = DomainSelection::new();
    for (line_no, line) in data_lines(reader) {
        let line = line.map_err(|e| DomainError::io(source, e))?;
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 10 {
            return Err(DomainError::Parse {
                format: FORMAT,
                line: line_no,
                message: format!("expected at least 10 columns, found {}", cols.len()),
            });
        }
        let domain_index: usize = parse_field(&cols, 9, line_no)?;
        selection
            .entry(cols[3].to_string())
            .or_default()
            .entry(cols[0].to_string())
            .or_default()
            .push(domain_index);
    }
    Ok(selection)
}

/// `path` if it exists, else `path.gz` if that exists.
pub fn resolve_possibly_gzipped(path: &Path) -> Result<PathBuf, DomainError> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    let gz = compress::with_gz_suffix(path);
    if gz.exists() {
        return Ok(gz);
    }
    Err(DomainError::io(
        path,
        std::io::Error::new(std::io::ErrorKind::NotFound, "neither file nor its .gz exists"),
    ))
}

pub fn read_domtab(path: &Path) -> Result<Vec<DomtabRow>, DomainError> {
    let path = resolve_possibly_gzipped(path)?;
    let reader = compress::open_file(&path).map_err(|e| DomainError::io(&path, e))?;
    parse_domtab(reader, &path)
}

pub fn read_filtered_domtab(path: &Path) -> Result<DomainSelection, DomainError> {
    let path = resolve_possibly_gzipped(path)?;
    let reader = compress::open_file(&path).map_err(|e| DomainError::io(&path, e))?;
    parse_filtered_domtab(reader, &path)
}

/// Keeps the rows whose (query, target, domain index) appears in `selection`.
pub fn select_rows(rows: Vec<DomtabRow>, selection: &DomainSelection) -> Vec<DomtabRow> {
    rows.into_iter()
        .filter(|row| {
            selection
                .get(&row.query_name)
                .and_then(|targets| targets.get(&row.target_name))
                .is_some_and(|indices| indices.contains(&row.domain_index))
        })
        .collect()
}
