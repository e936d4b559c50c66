//! The tab-separated pairwise distance report.
//!
//! Layout: three `#` comment lines, a `#`-prefixed header row, then one row of
//! 13 columns per receptor-ligand atom pair. Overlap columns are left empty
//! when overlaps were not computed.

use super::compress::{self, with_gz_suffix};
use crate::core::models::record::{AtomOrdinal, PairwiseRecord};
use crate::core::overlap::Integral;
use crate::core::overlap::format::{format_error, format_overlap, format_shortest};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const REPORT_COLUMNS: [&str; 13] = [
    "#pdbID-pdbChain",
    "receptor_aa_1-index",
    "receptor_aa_value",
    "receptor_atom_id",
    "receptor_atom_value",
    "ligand_id",
    "ligand_atom_value",
    "euclidean_distance",
    "overlap_vdw_radii",
    "integral_error_vdw_radii",
    "overlap_1.5",
    "integral_error_1.5",
    "full_receptor_sequence",
];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Report parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Invalid value in '{path}' (line {line}): {message}")]
    Parse {
        path: String,
        line: u64,
        message: String,
    },
}

fn header_lines(pdb_id: &str) -> String {
    format!(
        "# All pairwise distances between receptor protein chain residue atoms and ligand atoms for {pdb_id}\n\
         # NOTE: columns 8-11 contain the overlap area between Gaussian distributions centered at each atom with \n\
         #   standard deviations set to either the van der Waals radii of the two atoms or to 1.5\n"
    )
}

fn integral_fields(integral: Option<Integral>) -> (String, String) {
    match integral {
        Some(i) => (format_overlap(i.value), format_error(i.error)),
        None => (String::new(), String::new()),
    }
}

/// Writes `records` to `path`, appending `.gz` and compressing when requested.
/// Returns the path actually written.
pub fn write_distance_report(
    path: &Path,
    pdb_id: &str,
    records: &[PairwiseRecord],
    compressed: bool,
) -> Result<PathBuf, ReportError> {
    let path = if compressed {
        with_gz_suffix(path)
    } else {
        path.to_path_buf()
    };
    let io_err = |e: std::io::Error| ReportError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    };
    let csv_err = |e: csv::Error| ReportError::Csv {
        path: path.to_string_lossy().to_string(),
        source: e,
    };

    let mut out = compress::create_file(&path).map_err(io_err)?;
    out.write_all(header_lines(pdb_id).as_bytes())
        .map_err(io_err)?;
    out.write_all(REPORT_COLUMNS.join("\t").as_bytes())
        .map_err(io_err)?;
    out.write_all(b"\n").map_err(io_err)?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(out);
    for r in records {
        let (overlap_vdw, error_vdw) = integral_fields(r.overlap_vdw);
        let (overlap_fixed, error_fixed) = integral_fields(r.overlap_fixed);
        writer
            .write_record([
                r.receptor_id.as_str(),
                &r.residue_index.to_string(),
                &r.residue_code.to_string(),
                &r.atom_ordinal.to_string(),
                &r.receptor_element,
                &r.ligand_id,
                &r.ligand_element,
                &format_shortest(r.distance),
                &overlap_vdw,
                &error_vdw,
                &overlap_fixed,
                &error_fixed,
                &r.full_sequence,
            ])
            .map_err(csv_err)?;
    }

    let out = writer
        .into_inner()
        .map_err(|e| io_err(std::io::Error::other(e.to_string())))?;
    out.finish().map_err(io_err)?.flush().map_err(io_err)?;
    Ok(path)
}

/// Reads a report written by [`write_distance_report`], compressed or not.
pub fn read_distance_report(path: &Path) -> Result<Vec<PairwiseRecord>, ReportError> {
    let path_str = path.to_string_lossy().to_string();
    let input = compress::open_file(path).map_err(|e| ReportError::Io {
        path: path_str.clone(),
        source: e,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| ReportError::Csv {
            path: path_str.clone(),
            source: e,
        })?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let parse_err = |message: String| ReportError::Parse {
            path: path_str.clone(),
            line,
            message,
        };

        if row.len() < 8 {
            return Err(parse_err(format!(
                "expected {} columns, found {}",
                REPORT_COLUMNS.len(),
                row.len()
            )));
        }
        let field = |i: usize| row.get(i).unwrap_or("").trim();
        let number = |i: usize| -> Result<Option<f64>, ReportError> {
            let s = field(i);
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>()
                .map(Some)
                .map_err(|_| parse_err(format!("'{}' in column {} is not a number", s, i + 1)))
        };
        let integral = |value: usize, error: usize| -> Result<Option<Integral>, ReportError> {
            Ok(match (number(value)?, number(error)?) {
                (Some(value), Some(error)) => Some(Integral { value, error }),
                _ => None,
            })
        };

        records.push(PairwiseRecord {
            receptor_id: field(0).to_string(),
            residue_index: field(1)
                .parse()
                .map_err(|_| parse_err(format!("invalid residue index '{}'", field(1))))?,
            residue_code: field(2)
                .chars()
                .next()
                .ok_or_else(|| parse_err("empty residue code".to_string()))?,
            atom_ordinal: field(3)
                .parse::<AtomOrdinal>()
                .map_err(|e| parse_err(e.to_string()))?,
            receptor_element: field(4).to_string(),
            ligand_id: field(5).to_string(),
            ligand_element: field(6).to_string(),
            distance: number(7)?.ok_or_else(|| parse_err("missing distance".to_string()))?,
            overlap_vdw: integral(8, 9)?,
            overlap_fixed: integral(10, 11)?,
            full_sequence: field(12).to_string(),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(distance: f64, sequence: &str, with_overlap: bool) -> PairwiseRecord {
        PairwiseRecord {
            receptor_id: "2lueA".to_string(),
            residue_index: 4,
            residue_code: 'K',
            atom_ordinal: AtomOrdinal { index: 2, count: 5 },
            receptor_element: "C".to_string(),
            ligand_id: "III".to_string(),
            ligand_element: "N".to_string(),
            distance,
            overlap_vdw: with_overlap.then_some(Integral {
                value: 0.0001,
                error: 0.000012345,
            }),
            overlap_fixed: with_overlap.then_some(Integral {
                value: 0.123456789,
                error: 0.0001,
            }),
            full_sequence: sequence.to_string(),
        }
    }

    #[test]
    fn report_has_fixed_header_and_formatted_rows() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("2lue.txt");
        let written = write_distance_report(
            &target,
            "2lue",
            &[record(3.0, "MKVL", true), record(4.25, "", true)],
            false,
        )
        .unwrap();
        assert_eq!(written, target);

        let content = std::fs::read_to_string(&written).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "# All pairwise distances between receptor protein chain residue atoms and ligand atoms for 2lue"
        );
        assert!(lines[1].starts_with("# NOTE: columns 8-11"));
        assert!(lines[2].ends_with("of the two atoms or to 1.5"));
        assert_eq!(lines[3].split('\t').count(), 13);
        assert_eq!(
            lines[4],
            "2lueA\t4\tK\t2/5\tC\tIII\tN\t3.0\t1e-04\t1.2e-05\t0.1234568\t1e-04\tMKVL"
        );
        assert_eq!(
            lines[5],
            "2lueA\t4\tK\t2/5\tC\tIII\tN\t4.25\t1e-04\t1.2e-05\t0.1234568\t1e-04\t"
        );
    }

    #[test]
    fn compressed_report_gets_gz_suffix_and_reads_back() {
        let dir = tempdir().unwrap();
        let written = write_distance_report(
            &dir.path().join("2lue.txt"),
            "2lue",
            &[record(12.5, "MKVL", true)],
            true,
        )
        .unwrap();
        assert!(written.to_string_lossy().ends_with("2lue.txt.gz"));

        let records = read_distance_report(&written).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.distance, 12.5);
        assert_eq!(r.atom_ordinal, AtomOrdinal { index: 2, count: 5 });
        assert_eq!(r.full_sequence, "MKVL");
        assert_eq!(r.overlap_fixed.unwrap().value, 0.1234568);
        assert_eq!(r.overlap_vdw.unwrap().value, 0.0001);
    }

    #[test]
    fn distance_only_report_leaves_overlap_columns_empty() {
        let dir = tempdir().unwrap();
        let written = write_distance_report(
            &dir.path().join("d.txt"),
            "1abc",
            &[record(0.1 + 0.2, "", false)],
            false,
        )
        .unwrap();

        let content = std::fs::read_to_string(&written).unwrap();
        let row = content.lines().nth(4).unwrap();
        assert!(row.contains("\t0.30000000000000004\t\t\t\t\t"));

        let records = read_distance_report(&written).unwrap();
        assert_eq!(records[0].distance, 0.1 + 0.2);
        assert!(!records[0].has_overlap());
    }

    #[test]
    fn malformed_row_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, "2lueA\tfour\tK\t2/5\tC\tIII\tN\t3.0\t\t\t\t\t\n").unwrap();
        let err = read_distance_report(&path).unwrap_err();
        assert!(matches!(err, ReportError::Parse { .. }));
    }
}
