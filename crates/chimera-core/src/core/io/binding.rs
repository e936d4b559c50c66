//! Per-match-state ligand binding frequencies of Pfam domains.
//!
//! Two inputs are understood: the unpivoted CSV
//! (`pfam_id,match_state,ligand_type,binding_frequency`) and the InteracDome
//! results TSV, whose `binding_frequencies` column holds one comma-separated
//! value per match state.

use super::compress;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum BindingTableError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Table parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Invalid value in '{path}' (line {line}): {message}")]
    Parse {
        path: String,
        line: u64,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingFrequency {
    pub pfam_id: String,
    pub match_state: usize,
    pub ligand_type: String,
    pub binding_frequency: f64,
}

/// Confidence cut-offs applied to InteracDome domain-ligand pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteracdomeThresholds {
    pub min_instances: u32,
    pub min_structures: u32,
    pub min_achieved_precision: f64,
}

impl Default for InteracdomeThresholds {
    fn default() -> Self {
        Self {
            min_instances: 3,
            min_structures: 3,
            min_achieved_precision: 0.5,
        }
    }
}

impl InteracdomeThresholds {
    fn accepts(&self, row: &InteracdomeRow) -> bool {
        row.num_nonidentical_instances >= f64::from(self.min_instances)
            && row.num_structures >= f64::from(self.min_structures)
            && row.max_achieved_precision >= self.min_achieved_precision
    }
}

#[derive(Debug, Deserialize)]
struct InteracdomeRow {
    pfam_id: String,
    ligand_type: String,
    binding_frequencies: String,
    num_nonidentical_instances: f64,
    num_structures: f64,
    max_achieved_precision: f64,
}

#[derive(Debug, Clone, Default)]
pub struct BindingFrequencyTable {
    entries: Vec<BindingFrequency>,
    index: HashMap<(String, usize), Vec<usize>>,
}

impl BindingFrequencyTable {
    pub fn from_entries(entries: Vec<BindingFrequency>) -> Self {
        let mut index: HashMap<(String, usize), Vec<usize>> = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            index
                .entry((entry.pfam_id.clone(), entry.match_state))
                .or_default()
                .push(i);
        }
        Self { entries, index }
    }

    pub fn load(path: &Path) -> Result<Self, BindingTableError> {
        let path_str = path.to_string_lossy().to_string();
        let input = compress::open_file(path).map_err(|e| BindingTableError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);

        let mut entries = Vec::new();
        for result in reader.deserialize::<BindingFrequency>() {
            let entry = result.map_err(|e| BindingTableError::Csv {
                path: path_str.clone(),
                source: e,
            })?;
            entries.push(entry);
        }
        info!("Read {} binding frequencies from '{}'.", entries.len(), path_str);
        Ok(Self::from_entries(entries))
    }

    /// Builds the table from InteracDome results, keeping only the
    /// domain-ligand pairs that pass `thresholds`. Pairs are grouped by
    /// Pfam id in sorted order.
    pub fn from_interacdome(
        path: &Path,
        thresholds: &InteracdomeThresholds,
    ) -> Result<Self, BindingTableError> {
        let path_str = path.to_string_lossy().to_string();
        let input = compress::open_file(path).map_err(|e| BindingTableError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .comment(Some(b'#'))
            .from_reader(input);

        let mut rows = Vec::new();
        let mut total = 0usize;
        for result in reader.deserialize::<InteracdomeRow>() {
            let row = result.map_err(|e| BindingTableError::Csv {
                path: path_str.clone(),
                source: e,
            })?;
            total += 1;
            if thresholds.accepts(&row) {
                rows.push(row);
            }
        }
        rows.sort_by(|a, b| a.pfam_id.cmp(&b.pfam_id));
        debug!("{} of {} InteracDome rows pass the thresholds.", rows.len(), total);

        let mut entries = Vec::new();
        for (row_no, row) in rows.into_iter().enumerate() {
            for (i, field) in row.binding_frequencies.split(',').enumerate() {
                let binding_frequency =
                    field
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| BindingTableError::Parse {
                            path: path_str.clone(),
                            line: row_no as u64 + 1,
                            message: format!(
                                "binding frequency '{}' of {} is not a number",
                                field, row.pfam_id
                            ),
                        })?;
                entries.push(BindingFrequency {
                    pfam_id: row.pfam_id.clone(),
                    match_state: i + 1,
                    ligand_type: row.ligand_type.clone(),
                    binding_frequency,
                });
            }
        }
        info!(
            "Derived {} binding frequencies from '{}'.",
            entries.len(),
            path_str
        );
        Ok(Self::from_entries(entries))
    }

    /// Writes the table in the unpivoted CSV layout read by [`Self::load`].
    pub fn save(&self, path: &Path) -> Result<(), BindingTableError> {
        let path_str = path.to_string_lossy().to_string();
        let io_err = |e: std::io::Error| BindingTableError::Io {
            path: path_str.clone(),
            source: e,
        };
        let out = compress::create_file(path).map_err(io_err)?;
        let mut writer = csv::Writer::from_writer(out);
        for entry in &self.entries {
            writer.serialize(entry).map_err(|e| BindingTableError::Csv {
                path: path_str.clone(),
                source: e,
            })?;
        }
        let out = writer
            .into_inner()
            .map_err(|e| io_err(std::io::Error::other(e.to_string())))?;
        out.finish().map_err(io_err)?.flush().map_err(io_err)?;
        Ok(())
    }

    /// Frequencies recorded for one match state, in table order.
    pub fn lookup(&self, pfam_id: &str, match_state: usize) -> Vec<&BindingFrequency> {
        self.index
            .get(&(pfam_id.to_string(), match_state))
            .map(|ids| ids.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    pub fn entries(&self) -> &[BindingFrequency] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const INTERACDOME: &str = "\
# InteracDome v0.3 domain-ligand binding frequencies
pfam_id\tdomain_length\tligand_type\tnum_nonidentical_instances\tnum_structures\tbinding_frequencies\tmax_achieved_precision
PF00096_zf-C2H2\t4\tDNA_\t12\t20\t0.0,0.25,0.5,0.9\t0.81
PF00096_zf-C2H2\t4\tZN\t40\t44\t0.1,0.0,1.0,0.0\t0.99
PF00001_7tm_1\t3\tSM_\t2\t9\t0.3,0.3,0.3\t0.70
PF00002_7tm_2\t2\tION_\t5\t5\t0.4,0.6\t0.40
PF00005_ABC_tran\t2\tATP\t8\t11\t0.7,0.05\t0.95
";

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn interacdome_rows_are_filtered_and_unpivoted() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "interacdome.tsv", INTERACDOME);
        let table =
            BindingFrequencyTable::from_interacdome(&path, &InteracdomeThresholds::default())
                .unwrap();

        // 7tm_1 has too few instances, 7tm_2 too low a precision.
        assert_eq!(table.len(), 2 + 4 + 4);
        assert_eq!(table.entries()[0].pfam_id, "PF00005_ABC_tran");
        assert!(table.lookup("PF00001_7tm_1", 1).is_empty());
        assert!(table.lookup("PF00002_7tm_2", 1).is_empty());

        let third = table.lookup("PF00096_zf-C2H2", 3);
        assert_eq!(third.len(), 2);
        assert_eq!(third[0].ligand_type, "DNA_");
        assert_eq!(third[0].binding_frequency, 0.5);
        assert_eq!(third[1].ligand_type, "ZN");
        assert_eq!(third[1].binding_frequency, 1.0);
        assert!(table.lookup("PF00096_zf-C2H2", 5).is_empty());
    }

    #[test]
    fn relaxed_thresholds_keep_more_pairs() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "interacdome.tsv", INTERACDOME);
        let thresholds = InteracdomeThresholds {
            min_instances: 0,
            min_structures: 0,
            min_achieved_precision: 0.0,
        };
        let table = BindingFrequencyTable::from_interacdome(&path, &thresholds).unwrap();
        assert_eq!(table.len(), 4 + 4 + 3 + 2 + 2);
        assert_eq!(table.lookup("PF00001_7tm_1", 3)[0].binding_frequency, 0.3);
    }

    #[test]
    fn saved_table_loads_back() {
        let dir = tempdir().unwrap();
        let source = write(dir.path(), "interacdome.tsv", INTERACDOME);
        let table =
            BindingFrequencyTable::from_interacdome(&source, &InteracdomeThresholds::default())
                .unwrap();
        let csv_path = dir.path().join("binding_frequencies.csv");
        table.save(&csv_path).unwrap();

        let text = std::fs::read_to_string(&csv_path).unwrap();
        assert!(text.starts_with("pfam_id,match_state,ligand_type,binding_frequency\n"));
        assert!(text.contains("PF00005_ABC_tran,1,ATP,0.7\n"));

        let loaded = BindingFrequencyTable::load(&csv_path).unwrap();
        assert_eq!(loaded.entries(), table.entries());
    }

    #[test]
    fn non_numeric_frequency_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let bad = INTERACDOME.replace("0.7,0.05", "0.7,n/a");
        let path = write(dir.path(), "bad.tsv", &bad);
        let err = BindingFrequencyTable::from_interacdome(&path, &InteracdomeThresholds::default())
            .unwrap_err();
        assert!(matches!(err, BindingTableError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = BindingFrequencyTable::load(Path::new("/nonexistent/bf.csv")).unwrap_err();
        assert!(matches!(err, BindingTableError::Io { .. }));
    }
}
