use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Radius used when neither a van der Waals nor an ionic radius is known.
pub const FALLBACK_RADIUS: f64 = 1.5;

const BUNDLED_TABLE: &str = include_str!("../../data/vdw.txt");

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ElementRadii {
    pub atomic_number: u32,
    pub element_symbol: String,
    pub atomic_radius: Option<f64>,
    pub ionic_radius: Option<f64>,
    pub covalent_radius: Option<f64>,
    pub vdw_radius: Option<f64>,
    pub crystal_radius: Option<f64>,
}

impl ElementRadii {
    pub fn effective_radius(&self) -> f64 {
        self.vdw_radius
            .or(self.ionic_radius)
            .unwrap_or(FALLBACK_RADIUS)
    }
}

#[derive(Debug, Error)]
pub enum RadiusError {
    #[error("Unknown element symbol '{0}' (not present in the radius table)")]
    UnknownElement(String),
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Radius table parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

/// Element symbol to radius lookup, keyed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ElementRadiusTable {
    entries: HashMap<String, ElementRadii>,
}

impl ElementRadiusTable {
    pub fn bundled() -> Result<Self, RadiusError> {
        Self::from_reader(BUNDLED_TABLE.as_bytes(), "<bundled vdw.txt>")
    }

    pub fn load(path: &Path) -> Result<Self, RadiusError> {
        let file = std::fs::File::open(path).map_err(|e| RadiusError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_reader(file, &path.to_string_lossy())
    }

    fn from_reader<R: std::io::Read>(reader: R, origin: &str) -> Result<Self, RadiusError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .comment(Some(b'#'))
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = HashMap::new();
        for result in reader.deserialize::<ElementRadii>() {
            let record = result.map_err(|e| RadiusError::Csv {
                path: origin.to_string(),
                source: e,
            })?;
            entries.insert(record.element_symbol.to_ascii_lowercase(), record);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, element: &str) -> Option<&ElementRadii> {
        self.entries.get(&element.trim().to_ascii_lowercase())
    }

    pub fn contains(&self, element: &str) -> bool {
        self.get(element).is_some()
    }

    /// The van der Waals radius, else the ionic radius, else [`FALLBACK_RADIUS`].
    pub fn radius(&self, element: &str) -> Result<f64, RadiusError> {
        self.get(element)
            .map(ElementRadii::effective_radius)
            .ok_or_else(|| RadiusError::UnknownElement(element.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
