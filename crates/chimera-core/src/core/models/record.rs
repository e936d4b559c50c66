use crate::core::overlap::Integral;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Position `index` (1-based) of an atom among the `count` atoms of its residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomOrdinal {
    pub index: usize,
    pub count: usize,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Malformed atom ordinal '{0}': expected 'j/n'")]
pub struct AtomOrdinalParseError(pub String);

impl fmt::Display for AtomOrdinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.count)
    }
}

impl FromStr for AtomOrdinal {
    type Err = AtomOrdinalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || AtomOrdinalParseError(s.to_string());
        let (index, count) = s.trim().split_once('/').ok_or_else(err)?;
        Ok(Self {
            index: index.parse().map_err(|_| err())?,
            count: count.parse().map_err(|_| err())?,
        })
    }
}

/// One receptor-atom / ligand-atom pair within the distance cutoff.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseRecord {
    /// `{pdb_id}{chain}`, e.g. "2lueA".
    pub receptor_id: String,
    /// Residue position relative to the lowest residue number of the chain (1-based).
    pub residue_index: isize,
    pub residue_code: char,
    pub atom_ordinal: AtomOrdinal,
    pub receptor_element: String,
    /// Ligand code plus nucleic-acid subtype suffix, if any.
    pub ligand_id: String,
    pub ligand_element: String,
    pub distance: f64,
    /// Overlap with standard deviations set to the two atomic radii.
    pub overlap_vdw: Option<Integral>,
    /// Overlap with both standard deviations fixed at 1.5.
    pub overlap_fixed: Option<Integral>,
    /// Full receptor sequence; non-empty only on the first record of a chain.
    pub full_sequence: String,
}

impl PairwiseRecord {
    pub fn has_overlap(&self) -> bool {
        self.overlap_vdw.is_some() && self.overlap_fixed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_displays_as_fraction() {
        let ordinal = AtomOrdinal { index: 3, count: 7 };
        assert_eq!(ordinal.to_string(), "3/7");
    }

    #[test]
    fn ordinal_parses_fraction() {
        assert_eq!(
            "12/14".parse::<AtomOrdinal>().unwrap(),
            AtomOrdinal {
                index: 12,
                count: 14
            }
        );
    }

    #[test]
    fn ordinal_rejects_malformed_input() {
        assert!("12".parse::<AtomOrdinal>().is_err());
        assert!("a/b".parse::<AtomOrdinal>().is_err());
        assert!("".parse::<AtomOrdinal>().is_err());
    }
}
