use phf::{Map, Set, phf_map, phf_set};

static BACKBONE_ATOM_NAMES: Set<&'static str> = phf_set! { "N", "CA", "C", "O" };

static AMINO_ACID_CODES: Map<&'static str, char> = phf_map! {
    "ALA" => 'A', "ARG" => 'R', "ASN" => 'N', "ASP" => 'D', "CYS" => 'C',
    "GLN" => 'Q', "GLU" => 'E', "GLY" => 'G', "HIS" => 'H', "ILE" => 'I',
    "LEU" => 'L', "LYS" => 'K', "MET" => 'M', "PHE" => 'F', "PRO" => 'P',
    "SER" => 'S', "THR" => 'T', "TRP" => 'W', "TYR" => 'Y', "VAL" => 'V',
};

static NUCLEOTIDE_NAMES: Set<&'static str> = phf_set! {
    "A", "C", "G", "U", "I", "T", "DA", "DC", "DG", "DT", "DU", "DI",
};

/// Ligand identifier that marks a nucleic-acid ligand.
pub const NUCLEIC_ACID_LIGAND: &str = "NUC";

pub fn is_backbone_atom(atom_name: &str) -> bool {
    BACKBONE_ATOM_NAMES.contains(atom_name.trim())
}

pub fn is_standard_amino_acid(residue_name: &str) -> bool {
    AMINO_ACID_CODES.contains_key(residue_name.trim().to_ascii_uppercase().as_str())
}

pub fn is_nucleotide(residue_name: &str) -> bool {
    NUCLEOTIDE_NAMES.contains(residue_name.trim().to_ascii_uppercase().as_str())
}

pub fn one_letter_code(residue_name: &str) -> Option<char> {
    AMINO_ACID_CODES
        .get(residue_name.trim().to_ascii_uppercase().as_str())
        .copied()
}

pub fn is_hydrogen_element(element: &str) -> bool {
    matches!(element.trim().to_ascii_uppercase().as_str(), "H" | "D")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backbone_is_exactly_the_four_heavy_atoms() {
        for name in ["N", "CA", "C", "O", " CA "] {
            assert!(is_backbone_atom(name));
        }
        for name in ["CB", "OXT", "H", "HA", "ca"] {
            assert!(!is_backbone_atom(name));
        }
    }

    #[test]
    fn one_letter_code_covers_the_twenty_standard_residues() {
        assert_eq!(one_letter_code("ALA"), Some('A'));
        assert_eq!(one_letter_code("trp"), Some('W'));
        assert_eq!(one_letter_code("MSE"), None);
        assert!(is_standard_amino_acid("Gly"));
        assert!(!is_standard_amino_acid("HOH"));
    }

    #[test]
    fn nucleotides_and_hydrogens_are_recognized() {
        assert!(is_nucleotide("DA"));
        assert!(is_nucleotide("u"));
        assert!(!is_nucleotide("ALA"));
        assert!(is_hydrogen_element("H"));
        assert!(is_hydrogen_element("d"));
        assert!(!is_hydrogen_element("HG"));
    }
}
