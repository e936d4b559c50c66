use super::traits::{StructureError, StructureProvider};
use crate::core::models::atom::Atom;
use crate::core::models::residue::Residue;
use crate::core::utils::identifiers::{
    NUCLEIC_ACID_LIGAND, is_hydrogen_element, is_nucleotide, is_standard_amino_acid,
};
use nalgebra::Point3;
use pdbtbx::{ErrorLevel, PDB};
use std::path::Path;
use tracing::{debug, warn};

/// A PDB/mmCIF structure read with `pdbtbx`.
pub struct PdbStructure {
    path: String,
    pdb: PDB,
}

impl PdbStructure {
    pub fn open(path: &Path) -> Result<Self, StructureError> {
        let path_str = path.to_string_lossy().to_string();
        let (pdb, errors) = pdbtbx::ReadOptions::default()
            .set_only_atomic_coords(true)
            .set_level(pdbtbx::StrictnessLevel::Loose)
            .read(&path_str)
            .map_err(|errors| StructureError::Read {
                path: path_str.clone(),
                message: errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            })?;

        for e in &errors {
            match e.level() {
                ErrorLevel::BreakingError | ErrorLevel::InvalidatingError => {
                    warn!("{}: {}", path_str, e)
                }
                _ => debug!("{}: {}", path_str, e),
            }
        }

        Ok(Self {
            path: path_str,
            pdb,
        })
    }

    fn first_model(&self) -> Option<&pdbtbx::Model> {
        self.pdb.models().next()
    }
}

fn atom_is_hydrogen(atom: &pdbtbx::Atom) -> bool {
    match atom.element() {
        Some(element) => is_hydrogen_element(element.symbol()),
        None => atom
            .name()
            .trim_start_matches(|c: char| c.is_ascii_digit())
            .starts_with(['H', 'D']),
    }
}

fn atom_element(atom: &pdbtbx::Atom) -> String {
    match atom.element() {
        Some(element) => element.symbol().to_ascii_uppercase(),
        None => atom
            .name()
            .trim_start_matches(|c: char| c.is_ascii_digit())
            .chars()
            .take(1)
            .collect(),
    }
}

/// Atoms of the residue that belong to the conformer without an alternate
/// location or to the first listed alternate location, in file order.
fn selected_atoms(residue: &pdbtbx::Residue) -> Vec<&pdbtbx::Atom> {
    let preferred = residue
        .conformers()
        .find_map(|c| c.alternative_location());
    let mut atoms: Vec<&pdbtbx::Atom> = residue
        .conformers()
        .filter(|c| c.alternative_location().is_none() || c.alternative_location() == preferred)
        .flat_map(|c| c.atoms())
        .filter(|a| !atom_is_hydrogen(a))
        .collect();
    atoms.sort_by_key(|a| a.serial_number());
    atoms
}

fn to_atom(atom: &pdbtbx::Atom, residue_number: isize, chain_id: &str) -> Atom {
    let (x, y, z) = atom.pos();
    Atom::new(
        atom.name(),
        &atom_element(atom),
        Point3::new(x, y, z),
        residue_number,
        chain_id,
    )
}

impl StructureProvider for PdbStructure {
    fn source_name(&self) -> &str {
        &self.path
    }

    fn residues(&self, chain_id: &str) -> Result<Vec<Residue>, StructureError> {
        let no_chain = || StructureError::NoChain {
            chain_id: chain_id.to_string(),
            source_name: self.path.clone(),
        };
        let model = self.first_model().ok_or_else(no_chain)?;

        let chain = match model.chains().find(|c| c.id() == chain_id) {
            Some(chain) => chain,
            None if model.chain_count() == 1 => {
                let only = model.chains().next().ok_or_else(no_chain)?;
                debug!(
                    "Chain '{}' not in {}; using its only chain '{}'.",
                    chain_id,
                    self.path,
                    only.id()
                );
                only
            }
            None => return Err(no_chain()),
        };

        let mut residues = Vec::new();
        for residue in chain.residues() {
            let name = residue.name().unwrap_or("");
            if !is_standard_amino_acid(name) {
                continue;
            }
            let number = residue.serial_number();
            let mut out = Residue::new(number, name);
            if let Some(code) = residue.insertion_code() {
                out = out.with_insertion_code(code);
            }
            for atom in selected_atoms(residue) {
                out.add_atom(to_atom(atom, number, chain.id()));
            }
            if !out.atoms.is_empty() {
                residues.push(out);
            }
        }
        Ok(residues)
    }

    fn ligand_atoms(&self, ligand_id: &str) -> Result<Vec<Atom>, StructureError> {
        let Some(model) = self.first_model() else {
            return Ok(Vec::new());
        };
        let nucleic = ligand_id == NUCLEIC_ACID_LIGAND;

        let mut atoms = Vec::new();
        for chain in model.chains() {
            for residue in chain.residues() {
                let is_nucleotide_residue = nucleic && is_nucleotide(residue.name().unwrap_or(""));
                for atom in selected_atoms(residue) {
                    if atom.hetero() || is_nucleotide_residue {
                        atoms.push(to_atom(atom, residue.serial_number(), chain.id()));
                    }
                }
            }
        }
        Ok(atoms)
    }
}
