use crate::core::models::atom::Atom;
use crate::core::models::residue::Residue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StructureError {
    #[error("Failed to read structure '{path}': {message}")]
    Read { path: String, message: String },
    #[error("Chain '{chain_id}' not found in '{source_name}'")]
    NoChain {
        chain_id: String,
        source_name: String,
    },
}

/// Supplies receptor residues and ligand atoms to the distance engine.
///
/// Implementors are responsible for selection: receptor residues contain only
/// standard amino acids with non-hydrogen atoms in source listing order and a
/// single conformer, ligand atoms are non-hydrogen het atoms.
pub trait StructureProvider {
    /// A human-readable name used in log messages (usually the file path).
    fn source_name(&self) -> &str;

    fn residues(&self, chain_id: &str) -> Result<Vec<Residue>, StructureError>;

    fn ligand_atoms(&self, ligand_id: &str) -> Result<Vec<Atom>, StructureError>;
}
