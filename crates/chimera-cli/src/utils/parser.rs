use crate::config::models::JobSpec;
use chimera::core::io::fasta::SequenceRecord;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error(
        "Invalid job '{0}'. Expected 'CHAIN:LIGAND:RECEPTOR_PDB:LIGAND_PDB' (e.g., 'A:MG:2lue_receptor.pdb:2lue_ligand.pdb')."
    )]
    InvalidJobFormat(String),

    #[error("Invalid sequence '{0}'. Expected 'ID=SEQUENCE' (e.g., 'ctcf=MEGDAVEAIV').")]
    InvalidSequenceFormat(String),

    #[error("Sequence '{id}' contains non-residue character '{found}'.")]
    InvalidResidue { id: String, found: char },

    #[error("Component '{component}' cannot be empty in '{value}'.")]
    EmptyComponent {
        component: &'static str,
        value: String,
    },
}

fn non_empty<'a>(part: &'a str, component: &'static str, value: &str) -> Result<&'a str, ParseError> {
    let part = part.trim();
    if part.is_empty() {
        return Err(ParseError::EmptyComponent {
            component,
            value: value.to_string(),
        });
    }
    Ok(part)
}

/// Parses `CHAIN:LIGAND:RECEPTOR_PDB:LIGAND_PDB`. The ligand path is the
/// remainder after the third colon and may itself contain colons.
pub fn parse_job_spec(value: &str) -> Result<JobSpec, ParseError> {
    let parts: Vec<&str> = value.splitn(4, ':').collect();
    if parts.len() != 4 {
        return Err(ParseError::InvalidJobFormat(value.to_string()));
    }
    Ok(JobSpec {
        chain_id: non_empty(parts[0], "chain", value)?.to_string(),
        ligand_id: non_empty(parts[1], "ligand", value)?.to_string(),
        receptor_path: PathBuf::from(non_empty(parts[2], "receptor", value)?),
        ligand_path: PathBuf::from(non_empty(parts[3], "ligand file", value)?),
    })
}

/// Parses `ID=SEQUENCE`; the sequence is upper-cased.
pub fn parse_sequence_arg(value: &str) -> Result<SequenceRecord, ParseError> {
    let (id, sequence) = value
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidSequenceFormat(value.to_string()))?;
    let id = non_empty(id, "id", value)?;
    let sequence = non_empty(sequence, "sequence", value)?;
    if let Some(found) = sequence.chars().find(|c| !c.is_ascii_alphabetic()) {
        return Err(ParseError::InvalidResidue {
            id: id.to_string(),
            found,
        });
    }
    Ok(SequenceRecord::new(id, &sequence.to_ascii_uppercase()))
}
