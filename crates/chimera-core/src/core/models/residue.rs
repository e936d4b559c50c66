use super::atom::Atom;
use crate::core::utils::identifiers;

#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub number: isize,              // Residue sequence number from source file
    pub insertion_code: Option<String>,
    pub name: String,               // Three-letter residue name (e.g., "ALA")
    pub atoms: Vec<Atom>,           // Atoms in the order the source lists them
}

impl Residue {
    pub fn new(number: isize, name: &str) -> Self {
        Self {
            number,
            insertion_code: None,
            name: name.trim().to_string(),
            atoms: Vec::new(),
        }
    }

    pub fn with_insertion_code(mut self, code: &str) -> Self {
        self.insertion_code = Some(code.to_string());
        self
    }

    pub fn add_atom(&mut self, atom: Atom) {
        self.atoms.push(atom);
    }

    pub fn atom_names(&self) -> impl Iterator<Item = &str> {
        self.atoms.iter().map(|a| a.name.as_str())
    }

    pub fn one_letter_code(&self) -> Option<char> {
        identifiers::one_letter_code(&self.name)
    }
}
