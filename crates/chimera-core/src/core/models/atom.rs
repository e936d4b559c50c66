use nalgebra::Point3;

/// A single atom as delivered by a structure provider.
///
/// Atoms are immutable once read; the engines only ever copy or reorder them.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom name from the structure (e.g., "CA", "O2'").
    pub name: String,
    /// The element symbol (e.g., "C", "Zn"); compared case-insensitively.
    pub element: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// The sequence number of the owning residue.
    pub residue_number: isize,
    /// The identifier of the owning chain.
    pub chain_id: String,
}

impl Atom {
    pub fn new(
        name: &str,
        element: &str,
        position: Point3<f64>,
        residue_number: isize,
        chain_id: &str,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            element: element.trim().to_string(),
            position,
            residue_number,
            chain_id: chain_id.to_string(),
        }
    }

    pub fn distance_to(&self, other: &Point3<f64>) -> f64 {
        nalgebra::distance(&self.position, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_name_and_element() {
        let atom = Atom::new(" CA ", " C", Point3::new(1.0, 2.0, 3.0), 7, "A");
        assert_eq!(atom.name, "CA");
        assert_eq!(atom.element, "C");
        assert_eq!(atom.residue_number, 7);
        assert_eq!(atom.chain_id, "A");
    }

    #[test]
    fn distance_to_is_euclidean() {
        let atom = Atom::new("O", "O", Point3::new(0.0, 0.0, 0.0), 1, "A");
        assert_eq!(atom.distance_to(&Point3::new(3.0, 4.0, 0.0)), 5.0);
    }
}
