//! # Core Models Module
//!
//! Plain data carried between the structure provider, the distance engine and
//! the aggregation step.
//!
//! - [`atom`] - An atom with coordinates, element and owning residue/chain
//! - [`residue`] - A residue with its atoms in source listing order
//! - [`record`] - One receptor-ligand atom pair of the distance report

pub mod atom;
pub mod record;
pub mod residue;
