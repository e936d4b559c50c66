//! Input/output for structures, distance reports, FASTA-style files and
//! binding-frequency tables.
//!
//! Structure reading sits behind the [`traits::StructureProvider`] trait; the
//! `pdbtbx`-backed [`pdb::PdbStructure`] is the provider used by the CLI.

pub mod binding;
pub mod compress;
pub mod distance_report;
pub mod fasta;
pub mod pdb;
pub mod traits;
