//! # Chimera Core Library
//!
//! Receptor-ligand contact analysis for protein structures: pairwise atom
//! distances with Gaussian overlap integrals, per-residue binding-site
//! annotations, and binding-frequency lookups through Pfam domain match states.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (atoms, residues, pairwise
//!   records), the element radius table, the overlap quadrature, match-state
//!   mapping, Pfam domain finders and all file formats.
//!
//! - **[`engine`]: The Logic Core.** Typed configuration, progress reporting and
//!   the computations themselves: the pairwise distance scan, the overlap pass and
//!   the per-residue aggregation.
//!
//! - **[`workflows`]: The Public API.** Complete procedures that tie `engine` and
//!   `core` together, such as writing a distance report for a set of chains or
//!   mapping sequences onto known ligand-binding positions.

pub mod core;
pub mod engine;
pub mod workflows;
