//! # Core Module
//!
//! Stateless building blocks shared by the engine and the workflows.
//!
//! - **Models** ([`models`]) - Atoms, residues and pairwise distance records
//! - **Radii** ([`radii`]) - Element radius table with vdW/ionic/fixed fallback
//! - **Overlap** ([`overlap`]) - Gaussian overlap integrals and their text rendering
//! - **Alignment** ([`alignment`]) - Match-state mapping of profile alignments
//! - **Domains** ([`domain`]) - Pfam domain finders (hmmscan, dPUC2, DomStratStats, HMMER web)
//! - **File I/O** ([`io`]) - Structure providers, distance reports, FASTA files, binding tables

pub mod alignment;
pub mod domain;
pub mod io;
pub mod models;
pub mod overlap;
pub mod radii;
pub mod utils;
