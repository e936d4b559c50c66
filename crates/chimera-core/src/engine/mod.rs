//! # Engine Module
//!
//! Configuration, progress reporting and the computations behind the workflows.
//!
//! - **Distance scan** ([`distance`]) - Receptor/ligand pairing within a cutoff and the overlap pass
//! - **Aggregation** ([`aggregate`]) - Per-residue binding-site scores for the FASTA annotation
//! - **Configuration** ([`config`]) - Builders for distance and domain-search settings
//! - **Errors** ([`error`]) - The unified [`error::EngineError`]

pub mod aggregate;
pub mod config;
pub mod distance;
pub mod error;
pub mod progress;

mod memo;
