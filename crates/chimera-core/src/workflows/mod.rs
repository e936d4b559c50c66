//! # Workflows Module
//!
//! High-level procedures that combine the engine and the core building blocks
//! into complete analyses.
//!
//! - **Distance Workflow** ([`distance`]) - Pairwise distances and overlaps for a set
//!   of receptor chains and ligands, written as a (gzipped) distance report.
//! - **Annotation Workflow** ([`annotate`]) - Per-residue binding-site scores projected
//!   into a FASTA-style annotation, from records in memory or from an earlier report.
//! - **Binding Workflow** ([`binding`]) - Pfam domain search on protein sequences,
//!   match-state expansion and the join with per-position binding frequencies.
//!
//! Each workflow validates its inputs, reports progress through
//! [`crate::engine::progress::ProgressReporter`] where the work is long-running,
//! and surfaces every failure as an [`crate::engine::error::EngineError`].

pub mod annotate;
pub mod binding;
pub mod distance;
