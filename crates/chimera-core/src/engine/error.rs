use thiserror::Error;

use super::aggregate::AggregationError;
use super::config::ConfigError;
use crate::core::alignment::matchstate::MatchStateError;
use crate::core::domain::DomainError;
use crate::core::io::binding::BindingTableError;
use crate::core::io::distance_report::ReportError;
use crate::core::io::traits::StructureError;
use crate::core::radii::RadiusError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Radius table error: {source}")]
    Radius {
        #[from]
        source: RadiusError,
    },

    #[error("Structure error: {source}")]
    Structure {
        #[from]
        source: StructureError,
    },

    #[error("Distance report error: {source}")]
    Report {
        #[from]
        source: ReportError,
    },

    #[error("Match-state mapping failed: {source}")]
    MatchState {
        #[from]
        source: MatchStateError,
    },

    #[error("Aggregation failed: {source}")]
    Aggregation {
        #[from]
        source: AggregationError,
    },

    #[error("Domain search failed: {source}")]
    Domain {
        #[from]
        source: DomainError,
    },

    #[error("Binding frequency table error: {source}")]
    BindingTable {
        #[from]
        source: BindingTableError,
    },

    #[error("Chain '{chain_id}' of '{source_name}' has no usable residues")]
    EmptyReceptor {
        chain_id: String,
        source_name: String,
    },

    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
