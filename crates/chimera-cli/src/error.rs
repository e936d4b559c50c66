use chimera::core::alignment::matchstate::MatchStateError;
use chimera::core::domain::DomainError;
use chimera::engine::error::EngineError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

/// The kind of input file a command failed to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Structure,
    Fasta,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Structure => f.write_str("structure"),
            InputKind::Fasta => f.write_str("FASTA"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Cannot load config file '{path}': {source}", path = path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// A merged setting is out of range, or a config placeholder cannot be resolved.
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Cannot read {kind} file '{path}': {source}", path = path.display())]
    Input {
        kind: InputKind,
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("No query sequences were given; pass --fasta-in or --sequence")]
    NoSequences,

    #[error("Cannot annotate distance report '{path}': {source}", path = path.display())]
    Annotate {
        path: PathBuf,
        #[source]
        source: EngineError,
    },

    #[error("Invalid aligned sequence: {0}")]
    AlignedSequence(#[source] MatchStateError),

    #[error(
        "{tool} did not finish within {seconds} s; raise `timeout-secs` under [domains] in the config file"
    )]
    ToolTimeout { tool: String, seconds: u64 },

    #[error(transparent)]
    Engine(EngineError),

    #[error("Cannot open log file '{path}': {source}", path = path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot install diagnostics: {0}")]
    Diagnostics(String),

    #[error("Cannot build the worker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Cannot write to standard output: {0}")]
    Stdout(#[source] std::io::Error),
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Domain {
                source: DomainError::Timeout { tool, seconds },
            } => CliError::ToolTimeout { tool, seconds },
            other => CliError::Engine(other),
        }
    }
}
