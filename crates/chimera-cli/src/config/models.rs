use chimera::core::io::binding::InteracdomeThresholds;
use chimera::engine::config::{AggregationMetric, DistanceConfig, DomainSearchConfig};
use std::path::PathBuf;

/// One `--job`: a receptor chain scanned against a ligand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub chain_id: String,
    pub ligand_id: String,
    pub receptor_path: PathBuf,
    pub ligand_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationTarget {
    pub path: PathBuf,
    pub metric: AggregationMetric,
}

pub struct DistanceAppConfig {
    pub pdb_id: String,
    pub jobs: Vec<JobSpec>,
    pub output: PathBuf,
    pub radii_path: Option<PathBuf>,
    pub annotation: Option<AnnotationTarget>,
    pub core_config: DistanceConfig,
}

pub struct AnnotateAppConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub metric: AggregationMetric,
    pub cutoff: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrequencySource {
    Csv(PathBuf),
    Interacdome {
        path: PathBuf,
        thresholds: InteracdomeThresholds,
    },
}

pub struct BindingsAppConfig {
    pub fasta_in: Option<PathBuf>,
    pub sequences: Vec<String>,
    pub frequencies: FrequencySource,
    pub output: PathBuf,
    pub domains_out: Option<PathBuf>,
    pub core_config: DomainSearchConfig,
}
