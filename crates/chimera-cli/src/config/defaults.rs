use chimera::core::io::binding::InteracdomeThresholds;
use chimera::engine::config::{
    AggregationMetric, DEFAULT_DISTANCE_CUTOFF, DEFAULT_HMMER_WEB_URL, DEFAULT_TOOL_TIMEOUT,
    DomainBackend,
};

pub struct DefaultsConfig {
    pub cutoff: f64,
    pub include_backbone: bool,
    pub calculate_overlap: bool,
    pub compressed: bool,
    pub legacy_overlap_reuse: bool,
    pub metric: AggregationMetric,
    pub backend: DomainBackend,
    pub hmmscan_bin: String,
    pub web_url: String,
    pub timeout_secs: u64,
    pub full_domains: bool,
    pub interacdome: InteracdomeThresholds,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_DISTANCE_CUTOFF,
            include_backbone: false,
            calculate_overlap: true,
            compressed: true,
            legacy_overlap_reuse: false,
            metric: AggregationMetric::default(),
            backend: DomainBackend::default(),
            hmmscan_bin: "hmmscan".to_string(),
            web_url: DEFAULT_HMMER_WEB_URL.to_string(),
            timeout_secs: DEFAULT_TOOL_TIMEOUT.as_secs(),
            full_domains: false,
            interacdome: InteracdomeThresholds::default(),
        }
    }
}
