use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DISTANCE_CUTOFF: f64 = 20.0;
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(600);
pub const DEFAULT_HMMER_WEB_URL: &str = "https://www.ebi.ac.uk/Tools/hmmer/search/hmmscan";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {parameter}: {message}")]
    InvalidValue {
        parameter: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceConfig {
    /// Maximum receptor-ligand atom distance (Å) for a pair to be reported.
    pub cutoff: f64,
    /// Keep N, CA, C and O receptor atoms.
    pub include_backbone: bool,
    /// Compute the two Gaussian overlap integrals for every reported pair.
    pub calculate_overlap: bool,
    /// Gzip the distance report.
    pub compressed: bool,
    /// Reassign overlaps from a table keyed by (distance, radius pair) after
    /// computing them, reproducing historical reports.
    pub legacy_overlap_reuse: bool,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_DISTANCE_CUTOFF,
            include_backbone: false,
            calculate_overlap: true,
            compressed: true,
            legacy_overlap_reuse: false,
        }
    }
}

#[derive(Default)]
pub struct DistanceConfigBuilder {
    cutoff: Option<f64>,
    include_backbone: Option<bool>,
    calculate_overlap: Option<bool>,
    compressed: Option<bool>,
    legacy_overlap_reuse: Option<bool>,
}

impl DistanceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = Some(cutoff);
        self
    }

    pub fn include_backbone(mut self, include: bool) -> Self {
        self.include_backbone = Some(include);
        self
    }

    pub fn calculate_overlap(mut self, calculate: bool) -> Self {
        self.calculate_overlap = Some(calculate);
        self
    }

    pub fn compressed(mut self, compressed: bool) -> Self {
        self.compressed = Some(compressed);
        self
    }

    pub fn legacy_overlap_reuse(mut self, enabled: bool) -> Self {
        self.legacy_overlap_reuse = Some(enabled);
        self
    }

    pub fn build(self) -> Result<DistanceConfig, ConfigError> {
        let defaults = DistanceConfig::default();
        let cutoff = self.cutoff.unwrap_or(defaults.cutoff);
        if !(cutoff.is_finite() && cutoff > 0.0) {
            return Err(ConfigError::InvalidValue {
                parameter: "cutoff",
                message: format!("must be a positive distance, got {}", cutoff),
            });
        }
        Ok(DistanceConfig {
            cutoff,
            include_backbone: self.include_backbone.unwrap_or(defaults.include_backbone),
            calculate_overlap: self.calculate_overlap.unwrap_or(defaults.calculate_overlap),
            compressed: self.compressed.unwrap_or(defaults.compressed),
            legacy_overlap_reuse: self
                .legacy_overlap_reuse
                .unwrap_or(defaults.legacy_overlap_reuse),
        })
    }
}

/// Which of the two overlap integrals a metric reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlapKind {
    /// Standard deviations set to the atomic radii.
    Vdw,
    /// Both standard deviations fixed at 1.5.
    Fixed,
}

/// Reduction of all atom pairs of one (residue, ligand) to a single score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AggregationMetric {
    /// Maximum over receptor atoms of the summed fixed-radius overlap.
    #[default]
    MaxStd,
    MaxVdw,
    /// Summed overlap divided by the number of distinct receptor atoms.
    MeanStd,
    MeanVdw,
    SumStd,
    SumVdw,
    MinDist,
    /// Mean per-atom minimum distance, with the cutoff imputed for atoms
    /// that have no pair with the ligand.
    MeanDist,
    /// Fraction of the residue's atoms closer than 4 Å to the ligand.
    FracIn4,
}

impl AggregationMetric {
    pub const ALL: [AggregationMetric; 9] = [
        AggregationMetric::MaxStd,
        AggregationMetric::MaxVdw,
        AggregationMetric::MeanStd,
        AggregationMetric::MeanVdw,
        AggregationMetric::SumStd,
        AggregationMetric::SumVdw,
        AggregationMetric::MinDist,
        AggregationMetric::MeanDist,
        AggregationMetric::FracIn4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMetric::MaxStd => "maxstd",
            AggregationMetric::MaxVdw => "maxvdw",
            AggregationMetric::MeanStd => "meanstd",
            AggregationMetric::MeanVdw => "meanvdw",
            AggregationMetric::SumStd => "sumstd",
            AggregationMetric::SumVdw => "sumvdw",
            AggregationMetric::MinDist => "mindist",
            AggregationMetric::MeanDist => "meandist",
            AggregationMetric::FracIn4 => "fracin4",
        }
    }

    pub fn overlap_kind(&self) -> Option<OverlapKind> {
        match self {
            AggregationMetric::MaxStd | AggregationMetric::MeanStd | AggregationMetric::SumStd => {
                Some(OverlapKind::Fixed)
            }
            AggregationMetric::MaxVdw | AggregationMetric::MeanVdw | AggregationMetric::SumVdw => {
                Some(OverlapKind::Vdw)
            }
            AggregationMetric::MinDist
            | AggregationMetric::MeanDist
            | AggregationMetric::FracIn4 => None,
        }
    }
}

impl fmt::Display for AggregationMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationMetric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AggregationMetric::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidValue {
                parameter: "metric",
                message: format!(
                    "unknown metric '{}' (expected one of: {})",
                    s,
                    AggregationMetric::ALL.map(|m| m.as_str()).join(", ")
                ),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DomainBackend {
    /// Local `hmmscan --cut_ga` against Pfam.
    #[default]
    Hmmscan,
    /// The EBI HMMER web service.
    HmmerWeb,
    /// hmmscan followed by dPUC2 context filtering.
    Dpuc2,
    /// hmmscan followed by DomStratStats filtering.
    DomStratStats,
}

impl FromStr for DomainBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hmmer" | "hmmscan" => Ok(DomainBackend::Hmmscan),
            "hmmerweb" | "hmmer-web" => Ok(DomainBackend::HmmerWeb),
            "dpuc2" => Ok(DomainBackend::Dpuc2),
            "domstratstats" => Ok(DomainBackend::DomStratStats),
            _ => Err(ConfigError::InvalidValue {
                parameter: "backend",
                message: format!(
                    "unknown domain backend '{}' (expected hmmer, hmmerweb, dpuc2 or domstratstats)",
                    s
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainSearchConfig {
    pub backend: DomainBackend,
    pub hmmscan_bin: PathBuf,
    /// Directory holding `Pfam-A.hmm` and `Pfam-A.hmm.dat`.
    pub pfam_dir: PathBuf,
    pub dpuc2_dir: Option<PathBuf>,
    pub dpuc2_net: Option<PathBuf>,
    pub domstratstats_dir: Option<PathBuf>,
    pub web_url: String,
    pub timeout: Duration,
    /// Keep only hits spanning the whole profile model.
    pub full_domains: bool,
}

impl DomainSearchConfig {
    pub fn pfam_hmm(&self) -> PathBuf {
        self.pfam_dir.join("Pfam-A.hmm")
    }

    pub fn pfam_hmm_dat(&self) -> PathBuf {
        self.pfam_dir.join("Pfam-A.hmm.dat")
    }
}

#[derive(Default)]
pub struct DomainSearchConfigBuilder {
    backend: Option<DomainBackend>,
    hmmscan_bin: Option<PathBuf>,
    pfam_dir: Option<PathBuf>,
    dpuc2_dir: Option<PathBuf>,
    dpuc2_net: Option<PathBuf>,
    domstratstats_dir: Option<PathBuf>,
    web_url: Option<String>,
    timeout: Option<Duration>,
    full_domains: Option<bool>,
}

impl DomainSearchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(mut self, backend: DomainBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn hmmscan_bin(mut self, path: PathBuf) -> Self {
        self.hmmscan_bin = Some(path);
        self
    }

    pub fn pfam_dir(mut self, path: PathBuf) -> Self {
        self.pfam_dir = Some(path);
        self
    }

    pub fn dpuc2_dir(mut self, path: PathBuf) -> Self {
        self.dpuc2_dir = Some(path);
        self
    }

    pub fn dpuc2_net(mut self, path: PathBuf) -> Self {
        self.dpuc2_net = Some(path);
        self
    }

    pub fn domstratstats_dir(mut self, path: PathBuf) -> Self {
        self.domstratstats_dir = Some(path);
        self
    }

    pub fn web_url(mut self, url: String) -> Self {
        self.web_url = Some(url);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn full_domains(mut self, full: bool) -> Self {
        self.full_domains = Some(full);
        self
    }

    pub fn build(self) -> Result<DomainSearchConfig, ConfigError> {
        let backend = self
            .backend
            .ok_or(ConfigError::MissingParameter("backend"))?;

        let pfam_dir = match backend {
            DomainBackend::HmmerWeb => self.pfam_dir.unwrap_or_default(),
            _ => self
                .pfam_dir
                .ok_or(ConfigError::MissingParameter("pfam_dir"))?,
        };
        match backend {
            DomainBackend::Dpuc2 => {
                if self.dpuc2_dir.is_none() {
                    return Err(ConfigError::MissingParameter("dpuc2_dir"));
                }
                if self.dpuc2_net.is_none() {
                    return Err(ConfigError::MissingParameter("dpuc2_net"));
                }
            }
            DomainBackend::DomStratStats if self.domstratstats_dir.is_none() => {
                return Err(ConfigError::MissingParameter("domstratstats_dir"));
            }
            _ => {}
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TOOL_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                parameter: "timeout",
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(DomainSearchConfig {
            backend,
            hmmscan_bin: self
                .hmmscan_bin
                .unwrap_or_else(|| PathBuf::from("hmmscan")),
            pfam_dir,
            dpuc2_dir: self.dpuc2_dir,
            dpuc2_net: self.dpuc2_net,
            domstratstats_dir: self.domstratstats_dir,
            web_url: self
                .web_url
                .unwrap_or_else(|| DEFAULT_HMMER_WEB_URL.to_string()),
            timeout,
            full_domains: self.full_domains.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_builder_uses_documented_defaults() {
        let config = DistanceConfigBuilder::new().build().unwrap();
        assert_eq!(config, DistanceConfig::default());
        assert_eq!(config.cutoff, 20.0);
        assert!(!config.include_backbone);
        assert!(config.calculate_overlap);
        assert!(config.compressed);
        assert!(!config.legacy_overlap_reuse);
    }

    #[test]
    fn distance_builder_applies_overrides() {
        let config = DistanceConfigBuilder::new()
            .cutoff(8.0)
            .include_backbone(true)
            .calculate_overlap(false)
            .compressed(false)
            .legacy_overlap_reuse(true)
            .build()
            .unwrap();
        assert_eq!(config.cutoff, 8.0);
        assert!(config.include_backbone);
        assert!(!config.calculate_overlap);
        assert!(!config.compressed);
        assert!(config.legacy_overlap_reuse);
    }

    #[test]
    fn distance_builder_rejects_non_positive_cutoff() {
        for cutoff in [0.0, -1.0, f64::NAN] {
            let err = DistanceConfigBuilder::new().cutoff(cutoff).build().unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidValue {
                    parameter: "cutoff",
                    ..
                }
            ));
        }
    }

    #[test]
    fn metric_names_parse_and_display() {
        for metric in AggregationMetric::ALL {
            assert_eq!(metric.as_str().parse::<AggregationMetric>().unwrap(), metric);
            assert_eq!(metric.to_string(), metric.as_str());
        }
        assert!("MAXSTD".parse::<AggregationMetric>().is_err());
        assert!("median".parse::<AggregationMetric>().is_err());
        assert_eq!(AggregationMetric::default(), AggregationMetric::MaxStd);
    }

    #[test]
    fn metric_overlap_kinds() {
        assert_eq!(AggregationMetric::SumStd.overlap_kind(), Some(OverlapKind::Fixed));
        assert_eq!(AggregationMetric::MeanVdw.overlap_kind(), Some(OverlapKind::Vdw));
        assert_eq!(AggregationMetric::FracIn4.overlap_kind(), None);
    }

    #[test]
    fn domain_builder_requires_backend() {
        let err = DomainSearchConfigBuilder::new().build().unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("backend"));
    }

    #[test]
    fn domain_builder_checks_backend_requirements() {
        let err = DomainSearchConfigBuilder::new()
            .backend(DomainBackend::Hmmscan)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("pfam_dir"));

        let err = DomainSearchConfigBuilder::new()
            .backend(DomainBackend::Dpuc2)
            .pfam_dir(PathBuf::from("/data/pfam"))
            .dpuc2_dir(PathBuf::from("/opt/dpuc2"))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("dpuc2_net"));

        let web = DomainSearchConfigBuilder::new()
            .backend(DomainBackend::HmmerWeb)
            .build()
            .unwrap();
        assert_eq!(web.web_url, DEFAULT_HMMER_WEB_URL);
        assert_eq!(web.timeout, DEFAULT_TOOL_TIMEOUT);
    }

    #[test]
    fn domain_config_resolves_pfam_files() {
        let config = DomainSearchConfigBuilder::new()
            .backend(DomainBackend::Hmmscan)
            .pfam_dir(PathBuf::from("/data/pfam"))
            .build()
            .unwrap();
        assert_eq!(config.pfam_hmm(), PathBuf::from("/data/pfam/Pfam-A.hmm"));
        assert_eq!(config.pfam_hmm_dat(), PathBuf::from("/data/pfam/Pfam-A.hmm.dat"));
        assert_eq!(config.hmmscan_bin, PathBuf::from("hmmscan"));
    }

    #[test]
    fn domain_backend_names_parse() {
        assert_eq!("hmmer".parse::<DomainBackend>().unwrap(), DomainBackend::Hmmscan);
        assert_eq!("HmmerWeb".parse::<DomainBackend>().unwrap(), DomainBackend::HmmerWeb);
        assert_eq!("dpuc2".parse::<DomainBackend>().unwrap(), DomainBackend::Dpuc2);
        assert_eq!(
            "domstratstats".parse::<DomainBackend>().unwrap(),
            DomainBackend::DomStratStats
        );
        assert!("blast".parse::<DomainBackend>().is_err());
    }
}
