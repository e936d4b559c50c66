use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileDomainsConfig};
use super::models::{
    AnnotateAppConfig, AnnotationTarget, BindingsAppConfig, DistanceAppConfig, FrequencySource,
};
use crate::cli::{AnnotateArgs, BindingsArgs, DistanceArgs};
use crate::error::{CliError, Result};
use crate::utils::parser;
use chimera::core::io::binding::InteracdomeThresholds;
use chimera::engine::config::{
    AggregationMetric, ConfigError, DistanceConfigBuilder, DomainBackend, DomainSearchConfig,
    DomainSearchConfigBuilder,
};
use std::path::PathBuf;
use std::time::Duration;

fn config_error(e: ConfigError) -> CliError {
    CliError::Config(e.to_string())
}

fn parse_metric(
    cli_arg: Option<&str>,
    file_arg: Option<&str>,
    default: AggregationMetric,
) -> Result<AggregationMetric> {
    match cli_arg.or(file_arg) {
        Some(name) => name.parse::<AggregationMetric>().map_err(config_error),
        None => Ok(default),
    }
}

pub fn build_distance_config(args: &DistanceArgs) -> Result<DistanceAppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = FileConfig::from_optional_file(args.config.as_ref())?;
    let distance_file = file_config.distance.take().unwrap_or_default();
    let annotation_file = file_config.annotation.take().unwrap_or_default();

    let jobs = args
        .jobs
        .iter()
        .map(|job| parser::parse_job_spec(job))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| CliError::Argument(e.to_string()))?;

    // Boolean flags can only switch a feature away from its default.
    let include_backbone = args.include_backbone
        || distance_file
            .include_backbone
            .unwrap_or(defaults.include_backbone);
    let calculate_overlap = !args.no_overlap
        && distance_file
            .calculate_overlap
            .unwrap_or(defaults.calculate_overlap);
    let compressed =
        !args.no_compress && distance_file.compressed.unwrap_or(defaults.compressed);
    let legacy_overlap_reuse = args.legacy_overlap_reuse
        || distance_file
            .legacy_overlap_reuse
            .unwrap_or(defaults.legacy_overlap_reuse);

    let core_config = DistanceConfigBuilder::new()
        .cutoff(args.cutoff.or(distance_file.cutoff).unwrap_or(defaults.cutoff))
        .include_backbone(include_backbone)
        .calculate_overlap(calculate_overlap)
        .compressed(compressed)
        .legacy_overlap_reuse(legacy_overlap_reuse)
        .build()
        .map_err(config_error)?;

    let annotation = match &args.fasta {
        Some(path) => Some(AnnotationTarget {
            path: path.clone(),
            metric: parse_metric(
                args.metric.as_deref(),
                annotation_file.metric.as_deref(),
                defaults.metric,
            )?,
        }),
        None => None,
    };

    Ok(DistanceAppConfig {
        pdb_id: args.pdb_id.clone(),
        jobs,
        output: args.output.clone(),
        radii_path: args
            .radii
            .clone()
            .or(distance_file.radii_path.map(PathBuf::from)),
        annotation,
        core_config,
    })
}

pub fn build_annotate_config(args: &AnnotateArgs) -> Result<AnnotateAppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = FileConfig::from_optional_file(args.config.as_ref())?;
    let distance_file = file_config.distance.take().unwrap_or_default();
    let annotation_file = file_config.annotation.take().unwrap_or_default();

    let metric = parse_metric(
        args.metric.as_deref(),
        annotation_file.metric.as_deref(),
        defaults.metric,
    )?;
    let cutoff = args.cutoff.or(distance_file.cutoff).unwrap_or(defaults.cutoff);
    if !(cutoff.is_finite() && cutoff > 0.0) {
        return Err(CliError::Config(format!(
            "cutoff must be a positive distance, got {}",
            cutoff
        )));
    }

    Ok(AnnotateAppConfig {
        input: args.input.clone(),
        output: args.output.clone(),
        metric,
        cutoff,
    })
}

fn merge_thresholds(file: &FileDomainsConfig, defaults: &DefaultsConfig) -> InteracdomeThresholds {
    let file = file.interacdome.clone().unwrap_or_default();
    InteracdomeThresholds {
        min_instances: file
            .min_instances
            .unwrap_or(defaults.interacdome.min_instances),
        min_structures: file
            .min_structures
            .unwrap_or(defaults.interacdome.min_structures),
        min_achieved_precision: file
            .min_achieved_precision
            .unwrap_or(defaults.interacdome.min_achieved_precision),
    }
}

fn merge_domain_search(
    args: &BindingsArgs,
    file: &FileDomainsConfig,
    defaults: &DefaultsConfig,
) -> Result<DomainSearchConfig> {
    let backend = match args.backend.as_deref().or(file.backend.as_deref()) {
        Some(name) => name
            .parse::<DomainBackend>()
            .map_err(config_error)?,
        None => defaults.backend,
    };

    let mut builder = DomainSearchConfigBuilder::new()
        .backend(backend)
        .hmmscan_bin(PathBuf::from(
            file.hmmscan_bin.as_deref().unwrap_or(&defaults.hmmscan_bin),
        ))
        .web_url(
            file.web_url
                .clone()
                .unwrap_or_else(|| defaults.web_url.clone()),
        )
        .timeout(Duration::from_secs(
            file.timeout_secs.unwrap_or(defaults.timeout_secs),
        ))
        .full_domains(args.full_domains || file.full_domains.unwrap_or(defaults.full_domains));
    if let Some(dir) = &file.pfam_dir {
        builder = builder.pfam_dir(PathBuf::from(dir));
    }
    if let Some(dir) = &file.dpuc2_dir {
        builder = builder.dpuc2_dir(PathBuf::from(dir));
    }
    if let Some(net) = &file.dpuc2_net {
        builder = builder.dpuc2_net(PathBuf::from(net));
    }
    if let Some(dir) = &file.domstratstats_dir {
        builder = builder.domstratstats_dir(PathBuf::from(dir));
    }
    builder.build().map_err(config_error)
}

pub fn build_bindings_config(args: &BindingsArgs) -> Result<BindingsAppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = FileConfig::from_optional_file(args.config.as_ref())?;
    let domains_file = file_config.domains.take().unwrap_or_default();

    let frequencies = match (&args.frequencies, &args.interacdome) {
        (Some(path), None) => FrequencySource::Csv(path.clone()),
        (None, Some(path)) => FrequencySource::Interacdome {
            path: path.clone(),
            thresholds: merge_thresholds(&domains_file, &defaults),
        },
        _ => {
            return Err(CliError::Argument(
                "exactly one of --frequencies or --interacdome is required".to_string(),
            ));
        }
    };

    Ok(BindingsAppConfig {
        fasta_in: args.fasta_in.clone(),
        sequences: args.sequences.clone(),
        frequencies,
        output: args.output.clone(),
        domains_out: args.domains_out.clone(),
        core_config: merge_domain_search(args, &domains_file, &defaults)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use once_cell::sync::Lazy;
    use std::fs;
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let file_path = TEST_DIR.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn distance_args(extra: &[&str]) -> DistanceArgs {
        let mut argv = vec![
            "chimera",
            "distance",
            "--pdb-id",
            "2lue",
            "--job",
            "A:MG:rec.pdb:lig.pdb",
            "-o",
            "out.txt",
        ];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Distance(args) => args,
            other => panic!("Expected 'distance' subcommand, got {other:?}"),
        }
    }

    fn bindings_args(extra: &[&str]) -> BindingsArgs {
        let mut argv = vec!["chimera", "bindings", "--sequence", "q=MKV", "-o", "b.csv"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Bindings(args) => args,
            other => panic!("Expected 'bindings' subcommand, got {other:?}"),
        }
    }

    fn path_arg(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn distance_defaults_apply_without_a_file() {
        let app = build_distance_config(&distance_args(&[])).unwrap();
        assert_eq!(app.core_config.cutoff, 20.0);
        assert!(app.core_config.compressed);
        assert!(app.core_config.calculate_overlap);
        assert!(!app.core_config.include_backbone);
        assert!(!app.core_config.legacy_overlap_reuse);
        assert_eq!(app.jobs.len(), 1);
        assert!(app.annotation.is_none());
        assert!(app.radii_path.is_none());
    }

    #[test]
    fn cli_flags_override_file_values() {
        let config_path = write_config_file(
            "distance_override.toml",
            r#"
            [distance]
            cutoff = 12.0 # Will be overridden
            compressed = true # Will be overridden
            radii-path = "/tables/vdw.txt"

            [annotation]
            metric = "sumvdw" # Will be overridden
            "#,
        );
        let args = distance_args(&[
            "-c",
            path_arg(&config_path),
            "--cutoff",
            "6.5",
            "--no-compress",
            "--fasta",
            "2lue.fasta",
            "--metric",
            "fracin4",
        ]);
        let app = build_distance_config(&args).unwrap();

        assert_eq!(app.core_config.cutoff, 6.5);
        assert!(!app.core_config.compressed);
        assert_eq!(app.radii_path, Some(PathBuf::from("/tables/vdw.txt")));
        let annotation = app.annotation.unwrap();
        assert_eq!(annotation.metric, AggregationMetric::FracIn4);
        assert_eq!(annotation.path, PathBuf::from("2lue.fasta"));
    }

    #[test]
    fn file_values_fill_in_for_missing_flags() {
        let config_path = write_config_file(
            "distance_file.toml",
            "[distance]\ncutoff = 9.0\ninclude-backbone = true\nlegacy-overlap-reuse = true\n\n[annotation]\nmetric = \"meandist\"\n",
        );
        let args = distance_args(&["-c", path_arg(&config_path), "--fasta", "x.fasta"]);
        let app = build_distance_config(&args).unwrap();
        assert_eq!(app.core_config.cutoff, 9.0);
        assert!(app.core_config.include_backbone);
        assert!(app.core_config.legacy_overlap_reuse);
        assert_eq!(app.annotation.unwrap().metric, AggregationMetric::MeanDist);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let negative = build_distance_config(&distance_args(&["--cutoff=-1"]));
        assert!(matches!(negative, Err(CliError::Config(_))));

        let metric = build_distance_config(&distance_args(&["--fasta", "x", "--metric", "MAXSTD"]));
        assert!(matches!(metric, Err(CliError::Config(_))));
    }

    #[test]
    fn malformed_job_is_an_argument_error() {
        let mut args = distance_args(&[]);
        args.jobs = vec!["A:MG".to_string()];
        assert!(matches!(
            build_distance_config(&args),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn annotate_metric_comes_from_file_when_not_given() {
        let config_path = write_config_file("annotate.toml", "[annotation]\nmetric = \"maxvdw\"\n");
        let cli = Cli::parse_from([
            "chimera",
            "annotate",
            "-i",
            "2lue.txt.gz",
            "-o",
            "2lue.fasta",
            "-c",
            path_arg(&config_path),
        ]);
        let Commands::Annotate(args) = cli.command else {
            panic!("Expected 'annotate' subcommand");
        };
        let app = build_annotate_config(&args).unwrap();
        assert_eq!(app.metric, AggregationMetric::MaxVdw);
        assert_eq!(app.cutoff, 20.0);
    }

    #[test]
    fn bindings_merges_domains_section() {
        let config_path = write_config_file(
            "domains.toml",
            r#"
            [domains]
            backend = "dpuc2"
            pfam-dir = "/data/pfam"
            dpuc2-dir = "/opt/dpuc2"
            dpuc2-net = "/opt/dpuc2/Pfam-A.dpuc.net"
            timeout-secs = 90

            [domains.interacdome]
            min-instances = 1
            "#,
        );
        let args = bindings_args(&[
            "--interacdome",
            "interacdome.tsv",
            "--full-domains",
            "-c",
            path_arg(&config_path),
        ]);
        let app = build_bindings_config(&args).unwrap();

        assert_eq!(app.core_config.backend, DomainBackend::Dpuc2);
        assert_eq!(app.core_config.timeout, Duration::from_secs(90));
        assert!(app.core_config.full_domains);
        assert_eq!(app.core_config.pfam_hmm(), PathBuf::from("/data/pfam/Pfam-A.hmm"));
        match app.frequencies {
            FrequencySource::Interacdome { thresholds, .. } => {
                assert_eq!(thresholds.min_instances, 1);
                assert_eq!(thresholds.min_structures, 3);
            }
            other => panic!("unexpected frequency source: {other:?}"),
        }
    }

    #[test]
    fn bindings_backend_flag_wins_and_checks_requirements() {
        let args = bindings_args(&["--frequencies", "bf.csv", "--backend", "hmmerweb"]);
        let app = build_bindings_config(&args).unwrap();
        assert_eq!(app.core_config.backend, DomainBackend::HmmerWeb);
        assert_eq!(app.frequencies, FrequencySource::Csv(PathBuf::from("bf.csv")));

        // A local hmmscan run needs to know where Pfam lives.
        let local = bindings_args(&["--frequencies", "bf.csv"]);
        assert!(matches!(
            build_bindings_config(&local),
            Err(CliError::Config(_))
        ));
    }
}
