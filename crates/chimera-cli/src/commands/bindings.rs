use crate::cli::BindingsArgs;
use crate::config::builder::build_bindings_config;
use crate::config::models::FrequencySource;
use crate::error::{CliError, InputKind, Result};
use crate::utils::parser::parse_sequence_arg;
use chimera::core::io::binding::BindingFrequencyTable;
use chimera::core::io::compress;
use chimera::core::io::fasta::{SequenceRecord, read_sequences};
use chimera::engine::error::EngineError;
use chimera::workflows;
use std::path::Path;
use tracing::{info, warn};

fn read_fasta(path: &Path) -> Result<Vec<SequenceRecord>> {
    let reader = compress::open_file(path).map_err(|e| CliError::Input {
        kind: InputKind::Fasta,
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    read_sequences(reader).map_err(|e| CliError::Input {
        kind: InputKind::Fasta,
        path: path.to_path_buf(),
        source: e.into(),
    })
}

fn load_table(source: &FrequencySource) -> Result<BindingFrequencyTable> {
    let table = match source {
        FrequencySource::Csv(path) => {
            info!("Loading binding frequencies from {:?}", path);
            BindingFrequencyTable::load(path)
        }
        FrequencySource::Interacdome { path, thresholds } => {
            info!(
                "Deriving binding frequencies from InteracDome results {:?} ({:?})",
                path, thresholds
            );
            BindingFrequencyTable::from_interacdome(path, thresholds)
        }
    }
    .map_err(EngineError::from)?;
    Ok(table)
}

pub async fn run(args: BindingsArgs) -> Result<()> {
    let config = build_bindings_config(&args)?;

    let mut sequences = match &config.fasta_in {
        Some(path) => {
            info!("Reading query sequences from {:?}", path);
            read_fasta(path)?
        }
        None => Vec::new(),
    };
    for value in &config.sequences {
        sequences.push(parse_sequence_arg(value).map_err(|e| CliError::Argument(e.to_string()))?);
    }
    if sequences.is_empty() {
        return Err(CliError::NoSequences);
    }

    let table = load_table(&config.frequencies)?;
    if table.is_empty() {
        warn!("The binding frequency table is empty; no matches can be reported.");
    }

    let finder = workflows::binding::build_domain_finder(&config.core_config)?;
    println!(
        "Searching {} sequence(s) for domains with {}...",
        sequences.len(),
        finder.name()
    );
    let report = tokio::task::block_in_place(|| {
        workflows::binding::find_bindings(
            &sequences,
            finder.as_ref(),
            &table,
            config.core_config.full_domains,
        )
    })?;

    workflows::binding::write_binding_matches(&config.output, &report.matches)?;
    println!(
        "✓ {} binding match(es) across {} domain(s) written to: {}",
        report.matches.len(),
        report.domains.len(),
        config.output.display()
    );

    if let Some(path) = &config.domains_out {
        workflows::binding::write_domain_rows(path, &report.domains)?;
        println!("  Domain table written to: {}", path.display());
    }

    Ok(())
}
