use crate::cli::DistanceArgs;
use crate::config::builder::build_distance_config;
use crate::error::{CliError, InputKind, Result};
use crate::utils::progress::CliProgressHandler;
use chimera::core::io::pdb::PdbStructure;
use chimera::core::radii::ElementRadiusTable;
use chimera::engine::distance::DistanceJob;
use chimera::engine::error::EngineError;
use chimera::engine::progress::ProgressReporter;
use chimera::workflows;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn open_structure(path: &Path) -> Result<PdbStructure> {
    PdbStructure::open(path).map_err(|e| CliError::Input {
        kind: InputKind::Structure,
        path: path.to_path_buf(),
        source: e.into(),
    })
}

pub async fn run(args: DistanceArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = build_distance_config(&args)?;

    let radii = match &config.radii_path {
        Some(path) => {
            info!("Loading element radii from {:?}", path);
            ElementRadiusTable::load(path)
        }
        None => ElementRadiusTable::bundled(),
    }
    .map_err(EngineError::from)?;

    // Jobs frequently share a receptor or ligand file; each is read once.
    let mut structures: HashMap<PathBuf, PdbStructure> = HashMap::new();
    for job in &config.jobs {
        for path in [&job.receptor_path, &job.ligand_path] {
            if !structures.contains_key(path) {
                info!("Loading structure from {:?}", path);
                structures.insert(path.clone(), open_structure(path)?);
            }
        }
    }

    let jobs = config
        .jobs
        .iter()
        .map(|job| {
            let receptor = structures.get(&job.receptor_path);
            let ligand = structures.get(&job.ligand_path);
            match (receptor, ligand) {
                (Some(receptor), Some(ligand)) => Ok(DistanceJob {
                    chain_id: job.chain_id.clone(),
                    ligand_id: job.ligand_id.clone(),
                    receptor,
                    ligand,
                }),
                _ => Err(CliError::Engine(EngineError::Internal(format!(
                    "structure for job {}:{} was not loaded",
                    job.chain_id, job.ligand_id
                )))),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Computing receptor-ligand distances for {}...", config.pdb_id);
    let result = tokio::task::block_in_place(|| {
        workflows::distance::create_distance_file(
            &config.pdb_id,
            &jobs,
            &config.output,
            &config.core_config,
            &radii,
            &reporter,
        )
    })?;

    if result.records.is_empty() {
        warn!("No atom pairs fell within the {} Å cutoff.", config.core_config.cutoff);
    }
    println!(
        "✓ {} atom pairs written to: {}",
        result.records.len(),
        result.path.display()
    );

    if let Some(target) = &config.annotation {
        info!("Annotating binding sites with metric '{}'.", target.metric);
        let chains = tokio::task::block_in_place(|| {
            workflows::annotate::create_fasta(
                &result.records,
                &target.path,
                target.metric,
                config.core_config.cutoff,
            )
        })?;
        println!(
            "✓ {} annotated chain(s) written to: {}",
            chains.len(),
            target.path.display()
        );
    }

    Ok(())
}
