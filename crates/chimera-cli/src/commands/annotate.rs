use crate::cli::AnnotateArgs;
use crate::config::builder::build_annotate_config;
use crate::error::{CliError, Result};
use chimera::workflows;
use tracing::info;

pub async fn run(args: AnnotateArgs) -> Result<()> {
    let config = build_annotate_config(&args)?;

    info!(
        "Annotating {:?} with metric '{}' (cutoff {} Å).",
        &config.input, config.metric, config.cutoff
    );
    let chains = tokio::task::block_in_place(|| {
        workflows::annotate::annotate_report(
            &config.input,
            &config.output,
            config.metric,
            config.cutoff,
        )
    })
    .map_err(|source| CliError::Annotate {
        path: config.input.clone(),
        source,
    })?;

    println!(
        "✓ {} annotated chain(s) written to: {}",
        chains.len(),
        config.output.display()
    );
    Ok(())
}
