use crate::cli::MatchstatesArgs;
use crate::error::{CliError, Result};
use chimera::core::alignment::matchstate::seq_to_matchstates;
use std::io::Write;
use tracing::debug;

pub async fn run(args: MatchstatesArgs) -> Result<()> {
    let states = seq_to_matchstates(&args.aligned, args.start, args.end)
        .map_err(CliError::AlignedSequence)?;
    debug!("{} match states in '{}'.", states.len(), args.aligned);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "match_state\tseq_index").map_err(CliError::Stdout)?;
    for state in &states {
        writeln!(out, "{}\t{}", state.match_state, state.seq_index).map_err(CliError::Stdout)?;
    }
    Ok(())
}
