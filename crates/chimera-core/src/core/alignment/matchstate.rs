use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum MatchStateError {
    #[error(
        "Match states and sequence indices must have the same length ({match_states} != {seq_indices})"
    )]
    LengthMismatch {
        match_states: usize,
        seq_indices: usize,
    },
    #[error(
        "Aligned sequence consumes {consumed} target positions but the span {start}..={end} has {expected}"
    )]
    SequenceSpan {
        consumed: usize,
        start: usize,
        end: usize,
        expected: usize,
    },
}

/// One aligned column that consumes both a model position and a target position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchState {
    pub match_state: usize,
    pub seq_index: usize,
}

/// Maps a gapped alignment onto (model match state, target sequence index) pairs.
///
/// In `aligned`, uppercase letters are aligned columns, lowercase letters are
/// insertions relative to the model and `-` is a deletion relative to the
/// target. `start` and `end` are the 1-indexed inclusive target coordinates.
/// Columns that are an insertion or a deletion are dropped.
pub fn seq_to_matchstates(
    aligned: &str,
    start: usize,
    end: usize,
) -> Result<Vec<MatchState>, MatchStateError> {
    let mut match_states = Vec::with_capacity(aligned.len());
    let mut next_state = 1;
    for c in aligned.chars() {
        if c.to_uppercase().eq(std::iter::once(c)) {
            match_states.push(next_state);
            next_state += 1;
        } else {
            match_states.push(0);
        }
    }

    let consumed = aligned.chars().filter(|&c| c != '-').count();
    let expected = (end + 1).saturating_sub(start);
    if consumed != expected {
        return Err(MatchStateError::SequenceSpan {
            consumed,
            start,
            end,
            expected,
        });
    }

    let mut seq_indices = Vec::with_capacity(aligned.len());
    let mut next_index = start;
    for c in aligned.chars() {
        if c != '-' {
            seq_indices.push(next_index);
            next_index += 1;
        } else {
            seq_indices.push(0);
        }
    }

    if match_states.len() != seq_indices.len() {
        return Err(MatchStateError::LengthMismatch {
            match_states: match_states.len(),
            seq_indices: seq_indices.len(),
        });
    }

    Ok(match_states
        .into_iter()
        .zip(seq_indices)
        .filter(|&(m, s)| m != 0 && s != 0)
        .map(|(match_state, seq_index)| MatchState {
            match_state,
            seq_index,
        })
        .collect())
}
