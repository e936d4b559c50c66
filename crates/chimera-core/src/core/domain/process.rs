//! Bounded execution of the external HMMER / Perl tools.

use super::DomainError;
use std::io::{Read, Seek, SeekFrom};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const MAX_STDERR_CHARS: usize = 2000;

fn read_stderr(file: &mut std::fs::File) -> String {
    let mut buffer = String::new();
    if file.seek(SeekFrom::Start(0)).is_ok() {
        let _ = file.read_to_string(&mut buffer);
    }
    let trimmed = buffer.trim();
    match trimmed.char_indices().nth(MAX_STDERR_CHARS) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// Runs `command` to completion, killing it once `timeout` elapses.
///
/// Standard output is discarded; standard error is captured into a temporary
/// file so a chatty tool cannot block on a full pipe.
pub fn run_tool(command: &mut Command, tool: &str, timeout: Duration) -> Result<(), DomainError> {
    let mut stderr = tempfile::tempfile().map_err(|source| DomainError::Spawn {
        tool: tool.to_string(),
        source,
    })?;
    let stderr_handle = stderr.try_clone().map_err(|source| DomainError::Spawn {
        tool: tool.to_string(),
        source,
    })?;

    debug!("Running {}: {:?}", tool, command);
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::from(stderr_handle))
        .spawn()
        .map_err(|source| DomainError::Spawn {
            tool: tool.to_string(),
            source,
        })?;

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if started.elapsed() >= timeout => {
                warn!("{} exceeded {:?}; killing it.", tool, timeout);
                let _ = child.kill();
                let _ = child.wait();
                return Err(DomainError::Timeout {
                    tool: tool.to_string(),
                    seconds: timeout.as_secs(),
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                let _ = child.kill();
                return Err(DomainError::Spawn {
                    tool: tool.to_string(),
                    source,
                });
            }
        }
    };

    if status.success() {
        debug!("{} finished in {:.1?}.", tool, started.elapsed());
        Ok(())
    } else {
        Err(DomainError::ToolFailed {
            tool: tool.to_string(),
            status: status.to_string(),
            stderr: read_stderr(&mut stderr),
        })
    }
}
