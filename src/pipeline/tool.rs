//! Scoped invocation of external binaries.
//!
//! Every external tool (ddjvu, tesseract, soffice) goes through
//! [`run_tool`]: the binary is looked up first so a missing install gives a
//! clear [`ExtractError::ToolMissing`], the child runs with a hard timeout,
//! and `kill_on_drop` guarantees it does not outlive the call. Exit-status
//! interpretation is left to the caller, which knows what "failed" means
//! for its tool.

use crate::error::ExtractError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// Captured result of a finished tool run.
#[derive(Debug)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    /// Lossily decoded stderr, trimmed.
    pub stderr: String,
    pub elapsed: Duration,
}

/// Locate `program` on PATH (or verify it, if it is already a path).
pub fn locate(program: &Path, hint: &str) -> Result<PathBuf, ExtractError> {
    which::which(program).map_err(|_| ExtractError::ToolMissing {
        tool: program.display().to_string(),
        hint: hint.to_string(),
    })
}

/// Run `program args…` to completion, bounded by `timeout_secs`.
///
/// `subject` is the file being processed; it only feeds error messages.
pub async fn run_tool<I, S>(
    program: &Path,
    args: I,
    subject: &Path,
    timeout_secs: u64,
    hint: &str,
) -> Result<ToolOutput, ExtractError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let resolved = locate(program, hint)?;
    let tool = tool_name(program);

    let mut cmd = Command::new(&resolved);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    debug!("Running {:?}", cmd.as_std());

    let start = Instant::now();
    let limit = Duration::from_secs(timeout_secs);
    let output = match tokio::time::timeout(limit, cmd.output()).await {
        Ok(result) => result.map_err(|e| ExtractError::Io {
            path: resolved.clone(),
            source: e,
        })?,
        Err(_) => {
            return Err(ExtractError::ToolTimeout {
                tool,
                path: subject.to_path_buf(),
                elapsed: start.elapsed(),
            })
        }
    };
    let elapsed = start.elapsed();
    debug!("{} finished with {} in {}ms", tool, output.status, elapsed.as_millis());

    Ok(ToolOutput {
        status: output.status,
        stdout: output.stdout,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        elapsed,
    })
}

/// Short display name of a tool: the file name of its path.
pub fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}
