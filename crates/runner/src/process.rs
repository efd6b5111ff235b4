//! Module subprocess execution.
//!
//! The module contract: one JSON document on stdin, one JSON object
//! somewhere on stdout, exit status 0. There is deliberately no wall-clock
//! timeout here; a timeout policy would slot into `run_entrypoint` once one
//! is specified.

use std::process::Stdio;

use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::entrypoint::{Ecosystem, Entrypoint};
use crate::error::ExecuteError;

#[derive(Debug)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Install ecosystem dependencies next to the entrypoint when present.
/// Failures are logged and never fail the execution.
pub async fn install_entrypoint_deps(entrypoint: &Entrypoint) {
    if entrypoint.ecosystem != Ecosystem::Python {
        return;
    }
    let requirements = entrypoint.dir().join("requirements.txt");
    if !requirements.exists() {
        return;
    }

    debug!(dir = %entrypoint.dir().display(), "installing python dependencies");
    let result = Command::new("pip")
        .args(["install", "-r", "requirements.txt"])
        .current_dir(entrypoint.dir())
        .output()
        .await;

    match result {
        Ok(output) if output.status.success() => {}
        Ok(output) => {
            warn!(
                dir = %entrypoint.dir().display(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "pip install failed; running module anyway"
            );
        }
        Err(e) => {
            warn!(
                dir = %entrypoint.dir().display(),
                error = %e,
                "could not run pip install; running module anyway"
            );
        }
    }
}

/// Spawn the entrypoint, feed it the input document, and collect its output.
///
/// Success is exit code 0 or termination by signal (no code); any other code
/// is an execution failure carrying the captured stderr as diagnostics.
pub async fn run_entrypoint(
    entrypoint: &Entrypoint,
    input: &Value,
) -> Result<ProcessOutput, ExecuteError> {
    let file_name = entrypoint
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| entrypoint.path.display().to_string());

    debug!(
        interpreter = entrypoint.ecosystem.interpreter(),
        entrypoint = %entrypoint.path.display(),
        "spawning module process"
    );

    let mut child = Command::new(entrypoint.ecosystem.interpreter())
        .arg(&file_name)
        .current_dir(entrypoint.dir())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let document = serde_json::to_vec(input)?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(&document).await?;
        stdin.shutdown().await?;
        // Dropping the handle closes the pipe so the module sees EOF.
    }

    let output = child.wait_with_output().await?;
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    match output.status.code() {
        // Signal termination has no code; treat it like a shutdown, not a
        // module failure.
        None | Some(0) => Ok(ProcessOutput { stdout, stderr }),
        Some(code) => Err(ExecuteError::ExecutionFailure {
            code,
            stderr: stderr.trim().to_string(),
        }),
    }
}

// ── Tests ────────────────────────────────────────────────────────────
