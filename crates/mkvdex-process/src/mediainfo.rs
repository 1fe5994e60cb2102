//! mediainfo integration.

use crate::error::{ProcessError, ProcessResult};
use mkvdex_core::RawMediaRecord;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::runtime::Runtime;
use tracing::debug;

/// Upper bound for a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(300);

/// Produces a probe record for one media file.
pub trait Prober {
    fn probe(&self, path: &Path) -> ProcessResult<RawMediaRecord>;
}

/// Runs `<program> --Output=JSON <file>` with a bounded timeout.
///
/// A probe that outlives the timeout is killed and reported as
/// [`ProcessError::Timeout`].
pub struct MediaInfoProber {
    program: String,
    timeout: Duration,
    runtime: Runtime,
}

impl MediaInfoProber {
    /// Create a prober, failing early if `program` is not on `PATH`.
    pub fn new(program: impl Into<String>, timeout: Duration) -> ProcessResult<Self> {
        let program = program.into();
        if which::which(&program).is_err() {
            return Err(ProcessError::ToolNotFound { tool: program });
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            program,
            timeout,
            runtime,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run(&self, path: &Path) -> ProcessResult<std::process::Output> {
        let child = Command::new(&self.program)
            .arg("--Output=JSON")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Dropping the child on timeout kills it
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => Ok(output?),
            Err(_) => Err(ProcessError::Timeout {
                path: path.to_path_buf(),
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

impl Prober for MediaInfoProber {
    fn probe(&self, path: &Path) -> ProcessResult<RawMediaRecord> {
        if !path.exists() {
            return Err(ProcessError::FileNotFound(path.to_path_buf()));
        }

        debug!("Probing {}", path.display());
        let output = self.runtime.block_on(self.run(path))?;

        if !output.status.success() {
            return Err(ProcessError::ProcessFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).map_err(|e| {
            ProcessError::ParseError(format!("Failed to parse {} output: {}", self.program, e))
        })?;

        RawMediaRecord::from_value(json)
            .map_err(|e| ProcessError::ParseError(format!("{}: {}", path.display(), e)))
    }
}
