/// Subprocess runner for the external downloader.
///
/// Everything that talks to yt-dlp goes through [`CommandRunner`], so the
/// rest of the crate can be exercised with a scripted fake.
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use ytrelay_shared::errors::ToolError;

/// Runs one external command to completion and returns its stdout.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn execute(&self, args: &[String]) -> Result<String, ToolError>;
}

/// Runs the real yt-dlp binary with a bounded wall-clock timeout.
pub struct YtDlpRunner {
    /// Executable name or path.
    bin: String,
    /// Maximum time a single invocation may take.
    timeout: Duration,
}

impl YtDlpRunner {
    pub fn new(bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    pub fn bin(&self) -> &str {
        &self.bin
    }
}

#[async_trait]
impl CommandRunner for YtDlpRunner {
    async fn execute(&self, args: &[String]) -> Result<String, ToolError> {
        debug!("Running {} {}", self.bin, args.join(" "));

        let child = Command::new(&self.bin)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ToolError::SpawnFailed(format!("{}: {}", self.bin, e)))?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| ToolError::SpawnFailed(e.to_string()))?,
            Err(_) => {
                warn!("{} timed out after {}s, killed", self.bin, self.timeout.as_secs());
                return Err(ToolError::Timeout(self.timeout.as_secs()));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(
                "{} exited with {:?}: {}",
                self.bin,
                output.status.code(),
                stderr.chars().take(200).collect::<String>()
            );
            return Err(ToolError::Exited {
                code: output.status.code(),
                stderr,
            });
        }

        String::from_utf8(output.stdout).map_err(|_| ToolError::InvalidOutput)
    }
}
