//! Host bridge
//!
//! Command execution and UI control supplied by the surrounding shell. The
//! loader only relies on the result contract: `errno != 0` means failure.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;

/// Options forwarded with a command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecOptions {
    /// Working directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    /// Extra environment variables
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

/// Result of a host command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecOutput {
    pub errno: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn is_success(&self) -> bool {
        self.errno == 0
    }

    /// Turn a non-zero errno into an error, leaving the caller to decide
    /// whether to degrade or abort
    pub fn into_result(self) -> Result<Self, BridgeError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(BridgeError::CommandFailed {
                errno: self.errno,
                stderr: self.stderr,
            })
        }
    }
}

/// Host bridge error
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Command failed with errno {errno}: {stderr}")]
    CommandFailed { errno: i32, stderr: String },

    #[error("Could not spawn command: {0}")]
    Spawn(#[from] std::io::Error),
}

/// API supplied by the application shell
pub trait HostBridge {
    /// Run a shell command
    fn exec(
        &self,
        command: &str,
        options: &ExecOptions,
    ) -> impl Future<Output = Result<ExecOutput, BridgeError>>;

    /// Enter or leave fullscreen
    fn full_screen(&self, enabled: bool);

    /// Show a transient notice
    fn toast(&self, message: &str);
}

/// Runs commands through `sh -c`; UI calls are logged
#[derive(Debug, Clone, Default)]
pub struct ProcessBridge;

impl HostBridge for ProcessBridge {
    async fn exec(&self, command: &str, options: &ExecOptions) -> Result<ExecOutput, BridgeError> {
        tracing::debug!("exec: {}", command);
        let mut cmd = smol::process::Command::new("sh");
        cmd.arg("-c").arg(command).envs(&options.env);
        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }

        let output = cmd.output().await?;
        Ok(ExecOutput {
            errno: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn full_screen(&self, enabled: bool) {
        tracing::info!("fullscreen: {}", enabled);
    }

    fn toast(&self, message: &str) {
        tracing::info!("toast: {}", message);
    }
}

/// Stand-in when no host is present: every command succeeds with "OK"
#[derive(Debug, Clone, Default)]
pub struct OfflineBridge;

impl HostBridge for OfflineBridge {
    async fn exec(&self, command: &str, _options: &ExecOptions) -> Result<ExecOutput, BridgeError> {
        tracing::debug!("exec (offline): {}", command);
        Ok(ExecOutput {
            errno: 0,
            stdout: "OK".to_string(),
            stderr: String::new(),
        })
    }

    fn full_screen(&self, _enabled: bool) {}

    fn toast(&self, message: &str) {
        tracing::info!("toast: {}", message);
    }
}
