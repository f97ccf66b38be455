//! Kubernetes control-plane access
//!
//! The probes only need three existence checks, so the cluster is modeled as
//! an opaque [`ClusterClient`] capability. [`KubectlClient`] implements it by
//! running `kubectl` as a subprocess with a per-command timeout.

use serde_json::Value as JsonValue;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ProbeConfig;
use crate::probes::CancelToken;

/// Failure talking to the control plane
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("Failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("{command} cancelled")]
    Cancelled { command: String },

    #[error("{command} failed: {stderr}")]
    Failed { command: String, stderr: String },

    #[error("Unexpected output from {command}: {reason}")]
    Parse { command: String, reason: String },
}

/// Read-only view of a live cluster
pub trait ClusterClient: Send + Sync {
    /// Cheap authenticated read; returns the server's version string
    fn server_version(&self) -> Result<String, ClusterError>;

    fn namespace_exists(&self, name: &str) -> Result<bool, ClusterError>;

    /// `name` is the full CRD name, e.g. `optimizationpolicies.example.io`
    fn crd_exists(&self, name: &str) -> Result<bool, ClusterError>;
}

/// [`ClusterClient`] backed by the `kubectl` binary
#[derive(Debug, Clone)]
pub struct KubectlClient {
    binary: String,
    context: Option<String>,
    timeout: Duration,
    cancel: CancelToken,
}

impl KubectlClient {
    pub fn new(binary: impl Into<String>, context: Option<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            context,
            timeout,
            cancel: CancelToken::new(),
        }
    }

    /// Kill in-flight commands once `cancel` fires
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(
            config.kubectl.clone(),
            config.context.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn run(&self, args: &[&str]) -> Result<CommandOutput, ClusterError> {
        let mut command = Command::new(&self.binary);
        if let Some(context) = &self.context {
            command.arg("--context").arg(context);
        }
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let label = format!("{} {}", self.binary, args.join(" "));
        if self.cancel.is_cancelled() {
            return Err(ClusterError::Cancelled { command: label });
        }
        debug!("Running {}", label);

        let child = command.spawn().map_err(|source| ClusterError::Spawn {
            binary: self.binary.clone(),
            source,
        })?;
        wait_with_timeout(child, &label, self.timeout, &self.cancel)
    }

    /// `kubectl get <kind> <name>`: exit 0 means present, NotFound means absent
    fn exists(&self, kind: &str, name: &str) -> Result<bool, ClusterError> {
        let output = self.run(&["get", kind, name, "-o", "name"])?;
        if output.success {
            return Ok(true);
        }
        if output.stderr.contains("NotFound") || output.stderr.contains("not found") {
            return Ok(false);
        }
        Err(ClusterError::Failed {
            command: format!("get {} {}", kind, name),
            stderr: output.stderr.trim().to_string(),
        })
    }
}

impl ClusterClient for KubectlClient {
    fn server_version(&self) -> Result<String, ClusterError> {
        let command = "version -o json";
        let output = self.run(&["version", "-o", "json"])?;
        if !output.success {
            return Err(ClusterError::Failed {
                command: command.to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        parse_server_version(&output.stdout).ok_or_else(|| ClusterError::Parse {
            command: command.to_string(),
            reason: "no serverVersion.gitVersion in output".to_string(),
        })
    }

    fn namespace_exists(&self, name: &str) -> Result<bool, ClusterError> {
        self.exists("namespace", name)
    }

    fn crd_exists(&self, name: &str) -> Result<bool, ClusterError> {
        self.exists("customresourcedefinition", name)
    }
}

/// Whether `binary` runs at all (client-only, no cluster round trip)
pub fn kubectl_available(binary: &str) -> bool {
    Command::new(binary)
        .args(["version", "--client"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

struct CommandOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

fn wait_with_timeout(
    mut child: Child,
    label: &str,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<CommandOutput, ClusterError> {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let mut stdout = String::new();
                let mut stderr = String::new();
                if let Some(mut out) = child.stdout.take() {
                    let _ = out.read_to_string(&mut stdout);
                }
                if let Some(mut err) = child.stderr.take() {
                    let _ = err.read_to_string(&mut stderr);
                }
                return Ok(CommandOutput {
                    success: status.success(),
                    stdout,
                    stderr,
                });
            }
            Ok(None) => {
                if cancel.is_cancelled() {
                    let _ = child.kill();
                    let _ = child.wait();
                    debug!("{} killed on cancellation", label);
                    return Err(ClusterError::Cancelled {
                        command: label.to_string(),
                    });
                }
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!("{} timed out after {}s", label, timeout.as_secs());
                    return Err(ClusterError::Timeout {
                        command: label.to_string(),
                        secs: timeout.as_secs(),
                    });
                }
                thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                return Err(ClusterError::Failed {
                    command: label.to_string(),
                    stderr: format!("wait failed: {}", e),
                });
            }
        }
    }
}

fn parse_server_version(stdout: &str) -> Option<String> {
    let json: JsonValue = serde_json::from_str(stdout).ok()?;
    json.get("serverVersion")?
        .get("gitVersion")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_version() {
        let out = r#"{
  "clientVersion": {"gitVersion": "v1.30.1"},
  "serverVersion": {"major": "1", "minor": "29", "gitVersion": "v1.29.4"}
}"#;
        assert_eq!(parse_server_version(out).as_deref(), Some("v1.29.4"));
    }

    #[test]
    fn test_parse_server_version_client_only() {
        let out = r#"{"clientVersion": {"gitVersion": "v1.30.1"}}"#;
        assert!(parse_server_version(out).is_none());
        assert!(parse_server_version("error: not json").is_none());
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let client = KubectlClient::new(
            "suitecheck-no-such-kubectl",
            None,
            Duration::from_secs(1),
        );
        let err = client.server_version().unwrap_err();
        assert!(matches!(err, ClusterError::Spawn { .. }), "got {err:?}");
        assert!(!kubectl_available("suitecheck-no-such-kubectl"));
    }

    #[cfg(unix)]
    #[test]
    fn test_cancel_kills_running_command() {
        let child = Command::new("sleep")
            .arg("5")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            trigger.cancel();
        });

        let start = Instant::now();
        let result = wait_with_timeout(child, "sleep 5", Duration::from_secs(30), &cancel);
        canceller.join().unwrap();

        assert!(matches!(result, Err(ClusterError::Cancelled { .. })));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn test_cancelled_client_does_not_spawn() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let client = KubectlClient::new("suitecheck-no-such-kubectl", None, Duration::from_secs(1))
            .with_cancel(cancel);
        // Cancelled before the spawn, so the missing binary is never hit
        let err = client.namespace_exists("default").unwrap_err();
        assert!(matches!(err, ClusterError::Cancelled { .. }), "got {err:?}");
    }

    #[test]
    fn test_from_config_uses_probe_settings() {
        let config = ProbeConfig {
            kubectl: "/opt/bin/kubectl".into(),
            context: Some("kind-e2e".into()),
            timeout_secs: 7,
            ..Default::default()
        };
        let client = KubectlClient::from_config(&config);
        assert_eq!(client.binary, "/opt/bin/kubectl");
        assert_eq!(client.context.as_deref(), Some("kind-e2e"));
        assert_eq!(client.timeout, Duration::from_secs(7));
    }
}
