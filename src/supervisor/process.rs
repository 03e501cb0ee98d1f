//! Launching, watching and killing the supervised process.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tokio::sync::oneshot;

use crate::config::ProxyConfig;
use crate::observability::metrics;
use crate::supervisor::SuperviseError;

/// Fixed invocation shape: `<binary> <args...> <config path>`.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    pub binary: PathBuf,
    pub args: Vec<String>,
}

impl From<&ProxyConfig> for ProcessSpec {
    fn from(config: &ProxyConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            args: config.args.clone(),
        }
    }
}

/// How a supervised process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    /// Exited with a non-zero code.
    Failure(i32),
    /// Terminated by a signal.
    Signaled(i32),
    /// Waiting on the process failed; its fate is unknown.
    WaitFailed(String),
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        if status.success() {
            return ExitOutcome::Success;
        }
        match (status.code(), exit_signal(&status)) {
            (Some(code), _) => ExitOutcome::Failure(code),
            (None, Some(signal)) => ExitOutcome::Signaled(signal),
            (None, None) => ExitOutcome::WaitFailed(format!("unrecognized exit status {status}")),
        }
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Success => write!(f, "exited cleanly"),
            ExitOutcome::Failure(code) => write!(f, "exited with status {code}"),
            ExitOutcome::Signaled(signal) => write!(f, "killed by signal {signal}"),
            ExitOutcome::WaitFailed(reason) => write!(f, "wait failed: {reason}"),
        }
    }
}

/// Completion event of one process instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessExit {
    pub pid: u32,
    pub outcome: ExitOutcome,
}

struct RunningProcess {
    pid: u32,
    kill_tx: Option<oneshot::Sender<()>>,
    done_rx: oneshot::Receiver<ExitOutcome>,
}

impl RunningProcess {
    /// Wait for the completion event. Cancel-safe: the receiver is only borrowed.
    async fn completion(&mut self) -> ExitOutcome {
        match (&mut self.done_rx).await {
            Ok(outcome) => outcome,
            Err(_) => ExitOutcome::WaitFailed("completion channel closed".into()),
        }
    }
}

/// Owns at most one live child process.
pub struct ProcessSupervisor {
    spec: ProcessSpec,
    current: Option<RunningProcess>,
}

impl ProcessSupervisor {
    pub fn new(spec: ProcessSpec) -> Self {
        Self { spec, current: None }
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    pub fn pid(&self) -> Option<u32> {
        self.current.as_ref().map(|p| p.pid)
    }

    /// Launch a new instance reading `config_path`. Must run inside a Tokio runtime.
    pub fn start(&mut self, config_path: &Path) -> Result<u32, SuperviseError> {
        if let Some(pid) = self.pid() {
            return Err(SuperviseError::AlreadyRunning { pid });
        }

        let mut child = Command::new(&self.spec.binary)
            .args(&self.spec.args)
            .arg(config_path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SuperviseError::Spawn {
                binary: self.spec.binary.clone(),
                source,
            })?;
        let pid = child.id().unwrap_or_default();

        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        let (done_tx, done_rx) = oneshot::channel();

        tokio::spawn(async move {
            // A dropped kill sender means the owner is gone; kill in that case too.
            let status = tokio::select! {
                status = child.wait() => status,
                _ = kill_rx => {
                    if let Err(e) = child.start_kill() {
                        tracing::warn!(pid, error = %e, "Failed to signal process");
                    }
                    child.wait().await
                }
            };
            let outcome = match status {
                Ok(status) => ExitOutcome::from(status),
                Err(e) => ExitOutcome::WaitFailed(e.to_string()),
            };
            let _ = done_tx.send(outcome);
        });

        self.current = Some(RunningProcess {
            pid,
            kill_tx: Some(kill_tx),
            done_rx,
        });

        metrics::record_process_start();
        tracing::info!(
            pid,
            binary = %self.spec.binary.display(),
            config = %config_path.display(),
            "Process started"
        );
        Ok(pid)
    }

    /// Kill the current instance and wait until it has been reaped.
    ///
    /// Returns `None` when nothing was running.
    pub async fn stop(&mut self) -> Option<ProcessExit> {
        let process = self.current.as_mut()?;
        if let Some(kill) = process.kill_tx.take() {
            let _ = kill.send(());
        }
        let outcome = process.completion().await;
        let pid = process.pid;
        self.current = None;

        metrics::record_process_stop();
        tracing::info!(pid, outcome = %outcome, "Process stopped");
        Some(ProcessExit { pid, outcome })
    }

    /// Resolve when the current instance exits on its own.
    ///
    /// Never resolves while nothing is running. Safe to use as a `select!` branch.
    pub async fn wait_exit(&mut self) -> ProcessExit {
        let Some(process) = self.current.as_mut() else {
            return std::future::pending().await;
        };
        let outcome = process.completion().await;
        let pid = process.pid;
        self.current = None;
        ProcessExit { pid, outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn shell(script: &str) -> ProcessSupervisor {
        ProcessSupervisor::new(ProcessSpec {
            binary: "sh".into(),
            args: vec!["-c".into(), script.into(), "sh".into()],
        })
    }

    #[tokio::test]
    async fn test_stop_kills_and_reaps() {
        let mut supervisor = shell("sleep 30");
        let pid = supervisor.start(Path::new("/dev/null")).unwrap();
        assert!(supervisor.is_running());

        let exit = supervisor.stop().await.unwrap();
        assert_eq!(exit.pid, pid);
        assert_eq!(exit.outcome, ExitOutcome::Signaled(9));
        assert!(!supervisor.is_running());
    }

    #[tokio::test]
    async fn test_stop_without_process() {
        let mut supervisor = shell("true");
        assert!(supervisor.stop().await.is_none());
    }

    #[tokio::test]
    async fn test_unexpected_exit_is_reported() {
        let mut supervisor = shell("exit 3");
        let pid = supervisor.start(Path::new("/dev/null")).unwrap();

        let exit = tokio::time::timeout(Duration::from_secs(5), supervisor.wait_exit())
            .await
            .unwrap();
        assert_eq!(exit, ProcessExit { pid, outcome: ExitOutcome::Failure(3) });
        assert!(!supervisor.is_running());
    }

    #[tokio::test]
    async fn test_config_path_is_last_argument() {
        let mut supervisor = shell("test \"$1\" = /tmp/proxy.yaml");
        supervisor.start(Path::new("/tmp/proxy.yaml")).unwrap();

        let exit = tokio::time::timeout(Duration::from_secs(5), supervisor.wait_exit())
            .await
            .unwrap();
        assert_eq!(exit.outcome, ExitOutcome::Success);
    }

    #[tokio::test]
    async fn test_second_start_is_refused() {
        let mut supervisor = shell("sleep 30");
        let pid = supervisor.start(Path::new("/dev/null")).unwrap();

        match supervisor.start(Path::new("/dev/null")) {
            Err(SuperviseError::AlreadyRunning { pid: running }) => assert_eq!(running, pid),
            other => panic!("expected AlreadyRunning, got {:?}", other),
        }

        supervisor.stop().await;
        supervisor.start(Path::new("/dev/null")).unwrap();
        supervisor.stop().await;
    }

    #[tokio::test]
    async fn test_wait_exit_pends_without_process() {
        let mut supervisor = shell("true");
        let waited = tokio::time::timeout(Duration::from_millis(50), supervisor.wait_exit()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_missing_binary_fails_to_spawn() {
        let mut supervisor = ProcessSupervisor::new(ProcessSpec {
            binary: "/nonexistent/nutcracker".into(),
            args: vec![],
        });
        assert!(matches!(
            supervisor.start(Path::new("/dev/null")),
            Err(SuperviseError::Spawn { .. })
        ));
        assert!(!supervisor.is_running());
    }
}
