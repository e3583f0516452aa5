// Process runner - executes a harness script in a dedicated interpreter
// process with a hard wall-clock timeout and full stream capture

use std::process::Stdio;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::EngineConfig;

/// Raw outcome of one child-process run. Produced once per invocation.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub exit_signal: Option<String>,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    /// None of the configured interpreter binaries could be spawned.
    #[error("no usable Python interpreter found (tried: {tried})")]
    InterpreterUnavailable { tried: String },
    /// The interpreter was found but the process could not be launched.
    #[error("failed to launch interpreter process: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Spawns one interpreter process per call; no pooling, no retries.
///
/// Candidate binaries are tried in configuration order and the first one
/// that spawns runs the script. The child gets a cleared environment (PATH
/// preserved so the interpreter itself resolves), a closed stdin, and piped
/// stdout/stderr.
pub struct PythonRunner {
    candidates: Vec<String>,
}

impl PythonRunner {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            candidates: config.interpreter_candidates.clone(),
        }
    }

    /// Run a harness script to completion or to the timeout.
    ///
    /// On timeout the child is force-killed (SIGKILL via `kill_on_drop`) and
    /// the result carries `timed_out: true` with empty streams; partial
    /// output of a killed run is never graded.
    pub async fn run(
        &self,
        script: &str,
        timeout: Duration,
    ) -> Result<ExecutionResult, RunnerError> {
        let path_env = std::env::var("PATH")
            .unwrap_or_else(|_| "/usr/bin:/usr/local/bin:/bin".to_string());

        let mut child = None;
        let mut tried = Vec::new();
        for candidate in &self.candidates {
            let spawned = Command::new(candidate)
                .arg("-c")
                .arg(script)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .env_clear()
                .env("PATH", &path_env)
                .kill_on_drop(true)
                .spawn();

            match spawned {
                Ok(c) => {
                    debug!(interpreter = %candidate, "Interpreter spawned");
                    child = Some(c);
                    break;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(interpreter = %candidate, "Interpreter not found, trying next");
                    tried.push(candidate.clone());
                }
                Err(e) => return Err(RunnerError::Spawn(e)),
            }
        }

        let child = child.ok_or_else(|| RunnerError::InterpreterUnavailable {
            tried: tried.join(", "),
        })?;

        let start = Instant::now();

        // wait_with_output owns the child; dropping the future on timeout
        // drops the child, and kill_on_drop delivers SIGKILL
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                debug!(
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    exit = ?output.status.code(),
                    "Child process exited"
                );
                Ok(ExecutionResult {
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                    timed_out: false,
                    exit_signal: exit_signal(&output.status),
                })
            }
            Ok(Err(e)) => Err(RunnerError::Spawn(e)),
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Child process timed out, killing"
                );
                Ok(ExecutionResult {
                    stdout: String::new(),
                    stderr: String::new(),
                    timed_out: true,
                    exit_signal: None,
                })
            }
        }
    }
}

#[cfg(unix)]
fn exit_signal(status: &std::process::ExitStatus) -> Option<String> {
    use std::os::unix::process::ExitStatusExt;
    status.signal().map(|sig| match sig {
        6 => "SIGABRT".to_string(),
        9 => "SIGKILL".to_string(),
        11 => "SIGSEGV".to_string(),
        15 => "SIGTERM".to_string(),
        other => format!("signal {}", other),
    })
}

#[cfg(not(unix))]
fn exit_signal(_status: &std::process::ExitStatus) -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> PythonRunner {
        PythonRunner::new(&EngineConfig::default())
    }

    #[tokio::test]
    async fn test_captures_both_streams() {
        let result = runner()
            .run(
                "import sys\nprint('out')\nprint('err', file=sys.stderr)",
                Duration::from_secs(5),
            )
            .await
            .unwrap();
        assert!(!result.timed_out);
        assert_eq!(result.stdout.trim(), "out");
        assert_eq!(result.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let start = Instant::now();
        let result = runner()
            .run("while True: pass", Duration::from_millis(500))
            .await
            .unwrap();
        assert!(result.timed_out);
        // Bounded margin: well under timeout + 1s
        assert!(start.elapsed() < Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_unknown_interpreters_exhausted() {
        let config = EngineConfig {
            interpreter_candidates: vec![
                "pyarena-no-such-python-a".to_string(),
                "pyarena-no-such-python-b".to_string(),
            ],
            ..EngineConfig::default()
        };
        let err = PythonRunner::new(&config)
            .run("print(1)", Duration::from_secs(1))
            .await
            .unwrap_err();
        match err {
            RunnerError::InterpreterUnavailable { tried } => {
                assert!(tried.contains("pyarena-no-such-python-a"));
                assert!(tried.contains("pyarena-no-such-python-b"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fallback_to_second_candidate() {
        let config = EngineConfig {
            interpreter_candidates: vec![
                "pyarena-no-such-python".to_string(),
                "python3".to_string(),
                "python".to_string(),
            ],
            ..EngineConfig::default()
        };
        let result = PythonRunner::new(&config)
            .run("print(6 * 7)", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(result.stdout.trim(), "42");
    }
}
