// Grading orchestrator - validates the submission, drives harness
// synthesis, process execution, and report parsing, and classifies the
// outcome into a uniform verdict

use pyarena_common::types::{GradingReport, GradingVerdict};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::harness::{synthesize, Sentinels};
use crate::parser;
use crate::registry::ChallengeRegistry;
use crate::runner::{PythonRunner, RunnerError};

/// User-facing message for timed-out submissions. Emphasizes performance,
/// not correctness: the learner's logic may well be right.
pub const TIMEOUT_MESSAGE: &str =
    "Code execution timed out. Check for infinite loops or slow algorithms.";

/// Terminal failure states of one grading attempt. Learner-code failures
/// (setup errors, missing entry point, per-test errors) are not errors at
/// this level; they are data inside an `Ok` verdict.
#[derive(Debug, Error)]
pub enum GradeError {
    #[error("submission is empty")]
    EmptySubmission,
    #[error("submission exceeds the {limit} character limit")]
    SubmissionTooLarge { limit: usize },
    #[error("unknown challenge '{0}'")]
    ChallengeNotFound(String),
    #[error("code execution timed out")]
    Timeout,
    /// Environment problem (interpreter missing, spawn failure, protocol
    /// violation). Full detail is logged server-side; callers surface only
    /// a generic message, never the wrapped cause.
    #[error("grading is temporarily unavailable")]
    EvaluationUnavailable(#[source] anyhow::Error),
}

/// The engine's public entry point. One instance serves any number of
/// concurrent submissions; the registry is read-only and each call owns its
/// harness script and child process outright.
pub struct Grader {
    registry: ChallengeRegistry,
    runner: PythonRunner,
    config: EngineConfig,
}

impl Grader {
    pub fn new(registry: ChallengeRegistry, config: EngineConfig) -> Self {
        let runner = PythonRunner::new(&config);
        Self {
            registry,
            runner,
            config,
        }
    }

    pub fn registry(&self) -> &ChallengeRegistry {
        &self.registry
    }

    /// Grade one submission end-to-end.
    ///
    /// Validating → Synthesizing → Running → Parsing → Graded; every state
    /// can exit to exactly one terminal `GradeError`, and no state is ever
    /// re-entered. A submission is evaluated exactly once: no retries.
    pub async fn grade(
        &self,
        challenge_id: &str,
        learner_source: &str,
    ) -> Result<GradingVerdict, GradeError> {
        if learner_source.trim().is_empty() {
            return Err(GradeError::EmptySubmission);
        }
        let limit = self.config.max_source_chars;
        if learner_source.chars().count() > limit {
            return Err(GradeError::SubmissionTooLarge { limit });
        }

        let suite = self
            .registry
            .lookup(challenge_id)
            .ok_or_else(|| GradeError::ChallengeNotFound(challenge_id.to_string()))?;

        info!(
            challenge_id = %challenge_id,
            entrypoint = %suite.entrypoint,
            tests = suite.tests.len(),
            source_chars = learner_source.chars().count(),
            "Grading submission"
        );

        let sentinels = Sentinels::generate();
        let script = synthesize(learner_source, suite, &sentinels);

        let raw = self
            .runner
            .run(&script, self.config.timeout())
            .await
            .map_err(|e| {
                match &e {
                    RunnerError::InterpreterUnavailable { tried } => {
                        error!(tried = %tried, "No Python interpreter available")
                    }
                    RunnerError::Spawn(cause) => {
                        error!(error = %cause, "Failed to launch interpreter")
                    }
                }
                GradeError::EvaluationUnavailable(e.into())
            })?;

        if raw.timed_out {
            warn!(
                challenge_id = %challenge_id,
                timeout_ms = self.config.timeout_ms,
                "Submission timed out"
            );
            return Err(GradeError::Timeout);
        }

        let parsed = parser::parse(&raw, &sentinels).map_err(|e| {
            error!(
                challenge_id = %challenge_id,
                error = %e,
                exit_signal = ?raw.exit_signal,
                stderr_preview = raw.stderr.lines().next().unwrap_or(""),
                "Harness report missing or malformed"
            );
            GradeError::EvaluationUnavailable(e.into())
        })?;

        let verdict = build_verdict(parsed.report, parsed.clean_stdout, parsed.clean_stderr);

        debug!(
            challenge_id = %challenge_id,
            passed = verdict.passed,
            tests = verdict.tests.len(),
            "Grading completed"
        );

        Ok(verdict)
    }
}

/// Collapse a report into the final uniform verdict.
fn build_verdict(report: GradingReport, stdout: String, stderr: String) -> GradingVerdict {
    match report {
        GradingReport::Tests { tests, .. } => {
            let passed = !tests.is_empty() && tests.iter().all(|t| t.passed);
            GradingVerdict {
                passed,
                tests,
                stdout,
                stderr,
                missing_entry_point: None,
                setup_error: None,
            }
        }
        GradingReport::MissingEntryPoint { missing_entry_point } => GradingVerdict {
            passed: false,
            tests: Vec::new(),
            stdout,
            stderr,
            missing_entry_point: Some(missing_entry_point),
            setup_error: None,
        },
        GradingReport::SetupError { setup_error } => GradingVerdict {
            passed: false,
            tests: Vec::new(),
            stdout,
            stderr,
            missing_entry_point: None,
            setup_error: Some(setup_error),
        },
    }
}

/// The verdict-shaped body for a timed-out submission; the timeout message
/// travels in `setupError` so clients render it like any other failure.
pub fn timeout_verdict() -> GradingVerdict {
    GradingVerdict {
        passed: false,
        tests: Vec::new(),
        stdout: String::new(),
        stderr: String::new(),
        missing_entry_point: None,
        setup_error: Some(TIMEOUT_MESSAGE.to_string()),
    }
}
