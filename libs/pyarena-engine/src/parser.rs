// Output parser - recovers the sentinel-delimited JSON report from raw
// child-process output, separating it from the learner's own prints

use pyarena_common::types::GradingReport;
use thiserror::Error;

use crate::harness::Sentinels;
use crate::runner::ExecutionResult;

/// A decoded harness run: the structured report plus the stdout/stderr text
/// the learner's code actually produced outside the protocol region.
#[derive(Debug, Clone)]
pub struct ParsedRun {
    pub report: GradingReport,
    pub clean_stdout: String,
    pub clean_stderr: String,
}

/// The report region was missing or malformed. This indicates a harness bug
/// or an interpreter crash severe enough to prevent the protocol from
/// completing; learner-code failures always arrive inside a well-formed
/// report instead.
#[derive(Debug, Error)]
#[error("grading protocol violation: {0}")]
pub struct ProtocolViolation(pub String);

/// Extract the report from a completed (non-timed-out) run.
pub fn parse(raw: &ExecutionResult, sentinels: &Sentinels) -> Result<ParsedRun, ProtocolViolation> {
    let stdout = &raw.stdout;

    let start_at = stdout
        .find(&sentinels.start)
        .ok_or_else(|| ProtocolViolation("start sentinel not found in stdout".to_string()))?;
    let payload_at = start_at + sentinels.start.len();
    let end_rel = stdout[payload_at..]
        .find(&sentinels.end)
        .ok_or_else(|| ProtocolViolation("end sentinel not found after start".to_string()))?;
    let end_at = payload_at + end_rel;

    let payload = stdout[payload_at..end_at].trim();
    if payload.is_empty() {
        return Err(ProtocolViolation("empty report payload".to_string()));
    }

    let report: GradingReport = serde_json::from_str(payload)
        .map_err(|e| ProtocolViolation(format!("undecodable report payload: {}", e)))?;

    let clean_stdout = format!(
        "{}{}",
        &stdout[..start_at],
        &stdout[end_at + sentinels.end.len()..]
    )
    .trim()
    .to_string();

    Ok(ParsedRun {
        report,
        clean_stdout,
        clean_stderr: raw.stderr.trim().to_string(),
    })
}
