use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single test case: positional arguments, optional keyword arguments,
/// the expected return value, and an optional human-readable failure hint.
/// Defined at registry-load time and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestCase {
    pub input: Vec<Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub kwargs: Map<String, Value>,
    pub expected: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One challenge's grading contract: the function name the learner must
/// define and the ordered test cases it is called against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChallengeSuite {
    pub id: String,
    pub title: String,
    pub entrypoint: String,
    pub tests: Vec<TestCase>,
}

/// Per-case outcome as reported by the harness. `index` is 1-based and
/// follows suite order. Exactly one of `value`/`error` is set depending on
/// whether the entry-point call returned or raised.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestOutcome {
    pub index: u32,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The structured report the harness prints between its sentinels.
///
/// Modeled as a sum type so that "exactly one of `tests`,
/// `missingEntryPoint`, `setupError`" holds by construction. The harness
/// emits one flat JSON object per shape; untagged deserialization picks the
/// variant whose fields are present.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GradingReport {
    /// Every test case was attempted; one entry per case, in order.
    Tests {
        tests: Vec<TestOutcome>,
        entrypoint: String,
    },
    /// The learner never defined a callable with the required name.
    MissingEntryPoint {
        #[serde(rename = "missingEntryPoint")]
        missing_entry_point: String,
    },
    /// The learner source raised before any test could run.
    SetupError {
        #[serde(rename = "setupError")]
        setup_error: String,
    },
}

/// Final uniform result returned to the calling layer. `passed` is true iff
/// there was no setup error, no missing entry point, and every test in a
/// non-empty list passed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GradingVerdict {
    pub passed: bool,
    pub tests: Vec<TestOutcome>,
    pub stdout: String,
    pub stderr: String,
    pub missing_entry_point: Option<String>,
    pub setup_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_tests_shape() {
        let raw = r#"{"tests":[{"index":1,"passed":true,"expected":"Even","value":"Even"}],"entrypoint":"even_or_odd"}"#;
        let report: GradingReport = serde_json::from_str(raw).unwrap();
        match report {
            GradingReport::Tests { tests, entrypoint } => {
                assert_eq!(entrypoint, "even_or_odd");
                assert_eq!(tests.len(), 1);
                assert_eq!(tests[0].index, 1);
                assert!(tests[0].passed);
                assert_eq!(tests[0].value, Some(json!("Even")));
            }
            other => panic!("wrong shape: {:?}", other),
        }
    }

    #[test]
    fn test_report_missing_entry_point_shape() {
        let raw = r#"{"missingEntryPoint":"even_or_odd"}"#;
        let report: GradingReport = serde_json::from_str(raw).unwrap();
        assert_eq!(
            report,
            GradingReport::MissingEntryPoint {
                missing_entry_point: "even_or_odd".to_string()
            }
        );
    }

    #[test]
    fn test_report_setup_error_shape() {
        let raw = r#"{"setupError":"ValueError: x"}"#;
        let report: GradingReport = serde_json::from_str(raw).unwrap();
        assert_eq!(
            report,
            GradingReport::SetupError {
                setup_error: "ValueError: x".to_string()
            }
        );
    }

    #[test]
    fn test_report_rejects_empty_object() {
        assert!(serde_json::from_str::<GradingReport>("{}").is_err());
    }

    #[test]
    fn test_outcome_error_shape() {
        let raw = r#"{"index":2,"passed":false,"error":"ZeroDivisionError: division by zero"}"#;
        let outcome: TestOutcome = serde_json::from_str(raw).unwrap();
        assert!(!outcome.passed);
        assert!(outcome.value.is_none());
        assert!(outcome.error.as_deref().unwrap().contains("ZeroDivisionError"));
    }

    #[test]
    fn test_verdict_serializes_camel_case() {
        let verdict = GradingVerdict {
            passed: false,
            tests: vec![],
            stdout: String::new(),
            stderr: String::new(),
            missing_entry_point: Some("solve".to_string()),
            setup_error: None,
        };
        let raw = serde_json::to_value(&verdict).unwrap();
        assert_eq!(raw["missingEntryPoint"], json!("solve"));
        assert_eq!(raw["setupError"], Value::Null);
    }

    #[test]
    fn test_test_case_defaults() {
        let raw = r#"{"input":[2],"expected":"Even"}"#;
        let case: TestCase = serde_json::from_str(raw).unwrap();
        assert!(case.kwargs.is_empty());
        assert!(case.message.is_none());
        // Optional fields stay off the wire when absent
        let round = serde_json::to_string(&case).unwrap();
        assert!(!round.contains("kwargs"));
        assert!(!round.contains("message"));
    }
}
