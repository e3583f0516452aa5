// Harness synthesis - wraps learner source and test cases into a
// self-contained Python script that prints a sentinel-delimited JSON report

use base64::{engine::general_purpose, Engine as _};
use pyarena_common::types::ChallengeSuite;
use uuid::Uuid;

/// Start/end markers delimiting the report region in the child's stdout.
///
/// A fresh pair is generated per submission from a v4 UUID, so learner code
/// cannot print a matching marker even if it knows the prefix format.
#[derive(Debug, Clone)]
pub struct Sentinels {
    pub start: String,
    pub end: String,
}

impl Sentinels {
    pub fn generate() -> Self {
        let token = Uuid::new_v4().simple().to_string();
        Self {
            start: format!("----PYARENA-REPORT-BEGIN-{}----", token),
            end: format!("----PYARENA-REPORT-END-{}----", token),
        }
    }
}

/// Build the harness script for one submission.
///
/// The learner source and the serialized test list are embedded as base64,
/// never by direct interpolation: quotes, backslashes, triple-quotes, or
/// sentinel-like substrings in the submission cannot break the script's own
/// syntax or terminate the report region early. Both payloads are decoded
/// only inside the child process.
///
/// Harness behavior:
/// - executes the decoded source in a fresh namespace; a raise at module
///   level becomes `setupError` and no test runs
/// - a missing or non-callable entry point becomes `missingEntryPoint`
/// - otherwise every test case is called inside its own exception boundary,
///   so one raising case never suppresses the others
/// - the JSON report is always printed between the sentinels, even when the
///   learner produced no output at all
pub fn synthesize(learner_source: &str, suite: &ChallengeSuite, sentinels: &Sentinels) -> String {
    let source_b64 = general_purpose::STANDARD.encode(learner_source);
    let embedded = serde_json::json!({
        "entrypoint": suite.entrypoint,
        "tests": suite.tests,
    });
    // Serialization of registry-owned data cannot fail
    let embedded_b64 = general_purpose::STANDARD.encode(embedded.to_string());

    format!(
        r#"import base64, json, sys

_OUT = sys.stdout
_BEGIN = "{start}"
_END = "{end}"

def _emit(payload):
    _OUT.write("\n" + _BEGIN + "\n")
    _OUT.write(json.dumps(payload))
    _OUT.write("\n" + _END + "\n")
    _OUT.flush()

def _match(expected, value):
    if isinstance(expected, bool) or isinstance(value, bool):
        return isinstance(expected, bool) and isinstance(value, bool) and expected == value
    if isinstance(expected, (int, float)) and isinstance(value, (int, float)):
        return expected == value
    if isinstance(expected, list) and isinstance(value, list):
        if len(expected) != len(value):
            return False
        return all(_match(e, v) for e, v in zip(expected, value))
    if isinstance(expected, dict) and isinstance(value, dict):
        if set(expected.keys()) != set(value.keys()):
            return False
        return all(_match(expected[k], value[k]) for k in expected)
    if type(expected) is not type(value):
        return False
    return expected == value

def _jsonable(value):
    try:
        return json.loads(json.dumps(value))
    except (TypeError, ValueError):
        return repr(value)

def _main():
    source = base64.b64decode("{src}").decode("utf-8")
    suite = json.loads(base64.b64decode("{tests}").decode("utf-8"))
    namespace = dict(__name__="__main__")
    try:
        exec(compile(source, "<submission>", "exec"), namespace)
    except BaseException as exc:
        _emit(dict(setupError="%s: %s" % (type(exc).__name__, exc)))
        return
    func = namespace.get(suite["entrypoint"])
    if not callable(func):
        _emit(dict(missingEntryPoint=suite["entrypoint"]))
        return
    results = []
    for index, case in enumerate(suite["tests"], 1):
        entry = dict(index=index)
        if case.get("message") is not None:
            entry["message"] = case["message"]
        try:
            raw = func(*case.get("input", []), **case.get("kwargs", dict()))
        except BaseException as exc:
            entry["passed"] = False
            entry["error"] = "%s: %s" % (type(exc).__name__, exc)
        else:
            value = _jsonable(raw)
            entry["passed"] = _match(case["expected"], value)
            entry["expected"] = case["expected"]
            entry["value"] = value
        results.append(entry)
    _emit(dict(tests=results, entrypoint=suite["entrypoint"]))

_main()
"#,
        start = sentinels.start,
        end = sentinels.end,
        src = source_b64,
        tests = embedded_b64,
    )
}
