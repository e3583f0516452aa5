// CLI commands for managing challenges and grading locally
use anyhow::{bail, Context, Result};
use pyarena_common::types::{ChallengeSuite, GradingVerdict, TestCase};
use pyarena_engine::{ChallengeRegistry, EngineConfig, GradeError, Grader, TIMEOUT_MESSAGE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct ChallengesFile {
    challenges: Vec<ChallengeSuite>,
}

/// Load the challenge config, tolerating a missing file for add-challenge
fn load_challenges_config(path: &Path) -> Result<ChallengesFile> {
    if !path.exists() {
        return Ok(ChallengesFile { challenges: vec![] });
    }
    let content = fs::read_to_string(path).context("Failed to read challenges.json")?;
    serde_json::from_str(&content).context("Failed to parse challenges.json")
}

fn save_challenges_config(path: &Path, config: &ChallengesFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json_content =
        serde_json::to_string_pretty(config).context("Failed to serialize challenges.json")?;
    fs::write(path, json_content).context("Failed to write challenges.json")?;
    Ok(())
}

/// List the configured challenges
pub fn list_challenges(config_path: &str) -> Result<()> {
    let registry = ChallengeRegistry::load(config_path)?;

    println!("{} challenge(s) configured:", registry.len());
    println!();
    for suite in registry.list() {
        println!(
            "  {:<24} {} ({} tests, entrypoint: {})",
            suite.id,
            suite.title,
            suite.tests.len(),
            suite.entrypoint
        );
    }
    Ok(())
}

/// Grade a local submission file against a challenge
pub async fn grade(
    config_path: &str,
    challenge_id: &str,
    file: &str,
    python: Option<&str>,
    timeout_ms: u64,
    json: bool,
) -> Result<()> {
    let registry = ChallengeRegistry::load(config_path)?;

    let mut config = EngineConfig {
        timeout_ms,
        ..EngineConfig::default()
    };
    if let Some(python) = python {
        config.interpreter_candidates.insert(0, python.to_string());
    }

    let source =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))?;

    let grader = Grader::new(registry, config);
    let verdict = match grader.grade(challenge_id, &source).await {
        Ok(verdict) => verdict,
        Err(GradeError::Timeout) => {
            println!("✗ {}", TIMEOUT_MESSAGE);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
        return Ok(());
    }

    print_report(challenge_id, &verdict);

    if !verdict.passed {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(challenge_id: &str, verdict: &GradingVerdict) {
    println!("→ Graded '{}'", challenge_id);
    println!();

    if let Some(name) = &verdict.missing_entry_point {
        println!("  ✗ Your code never defines a function named '{}'", name);
    }
    if let Some(setup_error) = &verdict.setup_error {
        println!("  ✗ Your code crashed before any test ran: {}", setup_error);
    }

    for outcome in &verdict.tests {
        if outcome.passed {
            println!("  Test {} ✓", outcome.index);
        } else if let Some(error) = &outcome.error {
            println!("  Test {} ✗ raised {}", outcome.index, error);
        } else {
            println!(
                "  Test {} ✗ expected {}, got {}",
                outcome.index,
                outcome
                    .expected
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
                outcome
                    .value
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            );
        }
        if !outcome.passed {
            if let Some(message) = &outcome.message {
                println!("         hint: {}", message);
            }
        }
    }

    if !verdict.stdout.is_empty() {
        println!();
        println!("  stdout:");
        for line in verdict.stdout.lines() {
            println!("    {}", line);
        }
    }
    if !verdict.stderr.is_empty() {
        println!();
        println!("  stderr:");
        for line in verdict.stderr.lines() {
            println!("    {}", line);
        }
    }

    println!();
    let passed = verdict.tests.iter().filter(|t| t.passed).count();
    if verdict.passed {
        println!("→ Passed ({}/{} tests)", passed, verdict.tests.len());
    } else {
        println!("→ Failed ({}/{} tests)", passed, verdict.tests.len());
    }
}

/// Add a challenge suite to the config file
pub fn add_challenge(
    config_path: &str,
    id: &str,
    title: &str,
    entrypoint: &str,
    tests_file: &str,
) -> Result<()> {
    println!("→ Adding challenge: {}", id);

    if id.trim().is_empty() || entrypoint.trim().is_empty() {
        bail!("Challenge id and entrypoint cannot be empty");
    }

    let path = Path::new(config_path);
    let mut config = load_challenges_config(path)?;

    if config.challenges.iter().any(|c| c.id == id) {
        bail!("Challenge '{}' already exists in config", id);
    }

    let tests_content = fs::read_to_string(tests_file)
        .with_context(|| format!("Failed to read {}", tests_file))?;
    let tests: Vec<TestCase> =
        serde_json::from_str(&tests_content).context("Failed to parse test case array")?;
    if tests.is_empty() {
        bail!("Test case array is empty");
    }

    config.challenges.push(ChallengeSuite {
        id: id.to_string(),
        title: title.to_string(),
        entrypoint: entrypoint.to_string(),
        tests,
    });

    // Re-validate the whole file before writing it back
    ChallengeRegistry::from_suites(config.challenges.clone())?;

    save_challenges_config(path, &config)?;

    println!("✓ Challenge '{}' added ({} total)", id, config.challenges.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_round_trip() {
        let dir = std::env::temp_dir().join(format!(
            "pyarena-cli-test-{}",
            std::process::id()
        ));
        let path = dir.join("challenges.json");

        let config = ChallengesFile {
            challenges: vec![ChallengeSuite {
                id: "sum-list".to_string(),
                title: "Sum a List".to_string(),
                entrypoint: "sum_list".to_string(),
                tests: vec![TestCase {
                    input: vec![json!([1, 2, 3])],
                    kwargs: Default::default(),
                    expected: json!(6),
                    message: None,
                }],
            }],
        };
        save_challenges_config(&path, &config).unwrap();

        let loaded = load_challenges_config(&path).unwrap();
        assert_eq!(loaded.challenges, config.challenges);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_config_is_empty() {
        let loaded =
            load_challenges_config(Path::new("no/such/dir/challenges.json")).unwrap();
        assert!(loaded.challenges.is_empty());
    }
}
