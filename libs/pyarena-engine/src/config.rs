// Engine configuration - interpreter candidates, timeout, submission size cap

/// Runtime knobs for the grading engine.
///
/// Built once at process start and passed into the engine explicitly; the
/// engine itself never reads the environment, so tests can substitute any
/// configuration they need.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Interpreter binaries to try in order; the first one that spawns wins.
    pub interpreter_candidates: Vec<String>,
    /// Hard wall-clock limit for one submission's child process.
    pub timeout_ms: u64,
    /// Maximum accepted submission size, in characters.
    pub max_source_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interpreter_candidates: vec!["python3".to_string(), "python".to_string()],
            timeout_ms: 5000,
            max_source_chars: 100_000,
        }
    }
}

impl EngineConfig {
    /// Build a config from environment overrides on top of the defaults.
    ///
    /// `PYARENA_PYTHON` prepends an explicit interpreter to the candidate
    /// list, `PYARENA_TIMEOUT_MS` and `PYARENA_MAX_SOURCE` replace the
    /// respective limits. Intended to be called once from a binary's main.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(python) = std::env::var("PYARENA_PYTHON") {
            if !python.trim().is_empty() {
                config.interpreter_candidates.insert(0, python);
            }
        }
        if let Some(timeout_ms) = std::env::var("PYARENA_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.timeout_ms = timeout_ms;
        }
        if let Some(max_chars) = std::env::var("PYARENA_MAX_SOURCE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            config.max_source_chars = max_chars;
        }

        config
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.interpreter_candidates, vec!["python3", "python"]);
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.timeout(), std::time::Duration::from_secs(5));
    }
}
