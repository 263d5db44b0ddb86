use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeProvider {
    #[default]
    Openai,
    Fake,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JudgeConfig {
    pub provider: JudgeProvider,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Judge invocations per evaluation (N for the majority vote).
    pub runs: u32,
    /// Extra attempts when a reply contains no JSON at all.
    pub parse_retries: u32,
    /// Per-invocation timeout; 0 disables it.
    pub timeout_secs: u64,
    pub api_key_env: String,
    /// Raw reply for the `fake` provider; unset means approve every criterion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fake_response: Option<String>,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            provider: JudgeProvider::Openai,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_tokens: 2048,
            runs: 3,
            parse_retries: 1,
            timeout_secs: 120,
            api_key_env: "OPENAI_API_KEY".to_string(),
            fake_response: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    pub version: u32,
    pub judge: JudgeConfig,
    /// Library -> directory holding `<version>.json` reference snapshots.
    pub references: BTreeMap<String, PathBuf>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            judge: JudgeConfig::default(),
            references: BTreeMap::new(),
        }
    }
}

impl EvalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version,
                expected: SUPPORTED_CONFIG_VERSION,
            });
        }
        if self.judge.runs == 0 {
            return Err(ConfigError::Invalid("judge.runs must be at least 1".into()));
        }
        if !(0.0..=2.0).contains(&self.judge.temperature) {
            return Err(ConfigError::Invalid(format!(
                "judge.temperature {} out of range [0, 2]",
                self.judge.temperature
            )));
        }
        Ok(())
    }
}

/// Loads and validates a YAML config. Relative reference directories are
/// resolved against the config file's directory.
pub fn load_config(path: &Path) -> Result<EvalConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg: EvalConfig = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    cfg.validate()?;

    if let Some(base) = path.parent() {
        for dir in cfg.references.values_mut() {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(content: &str) -> (tempfile::TempDir, PathBuf) {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("verbench.yaml");
        std::fs::write(&path, content).unwrap();
        (tmp, path)
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let (_tmp, path) = write("version: 1\njudge:\n  runs: 5\n");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.judge.runs, 5);
        assert_eq!(cfg.judge.model, "gpt-4o-mini");
        assert_eq!(cfg.judge.parse_retries, 1);
        assert_eq!(cfg.judge.provider, JudgeProvider::Openai);
    }

    #[test]
    fn reference_dirs_resolve_against_config() {
        let (tmp, path) = write("version: 1\nreferences:\n  next: refs/next\n");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.references["next"], tmp.path().join("refs/next"));
    }

    #[test]
    fn rejects_unsupported_version_and_zero_runs() {
        let (_tmp, path) = write("version: 2\n");
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::UnsupportedVersion { found: 2, .. })
        ));
        let (_tmp, path) = write("version: 1\njudge:\n  runs: 0\n");
        assert!(matches!(load_config(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let (_tmp, path) = write("version: 1\njudge:\n  sampels: 3\n");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn provider_names_are_snake_case() {
        let (_tmp, path) = write("version: 1\njudge:\n  provider: fake\n");
        assert_eq!(load_config(&path).unwrap().judge.provider, JudgeProvider::Fake);
        let (_tmp, path) = write("version: 1\njudge:\n  provider: anthropic\n");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }
}
