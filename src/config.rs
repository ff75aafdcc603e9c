//! Configuration loader and validator for the email dataset generator.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::generator::GeneratorSettings;
use crate::model::SamplingOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub app: App,
    pub backend: Backend,
    #[serde(default)]
    pub prompt: Prompt,
    #[serde(default)]
    pub vocabulary: Vocabulary,
}

/// Output locations and run pacing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub output_path: String,
    pub debug_dir: String,
    pub log_path: String,
    #[serde(default = "default_stop_file")]
    pub stop_file: String,
    /// Final id the dataset should reach; a resumed run continues up to it.
    pub target_count: u64,
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fixed seed for role/adjective selection; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Generative backend endpoint and sampling options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Backend {
    pub url: String,
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
}

/// Prompt selection. `system` / `user` replace the preset's text when set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prompt {
    #[serde(default = "default_preset")]
    pub preset: String,
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

/// Where role/adjective lists come from; the built-in lists when `file` is unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vocabulary {
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for Prompt {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            system: None,
            user: None,
        }
    }
}

fn default_stop_file() -> String {
    "stop.txt".into()
}

fn default_retry_delay_ms() -> u64 {
    200
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_preset() -> String {
    "job_application".into()
}

impl Config {
    /// Ensure the output file's parent directory and the debug directory exist.
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if let Some(parent) = Path::new(&self.app.output_path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::create_dir_all(&self.app.debug_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.app.output_path)
    }

    pub fn sampling(&self) -> SamplingOptions {
        SamplingOptions {
            temperature: self.backend.temperature,
            top_p: self.backend.top_p,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    /// Project the pacing and retry knobs the generator needs.
    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            target_count: self.app.target_count,
            max_retries: self.app.max_retries,
            delay: Duration::from_millis(self.app.delay_ms),
            retry_delay: Duration::from_millis(self.app.retry_delay_ms),
            sampling: self.sampling(),
        }
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.output_path.trim().is_empty() {
        return Err(ConfigError::Invalid("app.output_path must be non-empty"));
    }
    if cfg.app.debug_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.debug_dir must be non-empty"));
    }
    if cfg.app.log_path.trim().is_empty() {
        return Err(ConfigError::Invalid("app.log_path must be non-empty"));
    }
    if cfg.app.stop_file.trim().is_empty() {
        return Err(ConfigError::Invalid("app.stop_file must be non-empty"));
    }
    if cfg.app.max_retries == 0 {
        return Err(ConfigError::Invalid("app.max_retries must be > 0"));
    }

    if cfg.backend.url.trim().is_empty() {
        return Err(ConfigError::Invalid("backend.url must be non-empty"));
    }
    if cfg.backend.model.trim().is_empty() {
        return Err(ConfigError::Invalid("backend.model must be non-empty"));
    }
    if cfg.backend.timeout_secs == 0 {
        return Err(ConfigError::Invalid("backend.timeout_secs must be > 0"));
    }
    if let Some(t) = cfg.backend.temperature {
        if !(0.0..=2.0).contains(&t) {
            return Err(ConfigError::Invalid("backend.temperature must be within 0..=2"));
        }
    }
    if let Some(p) = cfg.backend.top_p {
        if !(p > 0.0 && p <= 1.0) {
            return Err(ConfigError::Invalid("backend.top_p must be within (0, 1]"));
        }
    }

    if cfg.prompt.preset.trim().is_empty() {
        return Err(ConfigError::Invalid("prompt.preset must be non-empty"));
    }
    if matches!(cfg.prompt.system.as_deref(), Some(s) if s.trim().is_empty()) {
        return Err(ConfigError::Invalid("prompt.system must be non-empty when set"));
    }
    if matches!(cfg.prompt.user.as_deref(), Some(s) if s.trim().is_empty()) {
        return Err(ConfigError::Invalid("prompt.user must be non-empty when set"));
    }

    Ok(())
}

/// Returns the example YAML configuration.
pub fn example() -> &'static str {
    r#"app:
  output_path: "./data/job_application.csv"
  debug_dir: "./data/debug"
  log_path: "./data/generation_history.log"
  stop_file: "stop.txt"
  target_count: 500
  delay_ms: 100
  retry_delay_ms: 200
  max_retries: 3

backend:
  url: "http://localhost:11434/api/generate"
  model: "llama3.2:3b-instruct-q4_0"
  timeout_secs: 40
  temperature: 0.8
  top_p: 0.9

prompt:
  # recruiting_invite | job_application | onboarding
  preset: "job_application"

vocabulary:
  # YAML file with `roles:` and `adjectives:` lists; built-in lists when omitted
  file: null
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_example_ok() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.app.max_retries, 3);
        assert_eq!(cfg.prompt.preset, "job_application");
        assert!(cfg.vocabulary.file.is_none());
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let yaml = r#"app:
  output_path: "out.csv"
  debug_dir: "debug"
  log_path: "run.log"
  target_count: 10
backend:
  url: "http://localhost:11434/api/generate"
  model: "m"
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.app.stop_file, "stop.txt");
        assert_eq!(cfg.app.max_retries, 3);
        assert_eq!(cfg.app.retry_delay_ms, 200);
        assert_eq!(cfg.backend.timeout_secs, 120);
        assert_eq!(cfg.prompt.preset, "job_application");
        assert_eq!(cfg.sampling(), SamplingOptions::default());
    }

    #[test]
    fn invalid_backend() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.backend.model = "  ".into();
        let err = validate(&cfg).unwrap_err();
        match err { ConfigError::Invalid(msg) => assert!(msg.contains("backend.model")), _ => panic!("wrong error") }

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.backend.timeout_secs = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.backend.top_p = Some(0.0);
        let err = validate(&cfg).unwrap_err();
        match err { ConfigError::Invalid(msg) => assert!(msg.contains("top_p")), _ => panic!("wrong error") }

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.backend.temperature = Some(3.5);
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn invalid_app_fields() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.app.max_retries = 0;
        let err = validate(&cfg).unwrap_err();
        match err { ConfigError::Invalid(msg) => assert!(msg.contains("max_retries")), _ => panic!("wrong error") }

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.app.output_path = "".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.prompt.user = Some("\n".into());
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn generator_settings_projection() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        let s = cfg.generator_settings();
        assert_eq!(s.target_count, 500);
        assert_eq!(s.delay, Duration::from_millis(100));
        assert_eq!(s.retry_delay, Duration::from_millis(200));
        assert_eq!(s.sampling.temperature, Some(0.8));
        assert_eq!(s.sampling.top_p, Some(0.9));
    }

    #[test]
    fn ensure_dirs_creates_output_and_debug_dirs() {
        let td = tempdir().unwrap();
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.app.output_path = td.path().join("out/mails.csv").to_string_lossy().to_string();
        cfg.app.debug_dir = td.path().join("dbg").to_string_lossy().to_string();
        cfg.ensure_dirs().unwrap();
        assert!(td.path().join("out").is_dir());
        assert!(td.path().join("dbg").is_dir());
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        fs::write(&p, example()).unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert_eq!(cfg.backend.model, "llama3.2:3b-instruct-q4_0");
        assert_eq!(cfg.timeout(), Duration::from_secs(40));
    }
}
