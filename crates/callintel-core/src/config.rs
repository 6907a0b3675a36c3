use crate::error::ConfigError;
use crate::types::BackendId;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub backend: Vec<BackendConfig>,

    #[serde(default)]
    pub comparison: ComparisonConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_source_dir")]
    pub dir: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            dir: default_source_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub id: BackendId,

    pub plugin: String,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Plugin-specific keys, handed to the plugin's `initialize` untouched.
    #[serde(flatten)]
    pub options: toml::Value,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Scoring weights used by the comparison engine.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ComparisonConfig {
    #[serde(default = "default_failure_score")]
    pub failure_score: f64,

    #[serde(default)]
    pub degraded_score: f64,

    #[serde(default = "default_clean_score")]
    pub clean_score: f64,

    #[serde(default = "default_reasoning_weight")]
    pub reasoning_weight: f64,

    #[serde(default = "default_one")]
    pub risk_weight: f64,

    #[serde(default = "default_one")]
    pub upsell_weight: f64,

    #[serde(default = "default_richness_threshold_ratio")]
    pub richness_threshold_ratio: f64,

    #[serde(default)]
    pub latency_epsilon_seconds: f64,

    #[serde(default = "default_overall_deadline_seconds")]
    pub overall_deadline_seconds: u64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            failure_score: default_failure_score(),
            degraded_score: 0.0,
            clean_score: default_clean_score(),
            reasoning_weight: default_reasoning_weight(),
            risk_weight: default_one(),
            upsell_weight: default_one(),
            richness_threshold_ratio: default_richness_threshold_ratio(),
            latency_epsilon_seconds: 0.0,
            overall_deadline_seconds: default_overall_deadline_seconds(),
        }
    }
}

impl ComparisonConfig {
    pub fn overall_deadline(&self) -> Duration {
        Duration::from_secs(self.overall_deadline_seconds)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    #[serde(default = "default_report_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub history_path: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: default_report_path(),
            history_path: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("./transcripts")
}

fn default_timeout_seconds() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_failure_score() -> f64 {
    -2.0
}

fn default_clean_score() -> f64 {
    1.0
}

fn default_reasoning_weight() -> f64 {
    0.5
}

fn default_one() -> f64 {
    1.0
}

fn default_richness_threshold_ratio() -> f64 {
    0.2
}

fn default_overall_deadline_seconds() -> u64 {
    900
}

fn default_report_path() -> PathBuf {
    PathBuf::from("comparison_report.json")
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").expect("static pattern");
    let mut result = input.to_string();
    let mut errors = Vec::new();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(val) => {
                result = result.replace(&cap[0], &val);
            }
            Err(_) => {
                errors.push(var_name.to_string());
            }
        }
    }

    if let Some(first_missing) = errors.into_iter().next() {
        return Err(ConfigError::EnvVarNotFound(first_missing));
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for backend in &self.backend {
            if !seen.insert(backend.id) {
                return Err(ConfigError::Invalid(format!(
                    "backend '{}' configured more than once",
                    backend.id
                )));
            }
            if backend.timeout_seconds == 0 {
                return Err(ConfigError::Invalid(format!(
                    "backend '{}' timeout_seconds must be positive",
                    backend.id
                )));
            }
        }

        let cmp = &self.comparison;
        if !(0.0..=1.0).contains(&cmp.richness_threshold_ratio) {
            return Err(ConfigError::Invalid(format!(
                "richness_threshold_ratio must be within 0..=1, got {}",
                cmp.richness_threshold_ratio
            )));
        }
        for (name, weight) in [
            ("reasoning_weight", cmp.reasoning_weight),
            ("risk_weight", cmp.risk_weight),
            ("upsell_weight", cmp.upsell_weight),
        ] {
            if weight < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must not be negative")));
            }
        }
        if cmp.latency_epsilon_seconds < 0.0 {
            return Err(ConfigError::Invalid(
                "latency_epsilon_seconds must not be negative".to_string(),
            ));
        }
        if cmp.overall_deadline_seconds == 0 {
            return Err(ConfigError::Invalid(
                "overall_deadline_seconds must be positive".to_string(),
            ));
        }
        if !(cmp.failure_score < cmp.degraded_score && cmp.degraded_score < cmp.clean_score) {
            return Err(ConfigError::Invalid(
                "reliability scores must satisfy failure < degraded < clean".to_string(),
            ));
        }
        Ok(())
    }

    /// Backends that take part in comparisons, in configuration order.
    pub fn enabled_backends(&self) -> impl Iterator<Item = &BackendConfig> {
        self.backend.iter().filter(|b| b.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parse_valid_toml() {
        let toml_str = r#"
[general]
log_level = "debug"

[source]
dir = "/var/calls"

[[backend]]
id = "fast"
plugin = "ollama"
timeout_seconds = 60
endpoint = "http://localhost:11434"
model = "llama3.1:8b"

[[backend]]
id = "deep"
plugin = "reasoning"
max_new_tokens = 1500

[comparison]
richness_threshold_ratio = 0.25
reasoning_weight = 0.75

[report]
path = "out/report.json"
history_path = "out/history.jsonl"
"#;
        let config = AppConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.source.dir, PathBuf::from("/var/calls"));
        assert_eq!(config.backend.len(), 2);
        assert_eq!(config.backend[0].id, BackendId::Fast);
        assert_eq!(config.backend[0].plugin, "ollama");
        assert_eq!(config.backend[0].timeout(), Duration::from_secs(60));
        assert_eq!(config.backend[1].timeout_seconds, 300);
        assert_eq!(config.comparison.richness_threshold_ratio, 0.25);
        assert_eq!(config.comparison.reasoning_weight, 0.75);
        assert_eq!(config.report.path, PathBuf::from("out/report.json"));
        assert_eq!(
            config.report.history_path,
            Some(PathBuf::from("out/history.jsonl"))
        );
    }

    #[test]
    fn test_config_default_values() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.source.dir, PathBuf::from("./transcripts"));
        assert!(config.backend.is_empty());
        assert_eq!(config.comparison, ComparisonConfig::default());
        assert_eq!(config.comparison.failure_score, -2.0);
        assert_eq!(config.comparison.clean_score, 1.0);
        assert_eq!(config.comparison.richness_threshold_ratio, 0.2);
        assert_eq!(config.report.path, PathBuf::from("comparison_report.json"));
        assert!(config.report.history_path.is_none());
    }

    #[test]
    fn test_config_backend_extra_fields() {
        let toml_str = r#"
[[backend]]
id = "fast"
plugin = "ollama"
model = "llama3.2"
temperature = 0.4
"#;
        let config = AppConfig::from_toml_str(toml_str).unwrap();
        let opts = &config.backend[0].options;
        // Verify extra fields are captured via #[serde(flatten)]
        assert_eq!(opts.get("model").unwrap().as_str(), Some("llama3.2"));
        assert_eq!(opts.get("temperature").unwrap().as_float(), Some(0.4));
    }

    #[test]
    fn test_config_env_var_interpolation() {
        std::env::set_var("CALLINTEL_TEST_ENDPOINT", "http://gpu-box:11434");
        let toml_str = r#"
[[backend]]
id = "fast"
plugin = "ollama"
endpoint = "${CALLINTEL_TEST_ENDPOINT}"
"#;
        let config = AppConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(
            config.backend[0].options.get("endpoint").unwrap().as_str(),
            Some("http://gpu-box:11434")
        );
        std::env::remove_var("CALLINTEL_TEST_ENDPOINT");
    }

    #[test]
    fn test_config_missing_env_var_error() {
        let toml_str = r#"
[general]
log_level = "${DEFINITELY_DOES_NOT_EXIST_12345}"
"#;
        let err = AppConfig::from_toml_str(toml_str).unwrap_err();
        assert!(err.to_string().contains("DEFINITELY_DOES_NOT_EXIST_12345"));
    }

    #[test]
    fn test_config_invalid_toml_error() {
        let result = AppConfig::from_toml_str("this is not valid toml [[[");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_config_unknown_backend_id_rejected() {
        let toml_str = r#"
[[backend]]
id = "medium"
plugin = "ollama"
"#;
        assert!(AppConfig::from_toml_str(toml_str).is_err());
    }

    #[test]
    fn test_config_duplicate_backend_rejected() {
        let toml_str = r#"
[[backend]]
id = "fast"
plugin = "ollama"

[[backend]]
id = "fast"
plugin = "scripted"
"#;
        match AppConfig::from_toml_str(toml_str) {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("more than once")),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_config_threshold_out_of_range_rejected() {
        let toml_str = r#"
[comparison]
richness_threshold_ratio = 1.5
"#;
        assert!(matches!(
            AppConfig::from_toml_str(toml_str),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_config_reliability_order_enforced() {
        let toml_str = r#"
[comparison]
failure_score = 2.0
"#;
        assert!(matches!(
            AppConfig::from_toml_str(toml_str),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_config_negative_weight_rejected() {
        let toml_str = r#"
[comparison]
risk_weight = -1.0
"#;
        match AppConfig::from_toml_str(toml_str) {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("risk_weight")),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_config_enabled_backends_filters_disabled() {
        let toml_str = r#"
[[backend]]
id = "fast"
plugin = "ollama"

[[backend]]
id = "deep"
plugin = "reasoning"
enabled = false
"#;
        let config = AppConfig::from_toml_str(toml_str).unwrap();
        let ids: Vec<_> = config.enabled_backends().map(|b| b.id).collect();
        assert_eq!(ids, vec![BackendId::Fast]);
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = std::env::temp_dir().join("callintel_test_config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.toml");
        std::fs::write(
            &path,
            r#"
[general]
log_level = "warn"

[[backend]]
id = "deep"
plugin = "scripted"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.backend[0].id, BackendId::Deep);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_config_load_from_file_not_found() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/path.toml"));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("failed to read config file"));
    }
}
