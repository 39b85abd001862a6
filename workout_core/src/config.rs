//! Configuration file support for the workout composer.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/workout/config.toml`.
//! Every field has a default so partial files are valid.

use crate::synonyms;
use crate::types::UserProfile;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Hard cap on additional generation attempts
pub const MAX_RETRY_CAP: u32 = 5;

/// Upper bounds for duration settings
pub const MAX_CACHE_TTL_HOURS: u64 = 24 * 365;
pub const MAX_FALLBACK_TTL_MINUTES: u64 = 7 * 24 * 60;
pub const MAX_RETRY_BACKOFF_MS: u64 = 60_000;
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 3600;
pub const MAX_CALL_TIMEOUT_SECS: u64 = 3600;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub profile: ProfileConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub prompt: PromptConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Default user profile, expressed as labels
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_profile_id")]
    pub id: String,

    #[serde(default = "default_goal")]
    pub goal: String,

    #[serde(default = "default_structure")]
    pub structure: String,

    #[serde(default = "default_method")]
    pub method: String,

    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub conditions: Vec<String>,

    #[serde(default = "default_weekly_frequency")]
    pub weekly_frequency: u8,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            id: default_profile_id(),
            goal: default_goal(),
            structure: default_structure(),
            method: default_method(),
            level: default_level(),
            conditions: Vec::new(),
            weekly_frequency: default_weekly_frequency(),
        }
    }
}

impl ProfileConfig {
    /// Resolve the labels into a typed profile
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            goal: synonyms::parse_goal(&self.goal),
            structure: synonyms::parse_structure(&self.structure),
            method: synonyms::parse_method(&self.method),
            level: synonyms::parse_level(&self.level),
            conditions: self
                .conditions
                .iter()
                .map(|c| synonyms::parse_condition(c))
                .collect(),
            weekly_frequency: self.weekly_frequency,
        }
    }
}

/// Generative service configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Additional attempts after the first one
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Overall budget for generation within one request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            call_timeout_secs: default_call_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Cache store backend
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    #[default]
    File,
    Memory,
}

/// Composition cache configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,

    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,

    /// Lifetime of plans produced by the local fallback planner
    #[serde(default = "default_fallback_ttl_minutes")]
    pub fallback_ttl_minutes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            ttl_hours: default_ttl_hours(),
            fallback_ttl_minutes: default_fallback_ttl_minutes(),
        }
    }
}

/// What to do with reply exercises that are not in the catalog
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownExercisePolicy {
    /// Drop them, as long as the phase keeps at least one exercise
    #[default]
    Drop,
    /// Fail validation
    Reject,
}

/// Reply validation configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_exercise_count_slack")]
    pub exercise_count_slack: u32,

    #[serde(default)]
    pub strict_phase_count: bool,

    #[serde(default)]
    pub unknown_exercise_policy: UnknownExercisePolicy,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            exercise_count_slack: default_exercise_count_slack(),
            strict_phase_count: false,
            unknown_exercise_policy: UnknownExercisePolicy::default(),
        }
    }
}

/// Prompt assembly configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_max_catalog_entries")]
    pub max_catalog_entries: usize,

    /// How many recent completed plans feed anti-repetition
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_catalog_entries: default_max_catalog_entries(),
            history_limit: default_history_limit(),
        }
    }
}

/// Exercise catalog source
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// CSV catalog; the built-in catalog is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|_| PathBuf::from("."))
    });
    base.join("workout")
}

fn default_profile_id() -> String {
    "default".into()
}

fn default_goal() -> String {
    "conditioning".into()
}

fn default_structure() -> String {
    "bodyweight".into()
}

fn default_method() -> String {
    "traditional".into()
}

fn default_level() -> String {
    "beginner".into()
}

fn default_weekly_frequency() -> u8 {
    3
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_api_key_env() -> String {
    "WORKOUT_API_KEY".into()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_call_timeout_secs() -> u64 {
    45
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    90
}

fn default_ttl_hours() -> u64 {
    24
}

fn default_fallback_ttl_minutes() -> u64 {
    30
}

fn default_exercise_count_slack() -> u32 {
    2
}

fn default_max_catalog_entries() -> usize {
    48
}

fn default_history_limit() -> usize {
    3
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from("."))
        });
        base.join("workout").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject values the composer cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.cache.ttl_hours == 0 {
            return Err(Error::Config("cache.ttl_hours must be at least 1".into()));
        }
        if self.cache.fallback_ttl_minutes == 0 {
            return Err(Error::Config(
                "cache.fallback_ttl_minutes must be at least 1".into(),
            ));
        }
        if self.generation.max_retries > MAX_RETRY_CAP {
            return Err(Error::Config(format!(
                "generation.max_retries must be at most {}",
                MAX_RETRY_CAP
            )));
        }
        if self.generation.request_timeout_secs == 0 {
            return Err(Error::Config(
                "generation.request_timeout_secs must be at least 1".into(),
            ));
        }
        check_cap("cache.ttl_hours", self.cache.ttl_hours, MAX_CACHE_TTL_HOURS)?;
        check_cap(
            "cache.fallback_ttl_minutes",
            self.cache.fallback_ttl_minutes,
            MAX_FALLBACK_TTL_MINUTES,
        )?;
        check_cap(
            "generation.retry_backoff_ms",
            self.generation.retry_backoff_ms,
            MAX_RETRY_BACKOFF_MS,
        )?;
        check_cap(
            "generation.request_timeout_secs",
            self.generation.request_timeout_secs,
            MAX_REQUEST_TIMEOUT_SECS,
        )?;
        check_cap(
            "generation.call_timeout_secs",
            self.generation.call_timeout_secs,
            MAX_CALL_TIMEOUT_SECS,
        )?;
        if self.prompt.max_catalog_entries == 0 {
            return Err(Error::Config(
                "prompt.max_catalog_entries must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Directory holding one file per cache entry
    pub fn cache_dir(&self) -> PathBuf {
        self.data.data_dir.join("cache")
    }

    /// JSON-lines log of completed plans
    pub fn history_path(&self) -> PathBuf {
        self.data.data_dir.join("history.jsonl")
    }

    /// Most recently composed plan, kept for `complete`
    pub fn last_plan_path(&self) -> PathBuf {
        self.data.data_dir.join("last_plan.json")
    }
}

fn check_cap(field: &str, value: u64, max: u64) -> Result<()> {
    if value > max {
        return Err(Error::Config(format!("{} must be at most {}", field, max)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExperienceLevel, Goal, HealthCondition, TrainingStructure};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cache.ttl_hours, 24);
        assert_eq!(config.generation.max_retries, 2);
        assert_eq!(config.prompt.history_limit, 3);
        assert!(config.generation.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.cache.ttl_hours, parsed.cache.ttl_hours);
        assert_eq!(config.generation.model, parsed.generation.model);
        assert_eq!(config.cache.backend, parsed.cache.backend);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[generation]
max_retries = 1

[validation]
unknown_exercise_policy = "reject"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.generation.max_retries, 1);
        assert_eq!(config.generation.retry_backoff_ms, 500); // default
        assert_eq!(
            config.validation.unknown_exercise_policy,
            UnknownExercisePolicy::Reject
        );
        assert_eq!(config.validation.exercise_count_slack, 2); // default
    }

    #[test]
    fn test_profile_labels_resolve() {
        let toml_str = r#"
[profile]
id = "athlete-7"
goal = "muscle gain"
structure = "gym"
level = "expert"
conditions = ["high blood pressure", "something else"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        let profile = config.profile.to_profile();
        assert_eq!(profile.id, "athlete-7");
        assert_eq!(profile.goal, Goal::Hypertrophy);
        assert_eq!(profile.structure, TrainingStructure::FullGym);
        assert_eq!(profile.level, ExperienceLevel::Advanced);
        assert!(profile.conditions.contains(&HealthCondition::Hypertension));
        assert!(profile.conditions.contains(&HealthCondition::Other));
    }

    #[test]
    fn test_validate_rejects_excessive_retries() {
        let mut config = Config::default();
        config.generation.max_retries = MAX_RETRY_CAP + 1;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range_durations() {
        let cases: [fn(&mut Config); 5] = [
            |c| c.cache.ttl_hours = 9_000_000_000_000_000,
            |c| c.cache.fallback_ttl_minutes = MAX_FALLBACK_TTL_MINUTES + 1,
            |c| c.generation.retry_backoff_ms = u64::MAX,
            |c| c.generation.request_timeout_secs = u64::MAX,
            |c| c.generation.call_timeout_secs = MAX_CALL_TIMEOUT_SECS + 1,
        ];
        for apply in cases {
            let mut config = Config::default();
            apply(&mut config);
            assert!(matches!(config.validate(), Err(Error::Config(_))));
        }

        let mut config = Config::default();
        config.cache.ttl_hours = MAX_CACHE_TTL_HOURS;
        config.generation.request_timeout_secs = MAX_REQUEST_TIMEOUT_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_rejects_huge_ttl() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[cache]\nttl_hours = 9000000000000000\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.cache.fallback_ttl_minutes = 10;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.cache.fallback_ttl_minutes, 10);
    }
}
