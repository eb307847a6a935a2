use serde::Deserialize;
use std::{env, path::PathBuf, time::Duration};

use embrace_providers::RetryConfig;
use embrace_providers::gemini::{DEFAULT_GEMINI_MODEL, GEMINI_API_BASE_URL};

/// Environment variables consulted when the config file lists no keys.
pub const CREDENTIAL_ENV_VARS: [&str; 4] = [
    "GEMINI_API_KEY_1",
    "GEMINI_API_KEY_2",
    "GEMINI_API_KEY_3",
    "GEMINI_API_KEY",
];

const DEFAULT_TURN_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, Default, Deserialize)]
pub struct EmbraceConfig {
    pub api_keys: Option<ApiKeys>,
    pub google: Option<GoogleConfig>,
    pub generation: Option<GenerationConfig>,
    pub resources: Option<ResourcesConfig>,
    pub journal: Option<JournalConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// ```toml
/// [api_keys]
/// gemini = ["${GEMINI_API_KEY_1}", "${GEMINI_API_KEY_2}"]
/// ```
#[derive(Default, Deserialize)]
pub struct ApiKeys {
    #[serde(default)]
    pub gemini: Vec<String>,
}

// Manual Debug impl to prevent leaking API keys in logs.
impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field("gemini", &format_args!("[{} REDACTED]", self.gemini.len()))
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GoogleConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerationConfig {
    pub max_attempts: Option<u32>,
    pub backoff_ms: Option<u64>,
    pub attempt_timeout_secs: Option<u64>,
    pub turn_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResourcesConfig {
    pub path: Option<String>,
}

/// Turn journaling is opt-in.
#[derive(Debug, Default, Deserialize)]
pub struct JournalConfig {
    #[serde(default)]
    pub enabled: bool,
    pub path: Option<String>,
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut i = 0;

    while i < value.len() {
        if value[i..].starts_with("${") {
            let start = i + 2;
            if let Some(end_rel) = value[start..].find('}') {
                let end = start + end_rel;
                let var = &value[start..end];
                if !var.is_empty() {
                    let replacement = env::var(var).unwrap_or_default();
                    out.push_str(&replacement);
                }
                i = end + 1;
                continue;
            }
        }

        let Some(ch) = value[i..].chars().next() else {
            break;
        };
        out.push(ch);
        i += ch.len_utf8();
    }

    out
}

/// Expand a leading `~/` against the home directory.
fn expand_home(value: &str) -> PathBuf {
    if let Some(rest) = value.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(value)
}

impl EmbraceConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(path).map(Some)
    }

    pub fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read { path, source: err });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse { path, source: err })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Credentials from `[api_keys].gemini`, else from the environment.
    ///
    /// Blank entries (including `${VAR}` references to unset variables) are
    /// dropped. An empty result is a valid offline configuration.
    #[must_use]
    pub fn credentials(&self) -> Vec<String> {
        self.credentials_with(|name| env::var(name).ok())
    }

    fn credentials_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
        let configured = self
            .api_keys
            .as_ref()
            .map(|keys| distinct_keys(keys.gemini.iter().map(|raw| expand_env_vars(raw))))
            .unwrap_or_default();
        if !configured.is_empty() {
            return configured;
        }

        distinct_keys(CREDENTIAL_ENV_VARS.iter().filter_map(|name| lookup(name)))
    }

    #[must_use]
    pub fn model(&self) -> String {
        self.google
            .as_ref()
            .and_then(|g| g.model.clone())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string())
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        self.google
            .as_ref()
            .and_then(|g| g.base_url.clone())
            .unwrap_or_else(|| GEMINI_API_BASE_URL.to_string())
    }

    #[must_use]
    pub fn retry_config(&self) -> RetryConfig {
        let defaults = RetryConfig::default();
        let Some(generation) = self.generation.as_ref() else {
            return defaults;
        };
        RetryConfig {
            max_attempts: generation
                .max_attempts
                .unwrap_or(defaults.max_attempts)
                .max(1),
            backoff: generation
                .backoff_ms
                .map_or(defaults.backoff, Duration::from_millis),
            attempt_timeout: generation
                .attempt_timeout_secs
                .map_or(defaults.attempt_timeout, Duration::from_secs),
        }
    }

    #[must_use]
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(
            self.generation
                .as_ref()
                .and_then(|g| g.turn_timeout_secs)
                .unwrap_or(DEFAULT_TURN_TIMEOUT_SECS),
        )
    }

    /// Resource file; defaults to `~/.embrace/resources.json`.
    #[must_use]
    pub fn resources_path(&self) -> Option<PathBuf> {
        match self.resources.as_ref().and_then(|r| r.path.as_deref()) {
            Some(path) => Some(expand_home(path)),
            None => data_dir().map(|dir| dir.join("resources.json")),
        }
    }

    /// Journal database, or `None` unless `[journal].enabled` is set.
    #[must_use]
    pub fn journal_path(&self) -> Option<PathBuf> {
        let journal = self.journal.as_ref().filter(|j| j.enabled)?;
        match journal.path.as_deref() {
            Some(path) => Some(expand_home(path)),
            None => data_dir().map(|dir| dir.join("journal.db")),
        }
    }
}

/// Trimmed, non-blank keys in first-seen order. A repeated key would make
/// rotation retry the same credential.
fn distinct_keys(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for key in raw {
        let key = key.trim();
        if !key.is_empty() && !keys.iter().any(|seen| seen == key) {
            keys.push(key.to_string());
        }
    }
    keys
}

fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".embrace"))
}

pub fn config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("config.toml"))
}
