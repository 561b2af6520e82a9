//! TOML-based application configuration.
//!
//! Stores:
//! - Phase durations for the session timer
//! - Tip generator endpoint, model and cache lifetime
//! - Payment widget settings and the webhook secret
//! - Server bind address
//!
//! Configuration is stored at `~/.config/focusbuddy/config.toml`. Secrets
//! may instead come from the environment, which wins over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::billing::RetryPolicy;
use crate::error::{ConfigError, CoreError, Result};
use crate::timer::{PhaseDurations, DEFAULT_BREAK_SECS, DEFAULT_FOCUS_SECS};
use crate::tips::{DEFAULT_BASE_URL, DEFAULT_CACHE_TTL_SECS, DEFAULT_MODEL};

pub const ENV_HUGGING_FACE_API_KEY: &str = "HUGGING_FACE_API_KEY";
pub const ENV_PAYSTACK_WEBHOOK_SECRET: &str = "PAYSTACK_WEBHOOK_SECRET";
pub const ENV_PAYSTACK_PUBLIC_KEY: &str = "PAYSTACK_PUBLIC_KEY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_focus_secs")]
    pub focus_secs: u64,
    #[serde(default = "default_break_secs")]
    pub break_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipsConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_cache_secs")]
    pub cache_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Without a key every tip comes from the fallback list.
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingConfig {
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub webhook_secret: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_widget_poll_ms")]
    pub widget_poll_ms: u64,
    #[serde(default = "default_widget_timeout_ms")]
    pub widget_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/focusbuddy/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub tips: TipsConfig,
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_focus_secs() -> u64 {
    DEFAULT_FOCUS_SECS
}
fn default_break_secs() -> u64 {
    DEFAULT_BREAK_SECS
}
fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_model() -> String {
    DEFAULT_MODEL.into()
}
fn default_cache_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS as u64
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_widget_poll_ms() -> u64 {
    100
}
fn default_widget_timeout_ms() -> u64 {
    10_000
}
fn default_bind() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    3000
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_secs: default_focus_secs(),
            break_secs: default_break_secs(),
        }
    }
}

impl Default for TipsConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            model: default_model(),
            cache_secs: default_cache_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            api_key: None,
        }
    }
}

impl TipsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            public_key: None,
            webhook_secret: None,
            email: String::new(),
            widget_poll_ms: default_widget_poll_ms(),
            widget_timeout_ms: default_widget_timeout_ms(),
        }
    }
}

impl BillingConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            interval: Duration::from_millis(self.widget_poll_ms.max(1)),
            timeout: Duration::from_millis(self.widget_timeout_ms),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> std::result::Result<(), ConfigError> {
        let unknown = || ConfigError::InvalidValue {
            key: key.to_string(),
            message: "unknown config key".into(),
        };
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("not a leaf key".into()))
                    }
                    // Strings and unset optional secrets.
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data dir, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_from(&Self::path()?)?;
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.durations()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|_| {
            let mut cfg = Self::default();
            cfg.apply_env(|key| std::env::var(key).ok());
            cfg
        })
    }

    /// Persist to the data dir.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Overlay secrets from the environment. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = read(ENV_HUGGING_FACE_API_KEY) {
            self.tips.api_key = Some(v);
        }
        if let Some(v) = read(ENV_PAYSTACK_WEBHOOK_SECRET) {
            self.billing.webhook_secret = Some(v);
        }
        if let Some(v) = read(ENV_PAYSTACK_PUBLIC_KEY) {
            self.billing.public_key = Some(v);
        }
    }

    /// Get a config value as string by dot-separated key.
    /// Unset optional values read as `None`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match Self::get_json_value_by_path(&json, key)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key. Does not persist; call [`Config::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.durations()?;
        *self = updated;
        Ok(())
    }

    /// Every leaf key with its current value, sorted by key.
    pub fn entries(&self) -> Vec<(String, Option<String>)> {
        let Ok(json) = serde_json::to_value(self) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        if let serde_json::Value::Object(sections) = json {
            for (section, fields) in sections {
                if let serde_json::Value::Object(fields) = fields {
                    for (field, _) in fields {
                        let key = format!("{section}.{field}");
                        let value = self.get(&key);
                        out.push((key, value));
                    }
                }
            }
        }
        out
    }

    pub fn durations(&self) -> Result<PhaseDurations> {
        PhaseDurations::new(self.timer.focus_secs, self.timer.break_secs).map_err(|e| {
            CoreError::Config(ConfigError::InvalidValue {
                key: "timer".into(),
                message: e.to_string(),
            })
        })
    }

    /// Secret used to sign webhook bodies.
    ///
    /// # Errors
    /// [`ConfigError::MissingKey`] when no secret is configured.
    pub fn webhook_secret(&self) -> Result<&str> {
        self.billing
            .webhook_secret
            .as_deref()
            .ok_or_else(|| ConfigError::MissingKey(ENV_PAYSTACK_WEBHOOK_SECRET.into()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.timer.focus_secs, 1500);
        assert_eq!(parsed.timer.break_secs, 300);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("[timer]\nfocus_secs = 60\n").unwrap();
        assert_eq!(cfg.timer.focus_secs, 60);
        assert_eq!(cfg.timer.break_secs, 300);
        assert_eq!(cfg.tips.model, "gpt2");
        assert_eq!(cfg.server.port, 3000);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.focus_secs").as_deref(), Some("1500"));
        assert_eq!(cfg.get("server.bind").as_deref(), Some("127.0.0.1"));
        assert!(cfg.get("tips.api_key").is_none());
        assert!(cfg.get("timer.missing_key").is_none());
    }

    #[test]
    fn set_updates_number_and_optional_string() {
        let mut cfg = Config::default();
        cfg.set("timer.break_secs", "120").unwrap();
        cfg.set("billing.public_key", "pk_test_abc").unwrap();
        assert_eq!(cfg.timer.break_secs, 120);
        assert_eq!(cfg.billing.public_key.as_deref(), Some("pk_test_abc"));
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_number() {
        let mut cfg = Config::default();
        assert!(cfg.set("timer.nope", "1").is_err());
        assert!(cfg.set("timer.focus_secs", "soon").is_err());
        assert!(cfg.set("", "1").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn set_rejects_zero_duration() {
        let mut cfg = Config::default();
        let err = cfg.set("timer.focus_secs", "0").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Config(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg.timer.focus_secs, 1500);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config::default();
        cfg.billing.webhook_secret = Some("from-file".into());
        let env: HashMap<&str, &str> = [
            (ENV_PAYSTACK_WEBHOOK_SECRET, "from-env"),
            (ENV_HUGGING_FACE_API_KEY, "   "),
        ]
        .into_iter()
        .collect();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.webhook_secret().unwrap(), "from-env");
        assert!(cfg.tips.api_key.is_none());
    }

    #[test]
    fn missing_webhook_secret_is_a_config_error() {
        let cfg = Config::default();
        assert!(matches!(
            cfg.webhook_secret(),
            Err(CoreError::Config(ConfigError::MissingKey(_)))
        ));
    }

    #[test]
    fn load_from_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("timer.focus_secs", "900").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().timer.focus_secs, 900);
    }

    #[test]
    fn load_from_rejects_zero_duration_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer]\nbreak_secs = 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn entries_lists_every_leaf() {
        let entries = Config::default().entries();
        assert!(entries
            .iter()
            .any(|(k, v)| k == "timer.focus_secs" && v.as_deref() == Some("1500")));
        assert!(entries.iter().any(|(k, v)| k == "tips.api_key" && v.is_none()));
    }

    #[test]
    fn retry_policy_from_billing_section() {
        let policy = BillingConfig::default().retry_policy();
        assert_eq!(policy.interval, Duration::from_millis(100));
        assert_eq!(policy.timeout, Duration::from_secs(10));
    }
}
