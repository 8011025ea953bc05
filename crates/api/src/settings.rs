//! Service settings
//!
//! Layered from `config/default.toml`, an optional file named by
//! `CONTEXT_ENGINE_CONFIG`, and `CONTEXT_ENGINE__*` environment variables
//! (`CONTEXT_ENGINE__SERVER__ADDRESS=0.0.0.0:9000`).

use crate::rate_limit::RateLimitConfig;
use config::{Config, ConfigError, Environment, File};
use explanation::StoreConfig;
use inference_engine::EngineConfig;
use knowledge::ChatConfig;
use serde::{Deserialize, Serialize};
use signal_record::ValidationConfig;
use std::path::PathBuf;

/// Environment variable naming an extra settings file
pub const CONFIG_PATH_VAR: &str = "CONTEXT_ENGINE_CONFIG";

const ENV_PREFIX: &str = "CONTEXT_ENGINE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub address: String,
    /// Largest accepted batch
    pub max_batch_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:8080".to_string(),
            max_batch_size: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplanationSettings {
    pub capacity: usize,
    pub ttl_secs: u64,
    /// Directory receiving exported `.log` files
    pub export_dir: PathBuf,
}

impl Default for ExplanationSettings {
    fn default() -> Self {
        let store = StoreConfig::default();
        Self {
            capacity: store.capacity,
            ttl_secs: store.ttl_secs,
            export_dir: PathBuf::from("explanations"),
        }
    }
}

impl ExplanationSettings {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            capacity: self.capacity,
            ttl_secs: self.ttl_secs,
        }
    }
}

/// A chat-completions backend; used only when enabled and keyed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout_ms: u64,
}

impl RemoteSettings {
    fn new(endpoint: &str, model: &str, timeout_ms: u64) -> Self {
        Self {
            enabled: false,
            endpoint: endpoint.to_string(),
            api_key: String::new(),
            model: model.to_string(),
            timeout_ms,
        }
    }

    pub fn chat_config(&self) -> Option<ChatConfig> {
        if !self.enabled || self.api_key.trim().is_empty() {
            return None;
        }
        Some(ChatConfig {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            timeout_ms: self.timeout_ms,
        })
    }
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self::new("https://openrouter.ai/api/v1", "openai/gpt-4o-mini", 8_000)
    }
}

/// Complete service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub rules_path: PathBuf,
    pub logging: LoggingSettings,
    pub rate_limit: RateLimitConfig,
    pub explanations: ExplanationSettings,
    pub validation: ValidationConfig,
    pub engine: EngineConfig,
    pub reasoning: RemoteSettings,
    pub web_insight: RemoteSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            rules_path: PathBuf::from("config/rules.yaml"),
            logging: LoggingSettings::default(),
            rate_limit: RateLimitConfig::default(),
            explanations: ExplanationSettings::default(),
            validation: ValidationConfig::default(),
            engine: EngineConfig::default(),
            reasoning: RemoteSettings::default(),
            web_insight: RemoteSettings::new("https://api.perplexity.ai", "sonar-pro", 10_000),
        }
    }
}

impl Settings {
    /// Load from the default locations and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let extra = std::env::var(CONFIG_PATH_VAR).ok();
        Self::load_from(extra.as_deref())
    }

    /// Load with an explicit extra settings file, which must exist when given
    pub fn load_from(extra: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(File::with_name("config/default").required(false));
        if let Some(path) = extra {
            builder = builder.add_source(File::with_name(path));
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
