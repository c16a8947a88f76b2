//! # configs
//!
//! Layered configuration for DevForum binaries.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. `devforum.toml` in the working directory (or the file named by
//!    `DEVFORUM_CONFIG`), if present
//! 3. environment variables `DEVFORUM__<SECTION>__<KEY>`, after `.env` is
//!    loaded by `dotenvy`

use config::{Config, Environment, File};
use df_core::{PostFilter, RegistrySettings, ReplyLevels, SortPolicy, DEFAULT_MAX_TITLE_CHARS};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_FILE: &str = "devforum.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

/// The listing a presentation layer asks for by default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedConfig {
    pub sort: SortPolicy,
    pub community: Option<String>,
    pub search: Option<String>,
}

impl FeedConfig {
    pub fn filter(&self) -> PostFilter {
        PostFilter {
            community: self.community.clone(),
            search: self.search.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    pub reply_levels: ReplyLevels,
    pub max_title_chars: usize,
    pub seed_sample_data: bool,
}

impl EngineConfig {
    pub fn registry_settings(&self) -> RegistrySettings {
        RegistrySettings {
            reply_levels: self.reply_levels,
            max_title_chars: self.max_title_chars,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForumConfig {
    pub log: LogConfig,
    pub feed: FeedConfig,
    pub engine: EngineConfig,
}

impl ForumConfig {
    /// Reads `.env`, the optional config file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        let file = std::env::var("DEVFORUM_CONFIG").unwrap_or_else(|_| DEFAULT_FILE.to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name(&file).required(false))
            .add_source(Environment::with_prefix("DEVFORUM").separator("__"));
        Self::from_builder(builder)
    }

    /// Parses a TOML document layered over the defaults.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let builder = Self::defaults()?.add_source(File::from_str(toml, config::FileFormat::Toml));
        Self::from_builder(builder)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("log.level", "info")?
            .set_default("log.json", false)?
            .set_default("feed.sort", "hot")?
            .set_default("engine.reply_levels", "flat")?
            .set_default("engine.max_title_chars", DEFAULT_MAX_TITLE_CHARS as i64)?
            .set_default("engine.seed_sample_data", true)?)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let cfg: ForumConfig = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.max_title_chars == 0 {
            return Err(ConfigError::Invalid("engine.max_title_chars must be at least 1".into()));
        }
        if self.log.level.trim().is_empty() {
            return Err(ConfigError::Invalid("log.level must not be empty".into()));
        }
        Ok(())
    }
}
