//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/porotos/config.toml)
//! 3. Project config (./porotos.toml)
//! 4. Environment variables (POROTOS_* prefix, `__` separates sections)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{PorotoError, Result};

/// Prefix for configuration overrides (`POROTOS_LLM__MODEL` -> `llm.model`)
pub const ENV_PREFIX: &str = "POROTOS_";

const PROJECT_CONFIG_FILE: &str = "porotos.toml";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_layers(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
            ENV_PREFIX,
        )
    }

    /// Resolution chain over explicit files and env prefix
    pub fn load_layers(global: Option<&Path>, project: &Path, env_prefix: &str) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        figment = figment.merge(Env::prefixed(env_prefix).split("__"));

        let config: Config = figment
            .extract()
            .map_err(|e| PorotoError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| PorotoError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/porotos/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("porotos"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(PROJECT_CONFIG_FILE)
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write the default config template, globally or in the current
    /// directory. An existing file is kept unless `force` is set.
    pub fn init(global: bool, force: bool) -> Result<PathBuf> {
        let path = if global {
            Self::global_config_path().ok_or_else(|| {
                PorotoError::Config("Cannot determine global config directory".to_string())
            })?
        } else {
            Self::project_config_path()
        };

        Self::write_template(&path, force)?;
        Ok(path)
    }

    /// Returns whether the template was written
    pub fn write_template(path: &Path, force: bool) -> Result<bool> {
        if path.exists() && !force {
            info!("Config exists: {}", path.display());
            return Ok(false);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, Self::default_config())?;
        info!("Created config: {}", path.display());
        Ok(true)
    }

    /// Default config content (TOML)
    fn default_config() -> String {
        r#"# Porotos Configuration
# Project settings in ./porotos.toml override ~/.config/porotos/config.toml.
# Credentials belong in the environment: GROQ_API_KEY, GEMINI_API_KEY,
# OPENAI_API_KEY, JIRA_BASE_URL, JIRA_EMAIL, JIRA_API_TOKEN.

version = "1.0"

[llm]
# provider = "groq"        # groq | gemini | openai (auto-detected when unset)
# speed = "fast"           # groq preset: fast | accurate
# model = "llama-3.1-8b-instant"
timeout_secs = 30
temperature = 0.1
max_tokens = 300

[tracker]
enabled = true
# base_url = "https://company.atlassian.net"
# email = "me@company.com"
timeout_secs = 15
preflight = true

[input]
prefix = "SMPR"

[output]
delimiter = ";"

[retry]
classifier_attempts = 5
rate_limit_step_secs = 2
rate_limit_cap_secs = 20
failure_backoff_secs = 2
tracker_attempts = 3
tracker_rate_limit_step_secs = 5
tracker_transient_step_secs = 2
"#
        .to_string()
    }
}
