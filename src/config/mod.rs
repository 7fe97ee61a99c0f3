//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/porotos/config.toml)
//! 3. Project config (./porotos.toml)
//! 4. Environment variables (POROTOS_*)
//! 5. CLI arguments (highest priority)
//!
//! Credentials come from the provider's own variables (`GROQ_API_KEY`, ...)
//! and `JIRA_*`, see [`Config::provider_config`] and [`Config::tracker_settings`].

mod loader;
mod types;

pub use loader::{ConfigLoader, ENV_PREFIX};
pub use types::*;
