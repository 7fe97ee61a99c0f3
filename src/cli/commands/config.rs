//! Config Command
//!
//! Manage porotos configuration.
//!
//! Usage:
//!   porotos config show [-f toml|json]
//!   porotos config path
//!   porotos config init [-g] [--force]

use std::path::Path;

use console::style;

use crate::ai::ProviderKind;
use crate::config::{ConfigLoader, ENV_PREFIX, env_vars};
use crate::types::{PorotoError, Result};

/// Show the merged effective configuration (credentials are never printed)
pub fn show(format: &str) -> Result<()> {
    let config = ConfigLoader::load()?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&config)?),
        "toml" => println!(
            "{}",
            toml::to_string_pretty(&config).map_err(|e| PorotoError::Config(e.to_string()))?
        ),
        other => {
            return Err(PorotoError::Config(format!(
                "Unknown format '{}'. Valid values: toml, json",
                other
            )));
        }
    }

    Ok(())
}

/// Show configuration paths and which credentials are set
pub fn path() -> Result<()> {
    println!("Configuration paths:");
    println!();

    if let Some(global) = ConfigLoader::global_config_path() {
        println!("  Global:  {} {}", marker(&global), global.display());
    } else {
        println!("  Global:  (not available)");
    }

    let project = ConfigLoader::project_config_path();
    println!("  Project: {} {}", marker(&project), project.display());
    println!("  Env:     {}*", ENV_PREFIX);

    println!();
    println!("Credentials:");
    let names = ProviderKind::ALL
        .iter()
        .map(|kind| kind.api_key_env())
        .chain([
            env_vars::TRACKER_BASE_URL,
            env_vars::TRACKER_EMAIL,
            env_vars::TRACKER_API_TOKEN,
        ]);
    for name in names {
        let set = std::env::var(name).is_ok_and(|v| !v.trim().is_empty());
        let mark = if set {
            style("✓").green()
        } else {
            style("✗").dim()
        };
        println!("  {} {}", mark, name);
    }

    Ok(())
}

/// Write the default config file
pub fn init(global: bool, force: bool) -> Result<()> {
    let path = ConfigLoader::init(global, force)?;
    println!("{} Configuration: {}", style("✓").green(), path.display());
    Ok(())
}

fn marker(path: &Path) -> console::StyledObject<&'static str> {
    if path.exists() {
        style("✓").green()
    } else {
        style("✗").dim()
    }
}
