//! Configuration management for playbuild
//!
//! Engine settings control how playbooks are handed to the external runner
//! and the builder-wide command escalation policy.

use crate::tasks::CommandEscalation;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the inventory the runner reads
pub const INVENTORY_ENV: &str = "ANSIBLE_INVENTORY";
/// Environment variable naming the runner's own configuration file
pub const ANSIBLE_CONFIG_ENV: &str = "ANSIBLE_CONFIG";

/// Settings for the external playbook runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Runner executable
    pub program: String,
    /// Arguments placed before the playbook path
    pub extra_args: Vec<String>,
    /// Flag repeated once per verbosity level
    pub verbose_flag: String,
    /// Escalation policy for commands without an explicit `become_user`
    pub command_escalation: CommandEscalation,
    /// Environment variables the runner expects to be set by the caller
    pub required_env: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "ansible-playbook".to_string(),
            extra_args: Vec::new(),
            verbose_flag: "--verbose".to_string(),
            command_escalation: CommandEscalation::ExplicitOnly,
            required_env: vec![INVENTORY_ENV.to_string(), ANSIBLE_CONFIG_ENV.to_string()],
        }
    }
}

/// Default configuration directory
///
/// `/etc/playbuild` if it exists, otherwise `~/.config/playbuild`.
pub fn default_config_dir() -> PathBuf {
    let system_config = PathBuf::from("/etc/playbuild");
    if system_config.exists() {
        system_config
    } else {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("playbuild")
    }
}

/// Load engine configuration from the config directory
///
/// Looks for `engine.yml`, `engine.json` and `engine.toml` in that order and
/// returns the defaults when none exists. Missing keys take default values.
pub fn load_engine_config(config_dir: &Path) -> Result<EngineConfig> {
    let yaml_path = config_dir.join("engine.yml");
    let json_path = config_dir.join("engine.json");
    let toml_path = config_dir.join("engine.toml");

    let config: EngineConfig = if yaml_path.exists() {
        let contents = read(&yaml_path)?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", yaml_path.display()))?
    } else if json_path.exists() {
        let contents = read(&json_path)?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", json_path.display()))?
    } else if toml_path.exists() {
        let contents = read(&toml_path)?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", toml_path.display()))?
    } else {
        return Ok(EngineConfig::default());
    };

    Ok(config)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
