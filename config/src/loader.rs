// Configuration Loader
// Layered configuration loading system

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::agent_id::same_agent_id;
use crate::errors::ConfigError;
use crate::layered::{ConfigLayer, ConfigLayerSource, LayeredConfig};
use crate::types::{AgentEntry, Config, NestedToolsConfig, SubagentsConfig, ToolList};

const CONFIG_DIR_NAME: &str = ".lineage";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration loader with layered support
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory
    global_dir: Option<PathBuf>,
    /// Project directory containing `.lineage/config.toml`
    project_dir: Option<PathBuf>,
    /// Explicit config file, must exist when set
    config_file: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader rooted at `~/.lineage`
    pub fn new() -> Self {
        Self {
            global_dir: dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME)),
            project_dir: None,
            config_file: None,
        }
    }

    /// Override the global config directory
    pub fn with_global_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.global_dir = dir;
        self
    }

    /// Set project directory
    pub fn with_project_dir(mut self, dir: PathBuf) -> Self {
        self.project_dir = Some(dir);
        self
    }

    /// Set an explicit config file layered above global and project config
    pub fn with_config_file(mut self, path: PathBuf) -> Self {
        self.config_file = Some(path);
        self
    }

    /// Load configuration with CLI overrides
    pub fn load_with_cli_overrides(
        &self,
        cli_overrides: &[(String, String)],
    ) -> Result<Config, ConfigError> {
        // Layers in order:
        // 1. Built-in defaults
        // 2. Global config (~/.lineage/config.toml)
        // 3. Project config (.lineage/config.toml)
        // 4. Explicit config file
        // 5. CLI overrides
        let mut layered = LayeredConfig::new();
        layered.add_layer(ConfigLayer {
            source: ConfigLayerSource::Default,
            values: toml::Value::try_from(Config::default())?,
        });

        if let Some(global_dir) = &self.global_dir {
            if let Some(values) = read_optional_layer(&global_dir.join(CONFIG_FILE_NAME))? {
                layered.add_layer(ConfigLayer {
                    source: ConfigLayerSource::GlobalConfig,
                    values,
                });
            }
        }

        if let Some(project_dir) = &self.project_dir {
            let path = project_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
            if let Some(values) = read_optional_layer(&path)? {
                layered.add_layer(ConfigLayer {
                    source: ConfigLayerSource::ProjectConfig,
                    values,
                });
            }
        }

        if let Some(path) = &self.config_file {
            let values =
                read_optional_layer(path)?.ok_or_else(|| ConfigError::NotFound(path.clone()))?;
            layered.add_layer(ConfigLayer {
                source: ConfigLayerSource::ConfigFile,
                values,
            });
        }

        debug!(sources = ?layered.sources(), "loaded config layers");
        let mut config = layered.into_config()?;

        for (key, value) in cli_overrides {
            apply_override(&mut config, key, value)?;
        }

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a `KEY=VALUE` CLI argument
pub fn parse_override(raw: &str) -> Result<(String, String), ConfigError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ConfigError::MalformedOverride(raw.to_string())),
    }
}

fn read_optional_layer(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table: toml::Table = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "read config layer");
    Ok(Some(toml::Value::Table(table)))
}

/// Apply a single CLI override.
///
/// Accepted keys are `agents.defaults.subagents.<field>` and
/// `agents.list.<agentId>.subagents.<field>`. The latter targets the entry
/// whose normalized id matches and creates one when none does.
fn apply_override(config: &mut Config, key: &str, value: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = key.split('.').collect();
    let (subagents, field) = match parts.as_slice() {
        ["agents", "defaults", "subagents", field @ ..] => (
            config
                .agents
                .defaults
                .subagents
                .get_or_insert_with(SubagentsConfig::default),
            field.join("."),
        ),
        ["agents", "list", agent_id, "subagents", field @ ..] => {
            let agents = &mut config.agents.list;
            let existing = agents
                .iter()
                .position(|entry| same_agent_id(&entry.id, agent_id));
            let index = match existing {
                Some(index) => index,
                None => {
                    agents.push(AgentEntry::new(*agent_id));
                    agents.len() - 1
                }
            };
            (
                agents[index]
                    .subagents
                    .get_or_insert_with(SubagentsConfig::default),
                field.join("."),
            )
        }
        _ => return Err(ConfigError::UnknownKey(key.to_string())),
    };

    let invalid = || ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };

    match field.as_str() {
        "allowNestedSpawn" => {
            subagents.allow_nested_spawn = Some(value.parse().map_err(|_| invalid())?);
        }
        "maxSpawnDepth" => {
            subagents.max_spawn_depth = Some(value.parse().map_err(|_| invalid())?);
        }
        "nestedTools.allow" => {
            subagents
                .nested_tools
                .get_or_insert_with(NestedToolsConfig::default)
                .allow = Some(ToolList::Names(split_list(value)));
        }
        "nestedTools.deny" => {
            subagents
                .nested_tools
                .get_or_insert_with(NestedToolsConfig::default)
                .deny = Some(ToolList::Names(split_list(value)));
        }
        _ => return Err(ConfigError::UnknownKey(key.to_string())),
    }
    Ok(())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
