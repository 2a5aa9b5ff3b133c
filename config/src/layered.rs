// Layered Configuration
// Support for layered configuration with precedence

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;
use crate::types::Config;

/// Layered configuration wrapper
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayeredConfig {
  /// Configuration layers, lowest precedence first
  layers: Vec<ConfigLayer>,
}

/// Configuration layer with source tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigLayer {
  /// Layer source
  pub source: ConfigLayerSource,
  /// Configuration values
  pub values: toml::Value,
}

/// Configuration layer source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigLayerSource {
  /// Built-in defaults
  Default,
  /// Global user config
  GlobalConfig,
  /// Project-specific config
  ProjectConfig,
  /// Explicit config file
  ConfigFile,
}

impl LayeredConfig {
  /// Create a new layered configuration
  pub fn new() -> Self {
    Self { layers: Vec::new() }
  }

  /// Add a layer on top of the existing ones
  pub fn add_layer(&mut self, layer: ConfigLayer) {
    self.layers.push(layer);
  }

  /// Sources of the layers added so far, lowest precedence first
  pub fn sources(&self) -> Vec<ConfigLayerSource> {
    self.layers.iter().map(|layer| layer.source).collect()
  }

  /// Get merged configuration. Tables merge key by key; any other value in a
  /// higher layer replaces the lower one, arrays included.
  pub fn merge(&self) -> toml::Value {
    let mut merged = toml::Value::Table(toml::map::Map::new());
    for layer in &self.layers {
      debug!(source = ?layer.source, "merging config layer");
      merge_values(&mut merged, layer.values.clone());
    }
    merged
  }

  /// Merge all layers and deserialize the result
  pub fn into_config(self) -> Result<Config, ConfigError> {
    Ok(self.merge().try_into()?)
  }
}

fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
  match (base, overlay) {
    (toml::Value::Table(base), toml::Value::Table(overlay)) => {
      for (key, value) in overlay {
        match base.get_mut(&key) {
          Some(existing) => merge_values(existing, value),
          None => {
            base.insert(key, value);
          }
        }
      }
    }
    (slot, value) => *slot = value,
  }
}
