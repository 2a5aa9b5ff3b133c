use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
  #[error("config file not found: {0}")]
  NotFound(PathBuf),
  #[error("merged configuration is invalid: {0}")]
  Invalid(#[from] toml::de::Error),
  #[error("failed to serialize configuration: {0}")]
  Serialize(#[from] toml::ser::Error),
  #[error("invalid override `{0}`, expected KEY=VALUE")]
  MalformedOverride(String),
  #[error("invalid value `{value}` for config key `{key}`")]
  InvalidValue { key: String, value: String },
  #[error("unknown config key: {0}")]
  UnknownKey(String),
}
