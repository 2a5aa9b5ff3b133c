// Configuration Types
// Spawn policy configuration type definitions

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
  /// Agent configuration
  #[serde(default)]
  pub agents: AgentsConfig,
}

// ============================================================================
// AGENTS CONFIGURATION
// ============================================================================

/// Agent configuration: global defaults plus per-agent entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentsConfig {
  /// Defaults applied to every agent
  #[serde(default)]
  pub defaults: AgentDefaults,
  /// Per-agent entries
  #[serde(default)]
  pub list: Vec<AgentEntry>,
}

/// Global agent defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDefaults {
  /// Global subagent settings
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subagents: Option<SubagentsConfig>,
}

/// Per-agent configuration entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentEntry {
  /// Agent identifier, matched after normalization
  pub id: String,
  /// Display name
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  /// Subagent overrides for this agent
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subagents: Option<SubagentsConfig>,
}

impl AgentEntry {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      ..Self::default()
    }
  }

  pub fn with_subagents(mut self, subagents: SubagentsConfig) -> Self {
    self.subagents = Some(subagents);
    self
  }
}

// ============================================================================
// SUBAGENT CONFIGURATION
// ============================================================================

/// Subagent settings. Every field is optional so a per-agent block only
/// overrides what it sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubagentsConfig {
  /// Whether a spawned session may spawn again
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub allow_nested_spawn: Option<bool>,
  /// Deepest level a spawned session may occupy. Clamped when resolved.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_spawn_depth: Option<i64>,
  /// Tool lists for sessions nested two or more levels deep
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub nested_tools: Option<NestedToolsConfig>,
}

/// Nested tools configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NestedToolsConfig {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub allow: Option<ToolList>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deny: Option<ToolList>,
}

impl NestedToolsConfig {
  pub fn new(allow: Option<Vec<String>>, deny: Option<Vec<String>>) -> Self {
    Self {
      allow: allow.map(ToolList::Names),
      deny: deny.map(ToolList::Names),
    }
  }
}

/// A tool list as written by the user.
///
/// Anything that is not a list of strings is kept as `Malformed` so that a
/// bad entry never fails the whole config; the resolver drops it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolList {
  Names(Vec<String>),
  Malformed(serde_json::Value),
}

impl ToolList {
  pub fn as_names(&self) -> Option<&[String]> {
    match self {
      Self::Names(names) => Some(names),
      Self::Malformed(_) => None,
    }
  }
}
