// Spawn Decisions
// Structured outputs of the nested spawn policy kernel

use serde::{Deserialize, Serialize};

/// Outcome of a nested spawn permission check.
///
/// A denial is a normal value, not an error; the caller decides how to
/// surface `reason` to its user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnDecision {
  pub allowed: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
  pub current_depth: u32,
  pub max_depth: u32,
}

impl SpawnDecision {
  pub fn allow(current_depth: u32, max_depth: u32) -> Self {
    Self {
      allowed: true,
      reason: None,
      current_depth,
      max_depth,
    }
  }

  pub fn deny(reason: impl Into<String>, current_depth: u32, max_depth: u32) -> Self {
    Self {
      allowed: false,
      reason: Some(reason.into()),
      current_depth,
      max_depth,
    }
  }
}

/// Tool allow/deny lists applied to a deeply nested session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPolicy {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub allow: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deny: Option<Vec<String>>,
}

impl ToolPolicy {
  /// Deny wins over allow. A present allow list restricts the session to its
  /// members; `*` matches every tool.
  pub fn is_tool_allowed(&self, tool_name: &str) -> bool {
    let name = tool_name.trim();
    if let Some(deny) = &self.deny
      && list_matches(deny, name)
    {
      return false;
    }
    match &self.allow {
      Some(allow) => list_matches(allow, name),
      None => true,
    }
  }
}

fn list_matches(list: &[String], name: &str) -> bool {
  list.iter().any(|entry| {
    let entry = entry.trim();
    entry == "*" || entry.eq_ignore_ascii_case(name)
  })
}
