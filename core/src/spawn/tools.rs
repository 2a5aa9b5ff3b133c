use lineage_config::{Config, NestedToolsConfig, ToolList};
use lineage_protocol::ToolPolicy;

use crate::agent::config::{agent_subagents, global_subagents};

/// Tool allow/deny lists for a session at `spawn_depth`.
///
/// Only sessions two or more levels deep get a nested policy; a first-level
/// spawn keeps the caller's ordinary tool policy. An agent's `nestedTools`
/// block replaces the global one as a whole. Lists that are not lists of
/// strings are dropped.
pub fn resolve_nested_tools_policy(
  cfg: &Config,
  agent_id: &str,
  spawn_depth: u32,
) -> Option<ToolPolicy> {
  if spawn_depth <= 1 {
    return None;
  }
  let nested = agent_subagents(cfg, agent_id)
    .and_then(|s| s.nested_tools.as_ref())
    .or_else(|| global_subagents(cfg).and_then(|s| s.nested_tools.as_ref()))?;
  Some(sanitize(nested))
}

fn sanitize(nested: &NestedToolsConfig) -> ToolPolicy {
  ToolPolicy {
    allow: names(nested.allow.as_ref()),
    deny: names(nested.deny.as_ref()),
  }
}

fn names(list: Option<&ToolList>) -> Option<Vec<String>> {
  list.and_then(ToolList::as_names).map(<[String]>::to_vec)
}
