use lineage_config::Config;
use lineage_protocol::{SessionStore, SpawnDecision, ToolPolicy};
use tracing::debug;

use crate::agent::{
  ABSOLUTE_MAX_SPAWN_DEPTH, exceeds_spawn_depth_limit, resolve_effective_subagent_policy,
};
use crate::session::{compute_spawn_depth, normalize_agent_id};

use super::tools::resolve_nested_tools_policy;

/// A session asking to spawn another agent.
#[derive(Clone, Copy)]
pub struct SpawnRequest<'a> {
  pub requester_session_key: &'a str,
  pub requester_agent_id: &'a str,
  pub cfg: &'a Config,
  pub store: Option<&'a dyn SessionStore>,
}

/// Permission decision plus what the child would run with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnPlan {
  pub decision: SpawnDecision,
  /// Depth the new session would occupy; `None` when denied.
  pub child_depth: Option<u32>,
  /// Nested tool restrictions for the child, if any apply at its depth.
  pub tools: Option<ToolPolicy>,
}

/// Decide whether the requester may spawn another agent.
///
/// Top-level requesters are always allowed. Nested requesters need
/// `allowNestedSpawn` and room below the effective `maxSpawnDepth`.
pub fn is_nested_spawn_allowed(request: SpawnRequest<'_>) -> SpawnDecision {
  let agent_id = normalize_agent_id(request.requester_agent_id);
  let current_depth = compute_spawn_depth(request.requester_session_key, request.store);

  if current_depth == 0 {
    return SpawnDecision::allow(0, ABSOLUTE_MAX_SPAWN_DEPTH);
  }

  let policy = resolve_effective_subagent_policy(request.cfg, &agent_id);
  let max_depth = policy.max_spawn_depth;

  if !policy.allow_nested_spawn {
    debug!(agent_id = %agent_id, current_depth, "nested spawn disabled");
    return SpawnDecision::deny(
      "nested spawning is disabled (allowNestedSpawn=false)",
      current_depth,
      max_depth,
    );
  }

  let child_depth = current_depth + 1;
  if exceeds_spawn_depth_limit(child_depth, max_depth) {
    debug!(agent_id = %agent_id, current_depth, max_depth, "spawn depth limit reached");
    return SpawnDecision::deny(
      format!("spawn depth limit reached (currentDepth={current_depth}, maxSpawnDepth={max_depth})"),
      current_depth,
      max_depth,
    );
  }

  SpawnDecision::allow(current_depth, max_depth)
}

/// Run the permission check and, when allowed, resolve the child's nested
/// tool policy at `current_depth + 1`.
///
/// The tool policy is resolved under the requester's agent id, which is
/// right when the child runs as the same agent. Callers spawning a different
/// agent should call [`resolve_nested_tools_policy`] with the child's id and
/// `child_depth`.
pub fn plan_spawn(request: SpawnRequest<'_>) -> SpawnPlan {
  let decision = is_nested_spawn_allowed(request);
  if !decision.allowed {
    return SpawnPlan {
      decision,
      child_depth: None,
      tools: None,
    };
  }
  let child_depth = decision.current_depth + 1;
  let tools = resolve_nested_tools_policy(request.cfg, request.requester_agent_id, child_depth);
  SpawnPlan {
    decision,
    child_depth: Some(child_depth),
    tools,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use lineage_config::{AgentEntry, NestedToolsConfig, SubagentsConfig};
  use lineage_protocol::{SessionRecord, SessionSnapshot};
  use pretty_assertions::assert_eq;

  fn global(allow: Option<bool>, max: Option<i64>) -> Config {
    let mut cfg = Config::default();
    cfg.agents.defaults.subagents = Some(SubagentsConfig {
      allow_nested_spawn: allow,
      max_spawn_depth: max,
      nested_tools: None,
    });
    cfg
  }

  fn request<'a>(key: &'a str, cfg: &'a Config, store: Option<&'a dyn SessionStore>) -> SpawnRequest<'a> {
    SpawnRequest {
      requester_session_key: key,
      requester_agent_id: "main",
      cfg,
      store,
    }
  }

  #[test]
  fn top_level_requester_is_always_allowed() {
    let cfg = global(Some(false), Some(1));
    assert_eq!(
      is_nested_spawn_allowed(request("agent:main:main", &cfg, None)),
      SpawnDecision::allow(0, ABSOLUTE_MAX_SPAWN_DEPTH)
    );
  }

  #[test]
  fn nested_spawn_is_off_by_default() {
    let decision = is_nested_spawn_allowed(request("agent:main:subagent:a", &Config::default(), None));
    assert!(!decision.allowed);
    assert_eq!(decision.current_depth, 1);
    assert_eq!(decision.max_depth, 1);
    assert!(decision.reason.as_deref().is_some_and(|r| r.contains("allowNestedSpawn=false")));
  }

  #[test]
  fn default_depth_limit_blocks_second_level() {
    let cfg = global(Some(true), None);
    let decision = is_nested_spawn_allowed(request("agent:main:subagent:a", &cfg, None));
    assert!(!decision.allowed);
    assert_eq!((decision.current_depth, decision.max_depth), (1, 1));
  }

  #[test]
  fn depth_limit_counts_the_child() {
    let cfg = global(Some(true), Some(2));
    let store: SessionSnapshot = [(
      "agent:main:subagent:b".to_string(),
      SessionRecord::new("sid").with_spawn_depth(2),
    )]
    .into_iter()
    .collect();

    let decision = is_nested_spawn_allowed(request("agent:main:subagent:a", &cfg, Some(&store)));
    assert_eq!(decision, SpawnDecision::allow(1, 2));

    let decision = is_nested_spawn_allowed(request("agent:main:subagent:b", &cfg, Some(&store)));
    assert!(!decision.allowed);
    assert_eq!((decision.current_depth, decision.max_depth), (2, 2));
    assert!(decision.reason.as_deref().is_some_and(|r| r.contains("depth limit")));
  }

  #[test]
  fn plan_carries_child_tool_policy() {
    let mut cfg = global(Some(true), Some(3));
    cfg.agents.list = vec![AgentEntry::new("main").with_subagents(SubagentsConfig {
      nested_tools: Some(NestedToolsConfig::new(None, Some(vec!["shell".to_string()]))),
      ..SubagentsConfig::default()
    })];

    let plan = plan_spawn(request("agent:main:subagent:a", &cfg, None));
    assert_eq!(plan.decision, SpawnDecision::allow(1, 3));
    assert_eq!(plan.child_depth, Some(2));
    assert_eq!(
      plan.tools,
      Some(ToolPolicy {
        allow: None,
        deny: Some(vec!["shell".to_string()]),
      })
    );

    let plan = plan_spawn(request("agent:main:main", &cfg, None));
    assert_eq!(plan.child_depth, Some(1));
    assert_eq!(plan.tools, None);
  }

  #[test]
  fn denied_plan_has_no_child() {
    let plan = plan_spawn(request("agent:main:subagent:a", &Config::default(), None));
    assert!(!plan.decision.allowed);
    assert_eq!(plan.child_depth, None);
    assert_eq!(plan.tools, None);
  }
}
