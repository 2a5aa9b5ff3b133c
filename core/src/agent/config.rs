// Agent Configuration Resolution
// Per-agent overrides on top of global subagent defaults

use lineage_config::{AgentEntry, Config, SubagentsConfig};

use crate::session::normalize_agent_id;

use super::guards::{DEFAULT_MAX_SPAWN_DEPTH, clamp_max_spawn_depth};

/// Scalar subagent settings after agent, global and hard defaults are
/// folded together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveSubagentPolicy {
  pub allow_nested_spawn: bool,
  /// Always within `[1, ABSOLUTE_MAX_SPAWN_DEPTH]`.
  pub max_spawn_depth: u32,
}

/// Find the configured entry for `agent_id`, comparing normalized ids.
pub fn resolve_agent_config<'a>(cfg: &'a Config, agent_id: &str) -> Option<&'a AgentEntry> {
  let wanted = normalize_agent_id(agent_id);
  cfg
    .agents
    .list
    .iter()
    .find(|entry| normalize_agent_id(&entry.id) == wanted)
}

pub(crate) fn agent_subagents<'a>(cfg: &'a Config, agent_id: &str) -> Option<&'a SubagentsConfig> {
  resolve_agent_config(cfg, agent_id).and_then(|entry| entry.subagents.as_ref())
}

pub(crate) fn global_subagents(cfg: &Config) -> Option<&SubagentsConfig> {
  cfg.agents.defaults.subagents.as_ref()
}

pub fn resolve_effective_subagent_policy(cfg: &Config, agent_id: &str) -> EffectiveSubagentPolicy {
  let agent = agent_subagents(cfg, agent_id);
  let global = global_subagents(cfg);

  let allow_nested_spawn = resolve(
    agent.and_then(|s| s.allow_nested_spawn),
    global.and_then(|s| s.allow_nested_spawn),
    false,
  );
  let max_spawn_depth = clamp_max_spawn_depth(resolve(
    agent.and_then(|s| s.max_spawn_depth),
    global.and_then(|s| s.max_spawn_depth),
    i64::from(DEFAULT_MAX_SPAWN_DEPTH),
  ));

  EffectiveSubagentPolicy {
    allow_nested_spawn,
    max_spawn_depth,
  }
}

fn resolve<T>(agent: Option<T>, global: Option<T>, hard_default: T) -> T {
  agent.or(global).unwrap_or(hard_default)
}
