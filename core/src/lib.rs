// Lineage Core Library

pub mod agent;
pub mod session;
pub mod spawn;

pub use agent::{
  ABSOLUTE_MAX_SPAWN_DEPTH, DEFAULT_MAX_SPAWN_DEPTH, EffectiveSubagentPolicy,
  clamp_max_spawn_depth, exceeds_spawn_depth_limit, resolve_agent_config,
  resolve_effective_subagent_policy,
};
pub use session::{
  AgentSessionKey, DEFAULT_AGENT_ID, SessionKeyClass, classify_session_key, compute_spawn_depth,
  is_subagent_session_key, normalize_agent_id, parse_agent_session_key,
  resolve_agent_id_from_session_key,
};
pub use spawn::{SpawnPlan, SpawnRequest, is_nested_spawn_allowed, plan_spawn, resolve_nested_tools_policy};
