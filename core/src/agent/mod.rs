pub mod config;
pub mod guards;

pub use config::{EffectiveSubagentPolicy, resolve_agent_config, resolve_effective_subagent_policy};
pub use guards::{
  ABSOLUTE_MAX_SPAWN_DEPTH, DEFAULT_MAX_SPAWN_DEPTH, clamp_max_spawn_depth,
  exceeds_spawn_depth_limit,
};
