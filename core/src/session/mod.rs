// Session ancestry: key classification and spawn depth

pub mod depth;
pub mod key;

pub use depth::compute_spawn_depth;
pub use key::{
  AgentSessionKey, DEFAULT_AGENT_ID, SessionKeyClass, classify_session_key,
  is_subagent_session_key, normalize_agent_id, parse_agent_session_key,
  resolve_agent_id_from_session_key,
};
