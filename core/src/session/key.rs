//! Session key parsing.
//!
//! Keys look like `agent:<agentId>:<rest>` where `<rest>` starts with
//! `subagent:` for sessions created by a spawn. Classification is purely
//! syntactic and never consults a session store.

pub use lineage_config::{DEFAULT_AGENT_ID, normalize_agent_id};

const AGENT_SCOPE_TOKEN: &str = "agent";
const SUBAGENT_MARKER: &str = "subagent:";

/// An `agent:<id>:<rest>` key split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSessionKey {
  /// Lower-cased agent id.
  pub agent_id: String,
  pub rest: String,
}

/// Result of [`classify_session_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKeyClass {
  pub is_nested: bool,
  /// Key with any agent scope stripped.
  pub rest: String,
}

/// Split an agent-scoped key. Returns `None` unless the key has the
/// `agent` token, a non-empty id and a non-empty remainder.
pub fn parse_agent_session_key(session_key: &str) -> Option<AgentSessionKey> {
  let raw = session_key.trim();
  if raw.is_empty() {
    return None;
  }
  let parts: Vec<&str> = raw.split(':').filter(|part| !part.is_empty()).collect();
  if parts.len() < 3 || !parts[0].eq_ignore_ascii_case(AGENT_SCOPE_TOKEN) {
    return None;
  }
  let agent_id = parts[1].trim();
  let rest = parts[2..].join(":");
  if agent_id.is_empty() || rest.is_empty() {
    return None;
  }
  Some(AgentSessionKey {
    agent_id: agent_id.to_ascii_lowercase(),
    rest,
  })
}

pub fn classify_session_key(session_key: &str) -> SessionKeyClass {
  let raw = session_key.trim();
  if raw.is_empty() {
    return SessionKeyClass {
      is_nested: false,
      rest: String::new(),
    };
  }
  let rest = match parse_agent_session_key(raw) {
    Some(parsed) => parsed.rest,
    None => raw.to_string(),
  };
  SessionKeyClass {
    is_nested: starts_with_marker(&rest),
    rest,
  }
}

pub fn is_subagent_session_key(session_key: &str) -> bool {
  classify_session_key(session_key).is_nested
}

/// Agent id encoded in the key's scope, or [`DEFAULT_AGENT_ID`].
pub fn resolve_agent_id_from_session_key(session_key: &str) -> String {
  parse_agent_session_key(session_key)
    .map(|parsed| normalize_agent_id(&parsed.agent_id))
    .unwrap_or_else(|| DEFAULT_AGENT_ID.to_string())
}

fn starts_with_marker(value: &str) -> bool {
  value
    .get(..SUBAGENT_MARKER.len())
    .is_some_and(|prefix| prefix.eq_ignore_ascii_case(SUBAGENT_MARKER))
}
