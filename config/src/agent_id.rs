// Agent Ids
// Canonical form shared by config lookup and override targeting

/// Agent id used when a key carries no agent scope or an id normalizes to
/// nothing.
pub const DEFAULT_AGENT_ID: &str = "main";

const MAX_AGENT_ID_LEN: usize = 64;

/// Canonical form of an agent id: lower-case, `[a-z0-9_-]` only, no
/// leading or trailing dashes, at most 64 characters.
pub fn normalize_agent_id(agent_id: &str) -> String {
  let trimmed = agent_id.trim();
  if trimmed.is_empty() {
    return DEFAULT_AGENT_ID.to_string();
  }
  if is_valid_agent_id(trimmed) {
    return trimmed.to_ascii_lowercase();
  }

  let mut normalized = String::with_capacity(trimmed.len());
  let mut in_invalid_run = false;
  for ch in trimmed.chars().flat_map(char::to_lowercase) {
    if is_agent_id_char(ch) {
      normalized.push(ch);
      in_invalid_run = false;
    } else if !in_invalid_run {
      normalized.push('-');
      in_invalid_run = true;
    }
  }
  let normalized: String = normalized
    .trim_matches('-')
    .chars()
    .take(MAX_AGENT_ID_LEN)
    .collect();
  if normalized.is_empty() {
    DEFAULT_AGENT_ID.to_string()
  } else {
    normalized
  }
}

/// True when both ids name the same agent.
pub fn same_agent_id(a: &str, b: &str) -> bool {
  normalize_agent_id(a) == normalize_agent_id(b)
}

fn is_valid_agent_id(id: &str) -> bool {
  let mut chars = id.chars();
  let Some(first) = chars.next() else {
    return false;
  };
  first.is_ascii_alphanumeric()
    && id.len() <= MAX_AGENT_ID_LEN
    && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

fn is_agent_id_char(ch: char) -> bool {
  ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-'
}
