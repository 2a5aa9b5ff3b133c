use std::collections::HashSet;

use lineage_protocol::SessionStore;
use tracing::{debug, warn};

use crate::agent::ABSOLUTE_MAX_SPAWN_DEPTH;

use super::key::is_subagent_session_key;

/// Nesting depth of `session_key`.
///
/// Top-level keys are depth 0. A nested key whose ancestry cannot be read
/// (no store, or no record) is assumed to be a direct child at depth 1. A
/// cached `spawnDepth` on the record wins over traversal. Otherwise the
/// `spawnedBy` chain is walked until it reaches a top-level parent, a
/// missing record, a key seen before, or [`ABSOLUTE_MAX_SPAWN_DEPTH`].
///
/// Always returns a value in `[0, ABSOLUTE_MAX_SPAWN_DEPTH]` and never fails
/// on malformed ancestry.
pub fn compute_spawn_depth(session_key: &str, store: Option<&dyn SessionStore>) -> u32 {
  let key = session_key.trim();
  if !is_subagent_session_key(key) {
    return 0;
  }
  let Some(store) = store else {
    return 1;
  };
  let Some(record) = store.get_record(key) else {
    debug!(session_key = key, "no session record, assuming direct child");
    return 1;
  };
  if let Some(cached) = record.spawn_depth.filter(|depth| *depth > 0) {
    return cached.min(ABSOLUTE_MAX_SPAWN_DEPTH);
  }

  let mut depth = 1;
  let mut visited: HashSet<&str> = HashSet::from([key]);
  let mut parent = record.spawned_by.as_deref();

  while let Some(parent_key) = parent.map(str::trim).filter(|k| !k.is_empty()) {
    if depth >= ABSOLUTE_MAX_SPAWN_DEPTH {
      warn!(
        session_key = key,
        depth, "spawn ancestry truncated at absolute depth limit"
      );
      break;
    }
    if !visited.insert(parent_key) {
      warn!(
        session_key = key,
        parent_key, depth, "cycle in spawn ancestry"
      );
      break;
    }
    if !is_subagent_session_key(parent_key) {
      break;
    }
    depth += 1;
    parent = store
      .get_record(parent_key)
      .and_then(|record| record.spawned_by.as_deref());
  }

  debug!(session_key = key, depth, "resolved spawn depth from ancestry");
  depth
}

#[cfg(test)]
mod tests {
  use super::*;
  use lineage_protocol::{SessionRecord, SessionSnapshot};
  use pretty_assertions::assert_eq;

  fn store(entries: &[(&str, SessionRecord)]) -> SessionSnapshot {
    entries
      .iter()
      .map(|(key, record)| (key.to_string(), record.clone()))
      .collect()
  }

  fn child_of(parent: &str) -> SessionRecord {
    SessionRecord::new("sid").with_spawned_by(parent)
  }

  #[test]
  fn top_level_keys_are_depth_zero() {
    let store = store(&[]);
    for key in ["", "  ", "agent:main:main", "main", "agent:main:cron:job"] {
      assert_eq!(compute_spawn_depth(key, None), 0, "{key:?}");
      assert_eq!(compute_spawn_depth(key, Some(&store)), 0, "{key:?}");
    }
  }

  #[test]
  fn nested_key_without_ancestry_is_depth_one() {
    assert_eq!(compute_spawn_depth("agent:main:subagent:a", None), 1);
    let store = store(&[]);
    assert_eq!(compute_spawn_depth("agent:main:subagent:a", Some(&store)), 1);
  }

  #[test]
  fn walks_chain_to_top_level() {
    let store = store(&[
      ("agent:main:subagent:c", child_of("agent:main:subagent:b")),
      ("agent:main:subagent:b", child_of("agent:main:subagent:a")),
      ("agent:main:subagent:a", child_of("agent:main:main")),
    ]);
    assert_eq!(compute_spawn_depth("agent:main:subagent:c", Some(&store)), 3);
    assert_eq!(compute_spawn_depth("agent:main:subagent:b", Some(&store)), 2);
    assert_eq!(compute_spawn_depth("agent:main:subagent:a", Some(&store)), 1);
  }

  #[test]
  fn missing_parent_record_ends_traversal() {
    let store = store(&[("agent:main:subagent:b", child_of("agent:main:subagent:a"))]);
    assert_eq!(compute_spawn_depth("agent:main:subagent:b", Some(&store)), 2);
  }

  #[test]
  fn cached_depth_short_circuits() {
    let store = store(&[
      (
        "agent:main:subagent:b",
        child_of("agent:main:subagent:a").with_spawn_depth(4),
      ),
      ("agent:main:subagent:a", child_of("agent:main:main")),
    ]);
    assert_eq!(compute_spawn_depth("agent:main:subagent:b", Some(&store)), 4);
  }

  #[test]
  fn zero_cached_depth_falls_back_to_traversal() {
    let store = store(&[
      (
        "agent:main:subagent:b",
        child_of("agent:main:subagent:a").with_spawn_depth(0),
      ),
      ("agent:main:subagent:a", child_of("agent:main:main")),
    ]);
    assert_eq!(compute_spawn_depth("agent:main:subagent:b", Some(&store)), 2);
  }

  #[test]
  fn oversized_cached_depth_is_clamped() {
    let store = store(&[(
      "agent:main:subagent:a",
      SessionRecord::new("sid").with_spawn_depth(500),
    )]);
    assert_eq!(
      compute_spawn_depth("agent:main:subagent:a", Some(&store)),
      ABSOLUTE_MAX_SPAWN_DEPTH
    );
  }

  #[test]
  fn mutual_cycle_terminates() {
    let store = store(&[
      ("agent:main:subagent:a", child_of("agent:main:subagent:b")),
      ("agent:main:subagent:b", child_of("agent:main:subagent:a")),
    ]);
    assert_eq!(compute_spawn_depth("agent:main:subagent:a", Some(&store)), 2);
  }

  #[test]
  fn self_reference_terminates() {
    let store = store(&[("agent:main:subagent:a", child_of("agent:main:subagent:a"))]);
    assert_eq!(compute_spawn_depth("agent:main:subagent:a", Some(&store)), 1);
  }

  #[test]
  fn long_chain_stops_at_absolute_limit() {
    let entries: Vec<(String, SessionRecord)> = (0..50)
      .map(|i| {
        (
          format!("agent:main:subagent:{i}"),
          child_of(&format!("agent:main:subagent:{}", i + 1)),
        )
      })
      .collect();
    let store: SessionSnapshot = entries.into_iter().collect();
    assert_eq!(
      compute_spawn_depth("agent:main:subagent:0", Some(&store)),
      ABSOLUTE_MAX_SPAWN_DEPTH
    );
  }

  #[test]
  fn key_is_trimmed_before_lookup() {
    let store = store(&[
      ("agent:main:subagent:b", child_of("agent:main:subagent:a")),
      ("agent:main:subagent:a", child_of("agent:main:main")),
    ]);
    assert_eq!(
      compute_spawn_depth("  agent:main:subagent:b\n", Some(&store)),
      2
    );
  }
}
