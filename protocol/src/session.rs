// Session Records
// Read-only view of the runtime's session store

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// One entry of the runtime's session store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
  /// Identifier of the underlying execution session (not the session key).
  #[serde(default)]
  pub session_id: String,
  /// Last write, epoch milliseconds.
  #[serde(default)]
  pub updated_at: i64,
  /// Cached nesting depth written by whoever spawned the session. Values
  /// that are not a non-negative integer read as absent.
  #[serde(
    default,
    deserialize_with = "lenient_depth",
    skip_serializing_if = "Option::is_none"
  )]
  pub spawn_depth: Option<u32>,
  /// Session key of the parent session.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub spawned_by: Option<String>,
}

impl SessionRecord {
  pub fn new(session_id: impl Into<String>) -> Self {
    Self {
      session_id: session_id.into(),
      ..Self::default()
    }
  }

  pub fn with_spawned_by(mut self, parent_key: impl Into<String>) -> Self {
    self.spawned_by = Some(parent_key.into());
    self
  }

  pub fn with_spawn_depth(mut self, depth: u32) -> Self {
    self.spawn_depth = Some(depth);
    self
  }
}

/// Lookup seam over whatever map the runtime keeps its records in.
///
/// Implementations must behave as an immutable snapshot for the duration of
/// a single call into the kernel.
pub trait SessionStore {
  fn get_record(&self, session_key: &str) -> Option<&SessionRecord>;
}

impl<S: BuildHasher> SessionStore for HashMap<String, SessionRecord, S> {
  fn get_record(&self, session_key: &str) -> Option<&SessionRecord> {
    self.get(session_key)
  }
}

impl SessionStore for BTreeMap<String, SessionRecord> {
  fn get_record(&self, session_key: &str) -> Option<&SessionRecord> {
    self.get(session_key)
  }
}

/// Owned snapshot, as produced by [`load_session_store`].
pub type SessionSnapshot = BTreeMap<String, SessionRecord>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("session store is not valid JSON: {0}")]
  Parse(#[from] serde_json::Error),
}

/// Parse a JSON object mapping session keys to records.
///
/// Only a document that is not a JSON object is an error. Records that fail
/// to decode are skipped, which leaves their keys looking like sessions
/// with no stored ancestry.
pub fn load_session_store(json: &str) -> Result<SessionSnapshot, StoreError> {
  let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;
  let mut snapshot = SessionSnapshot::new();
  for (session_key, value) in raw {
    match serde_json::from_value::<SessionRecord>(value) {
      Ok(record) => {
        snapshot.insert(session_key, record);
      }
      Err(err) => {
        warn!(session_key = %session_key, error = %err, "skipping undecodable session record");
      }
    }
  }
  Ok(snapshot)
}

fn lenient_depth<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<serde_json::Value>::deserialize(deserializer)?;
  Ok(
    value
      .as_ref()
      .and_then(serde_json::Value::as_u64)
      .and_then(|depth| u32::try_from(depth).ok()),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn loads_camel_case_records() {
    let store = load_session_store(
      r#"{
        "agent:main:subagent:a": {
          "sessionId": "s-1",
          "updatedAt": 1700000000000,
          "spawnDepth": 2,
          "spawnedBy": "agent:main:main"
        },
        "agent:main:main": { "sessionId": "s-0" }
      }"#,
    )
    .expect("parse store");

    assert_eq!(
      store.get_record("agent:main:subagent:a"),
      Some(
        &SessionRecord::new("s-1")
          .with_spawn_depth(2)
          .with_spawned_by("agent:main:main")
          .with_updated_at(1_700_000_000_000)
      )
    );
    assert_eq!(store.get_record("agent:main:main"), Some(&SessionRecord::new("s-0")));
    assert_eq!(store.get_record("missing"), None);
  }

  #[test]
  fn rejects_non_object_store() {
    assert!(matches!(
      load_session_store("[1, 2, 3]"),
      Err(StoreError::Parse(_))
    ));
  }

  #[test]
  fn bad_records_do_not_spoil_the_snapshot() {
    let store = load_session_store(
      r#"{
        "agent:main:subagent:good": { "sessionId": "g", "spawnDepth": 2 },
        "agent:main:subagent:negative": { "spawnDepth": -1, "spawnedBy": "agent:main:subagent:good" },
        "agent:main:subagent:huge": { "sessionId": "h", "spawnDepth": 99999999999 },
        "agent:main:subagent:text": { "sessionId": "t", "spawnDepth": "3" },
        "agent:main:subagent:scalar": 42,
        "agent:main:subagent:bad-parent": { "sessionId": "p", "spawnedBy": 7 }
      }"#,
    )
    .expect("parse store");

    assert_eq!(
      store.get_record("agent:main:subagent:good"),
      Some(&SessionRecord::new("g").with_spawn_depth(2))
    );
    assert_eq!(
      store.get_record("agent:main:subagent:negative"),
      Some(&SessionRecord::new("").with_spawned_by("agent:main:subagent:good"))
    );
    assert_eq!(
      store.get_record("agent:main:subagent:huge"),
      Some(&SessionRecord::new("h"))
    );
    assert_eq!(
      store.get_record("agent:main:subagent:text"),
      Some(&SessionRecord::new("t"))
    );
    assert_eq!(store.get_record("agent:main:subagent:scalar"), None);
    assert_eq!(store.get_record("agent:main:subagent:bad-parent"), None);
    assert_eq!(store.len(), 4);
  }

  #[test]
  fn null_depth_reads_as_absent() {
    let store = load_session_store(r#"{ "k": { "sessionId": "s", "spawnDepth": null } }"#)
      .expect("parse store");
    assert_eq!(store.get_record("k"), Some(&SessionRecord::new("s")));
  }

  #[test]
  fn hash_map_is_a_store() {
    let mut map = HashMap::new();
    map.insert("k".to_string(), SessionRecord::new("s"));
    let store: &dyn SessionStore = &map;
    assert_eq!(store.get_record("k").map(|r| r.session_id.as_str()), Some("s"));
  }

  impl SessionRecord {
    fn with_updated_at(mut self, updated_at: i64) -> Self {
      self.updated_at = updated_at;
      self
    }
  }
}
