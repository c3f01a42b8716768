// In-memory session store: one mutable draft per chat session.
//
// Sessions live for the lifetime of the process only; persistence across
// restarts is out of scope.

use std::collections::HashMap;

use serde_json::{Map, Value};
use uuid::Uuid;

/// Per-session state. The draft is kept as a raw JSON object — the shape the
/// extractor patches against — and decoded into a typed record per turn.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub draft: Value,
}

impl SessionState {
    fn new() -> Self {
        Self {
            draft: Value::Object(Map::new()),
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a session id: reuse the supplied one (creating state for it on
    /// first sight), or mint a fresh UUIDv4 when none was given.
    pub fn get_or_create(&mut self, session_id: Option<&str>) -> String {
        let id = match session_id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };
        self.sessions.entry(id.clone()).or_insert_with(SessionState::new);
        id
    }

    pub fn draft(&self, session_id: &str) -> Option<&Value> {
        self.sessions.get(session_id).map(|s| &s.draft)
    }

    pub fn draft_mut(&mut self, session_id: &str) -> Option<&mut Value> {
        self.sessions.get_mut(session_id).map(|s| &mut s.draft)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_store_is_empty() {
        let store = SessionStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn missing_id_mints_a_uuid() {
        let mut store = SessionStore::new();
        let id = store.get_or_create(None);
        assert_eq!(id.len(), 36);
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn fresh_session_starts_with_empty_draft() {
        let mut store = SessionStore::new();
        let id = store.get_or_create(None);
        assert_eq!(store.draft(&id), Some(&json!({})));
    }

    #[test]
    fn supplied_id_is_reused() {
        let mut store = SessionStore::new();
        let first = store.get_or_create(Some("session-abc"));
        assert_eq!(first, "session-abc");

        if let Some(draft) = store.draft_mut(&first) {
            *draft = json!({ "name": "Expo" });
        }

        // Same id on the next turn: same state, no new session.
        let second = store.get_or_create(Some("session-abc"));
        assert_eq!(second, "session-abc");
        assert_eq!(store.len(), 1);
        assert_eq!(store.draft(&second), Some(&json!({ "name": "Expo" })));
    }

    #[test]
    fn empty_string_id_counts_as_missing() {
        let mut store = SessionStore::new();
        let id = store.get_or_create(Some(""));
        assert_ne!(id, "");
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn unknown_id_starts_a_new_session_under_that_id() {
        let mut store = SessionStore::new();
        let id = store.get_or_create(Some("never-seen-before"));
        assert_eq!(id, "never-seen-before");
        assert_eq!(store.draft(&id), Some(&json!({})));
    }

    #[test]
    fn distinct_calls_without_id_make_distinct_sessions() {
        let mut store = SessionStore::new();
        let a = store.get_or_create(None);
        let b = store.get_or_create(None);
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn drafts_are_isolated_between_sessions() {
        let mut store = SessionStore::new();
        let a = store.get_or_create(Some("a"));
        let b = store.get_or_create(Some("b"));

        if let Some(draft) = store.draft_mut(&a) {
            *draft = json!({ "name": "A's Event" });
        }

        assert_eq!(store.draft(&b), Some(&json!({})));
    }
}
