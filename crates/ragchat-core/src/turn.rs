use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One committed message.  Fields are private: a turn cannot change after
/// it has been appended to a [`ConversationLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    text: String,
    sources: Vec<String>,
    created_at: DateTime<Utc>,
}

impl Turn {
    pub(crate) fn new(role: Role, text: impl Into<String>, sources: Vec<String>) -> Self {
        Self { role, text: text.into(), sources, created_at: Utc::now() }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Creation time; used for display only.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Append-only, chronologically ordered transcript.
///
/// Turns are stored behind `Arc` so snapshots can share them with renderers
/// without copying text.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    turns: Vec<Arc<Turn>>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, turn: Turn) -> &Turn {
        debug_assert!(!turn.text.is_empty(), "committed turns are never empty");
        self.turns.push(Arc::new(turn));
        &self.turns[self.turns.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Turn> {
        self.turns.get(idx).map(Arc::as_ref)
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last().map(Arc::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> + '_ {
        self.turns.iter().map(Arc::as_ref)
    }

    pub(crate) fn shared(&self) -> Vec<Arc<Turn>> {
        self.turns.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order() {
        let mut log = ConversationLog::new();
        log.append(Turn::new(Role::User, "a", vec![]));
        log.append(Turn::new(Role::Assistant, "b", vec!["http://s".into()]));
        let roles: Vec<Role> = log.iter().map(Turn::role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(log.last().unwrap().sources(), ["http://s".to_string()]);
    }

    #[test]
    fn shared_turns_are_the_same_allocation() {
        let mut log = ConversationLog::new();
        log.append(Turn::new(Role::User, "a", vec![]));
        let a = log.shared();
        let b = log.shared();
        assert!(Arc::ptr_eq(&a[0], &b[0]));
    }

    #[test]
    fn timestamps_are_monotonic_across_appends() {
        let mut log = ConversationLog::new();
        log.append(Turn::new(Role::User, "a", vec![]));
        log.append(Turn::new(Role::Assistant, "b", vec![]));
        assert!(log.get(0).unwrap().created_at() <= log.get(1).unwrap().created_at());
    }

    #[test]
    fn role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }
}
