//! Set of session identifiers seen on authenticated requests.

use dashmap::DashSet;

/// Bearer tokens observed since process start. Entries are never evicted,
/// so the exported size is a cumulative count of distinct sessions.
#[derive(Debug, Default)]
pub struct ActiveUsers {
    sessions: DashSet<String>,
}

impl ActiveUsers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a session. Returns true if it had not been seen before.
    pub fn observe(&self, token: &str) -> bool {
        if self.sessions.contains(token) {
            return false;
        }
        self.sessions.insert(token.to_string())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
