//! Per-session flags that outlive a single pass.
//!
//! Currently one flag: planning disabled after the planner exhausted its
//! attempts. It is sticky for the life of the registry unless the host
//! explicitly resets the session.

use dashmap::DashMap;
use tracing::info;

use helm_core::ids::SessionId;

#[derive(Clone, Copy, Debug, Default)]
struct SessionFlags {
    planning_disabled: bool,
}

/// Concurrent map of session flags.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, SessionFlags>,
}

impl SessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether planning has been disabled for `session`.
    pub fn is_planning_disabled(&self, session: &SessionId) -> bool {
        self.sessions
            .get(session)
            .is_some_and(|flags| flags.planning_disabled)
    }

    /// Disable planning for `session`. Returns `true` only the first time.
    pub fn disable_planning(&self, session: &SessionId) -> bool {
        let mut flags = self.sessions.entry(session.clone()).or_default();
        let newly = !flags.planning_disabled;
        flags.planning_disabled = true;
        if newly {
            info!(session_id = %session, "planning disabled for session");
        }
        newly
    }

    /// Forget every flag for `session`.
    pub fn reset(&self, session: &SessionId) {
        let _ = self.sessions.remove(session);
    }

    /// Number of sessions with flags.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session has flags.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
