//! `ImpersonationSession`: who is being imitated, and where imitation is off.
//!
//! Two states: idle (no target) and impersonating a target. Every mutation is
//! a named operation; the dispatcher owns the only instance.

use tracing::info;

use super::restrictions::{RestrictedChannels, RestrictionView};

/// The user currently being impersonated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub user_id: String,
    /// Display name at selection time, used for mention detection.
    pub display_name: String,
}

impl Target {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Point-in-time snapshot of the session for status reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub target: Option<Target>,
    pub restricted: Vec<String>,
}

/// Process-wide impersonation state.
#[derive(Debug, Default)]
pub struct ImpersonationSession {
    target: Option<Target>,
    /// Raw text of the last processed message (dedup guard).
    last_text: Option<String>,
    restricted: RestrictedChannels,
}

impl ImpersonationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn is_impersonating(&self) -> bool {
        self.target.is_some()
    }

    /// Switch to impersonating `target`, returning the previous target if any.
    pub fn impersonate(&mut self, target: Target) -> Option<Target> {
        info!(user_id = %target.user_id, name = %target.display_name, "impersonation started");
        self.target.replace(target)
    }

    /// Return to idle, returning the target that was being impersonated.
    pub fn stop(&mut self) -> Option<Target> {
        let previous = self.target.take();
        if let Some(target) = &previous {
            info!(user_id = %target.user_id, "impersonation stopped");
        }
        previous
    }

    /// Restrict `channel`. Returns false if it already was.
    pub fn restrict(&mut self, channel: &str) -> bool {
        let added = self.restricted.insert(channel);
        if added {
            info!(channel, "channel restricted");
        }
        added
    }

    /// Lift the restriction on `channel`. Returns false if there was none.
    pub fn unrestrict(&mut self, channel: &str) -> bool {
        let removed = self.restricted.remove(channel);
        if removed {
            info!(channel, "channel unrestricted");
        }
        removed
    }

    pub fn is_restricted(&self, channel: &str) -> bool {
        self.restricted.contains(channel)
    }

    pub fn restricted_channels(&self) -> Vec<String> {
        self.restricted.sorted()
    }

    pub fn restriction_view(&self) -> RestrictionView {
        self.restricted.view()
    }

    /// Whether `text` is identical to the last processed message.
    pub fn is_repeat(&self, text: &str) -> bool {
        self.last_text.as_deref() == Some(text)
    }

    /// Remember `text` as the last processed message.
    pub fn record_text(&mut self, text: &str) {
        self.last_text = Some(text.to_string());
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            target: self.target.clone(),
            restricted: self.restricted_channels(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let session = ImpersonationSession::new();
        assert!(!session.is_impersonating());
        assert!(session.target().is_none());
        assert_eq!(
            session.status(),
            SessionStatus {
                target: None,
                restricted: Vec::new()
            }
        );
    }

    #[test]
    fn test_impersonate_then_stop() {
        let mut session = ImpersonationSession::new();
        assert_eq!(session.impersonate(Target::new("U1", "alice")), None);
        assert!(session.is_impersonating());

        let previous = session.impersonate(Target::new("U2", "bob"));
        assert_eq!(previous, Some(Target::new("U1", "alice")));

        assert_eq!(session.stop(), Some(Target::new("U2", "bob")));
        assert!(!session.is_impersonating());
        assert_eq!(session.stop(), None);
    }

    #[test]
    fn test_restrict_unrestrict_roundtrip() {
        let mut session = ImpersonationSession::new();
        session.restrict("ops");

        assert!(session.restrict("general"));
        assert!(session.unrestrict("general"));
        assert_eq!(session.restricted_channels(), vec!["ops"]);

        assert!(!session.unrestrict("general"));
        assert!(!session.restrict("ops"));
        assert_eq!(session.restricted_channels(), vec!["ops"]);
    }

    #[test]
    fn test_dedup_guard() {
        let mut session = ImpersonationSession::new();
        assert!(!session.is_repeat("hello"));
        session.record_text("hello");
        assert!(session.is_repeat("hello"));
        assert!(!session.is_repeat("hello!"));
        session.record_text("other");
        assert!(!session.is_repeat("hello"));
    }

    #[test]
    fn test_restriction_view_tracks_session() {
        let mut session = ImpersonationSession::new();
        let view = session.restriction_view();
        session.restrict("general");
        assert!(view.contains("general"));
    }
}
