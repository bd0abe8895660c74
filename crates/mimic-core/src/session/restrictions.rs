//! Restricted channel set.
//!
//! The set is owned by the session and only mutated through its named
//! operations. Scheduled replies hold a [`RestrictionView`] so they can re-check
//! membership at delivery time without seeing any other session state.

use std::sync::Arc;

use dashmap::DashSet;

/// Channels where neither training nor generation happens.
#[derive(Debug, Default)]
pub struct RestrictedChannels {
    channels: Arc<DashSet<String>>,
}

impl RestrictedChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `channel`. Returns false if it was already restricted.
    pub fn insert(&mut self, channel: &str) -> bool {
        self.channels.insert(channel.to_string())
    }

    /// Remove `channel`. Returns false if it was not restricted.
    pub fn remove(&mut self, channel: &str) -> bool {
        self.channels.remove(channel).is_some()
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.channels.contains(channel)
    }

    /// Restricted channels in sorted order.
    pub fn sorted(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.channels.iter().map(|c| c.key().clone()).collect();
        channels.sort();
        channels
    }

    /// A read-only handle that observes later changes.
    pub fn view(&self) -> RestrictionView {
        RestrictionView {
            channels: Arc::clone(&self.channels),
        }
    }
}

/// Read-only, cloneable view of the live restricted-channel set.
#[derive(Debug, Clone, Default)]
pub struct RestrictionView {
    channels: Arc<DashSet<String>>,
}

impl RestrictionView {
    pub fn contains(&self, channel: &str) -> bool {
        self.channels.contains(channel)
    }
}
