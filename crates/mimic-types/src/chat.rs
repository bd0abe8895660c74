//! Chat identities and message types for Mimic.
//!
//! These types model what the host chat adapter hands to the dispatcher
//! (inbound messages with sender identity and channel) and what the dispatcher
//! hands back (replies, possibly scheduled for later delivery).

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chat participant as known to the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Stable identifier assigned by the chat platform.
    pub id: String,
    /// Current display name (may drift over time).
    pub name: String,
}

impl UserRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A raw message observed in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub text: String,
    pub sender: UserRecord,
    pub channel: String,
}

impl InboundMessage {
    pub fn new(channel: impl Into<String>, sender: UserRecord, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender,
            channel: channel.into(),
        }
    }
}

/// Immutable snapshot of a generated reply awaiting delivery.
///
/// Captured at scheduling time so that later session changes (a new target,
/// a stop command) can never alter what a pending reply says or who it is
/// attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledReply {
    pub id: Uuid,
    /// The impersonated user whose model produced `text`.
    pub target_user_id: String,
    pub channel: String,
    pub text: String,
    pub scheduled_at: DateTime<Utc>,
    #[serde(with = "duration_millis")]
    pub delay: Duration,
}

impl ScheduledReply {
    pub fn new(
        target_user_id: impl Into<String>,
        channel: impl Into<String>,
        text: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            target_user_id: target_user_id.into(),
            channel: channel.into(),
            text: text.into(),
            scheduled_at: Utc::now(),
            delay,
        }
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_message_new() {
        let msg = InboundMessage::new("general", UserRecord::new("U1", "alice"), "hello there");
        assert_eq!(msg.channel, "general");
        assert_eq!(msg.sender.id, "U1");
        assert_eq!(msg.text, "hello there");
    }

    #[test]
    fn test_scheduled_reply_serialize() {
        let reply = ScheduledReply::new("U1", "general", "hi", Duration::from_millis(1500));
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["target_user_id"], "U1");
        assert_eq!(json["delay"], 1500);

        let parsed: ScheduledReply = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.delay, Duration::from_millis(1500));
        assert_eq!(parsed.id, reply.id);
    }
}
