//! Delayed, cancellable delivery of generated replies.
//!
//! Each scheduled reply is an immutable [`ScheduledReply`] snapshot running in
//! its own task. A reply goes out only if, when its delay elapses:
//! - it has not been cancelled (channel restricted, session stopped, target
//!   changed), and
//! - its channel is not restricted at that moment.

use std::sync::Arc;

use dashmap::DashMap;
use mimic_types::chat::ScheduledReply;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::outbound::MessageSink;
use crate::session::RestrictionView;

/// What happened to a scheduled reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Cancelled,
    /// The channel was restricted by the time the delay elapsed.
    Restricted,
    Failed,
}

struct PendingReply {
    target_user_id: String,
    channel: String,
    cancel: CancellationToken,
}

/// Runs scheduled replies and tracks the ones still pending.
pub struct ReplyScheduler<S> {
    sink: Arc<S>,
    restrictions: RestrictionView,
    pending: Arc<DashMap<Uuid, PendingReply>>,
}

impl<S: MessageSink> ReplyScheduler<S> {
    pub fn new(sink: Arc<S>, restrictions: RestrictionView) -> Self {
        Self {
            sink,
            restrictions,
            pending: Arc::new(DashMap::new()),
        }
    }

    /// Spawn delivery of `reply` after `reply.delay`.
    pub fn schedule(&self, reply: ScheduledReply) -> JoinHandle<DeliveryOutcome> {
        let cancel = CancellationToken::new();
        self.pending.insert(
            reply.id,
            PendingReply {
                target_user_id: reply.target_user_id.clone(),
                channel: reply.channel.clone(),
                cancel: cancel.clone(),
            },
        );
        debug!(reply_id = %reply.id, channel = %reply.channel, delay = ?reply.delay, "reply scheduled");

        let sink = Arc::clone(&self.sink);
        let restrictions = self.restrictions.clone();
        let pending = Arc::clone(&self.pending);

        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => DeliveryOutcome::Cancelled,
                _ = tokio::time::sleep(reply.delay) => {
                    deliver(sink.as_ref(), &restrictions, &reply).await
                }
            };
            pending.remove(&reply.id);
            debug!(reply_id = %reply.id, ?outcome, "scheduled reply finished");
            outcome
        })
    }

    /// Cancel every pending reply headed for `channel`.
    pub fn cancel_channel(&self, channel: &str) -> usize {
        self.cancel_where(|p| p.channel == channel)
    }

    /// Cancel every pending reply generated from `user_id`'s model.
    pub fn cancel_target(&self, user_id: &str) -> usize {
        self.cancel_where(|p| p.target_user_id == user_id)
    }

    /// Cancel every pending reply.
    pub fn cancel_all(&self) -> usize {
        self.cancel_where(|_| true)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn cancel_where(&self, matches: impl Fn(&PendingReply) -> bool) -> usize {
        let mut cancelled = 0;
        self.pending.retain(|_, p| {
            if matches(p) {
                p.cancel.cancel();
                cancelled += 1;
                false
            } else {
                true
            }
        });
        if cancelled > 0 {
            debug!(cancelled, "pending replies cancelled");
        }
        cancelled
    }
}

async fn deliver<S: MessageSink>(
    sink: &S,
    restrictions: &RestrictionView,
    reply: &ScheduledReply,
) -> DeliveryOutcome {
    if restrictions.contains(&reply.channel) {
        debug!(reply_id = %reply.id, channel = %reply.channel, "channel restricted, dropping reply");
        return DeliveryOutcome::Restricted;
    }
    match sink.send(&reply.channel, &reply.text).await {
        Ok(()) => DeliveryOutcome::Delivered,
        Err(e) => {
            warn!(reply_id = %reply.id, channel = %reply.channel, error = %e, "failed to deliver reply");
            DeliveryOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::session::RestrictedChannels;
    use crate::testing::RecordingSink;

    fn reply(target: &str, channel: &str, secs: u64) -> ScheduledReply {
        ScheduledReply::new(target, channel, "generated words", Duration::from_secs(secs))
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivers_after_delay() {
        let sink = Arc::new(RecordingSink::default());
        let scheduler = ReplyScheduler::new(Arc::clone(&sink), RestrictedChannels::new().view());

        let handle = scheduler.schedule(reply("U1", "general", 3));
        assert_eq!(scheduler.pending_count(), 1);

        assert_eq!(handle.await.unwrap(), DeliveryOutcome::Delivered);
        assert_eq!(
            sink.sent(),
            vec![("general".to_string(), "generated words".to_string())]
        );
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restriction_at_delivery_time_drops_reply() {
        let sink = Arc::new(RecordingSink::default());
        let mut restricted = RestrictedChannels::new();
        let scheduler = ReplyScheduler::new(Arc::clone(&sink), restricted.view());

        let handle = scheduler.schedule(reply("U1", "general", 5));
        restricted.insert("general");

        assert_eq!(handle.await.unwrap(), DeliveryOutcome::Restricted);
        assert!(sink.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_by_channel_and_target() {
        let sink = Arc::new(RecordingSink::default());
        let scheduler = ReplyScheduler::new(Arc::clone(&sink), RestrictedChannels::new().view());

        let a = scheduler.schedule(reply("U1", "general", 5));
        let b = scheduler.schedule(reply("U2", "random", 5));
        let c = scheduler.schedule(reply("U1", "random", 5));

        assert_eq!(scheduler.cancel_channel("general"), 1);
        assert_eq!(scheduler.cancel_target("U1"), 1);
        assert_eq!(scheduler.pending_count(), 1);

        assert_eq!(a.await.unwrap(), DeliveryOutcome::Cancelled);
        assert_eq!(c.await.unwrap(), DeliveryOutcome::Cancelled);
        assert_eq!(b.await.unwrap(), DeliveryOutcome::Delivered);
        assert_eq!(
            sink.sent(),
            vec![("random".to_string(), "generated words".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_and_failed_send() {
        let sink = Arc::new(RecordingSink::default());
        let scheduler = ReplyScheduler::new(Arc::clone(&sink), RestrictedChannels::new().view());

        let first = scheduler.schedule(reply("U1", "general", 5));
        assert_eq!(scheduler.cancel_all(), 1);
        assert_eq!(first.await.unwrap(), DeliveryOutcome::Cancelled);

        sink.fail.store(true, Ordering::SeqCst);
        let second = scheduler.schedule(reply("U1", "general", 1));
        assert_eq!(second.await.unwrap(), DeliveryOutcome::Failed);
    }
}
