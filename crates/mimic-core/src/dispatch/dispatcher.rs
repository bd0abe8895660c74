//! `Dispatcher`: the per-message and per-command entry point.
//!
//! Inbound messages are processed one at a time (`&mut self`), in this order:
//! 1. reconcile the sender's stored display name
//! 2. drop messages in restricted channels
//! 3. drop empty messages and messages addressed to the bot
//! 4. train the sender's model (when the mode trains)
//! 5. maybe generate and deliver a reply (when the mode responds and a target
//!    is set)
//! 6. remember the text for the dedup guard

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use mimic_types::chat::{InboundMessage, ScheduledReply, UserRecord};
use mimic_types::config::ImpersonateConfig;
use mimic_types::error::DirectoryError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::addressing::{mentions, AddressBook};
use super::delay::{typing_delay, DeliveryPolicy};
use super::scheduler::ReplyScheduler;
use crate::directory::{Reconciled, UserDirectory};
use crate::markov::ModelOptions;
use crate::outbound::MessageSink;
use crate::session::command::UNKNOWN_USER;
use crate::session::{Command, ImpersonationSession, Notice, SessionStatus, Target};
use crate::storage::model_store::DEFAULT_CACHE_CAPACITY;
use crate::storage::{KvStore, ModelStore};

/// Errors that abort a command.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("user lookup failed: {0}")]
    Directory(#[from] DirectoryError),
}

/// Why a message was dropped before training or generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    RestrictedChannel,
    EmptyText,
    AddressedToBot,
}

/// What the generation half did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The mode does not respond, or nobody is being impersonated.
    Inactive,
    /// Same text as the previous message.
    Repeat,
    /// The random draw did not exceed the threshold and the target was not
    /// mentioned.
    NotDrawn { roll: u8 },
    /// The target's model produced nothing.
    Empty,
    Sent { text: String },
    Scheduled { reply_id: Uuid },
    Failed,
}

/// Result of processing one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Skipped(SkipReason),
    Processed { trained: bool, reply: ReplyOutcome },
}

/// Owns the session and model store and applies the message policy.
pub struct Dispatcher<K, D, S> {
    config: ImpersonateConfig,
    models: ModelStore<K>,
    directory: D,
    sink: Arc<S>,
    session: ImpersonationSession,
    scheduler: ReplyScheduler<S>,
    address: AddressBook,
    policy: DeliveryPolicy,
    rng: StdRng,
}

impl<K, D, S> Dispatcher<K, D, S>
where
    K: KvStore,
    D: UserDirectory,
    S: MessageSink,
{
    pub fn new(config: ImpersonateConfig, kv: K, directory: D, sink: Arc<S>) -> Self {
        let capacity =
            NonZeroUsize::new(config.model_cache_capacity).unwrap_or(DEFAULT_CACHE_CAPACITY);
        let models = ModelStore::new(kv, ModelOptions::from_config(&config), capacity);
        let session = ImpersonationSession::new();
        let scheduler = ReplyScheduler::new(Arc::clone(&sink), session.restriction_view());
        let address = AddressBook::new(&config.bot_name, &config.bot_aliases);
        let policy = DeliveryPolicy::from_config(&config);

        Self {
            config,
            models,
            directory,
            sink,
            session,
            scheduler,
            address,
            policy,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the random source (deterministic tests, reproducible runs).
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn config(&self) -> &ImpersonateConfig {
        &self.config
    }

    pub fn session(&self) -> &ImpersonationSession {
        &self.session
    }

    pub fn models(&self) -> &ModelStore<K> {
        &self.models
    }

    pub fn scheduler(&self) -> &ReplyScheduler<S> {
        &self.scheduler
    }

    /// Process one inbound message.
    pub async fn handle_message(&mut self, msg: &InboundMessage) -> DispatchOutcome {
        self.reconcile_sender(&msg.sender).await;

        if self.session.is_restricted(&msg.channel) {
            debug!(channel = %msg.channel, "message in restricted channel ignored");
            return DispatchOutcome::Skipped(SkipReason::RestrictedChannel);
        }

        let text = msg.text.as_str();
        if text.trim().is_empty() {
            self.session.record_text(text);
            return DispatchOutcome::Skipped(SkipReason::EmptyText);
        }
        if self.address.is_addressed_to_bot(text) {
            debug!(channel = %msg.channel, "message addressed to the bot ignored");
            self.session.record_text(text);
            return DispatchOutcome::Skipped(SkipReason::AddressedToBot);
        }

        let trained = if self.config.mode.trains() {
            self.train(&msg.sender.id, text).await
        } else {
            false
        };

        let reply = self.maybe_reply(msg).await;
        self.session.record_text(text);

        DispatchOutcome::Processed { trained, reply }
    }

    /// Apply an operator command issued in `channel` and say the resulting
    /// notice there.
    pub async fn handle_command(
        &mut self,
        command: Command,
        channel: &str,
    ) -> Result<Notice, DispatchError> {
        let notice = match command {
            Command::Impersonate { name } => self.select_target(&name).await?,
            Command::Stop => self.stop().await,
            Command::Status => self.status().await,
            Command::Restrict => self.restrict(channel),
            Command::Unrestrict => self.unrestrict(channel),
        };

        if let Err(e) = self.sink.send(channel, &notice.to_string()).await {
            warn!(channel, error = %e, "failed to send command notice");
        }
        Ok(notice)
    }

    async fn reconcile_sender(&self, sender: &UserRecord) {
        match self.directory.reconcile(sender).await {
            Ok(Reconciled::Renamed { previous }) => {
                info!(user_id = %sender.id, "username {previous} updated to {}", sender.name);
            }
            Ok(Reconciled::Created) => debug!(user_id = %sender.id, "new user recorded"),
            Ok(Reconciled::Unchanged) => {}
            Err(e) => warn!(user_id = %sender.id, error = %e, "failed to reconcile sender"),
        }
    }

    async fn train(&mut self, user_id: &str, text: &str) -> bool {
        match self.models.train(user_id, text).await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(user_id, error = %e, "failed to train text model");
                false
            }
        }
    }

    async fn maybe_reply(&mut self, msg: &InboundMessage) -> ReplyOutcome {
        if !self.config.mode.responds() {
            return ReplyOutcome::Inactive;
        }
        let Some(target) = self.session.target().cloned() else {
            return ReplyOutcome::Inactive;
        };
        if self.session.is_repeat(&msg.text) {
            debug!("repeated message, not replying");
            return ReplyOutcome::Repeat;
        }

        let roll: u8 = self.rng.gen_range(0..=100);
        if !draw_passes(roll, self.config.frequency_threshold)
            && !mentions(&msg.text, &target.display_name)
        {
            return ReplyOutcome::NotDrawn { roll };
        }

        let response = match self
            .models
            .respond(&target.user_id, &msg.text, &mut self.rng)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(user_id = %target.user_id, error = %e, "failed to load text model for reply");
                return ReplyOutcome::Failed;
            }
        };
        if response.is_empty() {
            debug!(user_id = %target.user_id, "model produced nothing to say");
            return ReplyOutcome::Empty;
        }

        let per_word = Duration::from_millis(self.config.response_delay_per_word_ms);
        let delay = typing_delay(response.split_whitespace().count(), per_word, &mut self.rng);

        match self.policy {
            DeliveryPolicy::Immediate => {
                debug!(?delay, "typing simulation disabled, sending immediately");
                match self.sink.send(&msg.channel, &response).await {
                    Ok(()) => ReplyOutcome::Sent { text: response },
                    Err(e) => {
                        warn!(channel = %msg.channel, error = %e, "failed to deliver reply");
                        ReplyOutcome::Failed
                    }
                }
            }
            DeliveryPolicy::SimulateTyping => {
                let reply = ScheduledReply::new(target.user_id, &msg.channel, response, delay);
                let reply_id = reply.id;
                self.scheduler.schedule(reply);
                ReplyOutcome::Scheduled { reply_id }
            }
        }
    }

    async fn select_target(&mut self, name: &str) -> Result<Notice, DispatchError> {
        if !self.config.mode.responds() {
            return Ok(Notice::RespondDisabled);
        }

        let name = name.trim();
        let name = name.strip_prefix('@').unwrap_or(name).trim();
        let mut matches = self.directory.find_by_name(name).await?;

        let user = match matches.len() {
            0 => {
                return Ok(Notice::UnknownUser {
                    name: name.to_string(),
                });
            }
            1 => matches.remove(0),
            _ => {
                return Ok(Notice::AmbiguousUser {
                    name: name.to_string(),
                    candidates: matches.into_iter().map(|u| u.name).collect(),
                });
            }
        };

        if self.address.is_bot_name(&user.name) {
            return Ok(Notice::SelfImpersonation);
        }

        let notice = Notice::Impersonating {
            name: user.name.clone(),
        };
        if let Some(previous) = self.session.impersonate(Target::new(user.id, user.name)) {
            let current = self.session.target().map(|t| t.user_id.as_str());
            if current != Some(previous.user_id.as_str()) {
                self.scheduler.cancel_target(&previous.user_id);
            }
        }
        Ok(notice)
    }

    async fn stop(&mut self) -> Notice {
        let Some(previous) = self.session.stop() else {
            return Notice::NotImpersonating;
        };
        self.scheduler.cancel_all();

        match self.directory.find_by_id(&previous.user_id).await {
            Ok(Some(_)) => Notice::Stopped,
            Ok(None) => Notice::StoppedUnknown,
            Err(e) => {
                warn!(user_id = %previous.user_id, error = %e, "failed to look up stopped target");
                Notice::StoppedUnknown
            }
        }
    }

    async fn status(&self) -> Notice {
        let SessionStatus { target, restricted } = self.session.status();
        let Some(target) = target else {
            return Notice::Status {
                target: None,
                restricted,
            };
        };

        let name = match self.directory.find_by_id(&target.user_id).await {
            Ok(Some(user)) => user.name,
            Ok(None) => UNKNOWN_USER.to_string(),
            Err(e) => {
                warn!(user_id = %target.user_id, error = %e, "failed to look up target for status");
                target.display_name
            }
        };
        Notice::Status {
            target: Some(name),
            restricted,
        }
    }

    fn restrict(&mut self, channel: &str) -> Notice {
        if !self.session.restrict(channel) {
            return Notice::AlreadyRestricted;
        }
        self.scheduler.cancel_channel(channel);
        Notice::Restricted {
            channels: self.session.restricted_channels(),
        }
    }

    fn unrestrict(&mut self, channel: &str) -> Notice {
        if self.session.unrestrict(channel) {
            Notice::Unrestricted {
                channel: channel.to_string(),
            }
        } else {
            Notice::AlreadyAllowed
        }
    }
}

/// Whether a draw from `[0, 100]` clears `threshold`. A threshold of 0 lets
/// every draw through, 100 none.
fn draw_passes(roll: u8, threshold: u8) -> bool {
    threshold == 0 || roll > threshold
}
