//! Operator commands and the user-visible notices they produce.
//!
//! Commands arrive already parsed from the host chat adapter. Each maps to one
//! session operation; the resulting [`Notice`] is what gets said back in the
//! channel.

use std::fmt;

/// A parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start impersonating the user with this (possibly partial) name.
    Impersonate { name: String },
    /// Stop impersonating.
    Stop,
    /// Report who is being impersonated and where imitation is off.
    Status,
    /// Disallow training and generation in the invoking channel.
    Restrict,
    /// Allow training and generation in the invoking channel again.
    Unrestrict,
}

/// Outcome of a command, rendered as the bot's reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Impersonating { name: String },
    SelfImpersonation,
    UnknownUser { name: String },
    AmbiguousUser { name: String, candidates: Vec<String> },
    /// The configured mode does not generate replies.
    RespondDisabled,
    Stopped,
    /// Stopped, but the target no longer resolves to a known user.
    StoppedUnknown,
    NotImpersonating,
    Status {
        /// Display name of the target, if impersonating.
        target: Option<String>,
        restricted: Vec<String>,
    },
    Restricted { channels: Vec<String> },
    AlreadyRestricted,
    Unrestricted { channel: String },
    AlreadyAllowed,
}

/// Status phrasing when the target no longer resolves.
pub const UNKNOWN_USER: &str = "an unknown user";

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Impersonating { name } => write!(f, "Alright, I'll impersonate {name}."),
            Notice::SelfImpersonation => write!(f, "Impersonating myself? How meta."),
            Notice::UnknownUser { name } => {
                write!(f, "I don't know anyone by the name of {name}.")
            }
            Notice::AmbiguousUser { name, candidates } => write!(
                f,
                "More than one person goes by {name}: {}. Be more specific.",
                candidates.join(", ")
            ),
            Notice::RespondDisabled => {
                write!(f, "I'm only listening right now, so I can't impersonate anyone.")
            }
            Notice::Stopped => write!(f, "Fine, I'll shut up now."),
            Notice::StoppedUnknown => write!(
                f,
                "I don't recognize that user, but I've stopped impersonating anyway."
            ),
            Notice::NotImpersonating => write!(f, "I wasn't impersonating anyone to begin with."),
            Notice::Status { target, restricted } => {
                match target {
                    Some(name) => write!(f, "I am impersonating {name}")?,
                    None => write!(f, "I'm not impersonating anyone")?,
                }
                if !restricted.is_empty() {
                    write!(f, ", and I am restricted from {}", restricted.join(", "))?;
                }
                write!(f, ".")
            }
            Notice::Restricted { channels } => {
                write!(f, "I am now restricted from {}.", channels.join(", "))
            }
            Notice::AlreadyRestricted => write!(f, "I'm already restricted here. Yeesh."),
            Notice::Unrestricted { channel } => {
                write!(f, "I am now allowed to impersonate in {channel}.")
            }
            Notice::AlreadyAllowed => write!(f, "I'm already allowed to impersonate in here."),
        }
    }
}
