use thiserror::Error;

/// Errors from repository operations (used by trait definitions in mimic-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}

/// Errors related to encoding or decoding persisted text models.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to encode model: {0}")]
    Encode(String),

    #[error("failed to decode model: {0}")]
    Decode(String),
}

/// Errors from resolving or updating user records.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("user directory unavailable: {0}")]
    Unavailable(String),

    #[error("directory query error: {0}")]
    Query(String),
}

/// Errors from the outbound send primitive.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("channel '{0}' is closed")]
    ChannelClosed(String),

    #[error("send failed: {0}")]
    SendFailed(String),
}
