//! User directory port.
//!
//! Resolves display names to user records and keeps stored names in step with
//! the identity carried on incoming messages. Implementations live in
//! mimic-infra (SQLite) or in the host chat adapter.

use mimic_types::chat::UserRecord;
use mimic_types::error::DirectoryError;

/// Result of reconciling a sender against its stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// First time this user id was seen; the record was stored.
    Created,
    /// Stored name already matched.
    Unchanged,
    /// Stored name drifted and was updated.
    Renamed { previous: String },
}

/// Trait for looking up and maintaining chat user records.
pub trait UserDirectory: Send + Sync {
    /// Fuzzy lookup by display name.
    ///
    /// A case-insensitive exact match wins outright; otherwise every user whose
    /// name starts with `name` (case-insensitive) is returned.
    fn find_by_name(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Vec<UserRecord>, DirectoryError>> + Send;

    /// Lookup by stable id.
    fn find_by_id(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserRecord>, DirectoryError>> + Send;

    /// Store `user`, updating the name if it drifted.
    fn reconcile(
        &self,
        user: &UserRecord,
    ) -> impl std::future::Future<Output = Result<Reconciled, DirectoryError>> + Send;
}

/// Apply the fuzzy name rules of [`UserDirectory::find_by_name`] to a slice.
pub fn fuzzy_match(users: &[UserRecord], name: &str) -> Vec<UserRecord> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let exact: Vec<UserRecord> = users
        .iter()
        .filter(|u| u.name.to_lowercase() == needle)
        .cloned()
        .collect();
    if !exact.is_empty() {
        return exact;
    }

    users
        .iter()
        .filter(|u| u.name.to_lowercase().starts_with(&needle))
        .cloned()
        .collect()
}
