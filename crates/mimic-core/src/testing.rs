//! In-memory port implementations shared by the unit tests in this crate.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use mimic_types::chat::UserRecord;
use mimic_types::error::{DeliveryError, DirectoryError, RepositoryError};
use mimic_types::storage::KvEntry;

use crate::directory::{fuzzy_match, Reconciled, UserDirectory};
use crate::outbound::MessageSink;
use crate::storage::KvStore;

/// Map-backed `KvStore` that can be told to fail reads or writes.
#[derive(Default)]
pub struct MemoryKvStore {
    values: Mutex<BTreeMap<String, serde_json::Value>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, value: serde_json::Value) {
        self.values.lock().unwrap().insert(key.to_string(), value);
    }

    pub fn value(&self, key: &str) -> Option<serde_json::Value> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        self.insert(key, value.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, RepositoryError> {
        Ok(self
            .values
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn get_entry(&self, key: &str) -> Result<Option<KvEntry>, RepositoryError> {
        Ok(self.value(key).map(|value| KvEntry {
            key: key.to_string(),
            value,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }))
    }
}

/// Vec-backed `UserDirectory`.
#[derive(Default)]
pub struct MemoryDirectory {
    users: Mutex<Vec<UserRecord>>,
    pub unavailable: AtomicBool,
}

impl MemoryDirectory {
    pub fn with_users(users: &[(&str, &str)]) -> Self {
        let users = users
            .iter()
            .map(|(id, name)| UserRecord::new(*id, *name))
            .collect();
        Self {
            users: Mutex::new(users),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn remove(&self, id: &str) {
        self.users.lock().unwrap().retain(|u| u.id != id);
    }

    pub fn name_of(&self, id: &str) -> Option<String> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.name.clone())
    }

    fn check(&self) -> Result<(), DirectoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable("test directory offline".to_string()));
        }
        Ok(())
    }
}

impl UserDirectory for MemoryDirectory {
    async fn find_by_name(&self, name: &str) -> Result<Vec<UserRecord>, DirectoryError> {
        self.check()?;
        Ok(fuzzy_match(&self.users.lock().unwrap(), name))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, DirectoryError> {
        self.check()?;
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn reconcile(&self, user: &UserRecord) -> Result<Reconciled, DirectoryError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) if existing.name == user.name => Ok(Reconciled::Unchanged),
            Some(existing) => {
                let previous = std::mem::replace(&mut existing.name, user.name.clone());
                Ok(Reconciled::Renamed { previous })
            }
            None => {
                users.push(user.clone());
                Ok(Reconciled::Created)
            }
        }
    }
}

/// `MessageSink` that records every send.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

impl RecordingSink {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl MessageSink for RecordingSink {
    async fn send(&self, channel: &str, text: &str) -> Result<(), DeliveryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::SendFailed("test sink refused".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel.to_string(), text.to_string()));
        Ok(())
    }
}
