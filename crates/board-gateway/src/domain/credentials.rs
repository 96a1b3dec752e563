//! Credential Store - maps client-chosen keys to shared secrets.
//!
//! Credentials are immutable once registered. There is no deletion or
//! rotation path.

use crate::domain::error::StoreError;
use crate::domain::types::{Credential, SharedSecret};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// In-memory credential store, one per process.
#[derive(Default)]
pub struct CredentialStore {
    credentials: RwLock<HashMap<String, Credential>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` with `secret`.
    ///
    /// The secret is accepted as given, without any strength check.
    pub fn register(&self, key: &str, secret: SharedSecret) -> Result<(), StoreError> {
        let mut credentials = self.credentials.write();
        if credentials.contains_key(key) {
            debug!(key = key, "Credential registration rejected: key exists");
            return Err(StoreError::AlreadyExists(key.to_string()));
        }

        credentials.insert(
            key.to_string(),
            Credential {
                shared_secret: secret,
            },
        );
        debug!(key = key, "Registered credential");
        Ok(())
    }

    /// Secret registered under `key`
    pub fn lookup(&self, key: &str) -> Result<SharedSecret, StoreError> {
        self.credentials
            .read()
            .get(key)
            .map(|c| c.shared_secret.clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    /// Every credential, secrets included, ordered by key.
    ///
    /// INSECURE: this exists only to back the `GET /credentials` debug dump.
    pub fn list_all(&self) -> BTreeMap<String, Credential> {
        self.credentials
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Number of registered credentials
    pub fn len(&self) -> usize {
        self.credentials.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
