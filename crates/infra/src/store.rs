//! In-memory principal store.
//!
//! Intended for tests/dev. Not optimized for performance.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use pitline_auth::{CredentialStore, PrincipalRecord, PrincipalStore};
use pitline_core::UserId;

/// In-memory implementation of the principal/credential store collaborators.
///
/// Keeps one record per subject plus an email index; reads clone, so
/// concurrent lookups never observe partial writes.
#[derive(Debug, Default)]
pub struct InMemoryPrincipalStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    by_id: HashMap<UserId, PrincipalRecord>,
    by_email: HashMap<String, UserId>,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing registration. Test helper.
    ///
    /// Replaces any existing record with the same id; the email index is
    /// updated accordingly.
    pub fn seed(&self, record: PrincipalRecord) {
        let mut inner = self.inner.write().expect("store lock poisoned");
        if let Some(previous) = inner.by_id.get(&record.id) {
            let stale = previous.email.clone();
            inner.by_email.remove(&stale);
        }
        inner.by_email.insert(record.email.clone(), record.id);
        inner.by_id.insert(record.id, record);
    }

    /// Mutate a seeded record in place. Test helper.
    pub fn update<F>(&self, subject: UserId, f: F) -> bool
    where
        F: FnOnce(&mut PrincipalRecord),
    {
        let mut inner = self.inner.write().expect("store lock poisoned");
        match inner.by_id.get_mut(&subject) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl PrincipalStore for InMemoryPrincipalStore {
    async fn find_principal(&self, subject: UserId) -> anyhow::Result<Option<PrincipalRecord>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        Ok(inner.by_id.get(&subject).cloned())
    }
}

#[async_trait]
impl CredentialStore for InMemoryPrincipalStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<PrincipalRecord>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.by_id.get(id))
            .cloned())
    }

    async fn insert_principal(&self, record: PrincipalRecord) -> anyhow::Result<bool> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        if inner.by_email.contains_key(&record.email) {
            return Ok(false);
        }
        inner.by_email.insert(record.email.clone(), record.id);
        inner.by_id.insert(record.id, record);
        Ok(true)
    }
}
