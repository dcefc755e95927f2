//! Process-wide "current identity" state, persisted so a restart resumes the
//! prior authenticated session without re-entering credentials. At most one
//! session exists per process: either anonymous or authenticated as one
//! account.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AuthResult;
use crate::storage::SharedStore;
use crate::tprintln;

use super::account::{Account, AccountId};
use super::registry::IdentityStore;

/// Durable marker for the active session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMarker {
    pub account_id: AccountId,
    pub session_started_at: DateTime<Utc>,
}

pub struct SessionManager {
    store: SharedStore,
    current: RwLock<Option<SessionMarker>>,
}

impl SessionManager {
    /// Starts anonymous; call `restore` once at startup to resume a persisted
    /// session.
    pub fn new(store: SharedStore) -> Self {
        Self { store, current: RwLock::new(None) }
    }

    /// The active session's account id, or none when anonymous.
    pub fn current(&self) -> Option<AccountId> {
        self.current.read().as_ref().map(|m| m.account_id.clone())
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.current.read().as_ref().map(|m| m.session_started_at)
    }

    /// Mark the session authenticated as the given account and persist the
    /// marker before returning.
    pub fn set(&self, account_id: AccountId) -> AuthResult<()> {
        let marker = SessionMarker { account_id, session_started_at: Utc::now() };
        self.store.write_collection(&self.store.session_file(), &marker)?;
        tprintln!("session.set user={} at={}", marker.account_id, marker.session_started_at);
        *self.current.write() = Some(marker);
        Ok(())
    }

    /// Mark the session anonymous and remove the persisted marker.
    pub fn clear(&self) -> AuthResult<()> {
        self.store.remove_collection(&self.store.session_file())?;
        *self.current.write() = None;
        Ok(())
    }

    /// Resolve the persisted marker against the registry at process start.
    /// A missing, unreadable or dangling marker degrades to anonymous and the
    /// stale marker file is removed; restoration never fails startup.
    pub fn restore(&self, registry: &IdentityStore) -> Option<Account> {
        let path = self.store.session_file();
        let marker: SessionMarker = match self.store.read_collection::<Option<SessionMarker>>(&path)
        {
            Ok(Some(m)) => m,
            Ok(None) => return None,
            Err(e) => {
                warn!("session.restore unreadable marker, clearing: {}", e);
                let _ = self.store.remove_collection(&path);
                return None;
            }
        };
        match registry.find_by_id(&marker.account_id) {
            Some(account) => {
                tprintln!("session.restore user={}", marker.account_id);
                *self.current.write() = Some(marker);
                Some(account)
            }
            None => {
                warn!("session.restore dangling marker user={}, clearing", marker.account_id);
                let _ = self.store.remove_collection(&path);
                *self.current.write() = None;
                None
            }
        }
    }
}
