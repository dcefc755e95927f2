//! Durable account registry. Email exclusivity is enforced inside `insert`
//! under the registry lock, so a check-then-insert race between two
//! registrations for the same email commits at most one of them.

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{AuthError, AuthResult};
use crate::storage::SharedStore;

use super::account::{Account, AccountId};

pub struct IdentityStore {
    store: SharedStore,
    /// In-memory mirror of `accounts.json`, insertion order preserved.
    accounts: RwLock<Vec<Account>>,
}

impl IdentityStore {
    /// Hydrate the registry from the durable collection. A corrupt collection
    /// file is a hard error here; callers that must degrade (session restore)
    /// handle that above this layer.
    pub fn open(store: SharedStore) -> AuthResult<Self> {
        let accounts: Vec<Account> = store.read_collection(&store.accounts_file())?;
        debug!("registry.open accounts={}", accounts.len());
        Ok(Self { store, accounts: RwLock::new(accounts) })
    }

    /// Exact-match lookup, case-sensitive.
    pub fn find_by_email(&self, email: &str) -> Option<Account> {
        self.accounts.read().iter().find(|a| a.email == email).cloned()
    }

    pub fn find_by_id(&self, id: &AccountId) -> Option<Account> {
        self.accounts.read().iter().find(|a| &a.id == id).cloned()
    }

    /// Append a new account and persist the collection before returning.
    /// Fails with `DuplicateEmail` without touching disk if the email is
    /// already registered. If the durable write fails, the in-memory mirror
    /// is rolled back so it never diverges from disk.
    pub fn insert(&self, account: Account) -> AuthResult<()> {
        let mut list = self.accounts.write();
        if list.iter().any(|a| a.email == account.email) {
            return Err(AuthError::DuplicateEmail);
        }
        let id = account.id.clone();
        list.push(account);
        if let Err(e) = self.store.write_collection(&self.store.accounts_file(), &*list) {
            list.pop();
            return Err(e);
        }
        debug!("registry.insert id={} total={}", id, list.len());
        Ok(())
    }

    /// Replace an existing record in place, preserving the position of every
    /// other record. Fails with `NotFound` if the id is unknown.
    pub fn update(&self, account: &Account) -> AuthResult<()> {
        let mut list = self.accounts.write();
        let Some(pos) = list.iter().position(|a| a.id == account.id) else {
            return Err(AuthError::NotFound);
        };
        let previous = std::mem::replace(&mut list[pos], account.clone());
        if let Err(e) = self.store.write_collection(&self.store.accounts_file(), &*list) {
            list[pos] = previous;
            return Err(e);
        }
        debug!("registry.update id={}", account.id);
        Ok(())
    }

    /// The full durable set, in insertion order.
    pub fn load_all(&self) -> Vec<Account> {
        self.accounts.read().clone()
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}
