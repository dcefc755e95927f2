//! Write-mostly secret store. Verification by equality stands in for a real
//! hashing scheme; swapping one in only touches this module, never the auth
//! service contract. No API returns a stored secret.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::error::AuthResult;
use crate::storage::SharedStore;

use super::account::AccountId;

pub struct CredentialVault {
    store: SharedStore,
    secrets: RwLock<BTreeMap<String, String>>,
}

impl CredentialVault {
    pub fn open(store: SharedStore) -> AuthResult<Self> {
        let secrets: BTreeMap<String, String> =
            store.read_collection(&store.credentials_file())?;
        Ok(Self { store, secrets: RwLock::new(secrets) })
    }

    /// Store or overwrite the secret for an account, persisted immediately.
    /// Rolls the in-memory map back if the durable write fails.
    pub fn set(&self, id: &AccountId, secret: &str) -> AuthResult<()> {
        let mut map = self.secrets.write();
        let previous = map.insert(id.as_str().to_string(), secret.to_string());
        if let Err(e) = self.store.write_collection(&self.store.credentials_file(), &*map) {
            match previous {
                Some(p) => map.insert(id.as_str().to_string(), p),
                None => map.remove(id.as_str()),
            };
            return Err(e);
        }
        debug!("vault.set id={}", id);
        Ok(())
    }

    /// Constant-shape equality check against the stored secret. Unknown ids
    /// verify as false.
    pub fn verify(&self, id: &AccountId, candidate: &str) -> bool {
        let map = self.secrets.read();
        let Some(stored) = map.get(id.as_str()) else {
            return false;
        };
        stored.as_bytes().ct_eq(candidate.as_bytes()).into()
    }
}
