//!
//! sizehub auth service
//! --------------------
//! Sole entry point for the presentation layer: registration, login, logout,
//! profile update and startup session restoration, orchestrated over the
//! identity store, credential vault and session manager.
//!
//! The service is a state machine over {Anonymous, Authenticating,
//! Authenticated}. Operations are logically serialized: a second
//! register/login/update issued while one is in flight is rejected with
//! `Busy` (logout and restore queue behind the in-flight operation instead).
//! Every outcome except restoration is mirrored to the notification sink;
//! state snapshots are published on a watch channel the UI subscribes to.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

use crate::error::{AuthError, AuthResult};
use crate::notify::{Notification, NotificationSink};
use crate::storage::SharedStore;

use super::account::{Account, AccountKind, ProfilePatch};
use super::registry::IdentityStore;
use super::session::SessionManager;
use super::vault::CredentialVault;

/// What the presentation layer sees on every transition.
#[derive(Debug, Clone, Default)]
pub struct AuthSnapshot {
    pub current: Option<Account>,
    pub is_loading: bool,
}

#[derive(Debug, Clone)]
enum AuthState {
    Anonymous,
    Authenticating,
    Authenticated(Account),
}

impl AuthState {
    fn account(&self) -> Option<&Account> {
        match self {
            AuthState::Authenticated(a) => Some(a),
            _ => None,
        }
    }
}

pub struct AuthService {
    registry: IdentityStore,
    vault: CredentialVault,
    sessions: SessionManager,
    sink: Arc<dyn NotificationSink>,
    state: parking_lot::Mutex<AuthState>,
    /// Single-in-flight-operation gate. `try_lock` failures surface as `Busy`.
    op: Mutex<()>,
    tx: watch::Sender<AuthSnapshot>,
}

impl AuthService {
    pub fn new(
        registry: IdentityStore,
        vault: CredentialVault,
        sessions: SessionManager,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let (tx, _rx) = watch::channel(AuthSnapshot::default());
        Self {
            registry,
            vault,
            sessions,
            sink,
            state: parking_lot::Mutex::new(AuthState::Anonymous),
            op: Mutex::new(()),
            tx,
        }
    }

    /// Convenience constructor: hydrates all three components from one store.
    pub fn open(store: SharedStore, sink: Arc<dyn NotificationSink>) -> AuthResult<Self> {
        let registry = IdentityStore::open(store.clone())?;
        let vault = CredentialVault::open(store.clone())?;
        let sessions = SessionManager::new(store);
        Ok(Self::new(registry, vault, sessions, sink))
    }

    /// Subscribe to `{current, is_loading}` snapshots. The receiver starts at
    /// the latest published value.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<Account> {
        self.state.lock().account().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    /// Registered accounts in insertion order. Diagnostic surface for the
    /// CLI shell; the dashboard itself never lists accounts.
    pub fn accounts(&self) -> Vec<Account> {
        self.registry.load_all()
    }

    /// Register a new account, sign it in and persist the session.
    /// Valid from Anonymous; nothing is persisted on any failure path.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        secret: &str,
        kind: AccountKind,
    ) -> AuthResult<Account> {
        let Ok(_guard) = self.op.try_lock() else {
            return Err(self.fail(AuthError::Busy));
        };
        if self.is_authenticated() {
            return Err(self.fail(AuthError::Validation(
                "Você já está autenticado. Saia para criar outra conta.".into(),
            )));
        }
        self.begin();
        match self.do_register(name, email, secret, kind) {
            Ok(account) => {
                info!("auth.register ok id={} kind={}", account.id, account.kind);
                self.settle(AuthState::Authenticated(account.clone()));
                self.sink.notify(Notification::info(format!(
                    "Conta criada com sucesso! Bem-vindo, {}!",
                    account.name
                )));
                Ok(account)
            }
            Err(e) => {
                debug!("auth.register err code={}", e.code_str());
                self.settle(AuthState::Anonymous);
                Err(self.fail(e))
            }
        }
    }

    fn do_register(
        &self,
        name: &str,
        email: &str,
        secret: &str,
        kind: AccountKind,
    ) -> AuthResult<Account> {
        validate_registration(name, email, secret)?;
        if self.registry.find_by_email(email).is_some() {
            return Err(AuthError::DuplicateEmail);
        }
        let account = Account::new(name, email, kind);
        // insert re-checks uniqueness under the registry lock; a concurrent
        // registration racing on the same email loses here
        self.registry.insert(account.clone())?;
        self.vault.set(&account.id, secret)?;
        self.sessions.set(account.id.clone())?;
        Ok(account)
    }

    /// Authenticate existing credentials, stamp `last_login` and persist the
    /// session. A successful login overwrites any prior session.
    pub async fn login(&self, email: &str, secret: &str) -> AuthResult<Account> {
        let Ok(_guard) = self.op.try_lock() else {
            return Err(self.fail(AuthError::Busy));
        };
        let prior = self.state.lock().clone();
        self.begin();
        match self.do_login(email, secret) {
            Ok(account) => {
                info!("auth.login ok id={}", account.id);
                self.settle(AuthState::Authenticated(account.clone()));
                self.sink.notify(Notification::info(format!(
                    "Bem-vindo de volta, {}!",
                    account.name
                )));
                Ok(account)
            }
            Err(e) => {
                // failed login never disturbs an existing session
                debug!("auth.login err code={}", e.code_str());
                self.settle(prior);
                Err(self.fail(e))
            }
        }
    }

    fn do_login(&self, email: &str, secret: &str) -> AuthResult<Account> {
        let mut account = self
            .registry
            .find_by_email(email)
            .ok_or(AuthError::AccountNotFound)?;
        if !self.vault.verify(&account.id, secret) {
            return Err(AuthError::InvalidCredential);
        }
        account.last_login = Some(chrono::Utc::now());
        self.registry.update(&account)?;
        self.sessions.set(account.id.clone())?;
        Ok(account)
    }

    /// Clear the session and return to Anonymous. No-op when already
    /// anonymous. Queues behind an in-flight operation rather than failing.
    pub async fn logout(&self) {
        let _guard = self.op.lock().await;
        if self.state.lock().account().is_none() {
            return;
        }
        if let Err(e) = self.sessions.clear() {
            // the in-memory session still ends; the stale marker will be
            // re-validated against the registry on next startup
            debug!("auth.logout marker removal failed: {}", e);
        }
        info!("auth.logout");
        self.settle(AuthState::Anonymous);
        self.sink
            .notify(Notification::info("Logout realizado com sucesso"));
    }

    /// Merge an explicit field patch into the current account. `id`, `email`
    /// and `kind` are immutable. Fails quietly (no notification) when called
    /// while anonymous.
    pub async fn update_profile(&self, patch: ProfilePatch) -> AuthResult<Account> {
        let Ok(_guard) = self.op.try_lock() else {
            return Err(self.fail(AuthError::Busy));
        };
        let Some(mut account) = self.current() else {
            return Err(AuthError::AccountNotFound);
        };
        if patch.is_empty() {
            // nothing to merge; leave the stores untouched
            return Ok(account);
        }
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(self.fail(AuthError::Validation("Informe seu nome".into())));
            }
        }
        let before = account.clone();
        self.begin();
        account.apply(&patch);
        match self.registry.update(&account) {
            Ok(()) => {
                info!("auth.update_profile id={}", account.id);
                self.settle(AuthState::Authenticated(account.clone()));
                self.sink
                    .notify(Notification::info("Perfil atualizado com sucesso!"));
                Ok(account)
            }
            Err(e) => {
                // keep the pre-patch account authoritative
                self.settle(AuthState::Authenticated(before));
                Err(self.fail(e))
            }
        }
    }

    /// Resume the persisted session, once, at process start. Silent: emits no
    /// notification and degrades to Anonymous on every failure.
    pub async fn restore_session(&self) -> Option<Account> {
        let _guard = self.op.lock().await;
        self.publish(true);
        let restored = self.sessions.restore(&self.registry);
        match &restored {
            Some(account) => {
                info!("auth.restore id={}", account.id);
                self.settle(AuthState::Authenticated(account.clone()));
            }
            None => self.settle(AuthState::Anonymous),
        }
        restored
    }

    // -- state plumbing -----------------------------------------------------

    fn begin(&self) {
        // the visible account is untouched while the operation is in flight
        let current = self.current();
        *self.state.lock() = AuthState::Authenticating;
        self.tx.send_replace(AuthSnapshot { current, is_loading: true });
    }

    fn settle(&self, next: AuthState) {
        let snapshot = AuthSnapshot { current: next.account().cloned(), is_loading: false };
        *self.state.lock() = next;
        self.tx.send_replace(snapshot);
    }

    fn publish(&self, is_loading: bool) {
        let current = self.current();
        self.tx.send_replace(AuthSnapshot { current, is_loading });
    }

    /// Mirror an error to the notification sink and hand it back.
    fn fail(&self, e: AuthError) -> AuthError {
        self.sink.notify(Notification::error(e.to_string()));
        e
    }
}

fn validate_registration(name: &str, email: &str, secret: &str) -> AuthResult<()> {
    if name.trim().is_empty() {
        return Err(AuthError::Validation("Informe seu nome".into()));
    }
    if email.is_empty() || !email.contains('@') {
        // shape check only; the form layer owns full email validation
        return Err(AuthError::Validation("Email inválido".into()));
    }
    if secret.is_empty() || secret.len() < 6 {
        return Err(AuthError::Validation(
            "A senha deve ter pelo menos 6 caracteres".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;
