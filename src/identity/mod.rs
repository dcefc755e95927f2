//! Central identity and session management for the sizehub dashboard.
//! Keep the public surface thin and split implementation across sub-modules.

mod account;
mod registry;
mod session;
mod service;
mod vault;

pub use account::{Account, AccountId, AccountKind, ProfilePatch};
pub use registry::IdentityStore;
pub use service::{AuthService, AuthSnapshot};
pub use session::{SessionManager, SessionMarker};
pub use vault::CredentialVault;
