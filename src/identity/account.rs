use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Two-valued account kind. This is display metadata plus a coarse product
/// distinction; it carries no authorization semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Affiliate,
    Creator,
}

impl AccountKind {
    /// Display label used by the dashboard header.
    pub fn label(&self) -> &'static str {
        match self {
            AccountKind::Affiliate => "Afiliado",
            AccountKind::Creator => "Produtor",
        }
    }

    fn default_bio(&self) -> &'static str {
        match self {
            AccountKind::Creator => "Criador de produtos digitais",
            AccountKind::Affiliate => "Afiliado especializado em marketing digital",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Affiliate => write!(f, "affiliate"),
            AccountKind::Creator => write!(f, "creator"),
        }
    }
}

/// Opaque account identifier. Generated once at registration, never reused
/// or mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub(crate) fn generate() -> Self {
        Self(format!("user_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One registered user's durable profile record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    /// Unique across the registry, exact-match comparison.
    pub email: String,
    pub kind: AccountKind,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl Account {
    /// Build a fresh account at registration time. Avatar and bio are derived
    /// from the name and kind; both remain editable via profile update.
    pub(crate) fn new(name: &str, email: &str, kind: AccountKind) -> Self {
        Self {
            id: AccountId::generate(),
            name: name.to_string(),
            email: email.to_string(),
            kind,
            created_at: Utc::now(),
            last_login: None,
            avatar_url: Some(format!(
                "https://api.dicebear.com/7.x/initials/svg?seed={}",
                urlencoding::encode(name)
            )),
            bio: Some(kind.default_bio().to_string()),
        }
    }

    /// Merge a profile patch. `id`, `email`, `kind`, `created_at` and
    /// `last_login` are not patchable.
    pub(crate) fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(bio) = &patch.bio {
            self.bio = Some(bio.clone());
        }
        if let Some(avatar_url) = &patch.avatar_url {
            self.avatar_url = Some(avatar_url.clone());
        }
    }
}

/// Explicit optional-field input for profile updates. Absent fields are left
/// untouched; there is no open-ended key merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.bio.is_none() && self.avatar_url.is_none()
    }
}
