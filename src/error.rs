//! Typed error model for the identity layer.
//! Every fallible operation returns `AuthResult<T>`. The auth service mirrors
//! each failure into a user-facing notification (see `notify`), so `Display`
//! output doubles as the notification text shown by the dashboard.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Malformed input; rejected before any store is touched.
    #[error("{0}")]
    Validation(String),
    #[error("Este email já está cadastrado")]
    DuplicateEmail,
    #[error("Usuário não encontrado. Faça seu cadastro primeiro.")]
    AccountNotFound,
    #[error("Senha incorreta")]
    InvalidCredential,
    /// Update addressed an account id that is not in the registry.
    #[error("Conta não encontrada para atualização")]
    NotFound,
    /// Another register/login/update is already in flight.
    #[error("Operação em andamento. Aguarde e tente novamente.")]
    Busy,
    #[error("Falha ao acessar o armazenamento local: {0}")]
    StorageUnavailable(String),
}

impl AuthError {
    /// Stable machine-readable code, used in log lines.
    pub fn code_str(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "validation_error",
            AuthError::DuplicateEmail => "duplicate_email",
            AuthError::AccountNotFound => "account_not_found",
            AuthError::InvalidCredential => "invalid_credential",
            AuthError::NotFound => "not_found",
            AuthError::Busy => "busy",
            AuthError::StorageUnavailable(_) => "storage_unavailable",
        }
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, AuthError::StorageUnavailable(_))
    }
}

impl From<std::io::Error> for AuthError {
    fn from(err: std::io::Error) -> Self {
        AuthError::StorageUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::StorageUnavailable(err.to_string())
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
