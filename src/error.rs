use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Fatal configuration failure at `ConnectionContext` construction.
///
/// Nothing in this crate recovers from these at runtime — a context without
/// credentials cannot reach the backing services at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required connection setting: {0}")]
    Missing(&'static str),

    #[error("Connection setting {0} must not be empty")]
    Empty(&'static str),
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Structured error codes reported by the backing document store.
///
/// The only code this layer dispatches on is [`ErrorCode::PermissionDenied`];
/// the rest are carried through for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    PermissionDenied,
    Unavailable,
    NotFound,
    InvalidArgument,
    Internal,
}

impl ErrorCode {
    pub fn is_permission_denied(self) -> bool {
        matches!(self, Self::PermissionDenied)
    }
}

// ---------------------------------------------------------------------------
// ClientError
// ---------------------------------------------------------------------------

/// Errors surfaced to consumers of this layer (session `error` fields,
/// subscription `error` fields, one-shot read results).
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The backing store rejected an operation with a structured code.
    #[error("Store error ({code:?}): {message}")]
    Store { code: ErrorCode, message: String },

    /// The connection context was built without an auth gateway.
    #[error("Authentication service is not available on this connection")]
    AuthUnavailable,

    /// The auth gateway reported a transport or session failure.
    #[error("Auth error: {message}")]
    Auth { message: String },

    /// A snapshot failed shape validation at the subscription boundary.
    #[error("Invalid record at \"{path}\": {message}")]
    InvalidData { path: String, message: String },
}

impl ClientError {
    pub fn store(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Store {
            code,
            message: message.into(),
        }
    }

    /// The store-reported code, if this error came from the store.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Store { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
