//! Port for issuing and verifying signed session tokens.

use chrono::{DateTime, Utc};

use crate::domain::{LoginName, SessionToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session token adapters.
    pub enum SessionTokenError {
        /// The token lifetime has passed.
        Expired => "session token expired",
        /// The token failed signature or structural checks.
        Malformed { message: String } => "session token malformed: {message}",
        /// A token could not be signed.
        Signing { message: String } => "session token signing failed: {message}",
    }
}

/// A freshly issued token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    pub token: SessionToken,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies bearer tokens.
#[cfg_attr(test, mockall::automock)]
pub trait SessionTokens: Send + Sync {
    /// Sign a token for `user`.
    fn issue(&self, user: &UserId, login: &LoginName) -> Result<IssuedSession, SessionTokenError>;

    /// Verify `token` and return its subject.
    fn verify(&self, token: &str) -> Result<UserId, SessionTokenError>;
}
