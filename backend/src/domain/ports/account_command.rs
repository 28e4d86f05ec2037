//! Driving port for account use-cases: registration, login and profile
//! edits.
//!
//! Inbound adapters call it with validated domain values and never see the
//! hashing, token or storage adapters behind it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Error, FullName, ImagePayload, LoginCredentials, LoginName, Password, SessionToken,
    UserAccount, UserId,
};

/// Validated registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub login: LoginName,
    pub full_name: FullName,
    pub password: Password,
    pub image: ImagePayload,
}

/// Validated profile edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileChange {
    pub login: LoginName,
    pub full_name: FullName,
    /// Re-confirmation of the caller's password.
    pub current_password: Password,
    /// Replacement profile image, if any.
    pub image: Option<ImagePayload>,
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGrant {
    pub user_id: UserId,
    pub token: SessionToken,
    pub expires_at: DateTime<Utc>,
}

/// Domain use-case port for account lifecycle operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create a user with a zero balance.
    ///
    /// Fails with `conflict` / `login_taken` when the login is in use and
    /// `dependency_failed` / `upload_failed` when the image upload fails.
    async fn register(&self, request: RegistrationRequest) -> Result<UserAccount, Error>;

    /// Exchange credentials for a session token.
    ///
    /// Unknown logins and wrong passwords are indistinguishable.
    async fn login(&self, credentials: LoginCredentials) -> Result<SessionGrant, Error>;

    /// Edit login, display name and optionally the profile image.
    async fn update_profile(
        &self,
        user_id: &UserId,
        change: ProfileChange,
    ) -> Result<UserAccount, Error>;
}

/// Verifies bearer tokens presented by callers.
#[cfg_attr(test, mockall::automock)]
pub trait SessionVerifier: Send + Sync {
    /// Return the authenticated user for `token`, or an `unauthorized` error.
    fn verify(&self, token: &str) -> Result<UserId, Error>;
}
