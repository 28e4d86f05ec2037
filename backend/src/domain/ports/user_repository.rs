//! Port abstraction for user persistence adapters and their errors.
//!
//! Balance changes never flow through this port; they belong to the
//! [`LedgerRepository`](super::LedgerRepository).

use async_trait::async_trait;

use crate::domain::{
    FullName, ImageRef, LoginName, PasswordHash, StoredCredentials, UserAccount, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The login is already held by another user.
        LoginTaken { login: String } => "login {login} is already taken",
    }
}

/// New user row. The balance starts at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub id: UserId,
    pub login: LoginName,
    pub full_name: FullName,
    pub password_hash: PasswordHash,
    pub image: ImageRef,
}

/// Profile fields written by a profile edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub login: LoginName,
    pub full_name: FullName,
    /// Replacement image; `None` keeps the current one.
    pub image: Option<ImageRef>,
}

/// Identity store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. A duplicate login yields
    /// [`UserPersistenceError::LoginTaken`] from the store constraint.
    async fn create(&self, record: &NewUserRecord) -> Result<UserAccount, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Fetch the credential material for a login.
    async fn find_credentials(
        &self,
        login: &LoginName,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// Fetch the stored password hash for a user.
    async fn find_password_hash(
        &self,
        id: &UserId,
    ) -> Result<Option<PasswordHash>, UserPersistenceError>;

    /// Apply a profile edit, returning the updated user or `None` when the
    /// user no longer exists.
    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;
}
