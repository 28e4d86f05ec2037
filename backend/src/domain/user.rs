//! Marketplace user accounts.
//!
//! A [`UserAccount`] is the Identity Store's view of a user: login, display
//! name, profile image and spendable balance. Password hashes never leave the
//! credential flow; see [`crate::domain::StoredCredentials`].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ImageRef, Money};

/// Maximum login length, matching the `users.login` column.
pub const LOGIN_MAX: usize = 50;
/// Maximum display name length, matching the `users.full_name` column.
pub const FULL_NAME_MAX: usize = 70;

/// Validation errors for user fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// User id was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// Login was blank.
    #[error("login must not be empty")]
    EmptyLogin,
    /// Login exceeded [`LOGIN_MAX`] characters.
    #[error("login must be at most {max} characters")]
    LoginTooLong {
        /// Allowed maximum.
        max: usize,
    },
    /// Login contained whitespace.
    #[error("login must not contain whitespace")]
    LoginWhitespace,
    /// Display name was blank.
    #[error("name must not be empty")]
    EmptyFullName,
    /// Display name exceeded [`FULL_NAME_MAX`] characters.
    #[error("name must be at most {max} characters")]
    FullNameTooLong {
        /// Allowed maximum.
        max: usize,
    },
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a user id from text.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unique login name.
///
/// ## Invariants
/// - 1 to [`LOGIN_MAX`] characters, with no whitespace anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoginName(String);

impl LoginName {
    /// Validate and construct a login name.
    pub fn new(login: impl Into<String>) -> Result<Self, UserValidationError> {
        let login = login.into();
        if login.trim().is_empty() {
            return Err(UserValidationError::EmptyLogin);
        }
        if login.chars().any(char::is_whitespace) {
            return Err(UserValidationError::LoginWhitespace);
        }
        if login.chars().count() > LOGIN_MAX {
            return Err(UserValidationError::LoginTooLong { max: LOGIN_MAX });
        }
        Ok(Self(login))
    }

    /// Borrow the login text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for LoginName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoginName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<LoginName> for String {
    fn from(value: LoginName) -> Self {
        value.0
    }
}

impl TryFrom<String> for LoginName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Display name shown on profiles and gallery entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FullName(String);

impl FullName {
    /// Validate and construct a display name. Surrounding whitespace is trimmed.
    pub fn new(name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyFullName);
        }
        if trimmed.chars().count() > FULL_NAME_MAX {
            return Err(UserValidationError::FullNameTooLong { max: FULL_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the name text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<FullName> for String {
    fn from(value: FullName) -> Self {
        value.0
    }
}

impl TryFrom<String> for FullName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// User record as held by the Identity Store, minus credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// Stable identifier.
    pub id: UserId,
    /// Unique login name.
    pub login: LoginName,
    /// Display name.
    pub full_name: FullName,
    /// Reference to the uploaded profile image.
    pub image: ImageRef,
    /// Spendable balance; never negative.
    pub balance: Money,
}
