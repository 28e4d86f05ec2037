//! Authentication primitives: credentials, password hashes and session tokens.
//!
//! Inbound payload parsing stays outside the domain; these constructors
//! validate raw strings before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::{LoginName, UserId, UserValidationError};

/// Errors returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Login was missing or malformed.
    #[error(transparent)]
    Login(#[from] UserValidationError),
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Plain-text password held in zeroising memory.
///
/// ## Invariants
/// - Non-empty; caller-provided whitespace is preserved.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate and wrap a password.
    pub fn new(raw: &str) -> Result<Self, CredentialsValidationError> {
        if raw.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Borrow the secret.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Validated login credentials.
///
/// # Examples
/// ```
/// use artmarket::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("frida", "s3cret").unwrap();
/// assert_eq!(creds.login().as_str(), "frida");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    login: LoginName,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs. The login is trimmed first.
    pub fn try_from_parts(login: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            login: LoginName::new(login.trim())?,
            password: Password::new(password)?,
        })
    }

    /// Login name.
    pub fn login(&self) -> &LoginName {
        &self.login
    }

    /// Password.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Salted password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded PHC string.
    pub fn from_phc(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Borrow the encoded hash.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Credential material looked up by login during authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    /// Owner of the hash.
    pub user_id: UserId,
    /// Stored password hash.
    pub password_hash: PasswordHash,
}

/// Signed, time-limited bearer credential.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap an encoded token.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Borrow the encoded token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("  frida ", "pw", "frida")]
    #[case("diego", " spaced ", "diego")]
    fn accepts_valid_credentials(
        #[case] login: &str,
        #[case] password: &str,
        #[case] expected_login: &str,
    ) {
        let creds = LoginCredentials::try_from_parts(login, password).expect("valid credentials");
        assert_eq!(creds.login().as_str(), expected_login);
        assert_eq!(creds.password().expose(), password);
    }

    #[rstest]
    #[case("", "pw", CredentialsValidationError::Login(UserValidationError::EmptyLogin))]
    #[case("frida", "", CredentialsValidationError::EmptyPassword)]
    fn rejects_invalid_credentials(
        #[case] login: &str,
        #[case] password: &str,
        #[case] expected: CredentialsValidationError,
    ) {
        assert_eq!(
            LoginCredentials::try_from_parts(login, password),
            Err(expected)
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = LoginCredentials::try_from_parts("frida", "hunter2").expect("valid");
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
