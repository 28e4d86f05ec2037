//! Account domain service.
//!
//! Implements registration, login, profile edits and bearer verification on
//! top of the identity store, the password hasher, the token signer and the
//! blob gateway.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountCommand, BlobUploadError, BlobUploadGateway, NewUserRecord, PasswordHasher,
    PasswordHasherError, ProfileChange, ProfileUpdate, RegistrationRequest, SessionGrant,
    SessionTokenError, SessionTokens, SessionVerifier, UserPersistenceError, UserRepository,
};
use crate::domain::{
    BlobKey, Error, ImagePayload, ImageRef, LoginCredentials, LoginName, UserAccount, UserId,
};

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::LoginTaken { login } => login_taken(&login),
    }
}

fn login_taken(login: &str) -> Error {
    Error::conflict(format!("login {login} is already taken")).with_reason("login_taken")
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

fn map_token_error(error: SessionTokenError) -> Error {
    match error {
        SessionTokenError::Expired => {
            Error::unauthorized("session token expired").with_reason("token_expired")
        }
        SessionTokenError::Malformed { .. } => {
            Error::unauthorized("session token invalid").with_reason("token_malformed")
        }
        SessionTokenError::Signing { message } => {
            Error::internal(format!("session token signing failed: {message}"))
        }
    }
}

pub(crate) fn map_blob_error(error: BlobUploadError) -> Error {
    warn!(error = %error, "image upload failed");
    Error::dependency_failed("image upload failed").with_reason("upload_failed")
}

/// Upload `payload` under `key` and map failures to `dependency_failed`.
pub(crate) async fn upload_image<B>(
    blobs: &B,
    key: &BlobKey,
    payload: ImagePayload,
) -> Result<ImageRef, Error>
where
    B: BlobUploadGateway + ?Sized,
{
    blobs.upload(key, payload).await.map_err(map_blob_error)
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials").with_reason("bad_credentials")
}

fn user_not_found() -> Error {
    Error::not_found("user not found").with_reason("user_not_found")
}

/// Account service implementing [`AccountCommand`] and [`SessionVerifier`].
#[derive(Clone)]
pub struct AccountService<U, H, T, B> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    blobs: Arc<B>,
}

impl<U, H, T, B> AccountService<U, H, T, B> {
    /// Create a service over its collaborators.
    pub fn new(users: Arc<U>, hasher: Arc<H>, tokens: Arc<T>, blobs: Arc<B>) -> Self {
        Self {
            users,
            hasher,
            tokens,
            blobs,
        }
    }
}

impl<U, H, T, B> AccountService<U, H, T, B>
where
    U: UserRepository,
{
    /// Fail early when `login` belongs to a user other than `requester`.
    ///
    /// The store constraint remains authoritative; this check keeps an
    /// upload from replacing another user's profile image.
    async fn ensure_login_free(
        &self,
        login: &LoginName,
        requester: Option<&UserId>,
    ) -> Result<(), Error> {
        let holder = self
            .users
            .find_credentials(login)
            .await
            .map_err(map_user_error)?;
        match holder {
            Some(existing) if Some(&existing.user_id) != requester => {
                Err(login_taken(login.as_str()))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<U, H, T, B> AccountCommand for AccountService<U, H, T, B>
where
    U: UserRepository,
    H: PasswordHasher,
    T: SessionTokens,
    B: BlobUploadGateway,
{
    async fn register(&self, request: RegistrationRequest) -> Result<UserAccount, Error> {
        self.ensure_login_free(&request.login, None).await?;
        let password_hash = self
            .hasher
            .hash(&request.password)
            .await
            .map_err(map_hasher_error)?;
        let image = upload_image(
            self.blobs.as_ref(),
            &BlobKey::profile_image(&request.login),
            request.image,
        )
        .await?;

        let record = NewUserRecord {
            id: UserId::random(),
            login: request.login,
            full_name: request.full_name,
            password_hash,
            image,
        };
        let account = self.users.create(&record).await.map_err(map_user_error)?;
        info!(user_id = %account.id, login = %account.login, "user registered");
        Ok(account)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<SessionGrant, Error> {
        let stored = self
            .users
            .find_credentials(credentials.login())
            .await
            .map_err(map_user_error)?;
        let Some(stored) = stored else {
            self.hasher.verify_dummy(credentials.password()).await;
            return Err(invalid_credentials());
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .await
            .map_err(map_hasher_error)?;
        if !matches {
            return Err(invalid_credentials());
        }

        let issued = self
            .tokens
            .issue(&stored.user_id, credentials.login())
            .map_err(map_token_error)?;
        Ok(SessionGrant {
            user_id: stored.user_id,
            token: issued.token,
            expires_at: issued.expires_at,
        })
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        change: ProfileChange,
    ) -> Result<UserAccount, Error> {
        let hash = self
            .users
            .find_password_hash(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(user_not_found)?;
        let confirmed = self
            .hasher
            .verify(&change.current_password, &hash)
            .await
            .map_err(map_hasher_error)?;
        if !confirmed {
            return Err(
                Error::unauthorized("current password is incorrect").with_reason("bad_credentials")
            );
        }

        self.ensure_login_free(&change.login, Some(user_id)).await?;
        let image = match change.image {
            Some(payload) => Some(
                upload_image(
                    self.blobs.as_ref(),
                    &BlobKey::profile_image(&change.login),
                    payload,
                )
                .await?,
            ),
            None => None,
        };

        let update = ProfileUpdate {
            login: change.login,
            full_name: change.full_name,
            image,
        };
        let account = self
            .users
            .update_profile(user_id, &update)
            .await
            .map_err(map_user_error)?
            .ok_or_else(user_not_found)?;
        info!(user_id = %account.id, "profile updated");
        Ok(account)
    }
}

impl<U, H, T, B> SessionVerifier for AccountService<U, H, T, B>
where
    U: Send + Sync,
    H: Send + Sync,
    T: SessionTokens,
    B: Send + Sync,
{
    fn verify(&self, token: &str) -> Result<UserId, Error> {
        self.tokens.verify(token).map_err(|err| {
            warn!(error = %err, "session token rejected");
            map_token_error(err)
        })
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
