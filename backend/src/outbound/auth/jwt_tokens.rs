//! HS256 JWT implementation of the `SessionTokens` port.
//!
//! Claims: `sub` (user id), `login`, `iat`, `exp`. Expiry is checked against
//! the injected clock rather than the library's system-time check, so tests
//! can move time.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{IssuedSession, SessionTokenError, SessionTokens};
use crate::domain::{LoginName, SessionToken, UserId};

/// Default session lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    login: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies HS256 bearer tokens.
pub struct JwtSessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl JwtSessionTokens {
    /// Build a token service from a shared secret.
    ///
    /// A TTL too large for the clock arithmetic is clamped to one day.
    pub fn new(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: TimeDelta::from_std(ttl).unwrap_or_else(|_| TimeDelta::days(1)),
            clock,
        }
    }
}

fn map_decode_error(error: &jsonwebtoken::errors::Error) -> SessionTokenError {
    match error.kind() {
        ErrorKind::ExpiredSignature => SessionTokenError::expired(),
        _ => SessionTokenError::malformed(error.to_string()),
    }
}

impl SessionTokens for JwtSessionTokens {
    fn issue(&self, user: &UserId, login: &LoginName) -> Result<IssuedSession, SessionTokenError> {
        let issued_at = self.clock.utc();
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| SessionTokenError::signing("token expiry is out of range"))?;
        let claims = Claims {
            sub: user.to_string(),
            login: login.as_str().to_owned(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| SessionTokenError::signing(err.to_string()))?;
        Ok(IssuedSession {
            token: SessionToken::new(token),
            expires_at,
        })
    }

    fn verify(&self, token: &str) -> Result<UserId, SessionTokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|err| map_decode_error(&err))?;
        if self.clock.utc().timestamp() >= data.claims.exp {
            return Err(SessionTokenError::expired());
        }
        UserId::new(&data.claims.sub)
            .map_err(|err| SessionTokenError::malformed(format!("invalid subject: {err}")))
    }
}
