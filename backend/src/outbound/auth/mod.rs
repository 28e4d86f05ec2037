//! Credential adapters: Argon2id password hashing and HS256 session tokens.

mod argon2_hasher;
mod jwt_tokens;

pub use argon2_hasher::Argon2PasswordHasher;
pub use jwt_tokens::{DEFAULT_TOKEN_TTL, JwtSessionTokens};
