//! Signing-secret fingerprinting for operational visibility.
//!
//! Operators can confirm which secret is active without the secret itself
//! appearing in logs.

use sha2::{Digest, Sha256};

/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// First 8 bytes of the secret's SHA-256 digest as 16 lowercase hex digits.
///
/// # Examples
///
/// ```rust
/// use artmarket::inbound::http::token_config::fingerprint::secret_fingerprint;
///
/// let fp = secret_fingerprint(b"an example signing secret");
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn secret_fingerprint(secret: &[u8]) -> String {
    let digest = Sha256::digest(secret);
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
