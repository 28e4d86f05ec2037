//! Image payloads, blob keys and stored image references.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::domain::{ArtworkId, LoginName};

/// Maximum stored reference length, matching the image columns.
pub const IMAGE_REF_MAX: usize = 255;

/// Validation errors for image inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageValidationError {
    /// Payload was blank or decoded to zero bytes.
    #[error("image payload must not be empty")]
    EmptyPayload,
    /// Payload was not valid base64.
    #[error("image payload must be base64 encoded")]
    InvalidBase64,
    /// Reference was blank.
    #[error("image reference must not be empty")]
    EmptyReference,
    /// Reference exceeded [`IMAGE_REF_MAX`] characters.
    #[error("image reference must be at most {max} characters")]
    ReferenceTooLong {
        /// Allowed maximum.
        max: usize,
    },
}

/// Decoded image bytes ready for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload(Vec<u8>);

impl ImagePayload {
    /// Decode a base64 payload, accepting an optional `data:` URL prefix.
    ///
    /// # Examples
    /// ```
    /// use artmarket::domain::ImagePayload;
    ///
    /// let payload = ImagePayload::from_base64("data:image/jpeg;base64,/9j/4A==").unwrap();
    /// assert_eq!(payload.as_bytes(), &[0xff, 0xd8, 0xff, 0xe0]);
    /// ```
    pub fn from_base64(encoded: &str) -> Result<Self, ImageValidationError> {
        let body = match encoded.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => encoded,
        };
        let body = body.trim();
        if body.is_empty() {
            return Err(ImageValidationError::EmptyPayload);
        }
        let bytes = STANDARD
            .decode(body)
            .map_err(|_| ImageValidationError::InvalidBase64)?;
        Self::from_bytes(bytes)
    }

    /// Wrap raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ImageValidationError> {
        if bytes.is_empty() {
            return Err(ImageValidationError::EmptyPayload);
        }
        Ok(Self(bytes))
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the payload, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("len", &self.0.len())
            .finish()
    }
}

/// Logical storage key under which an image is uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey(String);

impl BlobKey {
    /// Key for a user's profile picture.
    pub fn profile_image(login: &LoginName) -> Self {
        Self(format!("profiles/{login}_profile.jpg"))
    }

    /// Key for a listed artwork's image.
    pub fn artwork_image(artwork: &ArtworkId) -> Self {
        Self(format!("artworks/{artwork}.jpg"))
    }

    /// Borrow the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable public reference returned by the blob gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageRef(String);

impl ImageRef {
    /// Validate and construct a reference.
    pub fn new(reference: impl Into<String>) -> Result<Self, ImageValidationError> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(ImageValidationError::EmptyReference);
        }
        if reference.chars().count() > IMAGE_REF_MAX {
            return Err(ImageValidationError::ReferenceTooLong { max: IMAGE_REF_MAX });
        }
        Ok(Self(reference))
    }

    /// Borrow the reference text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ImageRef> for String {
    fn from(value: ImageRef) -> Self {
        value.0
    }
}

impl TryFrom<String> for ImageRef {
    type Error = ImageValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
