//! Port for storing uploaded images outside the database.

use async_trait::async_trait;

use crate::domain::{BlobKey, ImagePayload, ImageRef};

use super::define_port_error;

define_port_error! {
    /// Errors raised by blob storage adapters.
    pub enum BlobUploadError {
        /// The storage endpoint could not be reached or timed out.
        Transport { message: String } => "blob upload transport failed: {message}",
        /// The storage endpoint refused the upload.
        Rejected { status: u16 } => "blob upload rejected with status {status}",
        /// The adapter could not build a reference for the stored object.
        Reference { message: String } => "blob reference invalid: {message}",
    }
}

/// Uploads image payloads and returns stable public references.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobUploadGateway: Send + Sync {
    /// Store `payload` under `key`. Re-uploading a key replaces the object.
    async fn upload(&self, key: &BlobKey, payload: ImagePayload)
    -> Result<ImageRef, BlobUploadError>;
}

/// Gateway that stores nothing and returns `{base}/{key}` references.
///
/// Used when no blob endpoint is configured.
#[derive(Debug, Clone)]
pub struct FixtureBlobUploadGateway {
    base: String,
}

impl FixtureBlobUploadGateway {
    /// Create a fixture that prefixes keys with `base`.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_owned(),
        }
    }
}

impl Default for FixtureBlobUploadGateway {
    fn default() -> Self {
        Self::new("/images")
    }
}

#[async_trait]
impl BlobUploadGateway for FixtureBlobUploadGateway {
    async fn upload(
        &self,
        key: &BlobKey,
        _payload: ImagePayload,
    ) -> Result<ImageRef, BlobUploadError> {
        ImageRef::new(format!("{}/{}", self.base, key))
            .map_err(|err| BlobUploadError::reference(err.to_string()))
    }
}
