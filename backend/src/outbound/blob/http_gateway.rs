//! Reqwest-backed blob upload adapter.
//!
//! Objects are written with `PUT {endpoint}/{key}`; the returned reference
//! is `{public_base_url}/{key}`. The adapter owns transport details only:
//! request timeout, content type and HTTP status mapping.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use crate::domain::ports::{BlobUploadError, BlobUploadGateway};
use crate::domain::{BlobKey, ImagePayload, ImageRef};

const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// Blob gateway that uploads to an HTTP object store.
pub struct HttpBlobUploadGateway {
    client: Client,
    endpoint: Url,
    public_base_url: String,
}

impl HttpBlobUploadGateway {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        public_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn object_url(&self, key: &BlobKey) -> Result<Url, BlobUploadError> {
        let base = self.endpoint.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{key}"))
            .map_err(|err| BlobUploadError::reference(format!("invalid object url: {err}")))
    }

    fn public_reference(&self, key: &BlobKey) -> Result<ImageRef, BlobUploadError> {
        ImageRef::new(format!("{}/{}", self.public_base_url, key))
            .map_err(|err| BlobUploadError::reference(err.to_string()))
    }
}

#[async_trait]
impl BlobUploadGateway for HttpBlobUploadGateway {
    async fn upload(
        &self,
        key: &BlobKey,
        payload: ImagePayload,
    ) -> Result<ImageRef, BlobUploadError> {
        let url = self.object_url(key)?;
        let size = payload.as_bytes().len();
        let response = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, IMAGE_CONTENT_TYPE)
            .body(payload.into_bytes())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status_error(status));
        }
        debug!(%key, size, "uploaded blob");
        self.public_reference(key)
    }
}

fn map_transport_error(error: reqwest::Error) -> BlobUploadError {
    if error.is_timeout() {
        BlobUploadError::transport(format!("upload timed out: {error}"))
    } else {
        BlobUploadError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode) -> BlobUploadError {
    BlobUploadError::rejected(status.as_u16())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArtworkId, LoginName};
    use rstest::{fixture, rstest};

    #[fixture]
    fn gateway() -> HttpBlobUploadGateway {
        HttpBlobUploadGateway::new(
            Url::parse("http://blobs.internal:9000/market/").expect("endpoint"),
            "https://cdn.example.test/market/",
            Duration::from_secs(5),
        )
        .expect("client builds")
    }

    #[rstest]
    fn object_urls_join_endpoint_and_key(gateway: HttpBlobUploadGateway) {
        let key = BlobKey::profile_image(&LoginName::new("frida").expect("login"));
        let url = gateway.object_url(&key).expect("url");
        assert_eq!(
            url.as_str(),
            "http://blobs.internal:9000/market/profiles/frida_profile.jpg"
        );
    }

    #[rstest]
    fn public_references_use_the_public_base(gateway: HttpBlobUploadGateway) {
        let artwork = ArtworkId::random();
        let reference = gateway
            .public_reference(&BlobKey::artwork_image(&artwork))
            .expect("reference");
        assert_eq!(
            reference.as_str(),
            format!("https://cdn.example.test/market/artworks/{artwork}.jpg")
        );
    }

    #[rstest]
    #[case(StatusCode::FORBIDDEN, 403)]
    #[case(StatusCode::PAYLOAD_TOO_LARGE, 413)]
    #[case(StatusCode::BAD_GATEWAY, 502)]
    fn failed_statuses_are_rejections(#[case] status: StatusCode, #[case] code: u16) {
        assert_eq!(map_status_error(status), BlobUploadError::rejected(code));
    }
}
