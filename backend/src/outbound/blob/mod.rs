//! Blob storage outbound adapters.
//!
//! A thin HTTP implementation of the `BlobUploadGateway` port. The
//! reference-only fixture lives beside the port.

mod http_gateway;

pub use http_gateway::HttpBlobUploadGateway;
