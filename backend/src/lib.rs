//! Digital-art marketplace backend.
//!
//! Users register, list artworks, top up balances and buy art from each
//! other. Purchases move money and ownership in one atomic step.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
