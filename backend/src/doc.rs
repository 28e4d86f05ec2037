//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api` handler, the health probes, the
//! request and response DTOs, and the error schema wrappers from
//! [`crate::inbound::http::schemas`]. Swagger UI serves it in debug builds
//! and `cargo run --bin openapi-dump` prints it.

use crate::inbound::http::art::CreateArtworkRequest;
use crate::inbound::http::dto::{
    AccountResponse, AcquisitionResponse, ArtworkResponse, ArtworkSummaryResponse,
    AuthorResponse, BalanceResponse, ProfileResponse, PurchaseResponse, SessionResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{
    LoginRequest, RegisterRequest, TopUpRequest, UpdateProfileRequest,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme in the generated document.
pub const BEARER_SCHEME: &str = "BearerToken";

/// Enrich the generated document with the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /api/auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Art marketplace API",
        description = "Register, list artworks, top up balances and buy art from other users."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::top_up,
        crate::inbound::http::art::create_artwork,
        crate::inbound::http::art::purchase_artwork,
        crate::inbound::http::gallery::list_gallery,
        crate::inbound::http::gallery::get_artwork,
        crate::inbound::http::gallery::list_my_art,
        crate::inbound::http::gallery::list_authors,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        LoginRequest,
        UpdateProfileRequest,
        TopUpRequest,
        CreateArtworkRequest,
        AccountResponse,
        SessionResponse,
        ProfileResponse,
        AcquisitionResponse,
        BalanceResponse,
        ArtworkResponse,
        ArtworkSummaryResponse,
        AuthorResponse,
        PurchaseResponse,
    )),
    tags(
        (name = "users", description = "Registration, login, profile and balance"),
        (name = "art", description = "Listing and purchasing artworks"),
        (name = "gallery", description = "Read-only catalogue views"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::openapi::{get_property, unwrap_object_schema};
    use rstest::rstest;

    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    #[rstest]
    fn error_schema_is_registered_with_wire_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error = unwrap_object_schema(
            schemas.get(ERROR_SCHEMA_NAME).expect("Error schema"),
            ERROR_SCHEMA_NAME,
        );

        for field in ["code", "error", "details", "traceId"] {
            get_property(error, field);
        }
    }

    #[rstest]
    #[case("/api/register")]
    #[case("/api/auth/login")]
    #[case("/api/user")]
    #[case("/api/profile")]
    #[case("/api/user/balance")]
    #[case("/api/art/create")]
    #[case("/api/art/purchase/{artwork_id}")]
    #[case("/api/gallery")]
    #[case("/api/gallery/{artwork_id}")]
    #[case("/api/my-art")]
    #[case("/api/authors")]
    #[case("/health/ready")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    #[case("/api/auth/login", "post", "401")]
    #[case("/api/art/purchase/{artwork_id}", "post", "409")]
    #[case("/api/gallery/{artwork_id}", "get", "400")]
    fn error_responses_reference_the_error_schema(
        #[case] path: &str,
        #[case] method: &str,
        #[case] status: &str,
    ) {
        let doc = serde_json::to_value(ApiDoc::openapi()).expect("serialise document");
        let reference = doc["paths"][path][method]["responses"][status]["content"]
            ["application/json"]["schema"]["$ref"]
            .as_str()
            .expect("schema reference");

        assert_eq!(
            reference,
            format!("#/components/schemas/{ERROR_SCHEMA_NAME}")
        );
    }

    #[rstest]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
    }
}
