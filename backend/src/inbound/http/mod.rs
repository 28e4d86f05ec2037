//! HTTP inbound adapter exposing REST endpoints under `/api`.

pub mod art;
pub mod bearer;
pub mod dto;
pub mod error;
pub mod gallery;
pub mod health;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod token_config;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

use crate::domain::Error;

/// Largest accepted JSON body; image payloads travel base64-encoded.
pub const JSON_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// JSON extractor settings that report malformed bodies as `invalid_request`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err, _req| {
            Error::invalid_request(format!("invalid JSON body: {err}"))
                .with_reason("malformed_body")
                .into()
        })
}

/// Register the `/api` scope with every marketplace endpoint.
///
/// Handlers read [`state::HttpState`] from app data, which the caller must
/// register.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .service(users::register)
            .service(users::login)
            .service(users::current_user)
            .service(users::update_profile)
            .service(users::top_up)
            .service(art::create_artwork)
            .service(art::purchase_artwork)
            .service(gallery::list_gallery)
            .service(gallery::get_artwork)
            .service(gallery::list_my_art)
            .service(gallery::list_authors),
    );
}
