//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::domain::UserId;
use crate::domain::ports::{
    MockAccountCommand, MockGalleryQuery, MockListingCommand, MockProfileQuery,
    MockSessionVerifier, MockTradeCommand,
};
use crate::domain::Error;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Token accepted by [`verifier_for`].
pub const TEST_TOKEN: &str = "test-token";

/// Build state from unconfigured mocks, letting the caller swap in the ports
/// a test exercises.
pub fn state_with(configure: impl FnOnce(&mut HttpStatePorts)) -> HttpState {
    let mut ports = HttpStatePorts {
        accounts: Arc::new(MockAccountCommand::new()),
        sessions: Arc::new(MockSessionVerifier::new()),
        trades: Arc::new(MockTradeCommand::new()),
        listings: Arc::new(MockListingCommand::new()),
        profiles: Arc::new(MockProfileQuery::new()),
        gallery: Arc::new(MockGalleryQuery::new()),
    };
    configure(&mut ports);
    HttpState::new(ports)
}

/// Session verifier accepting [`TEST_TOKEN`] as `user`.
pub fn verifier_for(user: UserId) -> Arc<MockSessionVerifier> {
    let mut sessions = MockSessionVerifier::new();
    sessions.expect_verify().returning(move |token| {
        if token == TEST_TOKEN {
            Ok(user)
        } else {
            Err(Error::unauthorized("session token invalid").with_reason("token_malformed"))
        }
    });
    Arc::new(sessions)
}

/// `Authorization` header carrying [`TEST_TOKEN`].
pub fn bearer_header() -> (&'static str, String) {
    ("Authorization", format!("Bearer {TEST_TOKEN}"))
}

/// The full `/api` surface over the given state.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .configure(crate::inbound::http::configure_api)
}
