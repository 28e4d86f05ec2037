//! Bearer-token authentication for HTTP handlers.
//!
//! [`AuthenticatedUser`] reads `Authorization: Bearer <token>`, verifies the
//! token through the [`SessionVerifier`](crate::domain::ports::SessionVerifier)
//! held in [`HttpState`] and hands the handler a verified user id.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::{Error, UserId};
use crate::inbound::http::state::HttpState;

const BEARER_SCHEME: &str = "bearer";

/// The caller identified by a valid bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    /// Verified user id.
    pub fn id(&self) -> &UserId {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token").with_reason("missing_token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header").with_reason("malformed"))?;
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized("malformed authorization header").with_reason("malformed"))?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(Error::unauthorized("unsupported authorization scheme").with_reason("wrong_scheme"));
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::unauthorized("missing bearer token").with_reason("missing_token"));
    }
    Ok(token)
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state not configured"))?;
    let token = bearer_token(req)
        .inspect_err(|error| debug!(reason = ?error.reason(), "bearer credentials rejected"))?;
    state.sessions.verify(token).map(AuthenticatedUser)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockSessionVerifier;
    use crate::inbound::http::test_utils::state_with;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use actix_web::{App, HttpResponse};
    use rstest::rstest;

    const USER: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn verifier() -> MockSessionVerifier {
        let mut sessions = MockSessionVerifier::new();
        sessions.expect_verify().returning(|token| match token {
            "good" => Ok(UserId::new(USER).expect("fixture id")),
            _ => Err(Error::unauthorized("token expired").with_reason("expired")),
        });
        sessions
    }

    async fn call(header: Option<&str>) -> (StatusCode, Option<String>) {
        let state = state_with(|ports| ports.sessions = std::sync::Arc::new(verifier()));
        let app = actix_test::init_service(App::new().app_data(web::Data::new(state)).route(
            "/whoami",
            web::get().to(|user: AuthenticatedUser| async move {
                HttpResponse::Ok().body(user.id().to_string())
            }),
        ))
        .await;
        let mut request = actix_test::TestRequest::get().uri("/whoami");
        if let Some(value) = header {
            request = request.insert_header((AUTHORIZATION, value));
        }
        let response = actix_test::call_service(&app, request.to_request()).await;
        let status = response.status();
        let body = actix_test::read_body(response).await;
        let text = String::from_utf8(body.to_vec()).ok();
        (status, text)
    }

    #[rstest]
    #[case("Bearer good")]
    #[case("bearer good")]
    #[case("BEARER   good ")]
    #[actix_web::test]
    async fn valid_tokens_yield_the_user(#[case] header: &str) {
        let (status, body) = call(Some(header)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_deref(), Some(USER));
    }

    #[rstest]
    #[case(None, "missing_token")]
    #[case(Some("Basic Zm9vOmJhcg=="), "wrong_scheme")]
    #[case(Some("Bearer"), "malformed")]
    #[case(Some("Bearer   "), "malformed")]
    #[case(Some("Bearer stale"), "expired")]
    #[actix_web::test]
    async fn invalid_credentials_are_unauthorised(
        #[case] header: Option<&str>,
        #[case] reason: &str,
    ) {
        let (status, body) = call(header).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let error: serde_json::Value =
            serde_json::from_str(body.as_deref().unwrap_or_default()).expect("json body");
        assert_eq!(error["code"], "unauthorized");
        assert_eq!(error["details"]["code"], reason);
    }

    #[rstest]
    fn missing_state_is_an_internal_error() {
        let req = actix_test::TestRequest::get()
            .insert_header((AUTHORIZATION, "Bearer good"))
            .to_http_request();
        let error = authenticate(&req).expect_err("no state");
        assert_eq!(error.code(), ErrorCode::InternalError);
    }
}
