//! Shared helpers for HTTP integration tests over the in-memory store.
//!
//! [`market_state`] wires the real domain services to an
//! [`InMemoryMarketStore`], a fast Argon2 profile and a fixture blob gateway.
//! The request helpers drive an `actix_web::test` service and decode JSON
//! bodies.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test;
use mockable::DefaultClock;
use serde_json::{Value, json};

use artmarket::domain::DEFAULT_OPERATION_TIMEOUT;
use artmarket::domain::ports::FixtureBlobUploadGateway;
use artmarket::inbound::http::state::HttpState;
use artmarket::outbound::auth::{Argon2PasswordHasher, DEFAULT_TOKEN_TTL, JwtSessionTokens};
use artmarket::outbound::memory::InMemoryMarketStore;
use artmarket::server::MarketAdapters;

/// Password shared by every test account.
pub const PASSWORD: &str = "correct horse battery";
/// Smallest valid JPEG-ish payload accepted by the image parser.
pub const IMAGE: &str = "data:image/jpeg;base64,/9j/4A==";

const SECRET: &[u8] = b"integration-test-signing-secret-0123456789";

/// Build HTTP state backed by `store`.
pub fn market_state(store: Arc<InMemoryMarketStore>) -> HttpState {
    let clock = Arc::new(DefaultClock);
    MarketAdapters {
        users: store.clone(),
        catalogue: store.clone(),
        ledger: store,
        hasher: Arc::new(Argon2PasswordHasher::fast_for_tests().expect("hasher")),
        tokens: Arc::new(JwtSessionTokens::new(SECRET, DEFAULT_TOKEN_TTL, clock.clone())),
        blobs: Arc::new(FixtureBlobUploadGateway::new("https://cdn.test/art")),
    }
    .into_http_state(clock, DEFAULT_OPERATION_TIMEOUT)
}

/// Send `request` and decode the JSON body, if any.
pub async fn call_json<S, B>(app: &S, request: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = test::call_service(app, request).await;
    let status = response.status();
    let body = test::read_body(response).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, json)
}

fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

/// Register `login` and return the new user id.
pub async fn register<S, B>(app: &S, login: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({
            "login": login,
            "fullName": format!("{login} Example"),
            "password": PASSWORD,
            "image": IMAGE,
        }))
        .to_request();
    let (status, body) = call_json(app, request).await;
    assert_eq!(status, StatusCode::CREATED, "register {login}: {body}");
    body["id"].as_str().expect("user id").to_owned()
}

/// Log in as `login` and return the bearer token.
pub async fn login<S, B>(app: &S, login: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "login": login, "password": PASSWORD }))
        .to_request();
    let (status, body) = call_json(app, request).await;
    assert_eq!(status, StatusCode::OK, "login {login}: {body}");
    body["token"].as_str().expect("token").to_owned()
}

/// Credit the caller with `amount`.
pub async fn top_up<S, B>(app: &S, token: &str, amount: Value) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = test::TestRequest::post()
        .uri("/api/user/balance")
        .insert_header(bearer(token))
        .set_json(json!({ "amount": amount }))
        .to_request();
    call_json(app, request).await
}

/// Fetch the caller's profile.
pub async fn current_user<S, B>(app: &S, token: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = test::TestRequest::get()
        .uri("/api/user")
        .insert_header(bearer(token))
        .to_request();
    call_json(app, request).await
}

/// Caller's balance as a decimal string.
pub async fn balance<S, B>(app: &S, token: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = current_user(app, token).await;
    assert_eq!(status, StatusCode::OK);
    body["balance"].as_str().expect("balance").to_owned()
}

/// List an artwork at `price` and return its id.
pub async fn list_artwork<S, B>(app: &S, token: &str, price: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let authors = test::TestRequest::get()
        .uri("/api/authors")
        .insert_header(bearer(token))
        .to_request();
    let (_, authors) = call_json(app, authors).await;
    let author = authors[0]["id"].as_str().expect("seeded author").to_owned();

    let request = test::TestRequest::post()
        .uri("/api/art/create")
        .insert_header(bearer(token))
        .set_json(json!({
            "title": "Las dos Fridas",
            "authorId": author,
            "publicationDate": "1939-01-01",
            "price": price,
            "image": IMAGE,
        }))
        .to_request();
    let (status, body) = call_json(app, request).await;
    assert_eq!(status, StatusCode::CREATED, "list artwork: {body}");
    body["id"].as_str().expect("artwork id").to_owned()
}

/// Buy `artwork` as the caller.
pub async fn purchase<S, B>(app: &S, token: &str, artwork: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = test::TestRequest::post()
        .uri(&format!("/api/art/purchase/{artwork}"))
        .insert_header(bearer(token))
        .to_request();
    call_json(app, request).await
}
