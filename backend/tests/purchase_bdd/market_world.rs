//! Server harness and shared world for the purchase scenarios.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. Dropping the [`WorldFixture`] stops
//! the server even if a step panics.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::ServerHandle;
use actix_web::{HttpServer, web};
use reqwest::{Client, Method};
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

use artmarket::domain::TRACE_ID_HEADER;
use artmarket::inbound::http::health::HealthState;
use artmarket::outbound::memory::InMemoryMarketStore;
use artmarket::server::build_app;

use crate::support::{IMAGE, PASSWORD, market_state};

/// Outcome of the most recent request.
pub(crate) struct LastResponse {
    pub(crate) status: u16,
    pub(crate) body: Value,
    pub(crate) trace_id: Option<String>,
}

pub(crate) struct MarketWorld {
    runtime: Runtime,
    local: LocalSet,
    base_url: String,
    server: ServerHandle,
    client: Client,
    tokens: HashMap<String, String>,
    pub(crate) artwork: Option<String>,
    pub(crate) last: Option<LastResponse>,
}

pub(crate) struct WorldFixture {
    world: RefCell<MarketWorld>,
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        let ctx = self.world.borrow();
        let server = ctx.server.clone();
        ctx.local.block_on(&ctx.runtime, async move {
            server.stop(true).await;
        });
    }
}

async fn spawn_market_server() -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;

    let health = web::Data::new(HealthState::new());
    health.mark_ready();
    let state = web::Data::new(market_state(Arc::new(InMemoryMarketStore::new())));

    let server = HttpServer::new(move || build_app(health.clone(), state.clone()))
        .disable_signals()
        .workers(1)
        .listen(listener)
        .map_err(|err| err.to_string())?
        .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);
    Ok((format!("http://{addr}"), handle))
}

/// Start a fresh marketplace with an empty in-memory store.
pub(crate) fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();
    let (base_url, server) = local
        .block_on(&runtime, spawn_market_server())
        .expect("spawn server");

    WorldFixture {
        world: RefCell::new(MarketWorld {
            runtime,
            local,
            base_url,
            server,
            client: Client::new(),
            tokens: HashMap::new(),
            artwork: None,
            last: None,
        }),
    }
}

impl WorldFixture {
    /// Send a JSON request, optionally as `login`, and return the response.
    fn send(&self, method: Method, path: &str, as_user: Option<&str>, body: Option<Value>) -> LastResponse {
        let ctx = self.world.borrow();
        let token = as_user.map(|login| ctx.tokens.get(login).cloned().expect("known user"));
        let mut request = ctx.client.request(method, format!("{}{path}", ctx.base_url));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        ctx.local.block_on(&ctx.runtime, async move {
            let response = request.send().await.expect("request");
            let status = response.status().as_u16();
            let trace_id = response
                .headers()
                .get(TRACE_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let text = response.text().await.expect("body");
            let body = if text.is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text).expect("JSON body")
            };
            LastResponse {
                status,
                body,
                trace_id,
            }
        })
    }

    fn expect_status(response: &LastResponse, status: u16, label: &str) {
        assert_eq!(response.status, status, "{label}: {}", response.body);
    }

    /// Register `login`, sign in and credit `amount` when it is positive.
    pub(crate) fn create_user(&self, login: &str, amount: &str) {
        let registered = self.send(
            Method::POST,
            "/api/register",
            None,
            Some(json!({
                "login": login,
                "fullName": format!("{login} Example"),
                "password": PASSWORD,
                "image": IMAGE,
            })),
        );
        Self::expect_status(&registered, 201, "register");

        let session = self.send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "login": login, "password": PASSWORD })),
        );
        Self::expect_status(&session, 200, "login");
        let token = session.body["token"].as_str().expect("token").to_owned();
        self.world.borrow_mut().tokens.insert(login.to_owned(), token);

        let zero = amount
            .parse::<artmarket::domain::Money>()
            .expect("amount")
            .is_zero();
        if !zero {
            let credited = self.send(
                Method::POST,
                "/api/user/balance",
                Some(login),
                Some(json!({ "amount": amount })),
            );
            Self::expect_status(&credited, 200, "top up");
        }
    }

    /// List an artwork owned by `login` and remember its id.
    pub(crate) fn list_artwork(&self, login: &str, price: &str) {
        let authors = self.send(Method::GET, "/api/authors", Some(login), None);
        let author = authors.body[0]["id"].as_str().expect("author").to_owned();
        let listed = self.send(
            Method::POST,
            "/api/art/create",
            Some(login),
            Some(json!({
                "title": "La columna rota",
                "authorId": author,
                "publicationDate": "1944-01-01",
                "price": price,
                "image": IMAGE,
            })),
        );
        Self::expect_status(&listed, 201, "list artwork");
        let id = listed.body["id"].as_str().expect("artwork id").to_owned();
        self.world.borrow_mut().artwork = Some(id);
    }

    /// Attempt to buy the remembered artwork as `login`.
    pub(crate) fn buy(&self, login: &str) {
        let artwork = self.world.borrow().artwork.clone().expect("listed artwork");
        let response = self.send(
            Method::POST,
            &format!("/api/art/purchase/{artwork}"),
            Some(login),
            None,
        );
        self.world.borrow_mut().last = Some(response);
    }

    /// Current balance of `login`.
    pub(crate) fn balance(&self, login: &str) -> String {
        let profile = self.send(Method::GET, "/api/user", Some(login), None);
        Self::expect_status(&profile, 200, "profile");
        profile.body["balance"].as_str().expect("balance").to_owned()
    }

    /// Profile of `login`.
    pub(crate) fn profile(&self, login: &str) -> Value {
        self.send(Method::GET, "/api/user", Some(login), None).body
    }

    /// Detail of the remembered artwork as seen by `login`.
    pub(crate) fn artwork_detail(&self, login: &str) -> Value {
        let artwork = self.world.borrow().artwork.clone().expect("listed artwork");
        self.send(Method::GET, &format!("/api/gallery/{artwork}"), Some(login), None)
            .body
    }

    /// Run `check` against the last response.
    pub(crate) fn with_last<R>(&self, check: impl FnOnce(&LastResponse) -> R) -> R {
        let ctx = self.world.borrow();
        check(ctx.last.as_ref().expect("a purchase was attempted"))
    }

    /// Remembered artwork id.
    pub(crate) fn artwork(&self) -> String {
        self.world.borrow().artwork.clone().expect("listed artwork")
    }
}
