//! Account API handlers.
//!
//! ```text
//! POST /api/register {"login":"frida","fullName":"Frida Kahlo","password":"…","image":"<base64>"}
//! POST /api/auth/login {"login":"frida","password":"…"}
//! GET /api/user
//! PUT /api/profile {"login":"frida","fullName":"…","currentPassword":"…","image":null}
//! POST /api/user/balance {"amount":"25.00"}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{ProfileChange, RegistrationRequest};
use crate::domain::{CredentialsValidationError, Error, LoginCredentials};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::AuthenticatedUser;
use crate::inbound::http::dto::{
    AccountResponse, BalanceResponse, ProfileResponse, SessionResponse,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_amount, parse_full_name, parse_image, parse_login, parse_optional_image,
    parse_password, require,
};

const LOGIN: FieldName = FieldName::new("login");
const FULL_NAME: FieldName = FieldName::new("fullName");
const PASSWORD: FieldName = FieldName::new("password");
const CURRENT_PASSWORD: FieldName = FieldName::new("currentPassword");
const IMAGE: FieldName = FieldName::new("image");
const AMOUNT: FieldName = FieldName::new("amount");

/// Registration body for `POST /api/register`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "frida")]
    pub login: Option<String>,
    #[schema(example = "Frida Kahlo")]
    pub full_name: Option<String>,
    pub password: Option<String>,
    /// Base64 JPEG, optionally as a `data:` URL.
    pub image: Option<String>,
}

impl TryFrom<RegisterRequest> for RegistrationRequest {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            login: parse_login(value.login, LOGIN)?,
            full_name: parse_full_name(value.full_name, FULL_NAME)?,
            password: parse_password(value.password, PASSWORD)?,
            image: parse_image(value.image, IMAGE)?,
        })
    }
}

/// Login body for `POST /api/auth/login`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "frida")]
    pub login: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        let login_text = require(value.login, LOGIN)?;
        let password = require(value.password, PASSWORD)?;
        Self::try_from_parts(&login_text, &password).map_err(map_credentials_error)
    }
}

fn map_credentials_error(err: CredentialsValidationError) -> Error {
    match err {
        CredentialsValidationError::Login(inner) => {
            Error::invalid_request(format!("login: {inner}"))
                .with_details(json!({ "field": "login", "code": "invalid_login" }))
        }
        CredentialsValidationError::EmptyPassword => {
            Error::invalid_request("password must not be empty")
                .with_details(json!({ "field": "password", "code": "missing_field" }))
        }
    }
}

/// Profile edit body for `PUT /api/profile`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub login: Option<String>,
    pub full_name: Option<String>,
    /// Re-confirms the caller's identity.
    pub current_password: Option<String>,
    /// Replacement image; omit to keep the current one.
    pub image: Option<String>,
}

impl TryFrom<UpdateProfileRequest> for ProfileChange {
    type Error = Error;

    fn try_from(value: UpdateProfileRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            login: parse_login(value.login, LOGIN)?,
            full_name: parse_full_name(value.full_name, FULL_NAME)?,
            current_password: parse_password(value.current_password, CURRENT_PASSWORD)?,
            image: parse_optional_image(value.image, IMAGE)?,
        })
    }
}

/// Top-up body for `POST /api/user/balance`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopUpRequest {
    /// Positive amount as a JSON number or decimal string.
    #[schema(value_type = String, example = "25.00")]
    pub amount: Option<serde_json::Value>,
}

/// Register a new user with a profile image.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = AccountResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Login already taken", body = ErrorSchema),
        (status = 502, description = "Image upload failed", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let request = RegistrationRequest::try_from(payload.into_inner())?;
    let account = state.accounts.register(request).await?;
    Ok(HttpResponse::Created().json(AccountResponse::from(account)))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = SessionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<SessionResponse>> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let grant = state.accounts.login(credentials).await?;
    Ok(web::Json(grant.into()))
}

/// The caller's profile and purchased artworks.
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/user")]
pub async fn current_user(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<ProfileResponse>> {
    let profile = state.profiles.fetch_profile(user.id()).await?;
    Ok(web::Json(profile.into()))
}

/// Edit login, display name or image after re-confirming the password.
#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Login already taken", body = ErrorSchema),
        (status = 502, description = "Image upload failed", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<AccountResponse>> {
    let change = ProfileChange::try_from(payload.into_inner())?;
    let account = state.accounts.update_profile(user.id(), change).await?;
    Ok(web::Json(account.into()))
}

/// Credit the caller's balance.
#[utoipa::path(
    post,
    path = "/api/user/balance",
    request_body = TopUpRequest,
    responses(
        (status = 200, description = "New balance", body = BalanceResponse),
        (status = 400, description = "Invalid amount", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "topUpBalance"
)]
#[post("/user/balance")]
pub async fn top_up(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<TopUpRequest>,
) -> ApiResult<web::Json<BalanceResponse>> {
    let amount = parse_amount(payload.into_inner().amount, AMOUNT)?;
    let balance = state.trades.credit(user.id(), amount).await?;
    Ok(web::Json(BalanceResponse {
        balance: balance.to_string(),
    }))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
