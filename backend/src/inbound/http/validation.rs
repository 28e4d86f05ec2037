//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request DTOs carry optional raw fields; these helpers turn them into
//! domain values and build `invalid_request` errors whose details name the
//! offending field and a machine-readable code.

use serde_json::{Value, json};
use uuid::Uuid;

use crate::domain::{
    ArtworkTitle, Error, FullName, ImagePayload, LoginName, Money, Password,
    parse_publication_date,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    MissingField,
    InvalidLogin,
    InvalidFullName,
    InvalidPassword,
    InvalidImage,
    InvalidTitle,
    InvalidDate,
    InvalidPrice,
    InvalidAmount,
    InvalidUuid,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidLogin => "invalid_login",
            Self::InvalidFullName => "invalid_full_name",
            Self::InvalidPassword => "invalid_password",
            Self::InvalidImage => "invalid_image",
            Self::InvalidTitle => "invalid_title",
            Self::InvalidDate => "invalid_date",
            Self::InvalidPrice => "invalid_price",
            Self::InvalidAmount => "amount",
            Self::InvalidUuid => "invalid_uuid",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": ValidationCode::MissingField.as_str(),
    }))
}

pub(crate) fn invalid_field_error(
    field: FieldName,
    code: ValidationCode,
    message: impl std::fmt::Display,
) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field}: {message}")).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

/// Unwrap a required field or fail with `missing_field`.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Unwrap a required string, treating blank text as missing.
pub(crate) fn require_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(missing_field_error(field)),
    }
}

pub(crate) fn parse_login(value: Option<String>, field: FieldName) -> Result<LoginName, Error> {
    let raw = require_text(value, field)?;
    LoginName::new(raw.trim()).map_err(|err| invalid_field_error(field, ValidationCode::InvalidLogin, err))
}

pub(crate) fn parse_full_name(value: Option<String>, field: FieldName) -> Result<FullName, Error> {
    let raw = require_text(value, field)?;
    FullName::new(raw).map_err(|err| invalid_field_error(field, ValidationCode::InvalidFullName, err))
}

pub(crate) fn parse_password(value: Option<String>, field: FieldName) -> Result<Password, Error> {
    let raw = require(value, field)?;
    Password::new(&raw).map_err(|_| missing_field_error(field))
}

pub(crate) fn parse_image(value: Option<String>, field: FieldName) -> Result<ImagePayload, Error> {
    let raw = require_text(value, field)?;
    ImagePayload::from_base64(&raw)
        .map_err(|err| invalid_field_error(field, ValidationCode::InvalidImage, err))
}

pub(crate) fn parse_optional_image(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<ImagePayload>, Error> {
    match value {
        Some(raw) if !raw.trim().is_empty() => parse_image(Some(raw), field).map(Some),
        _ => Ok(None),
    }
}

pub(crate) fn parse_title(value: Option<String>, field: FieldName) -> Result<ArtworkTitle, Error> {
    let raw = require_text(value, field)?;
    ArtworkTitle::new(raw).map_err(|err| invalid_field_error(field, ValidationCode::InvalidTitle, err))
}

pub(crate) fn parse_date(
    value: Option<String>,
    field: FieldName,
) -> Result<chrono::NaiveDate, Error> {
    let raw = require_text(value, field)?;
    parse_publication_date(&raw)
        .map_err(|err| invalid_field_error(field, ValidationCode::InvalidDate, err))
}

fn money_from_json(value: &Value) -> Option<Result<Money, crate::domain::MoneyError>> {
    match value {
        Value::Number(number) => Some(number.to_string().parse()),
        Value::String(text) => Some(text.parse()),
        _ => None,
    }
}

/// Parse a price: a JSON number or decimal string, zero allowed.
pub(crate) fn parse_price(value: Option<Value>, field: FieldName) -> Result<Money, Error> {
    let raw = require(value.filter(|v| !v.is_null()), field)?;
    match money_from_json(&raw) {
        Some(Ok(price)) => Ok(price),
        Some(Err(err)) => Err(invalid_field_error(field, ValidationCode::InvalidPrice, err)),
        None => Err(invalid_field_error(
            field,
            ValidationCode::InvalidPrice,
            "must be a number or decimal string",
        )),
    }
}

/// Parse a top-up amount: positive, at most two fractional digits.
pub(crate) fn parse_amount(value: Option<Value>, field: FieldName) -> Result<Money, Error> {
    let raw = require(value.filter(|v| !v.is_null()), field)?;
    match money_from_json(&raw) {
        Some(Ok(amount)) if !amount.is_zero() => Ok(amount),
        Some(Ok(_)) => Err(invalid_field_error(
            field,
            ValidationCode::InvalidAmount,
            "must be greater than zero",
        )),
        Some(Err(err)) => Err(invalid_field_error(field, ValidationCode::InvalidAmount, err)),
        None => Err(invalid_field_error(
            field,
            ValidationCode::InvalidAmount,
            "must be a number or decimal string",
        )),
    }
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim())
        .map_err(|_| invalid_field_error(field, ValidationCode::InvalidUuid, "must be a valid UUID"))
}
