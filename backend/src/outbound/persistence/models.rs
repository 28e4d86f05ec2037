//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::schema::{acquisitions, artworks, authors, users};

/// User columns exposed to the domain; credentials are selected separately.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub login: String,
    pub full_name: String,
    pub image_ref: String,
    pub balance: Decimal,
}

/// Credential lookup row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialRow {
    pub id: Uuid,
    pub password_hash: String,
}

/// Insertable struct for registration.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub login: &'a str,
    pub full_name: &'a str,
    pub password_hash: &'a str,
    pub image_ref: &'a str,
    pub balance: Decimal,
}

/// Changeset for profile edits; a `None` image leaves the column untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct ProfileChangeset<'a> {
    pub login: &'a str,
    pub full_name: &'a str,
    pub image_ref: Option<&'a str>,
}

/// Balance row locked during a purchase.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BalanceRow {
    pub id: Uuid,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = authors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AuthorRow {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = artworks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ArtworkRow {
    pub id: Uuid,
    pub title: String,
    pub author_id: Uuid,
    pub published_on: NaiveDate,
    pub available: bool,
    pub price: Decimal,
    pub image_ref: String,
    pub owner_id: Uuid,
}

/// Artwork columns read under `FOR UPDATE` by the purchase transaction.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = artworks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SaleRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub price: Decimal,
    pub available: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = artworks)]
pub(crate) struct NewArtworkRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub author_id: Uuid,
    pub published_on: NaiveDate,
    pub available: bool,
    pub price: Decimal,
    pub image_ref: &'a str,
    pub owner_id: Uuid,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = acquisitions)]
pub(crate) struct NewAcquisitionRow {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub artwork_id: Uuid,
    pub acquired_on: NaiveDate,
}
