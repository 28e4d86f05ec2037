//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate
//! with `diesel print-schema` when the migrations change.

diesel::table! {
    /// Registered users. `balance` is guarded by a `CHECK (balance >= 0)`.
    users (id) {
        id -> Uuid,
        /// Unique login (max 50 characters).
        login -> Varchar,
        /// Display name (max 70 characters).
        full_name -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        /// Public profile image reference.
        image_ref -> Varchar,
        /// `NUMERIC(12, 2)`.
        balance -> Numeric,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalogue authors, seeded by migration.
    authors (id) {
        id -> Uuid,
        name -> Varchar,
    }
}

diesel::table! {
    /// Listed artworks.
    artworks (id) {
        id -> Uuid,
        title -> Varchar,
        author_id -> Uuid,
        published_on -> Date,
        /// True while for sale; never reset once false.
        available -> Bool,
        /// `NUMERIC(12, 2)`.
        price -> Numeric,
        image_ref -> Varchar,
        /// Listing user.
        owner_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only purchase ledger. `artwork_id` is unique.
    acquisitions (id) {
        id -> Uuid,
        buyer_id -> Uuid,
        artwork_id -> Uuid,
        acquired_on -> Date,
    }
}

diesel::joinable!(artworks -> authors (author_id));
diesel::joinable!(artworks -> users (owner_id));
diesel::joinable!(acquisitions -> artworks (artwork_id));

diesel::allow_tables_to_appear_in_same_query!(users, authors, artworks, acquisitions);
