//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: single-process store used without a database
//! - **blob**: HTTP object storage for uploaded images
//! - **auth**: Argon2id password hashing and JWT session tokens
//!
//! Adapters are thin translators between domain types and
//! infrastructure-specific representations. The purchase rules they apply
//! come from the domain.

pub mod auth;
pub mod blob;
pub mod memory;
pub mod persistence;
