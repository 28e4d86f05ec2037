//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL through `diesel-async` and `bb8` connection pooling.
//!
//! - Repository implementations only translate between Diesel rows and
//!   domain types. The purchase rules live in [`crate::domain::settle`].
//! - Row structs (`models.rs`) and the table definitions (`schema.rs`) stay
//!   private to this module.
//! - Database failures are mapped onto each port's error enum.
//!
//! # Example
//!
//! ```ignore
//! use artmarket::outbound::persistence::{DbPool, DieselLedgerRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/market")).await?;
//! let ledger = DieselLedgerRepository::new(pool);
//! ```

mod diesel_catalogue_repository;
mod diesel_error_mapping;
mod diesel_ledger_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_catalogue_repository::DieselCatalogueRepository;
pub use diesel_ledger_repository::DieselLedgerRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
