//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL persistence for the party domain using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. Repositories in [`repositories`]
//! work with plain row types; adapters in [`adapters`] implement the domain
//! ports on top of them and translate errors into `PortError`.
//!
//! # Storage Model
//!
//! Persons, organizations, associations and mandates are stored as JSONB
//! documents next to the columns used for lookup, filtering and sorting.
//! Mandataries live in their own table so that deleting a party removes it
//! from every mandate.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool_from_url, run_migrations, adapters::PostgresPartyAdapter};
//!
//! let pool = create_pool_from_url("postgres://localhost/party").await?;
//! run_migrations(&pool).await?;
//! let adapter = PostgresPartyAdapter::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{PostgresPartyAdapter, PostgresReferenceDataAdapter};
pub use error::{DatabaseError, IntegrityRule};
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool, MIGRATOR};
