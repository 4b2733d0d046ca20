//! PostgreSQL implementations of the party ports
//!
//! Parties, associations and mandates are stored as JSONB documents beside
//! the columns that listing and tenant scoping query on. The adapters map
//! those rows to domain types and repository errors to `PortError`.
//!
//! ```rust,ignore
//! let adapter = PostgresPartyAdapter::new(pool);
//! let person = adapter.get_person(tenant_id, person_id).await?;
//! ```

pub mod party;
pub mod reference;

pub use party::PostgresPartyAdapter;
pub use reference::PostgresReferenceDataAdapter;
