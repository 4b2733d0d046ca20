//! Repository implementations
//!
//! Repositories encapsulate the SQL for each table group and map rows to
//! plain row structs. Conversion to domain types happens in `adapters`.
//!
//! Queries are built at runtime with `sqlx::query_as` and `FromRow` rows,
//! so the crate builds without a live database.

pub mod party;
pub mod reference;

pub use party::PartyRepository;
pub use reference::ReferenceDataRepository;
