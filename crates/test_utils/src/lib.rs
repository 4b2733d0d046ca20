//! Shared test support for the party crates
//!
//! `fixtures` holds the seed reference codes and [`PartyHarness`], an
//! in-memory service stack. `builders` produce valid parties and
//! relationships that tests then bend into invalid shapes. `database` starts
//! PostgreSQL containers for the adapter tests, `assertions` checks
//! validation and paging results, and `generators` feeds proptest and `fake`.

pub mod assertions;
pub mod builders;
pub mod database;
pub mod fixtures;
pub mod generators;

pub use assertions::*;
pub use builders::*;
pub use database::*;
pub use fixtures::*;
pub use generators::*;
