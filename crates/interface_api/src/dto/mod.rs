//! Request and response data transfer objects
//!
//! Persons, organizations, associations and mandates travel as their domain
//! types; this module only holds the query strings and envelopes around them.

pub mod party;
pub mod reference;
