//! Request handlers

pub mod health;
pub mod party;
pub mod reference;
