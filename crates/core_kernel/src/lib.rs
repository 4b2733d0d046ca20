//! Core Kernel - Foundational types shared by the party system crates
//!
//! This crate provides the building blocks used across the workspace:
//! - Strongly-typed identifiers for parties, tenants and party records
//! - The unified `PortError` returned by every port implementation
//! - Marker and health-check traits for ports and adapters

pub mod identifiers;
pub mod ports;

pub use identifiers::{
    IdParseError, PartyId, TenantId, AssociationId, MandateId,
    EducationId, EmploymentId, NextOfKinId, PhysicalAddressId,
};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
