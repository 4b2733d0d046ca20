//! Party Management Domain
//!
//! This crate manages persons and organizations (collectively "parties"),
//! the associations between them, the mandates that authorise parties to act
//! for others, and the locale-aware reference data that constrains every
//! code a party may carry.
//!
//! # Architecture
//!
//! - [`person`], [`organization`], [`association`] and [`mandate`] hold the
//!   aggregates and their child collections
//! - [`reference`] defines the reference code lists, [`reference_service`]
//!   serves them through a TTL cache with locale fallback
//! - [`validation`] checks aggregates structurally and against reference data
//! - [`service`] exposes tenant-scoped operations over a [`PartyPort`]
//! - [`codec`] encodes entities as JSON or XML
//!
//! # Examples
//!
//! ```rust
//! use core_kernel::TenantId;
//! use domain_party::person::Person;
//! use domain_party::contact::ContactMechanism;
//!
//! let mut person = Person::new(TenantId::DEFAULT, "");
//! person.given_name = Some("Thandi".to_string());
//! person.surname = Some("Nkosi".to_string());
//! person.update_name();
//! assert_eq!(person.name, "Thandi Nkosi");
//!
//! person.add_contact_mechanism(ContactMechanism::new(
//!     "email_address",
//!     "personal_email_address",
//!     "thandi@example.com",
//! ));
//! assert!(person.contact_mechanism_with_role("personal_email_address").is_some());
//! ```

pub mod address;
pub mod association;
pub mod attribute;
pub mod cache;
pub mod codec;
pub mod contact;
pub mod error;
pub mod identification;
pub mod mandate;
pub mod organization;
pub mod party;
pub mod person;
pub mod person_details;
pub mod ports;
pub mod reference;
pub mod reference_service;
pub mod role;
pub mod service;
pub mod validation;

pub use address::PhysicalAddress;
pub use association::{Association, AssociationProperty};
pub use attribute::{Attribute, Preference};
pub use codec::{CodecError, Format};
pub use contact::ContactMechanism;
pub use error::PartyError;
pub use identification::{ExternalReference, IdentityDocument, ResidencePermit, TaxNumber};
pub use mandate::{Mandatary, Mandate, MandateProperty};
pub use organization::Organization;
pub use party::{PageRequest, Party, PartyPage, PartyType, SortDirection, MAX_PAGE_SIZE};
pub use person::Person;
pub use person_details::{
    Education, Employment, LanguageProficiency, NextOfKin, ProficiencyLevel, Skill, SourceOfFunds,
    SourceOfWealth,
};
pub use ports::{PartyPort, ReferenceDataPort};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{InMemoryPartyPort, InMemoryReferenceDataPort};
pub use reference::{
    ConstraintType, ReferenceCode, ReferenceDataKind, RoleTypeAttributeTypeConstraint,
    RoleTypePreferenceTypeConstraint, ValueType,
};
pub use reference_service::{PartyReferenceService, DEFAULT_LOCALE};
pub use role::{Consent, Lock, Role, SegmentAllocation, Status};
pub use service::PartyService;
pub use validation::{PartyValidator, ValidationIssue, ValidationResult};
