//! Test Fixtures
//!
//! Provides seed reference data, fixed identifiers and ready-wired services
//! for tests that need a working party domain without a database.

use std::sync::Arc;

use chrono::NaiveDate;
use core_kernel::{PartyId, TenantId};
use domain_party::{
    ConstraintType, InMemoryPartyPort, InMemoryReferenceDataPort, PartyReferenceService,
    PartyService, PartyType, ReferenceCode, ReferenceDataKind, RoleTypeAttributeTypeConstraint,
    ValueType,
};
use uuid::Uuid;

/// Locale the seed codes are published in
pub const SEED_LOCALE: &str = "en-US";

/// Second locale carried by a subset of the seed codes
pub const ALTERNATE_LOCALE: &str = "af-ZA";

/// Fixed tenants
pub struct TenantFixtures;

impl TenantFixtures {
    /// The default tenant
    pub fn default_tenant() -> TenantId {
        TenantId::DEFAULT
    }

    /// A stable non-default tenant
    pub fn other_tenant() -> TenantId {
        TenantId::from(Uuid::from_u128(0x7e4a_0000_0000_0000_0000_0000_0000_0001))
    }
}

/// Fixed identifiers and dates
pub struct IdFixtures;

impl IdFixtures {
    /// A party id that is never stored
    pub fn unknown_party_id() -> PartyId {
        PartyId::from(Uuid::from_u128(0xdead_beef))
    }

    /// A date of birth for an adult
    pub fn adult_birth_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(1985, 6, 15).unwrap_or_default()
    }
}

/// Seed reference codes
pub struct ReferenceFixtures;

impl ReferenceFixtures {
    fn code(kind: ReferenceDataKind, code: &str, name: &str) -> ReferenceCode {
        ReferenceCode::new(kind, code, SEED_LOCALE, name)
    }

    /// Reference codes covering every value the builders produce
    pub fn codes() -> Vec<ReferenceCode> {
        use ReferenceDataKind::*;

        let code = Self::code;

        vec![
            code(Gender, "female", "Female").with_sort_index(1),
            code(Gender, "male", "Male").with_sort_index(2),
            ReferenceCode::new(Gender, "female", ALTERNATE_LOCALE, "Vroulik").with_sort_index(1),
            ReferenceCode::new(Gender, "male", ALTERNATE_LOCALE, "Manlik").with_sort_index(2),
            code(Title, "mr", "Mr"),
            code(Title, "ms", "Ms"),
            code(Title, "dr", "Dr"),
            code(Country, "ZA", "South Africa"),
            code(Country, "GB", "United Kingdom"),
            code(Country, "US", "United States"),
            code(MaritalStatus, "single", "Single"),
            code(MaritalStatus, "married", "Married"),
            code(MarriageType, "in_community_of_property", "In Community Of Property")
                .with_parent("married"),
            code(ContactMechanismType, "email_address", "Email Address"),
            code(ContactMechanismType, "mobile_number", "Mobile Number"),
            code(ContactMechanismRole, "personal_email_address", "Personal Email Address")
                .with_parent("email_address")
                .with_party_types(&[PartyType::Person]),
            code(ContactMechanismRole, "personal_mobile_number", "Personal Mobile Number")
                .with_parent("mobile_number")
                .with_party_types(&[PartyType::Person]),
            code(ContactMechanismRole, "main_email_address", "Main Email Address")
                .with_parent("email_address")
                .with_party_types(&[PartyType::Organization]),
            code(ContactMechanismPurpose, "marketing", "Marketing"),
            code(PhysicalAddressType, "street", "Street"),
            code(PhysicalAddressType, "unstructured", "Unstructured"),
            code(PhysicalAddressRole, "residential", "Residential")
                .with_party_types(&[PartyType::Person]),
            code(PhysicalAddressRole, "business", "Business"),
            code(PhysicalAddressPurpose, "correspondence", "Correspondence"),
            code(RoleType, "customer", "Customer"),
            code(RoleType, "employer", "Employer").with_party_types(&[PartyType::Organization]),
            code(AttributeType, "height", "Height").with_value_type(ValueType::Decimal),
            code(AttributeType, "employee_count", "Employee Count")
                .with_value_type(ValueType::Integer)
                .with_party_types(&[PartyType::Organization]),
            code(PreferenceType, "correspondence_language", "Correspondence Language"),
            code(SourceOfFundsType, "salary", "Salary"),
            code(SourceOfFundsType, "savings", "Savings"),
            code(AssociationType, "employer_of", "Employer Of"),
            code(AssociationType, "spouse_of", "Spouse Of"),
            code(MandateType, "power_of_attorney", "Power Of Attorney"),
            code(MandataryRole, "attorney", "Attorney"),
        ]
    }

    /// Role type constraints applied to the seed codes
    pub fn attribute_constraints() -> Vec<RoleTypeAttributeTypeConstraint> {
        vec![RoleTypeAttributeTypeConstraint::new(
            "employer",
            "employee_count",
            ConstraintType::Required,
            None,
        )]
    }
}

/// A party service wired over in-memory ports seeded with [`ReferenceFixtures`]
pub struct PartyHarness {
    pub party_port: Arc<InMemoryPartyPort>,
    pub reference_port: Arc<InMemoryReferenceDataPort>,
    pub reference: Arc<PartyReferenceService>,
    pub service: PartyService,
}

impl PartyHarness {
    /// Builds the harness with the seed reference data
    pub async fn new() -> Self {
        let reference_port = Arc::new(InMemoryReferenceDataPort::with_codes(ReferenceFixtures::codes()).await);
        for constraint in ReferenceFixtures::attribute_constraints() {
            reference_port.add_attribute_constraint(constraint).await;
        }

        let party_port = Arc::new(InMemoryPartyPort::new());
        let reference = Arc::new(PartyReferenceService::new(reference_port.clone()));
        let service = PartyService::new(party_port.clone(), reference.clone());

        Self {
            party_port,
            reference_port,
            reference,
            service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenants_are_distinct() {
        assert_ne!(TenantFixtures::default_tenant(), TenantFixtures::other_tenant());
    }

    #[test]
    fn test_seed_codes_are_unique_per_locale() {
        let codes = ReferenceFixtures::codes();
        let mut keys: Vec<_> = codes
            .iter()
            .map(|c| (c.kind, c.code.clone(), c.locale_id.clone()))
            .collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }

    #[tokio::test]
    async fn test_harness_serves_seed_codes() {
        let harness = PartyHarness::new().await;
        assert!(harness
            .reference
            .is_valid(ReferenceDataKind::Gender, TenantId::DEFAULT, "female")
            .await
            .unwrap());
    }
}
