//! Organization aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{PartyId, PhysicalAddressId, TenantId};

use crate::address::PhysicalAddress;
use crate::attribute::{Attribute, Preference};
use crate::contact::ContactMechanism;
use crate::identification::{ExternalReference, TaxNumber};
use crate::party::{identified_collection, keyed_collection, Party, PartyType};
use crate::role::{Lock, Role, SegmentAllocation, Status};

/// An organization such as a company, trust or government body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Organization {
    pub id: PartyId,
    pub tenant_id: TenantId,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    /// ISO 3166-1 alpha-2 codes of the countries of tax residence
    #[serde(default)]
    pub countries_of_tax_residence: Vec<String>,

    #[serde(default)]
    #[validate(nested)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    #[validate(nested)]
    pub contact_mechanisms: Vec<ContactMechanism>,
    #[serde(default)]
    #[validate(nested)]
    pub external_references: Vec<ExternalReference>,
    #[serde(default)]
    #[validate(nested)]
    pub locks: Vec<Lock>,
    #[serde(default)]
    #[validate(nested)]
    pub physical_addresses: Vec<PhysicalAddress>,
    #[serde(default)]
    #[validate(nested)]
    pub preferences: Vec<Preference>,
    #[serde(default)]
    #[validate(nested)]
    pub roles: Vec<Role>,
    #[serde(default)]
    #[validate(nested)]
    pub segment_allocations: Vec<SegmentAllocation>,
    #[serde(default)]
    #[validate(nested)]
    pub statuses: Vec<Status>,
    #[serde(default)]
    #[validate(nested)]
    pub tax_numbers: Vec<TaxNumber>,
}

impl PartialEq for Organization {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Organization {}

impl Organization {
    /// Creates a new organization with a random identifier
    pub fn new(tenant_id: TenantId, name: impl Into<String>) -> Self {
        Self::with_id(PartyId::new(), tenant_id, name)
    }

    /// Creates a new organization with the given identifier
    pub fn with_id(id: PartyId, tenant_id: TenantId, name: impl Into<String>) -> Self {
        Self {
            id,
            tenant_id,
            name: name.into(),
            created: Utc::now(),
            updated: None,
            countries_of_tax_residence: Vec::new(),
            attributes: Vec::new(),
            contact_mechanisms: Vec::new(),
            external_references: Vec::new(),
            locks: Vec::new(),
            physical_addresses: Vec::new(),
            preferences: Vec::new(),
            roles: Vec::new(),
            segment_allocations: Vec::new(),
            statuses: Vec::new(),
            tax_numbers: Vec::new(),
        }
    }

    /// Returns the common party header for this organization
    pub fn party(&self) -> Party {
        Party {
            id: self.id,
            tenant_id: self.tenant_id,
            party_type: PartyType::Organization,
            name: self.name.clone(),
            created: self.created,
            updated: self.updated,
        }
    }

    /// Adds a country of tax residence if not already present
    pub fn add_country_of_tax_residence(&mut self, country: impl Into<String>) {
        let country = country.into();
        if !self.countries_of_tax_residence.contains(&country) {
            self.countries_of_tax_residence.push(country);
        }
    }

    /// Returns the physical addresses with the given role
    pub fn physical_addresses_with_role(&self, role: &str) -> Vec<&PhysicalAddress> {
        self.physical_addresses.iter().filter(|a| a.role == role).collect()
    }
}

keyed_collection!(Organization, attributes: Attribute, key = attribute_type,
    add = add_attribute, remove = remove_attribute_with_type,
    get = attribute_with_type, has = has_attribute_with_type);
keyed_collection!(Organization, contact_mechanisms: ContactMechanism, key = role,
    add = add_contact_mechanism, remove = remove_contact_mechanism_with_role,
    get = contact_mechanism_with_role, has = has_contact_mechanism_with_role);
keyed_collection!(Organization, external_references: ExternalReference, key = external_reference_type,
    add = add_external_reference, remove = remove_external_reference_with_type,
    get = external_reference_with_type, has = has_external_reference_with_type);
keyed_collection!(Organization, locks: Lock, key = lock_type,
    add = add_lock, remove = remove_lock_with_type,
    get = lock_with_type, has = has_lock_with_type);
keyed_collection!(Organization, preferences: Preference, key = preference_type,
    add = add_preference, remove = remove_preference_with_type,
    get = preference_with_type, has = has_preference_with_type);
keyed_collection!(Organization, roles: Role, key = role_type,
    add = add_role, remove = remove_role_with_type,
    get = role_with_type, has = has_role_with_type);
keyed_collection!(Organization, segment_allocations: SegmentAllocation, key = segment,
    add = add_segment_allocation, remove = remove_segment_allocation,
    get = segment_allocation, has = has_segment_allocation);
keyed_collection!(Organization, statuses: Status, key = status_type,
    add = add_status, remove = remove_status_with_type,
    get = status_with_type, has = has_status_with_type);
keyed_collection!(Organization, tax_numbers: TaxNumber, key = tax_number_type,
    add = add_tax_number, remove = remove_tax_number_with_type,
    get = tax_number_with_type, has = has_tax_number_with_type);

identified_collection!(Organization, physical_addresses: PhysicalAddress, id = PhysicalAddressId,
    add = add_physical_address, remove = remove_physical_address, get = physical_address);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_mechanism_unique_per_role() {
        let mut organization = Organization::new(TenantId::DEFAULT, "Acme Ltd");
        organization.add_contact_mechanism(ContactMechanism::new("phone_number", "main", "+27 21 555 0100"));
        organization.add_contact_mechanism(ContactMechanism::new("phone_number", "main", "+27 21 555 0199"));
        organization.add_contact_mechanism(ContactMechanism::new("email_address", "accounts", "accounts@acme.example"));

        assert_eq!(organization.contact_mechanisms.len(), 2);
        assert_eq!(
            organization.contact_mechanism_with_role("main").unwrap().value,
            "+27 21 555 0199"
        );
    }

    #[test]
    fn test_party_header() {
        let organization = Organization::new(TenantId::DEFAULT, "Acme Ltd");
        let party = organization.party();
        assert_eq!(party.id, organization.id);
        assert_eq!(party.party_type, PartyType::Organization);
        assert_eq!(party.name, "Acme Ltd");
    }

    #[test]
    fn test_physical_address_by_id() {
        let mut organization = Organization::new(TenantId::DEFAULT, "Acme Ltd");
        let address = PhysicalAddress::street("business", "1", "Dock Road", "Cape Town", "ZA");
        let id = address.id;
        organization.add_physical_address(address);

        assert_eq!(organization.physical_addresses_with_role("business").len(), 1);
        assert!(organization.physical_address(id).is_some());
        assert!(organization.remove_physical_address(id).is_some());
        assert!(organization.physical_address(id).is_none());
    }
}
