//! Person aggregate
//!
//! A person is a natural person party. Besides the personal details held
//! directly on the record (names, dates, demographic codes), a person owns
//! collections of child records. Collections keyed by a type code hold at
//! most one record per code; adding a record with an existing code replaces
//! the earlier one.
//!
//! # Examples
//!
//! ```rust
//! use core_kernel::TenantId;
//! use domain_party::person::Person;
//! use domain_party::identification::TaxNumber;
//!
//! let mut person = Person::new(TenantId::DEFAULT, "Jane Doe");
//! person.add_tax_number(TaxNumber::new("za_income_tax_number", "ZA", "0123456789"));
//! person.add_tax_number(TaxNumber::new("za_income_tax_number", "ZA", "9876543210"));
//!
//! assert_eq!(person.tax_numbers.len(), 1);
//! assert_eq!(person.tax_number_with_type("za_income_tax_number").unwrap().number, "9876543210");
//! ```

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{EducationId, EmploymentId, NextOfKinId, PartyId, PhysicalAddressId, TenantId};

use crate::address::PhysicalAddress;
use crate::attribute::{Attribute, Preference};
use crate::contact::ContactMechanism;
use crate::identification::{ExternalReference, IdentityDocument, ResidencePermit, TaxNumber};
use crate::party::{identified_collection, keyed_collection, Party, PartyType};
use crate::person_details::{
    Education, Employment, LanguageProficiency, NextOfKin, Skill, SourceOfFunds, SourceOfWealth,
};
use crate::role::{Consent, Lock, Role, SegmentAllocation, Status};

/// A natural person
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Person {
    pub id: PartyId,
    pub tenant_id: TenantId,
    /// Display name, derived from the personal names when left blank
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub middle_names: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub surname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20))]
    pub initials: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub preferred_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub maiden_name: Option<String>,

    /// Code for the title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub title: Option<String>,
    /// Code for the gender
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub gender: Option<String>,
    /// Code for the race
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub race: Option<String>,
    /// Code for the marital status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub marital_status: Option<String>,
    /// Code for the marriage type, scoped to the marital status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub marriage_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_death: Option<NaiveDate>,

    /// ISO 3166-1 alpha-2 code of the country of birth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 2))]
    pub country_of_birth: Option<String>,
    #[serde(default)]
    pub countries_of_citizenship: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 2))]
    pub country_of_residence: Option<String>,
    #[serde(default)]
    pub countries_of_tax_residence: Vec<String>,

    /// Code for the employment status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub employment_status: Option<String>,
    /// Code for the employment type, scoped to the employment status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub employment_type: Option<String>,
    /// Code for the occupation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub occupation: Option<String>,
    /// ISO 639-1 code of the preferred language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 2))]
    pub language: Option<String>,
    /// Code for the residency status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub residency_status: Option<String>,
    /// Code for the residential type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub residential_type: Option<String>,
    /// IANA time zone identifier, e.g. "Africa/Johannesburg"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub time_zone: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    #[validate(nested)]
    pub consents: Vec<Consent>,
    #[serde(default)]
    #[validate(nested)]
    pub contact_mechanisms: Vec<ContactMechanism>,
    #[serde(default)]
    #[validate(nested)]
    pub educations: Vec<Education>,
    #[serde(default)]
    #[validate(nested)]
    pub employments: Vec<Employment>,
    #[serde(default)]
    #[validate(nested)]
    pub external_references: Vec<ExternalReference>,
    #[serde(default)]
    #[validate(nested)]
    pub identity_documents: Vec<IdentityDocument>,
    #[serde(default)]
    #[validate(nested)]
    pub language_proficiencies: Vec<LanguageProficiency>,
    #[serde(default)]
    #[validate(nested)]
    pub locks: Vec<Lock>,
    #[serde(default)]
    #[validate(nested)]
    pub next_of_kin: Vec<NextOfKin>,
    #[serde(default)]
    #[validate(nested)]
    pub physical_addresses: Vec<PhysicalAddress>,
    #[serde(default)]
    #[validate(nested)]
    pub preferences: Vec<Preference>,
    #[serde(default)]
    #[validate(nested)]
    pub residence_permits: Vec<ResidencePermit>,
    #[serde(default)]
    #[validate(nested)]
    pub roles: Vec<Role>,
    #[serde(default)]
    #[validate(nested)]
    pub segment_allocations: Vec<SegmentAllocation>,
    #[serde(default)]
    #[validate(nested)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    #[validate(nested)]
    pub sources_of_funds: Vec<SourceOfFunds>,
    #[serde(default)]
    #[validate(nested)]
    pub sources_of_wealth: Vec<SourceOfWealth>,
    #[serde(default)]
    #[validate(nested)]
    pub statuses: Vec<Status>,
    #[serde(default)]
    #[validate(nested)]
    pub tax_numbers: Vec<TaxNumber>,
}

impl PartialEq for Person {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Person {}

impl Person {
    /// Creates a new person with a random identifier
    ///
    /// # Arguments
    ///
    /// * `tenant_id` - The tenant that owns the person
    /// * `name` - The display name
    pub fn new(tenant_id: TenantId, name: impl Into<String>) -> Self {
        Self::with_id(PartyId::new(), tenant_id, name)
    }

    /// Creates a new person with the given identifier
    pub fn with_id(id: PartyId, tenant_id: TenantId, name: impl Into<String>) -> Self {
        Self {
            id,
            tenant_id,
            name: name.into(),
            created: Utc::now(),
            updated: None,
            given_name: None,
            middle_names: None,
            surname: None,
            initials: None,
            preferred_name: None,
            maiden_name: None,
            title: None,
            gender: None,
            race: None,
            marital_status: None,
            marriage_type: None,
            date_of_birth: None,
            date_of_death: None,
            country_of_birth: None,
            countries_of_citizenship: Vec::new(),
            country_of_residence: None,
            countries_of_tax_residence: Vec::new(),
            employment_status: None,
            employment_type: None,
            occupation: None,
            language: None,
            residency_status: None,
            residential_type: None,
            time_zone: None,
            attributes: Vec::new(),
            consents: Vec::new(),
            contact_mechanisms: Vec::new(),
            educations: Vec::new(),
            employments: Vec::new(),
            external_references: Vec::new(),
            identity_documents: Vec::new(),
            language_proficiencies: Vec::new(),
            locks: Vec::new(),
            next_of_kin: Vec::new(),
            physical_addresses: Vec::new(),
            preferences: Vec::new(),
            residence_permits: Vec::new(),
            roles: Vec::new(),
            segment_allocations: Vec::new(),
            skills: Vec::new(),
            sources_of_funds: Vec::new(),
            sources_of_wealth: Vec::new(),
            statuses: Vec::new(),
            tax_numbers: Vec::new(),
        }
    }

    /// Returns the common party header for this person
    pub fn party(&self) -> Party {
        Party {
            id: self.id,
            tenant_id: self.tenant_id,
            party_type: PartyType::Person,
            name: self.name.clone(),
            created: self.created,
            updated: self.updated,
        }
    }

    /// Derives the display name from the personal names if it is blank
    ///
    /// The preferred name takes precedence over the given name, and the
    /// surname is appended when present.
    pub fn update_name(&mut self) {
        if !self.name.trim().is_empty() {
            return;
        }

        let first = self
            .preferred_name
            .as_deref()
            .or(self.given_name.as_deref())
            .filter(|n| !n.trim().is_empty());
        let last = self.surname.as_deref().filter(|n| !n.trim().is_empty());

        self.name = match (first, last) {
            (Some(first), Some(last)) => format!("{} {}", first.trim(), last.trim()),
            (Some(first), None) => first.trim().to_string(),
            (None, Some(last)) => last.trim().to_string(),
            (None, None) => String::new(),
        };
    }

    /// Calculates the age of the person on the given date
    ///
    /// # Returns
    ///
    /// `None` if the date of birth is unknown or after `on`
    pub fn age_on(&self, on: NaiveDate) -> Option<u32> {
        let born = self.date_of_birth?;
        if born > on {
            return None;
        }
        let mut age = on.year() - born.year();
        if (on.month(), on.day()) < (born.month(), born.day()) {
            age -= 1;
        }
        u32::try_from(age).ok()
    }

    /// Adds a country of citizenship if not already present
    pub fn add_country_of_citizenship(&mut self, country: impl Into<String>) {
        let country = country.into();
        if !self.countries_of_citizenship.contains(&country) {
            self.countries_of_citizenship.push(country);
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

    /// Returns the physical addresses with the given purpose
    pub fn physical_addresses_with_purpose(&self, purpose: &str) -> Vec<&PhysicalAddress> {
        self.physical_addresses.iter().filter(|a| a.has_purpose(purpose)).collect()
    }

    /// Returns the contact mechanisms of the given type
    pub fn contact_mechanisms_with_type(&self, contact_mechanism_type: &str) -> Vec<&ContactMechanism> {
        self.contact_mechanisms
            .iter()
            .filter(|c| c.contact_mechanism_type == contact_mechanism_type)
            .collect()
    }
}

keyed_collection!(Person, attributes: Attribute, key = attribute_type,
    add = add_attribute, remove = remove_attribute_with_type,
    get = attribute_with_type, has = has_attribute_with_type);
keyed_collection!(Person, consents: Consent, key = consent_type,
    add = add_consent, remove = remove_consent_with_type,
    get = consent_with_type, has = has_consent_with_type);
keyed_collection!(Person, contact_mechanisms: ContactMechanism, key = role,
    add = add_contact_mechanism, remove = remove_contact_mechanism_with_role,
    get = contact_mechanism_with_role, has = has_contact_mechanism_with_role);
keyed_collection!(Person, external_references: ExternalReference, key = external_reference_type,
    add = add_external_reference, remove = remove_external_reference_with_type,
    get = external_reference_with_type, has = has_external_reference_with_type);
keyed_collection!(Person, identity_documents: IdentityDocument, key = identity_document_type,
    add = add_identity_document, remove = remove_identity_document_with_type,
    get = identity_document_with_type, has = has_identity_document_with_type);
keyed_collection!(Person, language_proficiencies: LanguageProficiency, key = language,
    add = add_language_proficiency, remove = remove_language_proficiency,
    get = language_proficiency, has = has_language_proficiency);
keyed_collection!(Person, locks: Lock, key = lock_type,
    add = add_lock, remove = remove_lock_with_type,
    get = lock_with_type, has = has_lock_with_type);
keyed_collection!(Person, preferences: Preference, key = preference_type,
    add = add_preference, remove = remove_preference_with_type,
    get = preference_with_type, has = has_preference_with_type);
keyed_collection!(Person, residence_permits: ResidencePermit, key = residence_permit_type,
    add = add_residence_permit, remove = remove_residence_permit_with_type,
    get = residence_permit_with_type, has = has_residence_permit_with_type);
keyed_collection!(Person, roles: Role, key = role_type,
    add = add_role, remove = remove_role_with_type,
    get = role_with_type, has = has_role_with_type);
keyed_collection!(Person, segment_allocations: SegmentAllocation, key = segment,
    add = add_segment_allocation, remove = remove_segment_allocation,
    get = segment_allocation, has = has_segment_allocation);
keyed_collection!(Person, skills: Skill, key = skill_type,
    add = add_skill, remove = remove_skill_with_type,
    get = skill_with_type, has = has_skill_with_type);
keyed_collection!(Person, sources_of_funds: SourceOfFunds, key = source_of_funds_type,
    add = add_source_of_funds, remove = remove_source_of_funds_with_type,
    get = source_of_funds_with_type, has = has_source_of_funds_with_type);
keyed_collection!(Person, sources_of_wealth: SourceOfWealth, key = source_of_wealth_type,
    add = add_source_of_wealth, remove = remove_source_of_wealth_with_type,
    get = source_of_wealth_with_type, has = has_source_of_wealth_with_type);
keyed_collection!(Person, statuses: Status, key = status_type,
    add = add_status, remove = remove_status_with_type,
    get = status_with_type, has = has_status_with_type);
keyed_collection!(Person, tax_numbers: TaxNumber, key = tax_number_type,
    add = add_tax_number, remove = remove_tax_number_with_type,
    get = tax_number_with_type, has = has_tax_number_with_type);

identified_collection!(Person, educations: Education, id = EducationId,
    add = add_education, remove = remove_education, get = education);
identified_collection!(Person, employments: Employment, id = EmploymentId,
    add = add_employment, remove = remove_employment, get = employment);
identified_collection!(Person, next_of_kin: NextOfKin, id = NextOfKinId,
    add = add_next_of_kin, remove = remove_next_of_kin, get = next_of_kin_with_id);
identified_collection!(Person, physical_addresses: PhysicalAddress, id = PhysicalAddressId,
    add = add_physical_address, remove = remove_physical_address, get = physical_address);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;

    fn person() -> Person {
        Person::new(TenantId::DEFAULT, "John Smith")
    }

    #[test]
    fn test_add_role_replaces_same_type() {
        let mut person = person();
        person.add_role(Role::new("customer"));
        person.add_role(Role {
            effective_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Role::new("customer")
        });
        person.add_role(Role::new("employee"));

        assert_eq!(person.roles.len(), 2);
        assert!(person.role_with_type("customer").unwrap().effective_from.is_some());
    }

    #[test]
    fn test_remove_by_type() {
        let mut person = person();
        person.add_attribute(Attribute::string("nickname", "Jack"));

        assert!(person.remove_attribute_with_type("height").is_none());
        assert!(person.remove_attribute_with_type("nickname").is_some());
        assert!(!person.has_attribute_with_type("nickname"));
    }

    #[test]
    fn test_identified_collection() {
        let mut person = person();
        let kin = NextOfKin::new("spouse", "Mary Smith");
        let kin_id = kin.id;
        person.add_next_of_kin(kin);

        assert!(person.next_of_kin_with_id(kin_id).is_some());
        assert!(person.remove_next_of_kin(kin_id).is_some());
        assert!(person.next_of_kin.is_empty());
    }

    #[test]
    fn test_update_name_prefers_preferred_name() {
        let mut person = Person::new(TenantId::DEFAULT, "");
        person.given_name = Some("Jonathan".to_string());
        person.preferred_name = Some("Jon".to_string());
        person.surname = Some("Smith".to_string());

        person.update_name();
        assert_eq!(person.name, "Jon Smith");
    }

    #[test]
    fn test_update_name_keeps_explicit_name() {
        let mut person = person();
        person.given_name = Some("Johnny".to_string());
        person.update_name();
        assert_eq!(person.name, "John Smith");
    }

    #[test]
    fn test_age_on() {
        let mut person = person();
        person.date_of_birth = NaiveDate::from_ymd_opt(1990, 6, 15);

        assert_eq!(person.age_on(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()), Some(33));
        assert_eq!(person.age_on(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()), Some(34));
        assert_eq!(person.age_on(NaiveDate::from_ymd_opt(1980, 1, 1).unwrap()), None);
    }

    #[test]
    fn test_equality_by_id() {
        let a = person();
        let mut b = a.clone();
        b.name = "Changed".to_string();
        assert_eq!(a, b);
        assert_ne!(a, person());
    }

    #[test]
    fn test_countries_are_unique() {
        let mut person = person();
        person.add_country_of_citizenship("ZA");
        person.add_country_of_citizenship("ZA");
        person.add_country_of_tax_residence("GB");
        assert_eq!(person.countries_of_citizenship, vec!["ZA".to_string()]);
        assert_eq!(person.countries_of_tax_residence.len(), 1);
    }
}
