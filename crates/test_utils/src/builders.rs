//! Test Data Builders
//!
//! Provides builder patterns for constructing parties and relationships with
//! sensible defaults. The defaults only use codes from
//! [`ReferenceFixtures`](crate::fixtures::ReferenceFixtures), so a built
//! entity passes validation unless a test overrides a field.

use chrono::NaiveDate;
use core_kernel::{PartyId, TenantId};
use domain_party::{
    Association, Attribute, ContactMechanism, Mandatary, Mandate, Organization, Person,
    PhysicalAddress, Role,
};
use rust_decimal::Decimal;

use crate::fixtures::{IdFixtures, TenantFixtures};

/// Builder for constructing test persons
pub struct PersonBuilder {
    tenant_id: TenantId,
    given_name: String,
    surname: String,
    gender: Option<String>,
    title: Option<String>,
    date_of_birth: Option<NaiveDate>,
    email: Option<String>,
    citizenship: Vec<String>,
    roles: Vec<String>,
    attributes: Vec<Attribute>,
    addresses: Vec<PhysicalAddress>,
}

impl Default for PersonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            tenant_id: TenantFixtures::default_tenant(),
            given_name: "Jane".to_string(),
            surname: "Doe".to_string(),
            gender: Some("female".to_string()),
            title: Some("ms".to_string()),
            date_of_birth: Some(IdFixtures::adult_birth_date()),
            email: Some("jane.doe@example.com".to_string()),
            citizenship: vec!["ZA".to_string()],
            roles: Vec::new(),
            attributes: Vec::new(),
            addresses: Vec::new(),
        }
    }

    pub fn tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    /// Sets the given name and surname
    pub fn named(mut self, given_name: &str, surname: &str) -> Self {
        self.given_name = given_name.to_string();
        self.surname = surname.to_string();
        self
    }

    pub fn gender(mut self, gender: Option<&str>) -> Self {
        self.gender = gender.map(str::to_string);
        self
    }

    pub fn title(mut self, title: Option<&str>) -> Self {
        self.title = title.map(str::to_string);
        self
    }

    pub fn date_of_birth(mut self, date_of_birth: Option<NaiveDate>) -> Self {
        self.date_of_birth = date_of_birth;
        self
    }

    /// Sets the personal email address, or removes it
    pub fn email(mut self, email: Option<&str>) -> Self {
        self.email = email.map(str::to_string);
        self
    }

    pub fn citizen_of(mut self, country: &str) -> Self {
        self.citizenship.push(country.to_string());
        self
    }

    pub fn role(mut self, role_type: &str) -> Self {
        self.roles.push(role_type.to_string());
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Adds a residential street address in Cape Town
    pub fn with_residential_address(mut self) -> Self {
        self.addresses.push(PhysicalAddress::street(
            "residential",
            "1",
            "Long Street",
            "Cape Town",
            "ZA",
        ));
        self
    }

    /// Builds the person
    pub fn build(self) -> Person {
        let mut person = Person::new(self.tenant_id, "");
        person.given_name = Some(self.given_name);
        person.surname = Some(self.surname);
        person.update_name();
        person.gender = self.gender;
        person.title = self.title;
        person.date_of_birth = self.date_of_birth;

        if let Some(email) = self.email {
            person.add_contact_mechanism(ContactMechanism::new(
                "email_address",
                "personal_email_address",
                email,
            ));
        }
        for country in self.citizenship {
            person.add_country_of_citizenship(country);
        }
        for role_type in self.roles {
            person.add_role(Role::new(role_type));
        }
        for attribute in self.attributes {
            person.add_attribute(attribute);
        }
        for address in self.addresses {
            person.add_physical_address(address);
        }

        person
    }
}

/// Builder for constructing test organizations
pub struct OrganizationBuilder {
    tenant_id: TenantId,
    name: String,
    email: Option<String>,
    tax_residence: Vec<String>,
    employee_count: Option<i64>,
    roles: Vec<String>,
}

impl Default for OrganizationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OrganizationBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            tenant_id: TenantFixtures::default_tenant(),
            name: "Acme Holdings".to_string(),
            email: Some("info@acme.example.com".to_string()),
            tax_residence: vec!["ZA".to_string()],
            employee_count: None,
            roles: Vec::new(),
        }
    }

    pub fn tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn email(mut self, email: Option<&str>) -> Self {
        self.email = email.map(str::to_string);
        self
    }

    pub fn employee_count(mut self, count: i64) -> Self {
        self.employee_count = Some(count);
        self
    }

    /// Adds the employer role together with the attribute it requires
    pub fn employer(mut self) -> Self {
        self.roles.push("employer".to_string());
        if self.employee_count.is_none() {
            self.employee_count = Some(25);
        }
        self
    }

    pub fn role(mut self, role_type: &str) -> Self {
        self.roles.push(role_type.to_string());
        self
    }

    /// Builds the organization
    pub fn build(self) -> Organization {
        let mut organization = Organization::new(self.tenant_id, self.name);

        if let Some(email) = self.email {
            organization.add_contact_mechanism(ContactMechanism::new(
                "email_address",
                "main_email_address",
                email,
            ));
        }
        for country in self.tax_residence {
            organization.add_country_of_tax_residence(country);
        }
        if let Some(count) = self.employee_count {
            organization.add_attribute(Attribute::integer("employee_count", count));
        }
        for role_type in self.roles {
            organization.add_role(Role::new(role_type));
        }

        organization
    }
}

/// Builder for constructing test associations
pub struct AssociationBuilder {
    tenant_id: TenantId,
    association_type: String,
    first_party_id: PartyId,
    second_party_id: PartyId,
    effective_from: Option<NaiveDate>,
    effective_to: Option<NaiveDate>,
}

impl AssociationBuilder {
    /// Creates an `employer_of` association between the two parties
    pub fn new(first_party_id: PartyId, second_party_id: PartyId) -> Self {
        Self {
            tenant_id: TenantFixtures::default_tenant(),
            association_type: "employer_of".to_string(),
            first_party_id,
            second_party_id,
            effective_from: None,
            effective_to: None,
        }
    }

    pub fn tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    pub fn association_type(mut self, association_type: &str) -> Self {
        self.association_type = association_type.to_string();
        self
    }

    pub fn effective(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.effective_from = from;
        self.effective_to = to;
        self
    }

    /// Builds the association
    pub fn build(self) -> Association {
        let mut association = Association::new(
            self.tenant_id,
            self.association_type,
            self.first_party_id,
            self.second_party_id,
        );
        association.effective_from = self.effective_from;
        association.effective_to = self.effective_to;
        association
    }
}

/// Builder for constructing test mandates
pub struct MandateBuilder {
    tenant_id: TenantId,
    mandate_type: String,
    mandataries: Vec<Mandatary>,
    effective_from: Option<NaiveDate>,
    effective_to: Option<NaiveDate>,
}

impl Default for MandateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MandateBuilder {
    /// Creates a `power_of_attorney` mandate with no mandataries
    pub fn new() -> Self {
        Self {
            tenant_id: TenantFixtures::default_tenant(),
            mandate_type: "power_of_attorney".to_string(),
            mandataries: Vec::new(),
            effective_from: None,
            effective_to: None,
        }
    }

    pub fn tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    pub fn mandate_type(mut self, mandate_type: &str) -> Self {
        self.mandate_type = mandate_type.to_string();
        self
    }

    /// Adds the party as an attorney
    pub fn attorney(self, party_id: PartyId) -> Self {
        self.mandatary(party_id, "attorney")
    }

    pub fn mandatary(mut self, party_id: PartyId, role: &str) -> Self {
        self.mandataries.push(Mandatary::new(party_id, role));
        self
    }

    pub fn effective(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.effective_from = from;
        self.effective_to = to;
        self
    }

    /// Builds the mandate
    pub fn build(self) -> Mandate {
        let mut mandate = Mandate::new(self.tenant_id, self.mandate_type);
        mandate.effective_from = self.effective_from;
        mandate.effective_to = self.effective_to;
        for mandatary in self.mandataries {
            mandate.add_mandatary(mandatary);
        }
        mandate
    }
}

/// A decimal `height` attribute in metres
pub fn height_attribute(metres: Decimal) -> Attribute {
    Attribute::decimal("height", metres)
}
