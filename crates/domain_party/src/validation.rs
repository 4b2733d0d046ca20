//! Party validation rules
//!
//! Validation runs in four passes and reports every problem it finds:
//!
//! 1. Field rules declared with `validator` (lengths, e-mail addresses),
//!    including the child records
//! 2. Structural rules: effective periods are ordered, the date of death is
//!    not before the date of birth, the time zone is an IANA identifier,
//!    physical addresses have the fields their type requires, associations
//!    link two different parties and mandates have mandataries
//! 3. Reference data: every code field holds a code that exists for the
//!    tenant, applies to the party type and belongs to its parent code
//! 4. Role-type constraints on the attributes and preferences of each role
//!    the party holds

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use validator::{Validate, ValidateEmail, ValidationErrors, ValidationErrorsKind};

use core_kernel::TenantId;

use crate::address::PhysicalAddress;
use crate::association::Association;
use crate::attribute::{Attribute, Preference};
use crate::contact::ContactMechanism;
use crate::error::PartyError;
use crate::identification::{ExternalReference, TaxNumber};
use crate::mandate::Mandate;
use crate::organization::Organization;
use crate::party::PartyType;
use crate::person::Person;
use crate::reference::{ConstraintType, ReferenceDataKind};
use crate::reference_service::PartyReferenceService;
use crate::role::{Lock, Role, SegmentAllocation, Status};

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Path of the offending property, e.g. `physical_addresses[0].city`
    pub property: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.message)
    }
}

/// Result of validating a party, association or mandate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(default)]
    pub errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Creates a successful validation result
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    /// Creates a result from the issues found, valid if there are none
    pub fn from_issues(errors: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Adds an error to the result
    pub fn add_error(&mut self, property: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue::new(property, message));
        self.is_valid = false;
    }

    /// Merges another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.is_valid = self.is_valid && other.is_valid;
        self.errors.extend(other.errors);
    }

    /// Converts a failed result into `PartyError::InvalidArgument`
    pub fn into_result(self, name: &str) -> Result<(), PartyError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(PartyError::validation_failed(name, self.errors))
        }
    }
}

/// Flattens `validator` errors into issues with dotted property paths
pub fn issues_from_errors(errors: &ValidationErrors) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    collect_issues("", errors, &mut issues);
    issues.sort_by(|a, b| a.property.cmp(&b.property));
    issues
}

fn collect_issues(prefix: &str, errors: &ValidationErrors, issues: &mut Vec<ValidationIssue>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = match &error.message {
                        Some(message) => message.to_string(),
                        None => describe(&error.code, &error.params),
                    };
                    issues.push(ValidationIssue::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_issues(&path, nested, issues),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_issues(&format!("{}[{}]", path, index), nested, issues);
                }
            }
        }
    }
}

fn describe(
    code: &Cow<'static, str>,
    params: &std::collections::HashMap<Cow<'static, str>, serde_json::Value>,
) -> String {
    let param = |name: &str| params.get(name).map(|v| v.to_string());
    match code.as_ref() {
        "length" => match (param("equal"), param("min"), param("max")) {
            (Some(equal), _, _) => format!("must be exactly {} characters", equal),
            (None, Some(min), Some(max)) if min == "1" => format!("is required and must be at most {} characters", max),
            (None, Some(min), Some(max)) => format!("must be between {} and {} characters", min, max),
            (None, Some(min), None) => format!("must be at least {} characters", min),
            (None, None, Some(max)) => format!("must be at most {} characters", max),
            (None, None, None) => "has an invalid length".to_string(),
        },
        "email" => "must be a valid e-mail address".to_string(),
        other => format!("is invalid ({})", other),
    }
}

fn effective_period_is_ordered(from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    match (from, to) {
        (Some(from), Some(to)) => to >= from,
        _ => true,
    }
}

/// Accumulates issues for one entity, checking codes against reference data
struct Checks<'a> {
    reference: &'a PartyReferenceService,
    tenant_id: TenantId,
    party_type: PartyType,
    issues: Vec<ValidationIssue>,
}

impl<'a> Checks<'a> {
    fn new(reference: &'a PartyReferenceService, tenant_id: TenantId, party_type: PartyType) -> Self {
        Self {
            reference,
            tenant_id,
            party_type,
            issues: Vec::new(),
        }
    }

    fn fail(&mut self, property: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(property, message));
    }

    fn invalid_code(&mut self, kind: ReferenceDataKind, property: &str, code: &str) {
        self.fail(property, format!("the {} code '{}' is invalid", kind, code));
    }

    /// Checks a code that is valid for every party type
    async fn code(&mut self, kind: ReferenceDataKind, property: &str, code: &str) -> Result<(), PartyError> {
        if !self.reference.is_valid(kind, self.tenant_id, code).await? {
            self.invalid_code(kind, property, code);
        }
        Ok(())
    }

    async fn optional_code(
        &mut self,
        kind: ReferenceDataKind,
        property: &str,
        code: Option<&str>,
    ) -> Result<(), PartyError> {
        match code {
            Some(code) => self.code(kind, property, code).await,
            None => Ok(()),
        }
    }

    /// Checks a code that must apply to the party type
    async fn party_type_code(&mut self, kind: ReferenceDataKind, property: &str, code: &str) -> Result<(), PartyError> {
        if !self
            .reference
            .is_valid_for_party_type(kind, self.tenant_id, self.party_type, code)
            .await?
        {
            self.invalid_code(kind, property, code);
        }
        Ok(())
    }

    /// Checks a code that must belong to the parent code
    async fn child_code(
        &mut self,
        kind: ReferenceDataKind,
        property: &str,
        parent_code: &str,
        code: &str,
    ) -> Result<(), PartyError> {
        if !self
            .reference
            .is_valid_with_parent(kind, self.tenant_id, parent_code, code)
            .await?
        {
            self.fail(
                property,
                format!("the {} code '{}' is invalid for '{}'", kind, code, parent_code),
            );
        }
        Ok(())
    }

    async fn countries(&mut self, property: &str, countries: &[String]) -> Result<(), PartyError> {
        for (index, country) in countries.iter().enumerate() {
            self.code(ReferenceDataKind::Country, &format!("{}[{}]", property, index), country)
                .await?;
        }
        Ok(())
    }

    async fn attributes(&mut self, attributes: &[Attribute]) -> Result<(), PartyError> {
        for (index, attribute) in attributes.iter().enumerate() {
            let property = format!("attributes[{}]", index);
            let definition = self
                .reference
                .find_code(ReferenceDataKind::AttributeType, self.tenant_id, &attribute.attribute_type)
                .await?
                .filter(|code| code.applies_to(self.party_type));

            let Some(definition) = definition else {
                self.invalid_code(
                    ReferenceDataKind::AttributeType,
                    &format!("{}.attribute_type", property),
                    &attribute.attribute_type,
                );
                continue;
            };

            let populated = attribute.populated_value_types();
            match definition.value_type {
                Some(value_type) if populated != [value_type] => self.fail(
                    property.clone(),
                    format!(
                        "the attribute '{}' requires a single {} value",
                        attribute.attribute_type,
                        value_type.code()
                    ),
                ),
                None if populated.len() > 1 => self.fail(
                    property.clone(),
                    format!("the attribute '{}' has more than one value", attribute.attribute_type),
                ),
                _ => {}
            }

            if let Some(value) = attribute.value_as_string() {
                if !definition.matches_pattern(&value) {
                    self.fail(
                        property,
                        format!("the value of the attribute '{}' has an invalid format", attribute.attribute_type),
                    );
                }
            }
        }
        Ok(())
    }

    async fn contact_mechanisms(&mut self, contact_mechanisms: &[ContactMechanism]) -> Result<(), PartyError> {
        for (index, contact_mechanism) in contact_mechanisms.iter().enumerate() {
            let property = format!("contact_mechanisms[{}]", index);
            self.party_type_code(
                ReferenceDataKind::ContactMechanismType,
                &format!("{}.contact_mechanism_type", property),
                &contact_mechanism.contact_mechanism_type,
            )
            .await?;

            if !self
                .reference
                .is_valid_contact_mechanism_role(
                    self.tenant_id,
                    self.party_type,
                    &contact_mechanism.contact_mechanism_type,
                    &contact_mechanism.role,
                )
                .await?
            {
                self.fail(
                    format!("{}.role", property),
                    format!(
                        "the contact-mechanism-role code '{}' is invalid for '{}'",
                        contact_mechanism.role, contact_mechanism.contact_mechanism_type
                    ),
                );
            }

            for (purpose_index, purpose) in contact_mechanism.purposes.iter().enumerate() {
                self.code(
                    ReferenceDataKind::ContactMechanismPurpose,
                    &format!("{}.purposes[{}]", property, purpose_index),
                    purpose,
                )
                .await?;
            }

            if contact_mechanism.is_email_address() && !contact_mechanism.value.validate_email() {
                self.fail(format!("{}.value", property), "must be a valid e-mail address");
            }
        }
        Ok(())
    }

    async fn external_references(&mut self, external_references: &[ExternalReference]) -> Result<(), PartyError> {
        for (index, external_reference) in external_references.iter().enumerate() {
            self.party_type_code(
                ReferenceDataKind::ExternalReferenceType,
                &format!("external_references[{}].external_reference_type", index),
                &external_reference.external_reference_type,
            )
            .await?;
        }
        Ok(())
    }

    async fn locks(&mut self, locks: &[Lock]) -> Result<(), PartyError> {
        for (index, lock) in locks.iter().enumerate() {
            let property = format!("locks[{}]", index);
            self.party_type_code(ReferenceDataKind::LockType, &format!("{}.lock_type", property), &lock.lock_type)
                .await?;
            if !effective_period_is_ordered(lock.effective_from, lock.effective_to) {
                self.fail(format!("{}.effective_to", property), "must not be before effective_from");
            }
        }
        Ok(())
    }

    async fn statuses(&mut self, statuses: &[Status]) -> Result<(), PartyError> {
        for (index, status) in statuses.iter().enumerate() {
            let property = format!("statuses[{}]", index);
            self.party_type_code(ReferenceDataKind::StatusType, &format!("{}.status_type", property), &status.status_type)
                .await?;
            if !effective_period_is_ordered(status.effective_from, status.effective_to) {
                self.fail(format!("{}.effective_to", property), "must not be before effective_from");
            }
        }
        Ok(())
    }

    async fn roles(&mut self, roles: &[Role]) -> Result<(), PartyError> {
        for (index, role) in roles.iter().enumerate() {
            let property = format!("roles[{}]", index);
            self.party_type_code(ReferenceDataKind::RoleType, &format!("{}.role_type", property), &role.role_type)
                .await?;
            if !effective_period_is_ordered(role.effective_from, role.effective_to) {
                self.fail(format!("{}.effective_to", property), "must not be before effective_from");
            }
        }
        Ok(())
    }

    async fn segment_allocations(&mut self, segment_allocations: &[SegmentAllocation]) -> Result<(), PartyError> {
        for (index, allocation) in segment_allocations.iter().enumerate() {
            self.party_type_code(
                ReferenceDataKind::Segment,
                &format!("segment_allocations[{}].segment", index),
                &allocation.segment,
            )
            .await?;
        }
        Ok(())
    }

    async fn preferences(&mut self, preferences: &[Preference]) -> Result<(), PartyError> {
        for (index, preference) in preferences.iter().enumerate() {
            let property = format!("preferences[{}]", index);
            let definition = self
                .reference
                .find_code(ReferenceDataKind::PreferenceType, self.tenant_id, &preference.preference_type)
                .await?
                .filter(|code| code.applies_to(self.party_type));

            match definition {
                Some(definition) if !definition.matches_pattern(&preference.value) => self.fail(
                    format!("{}.value", property),
                    format!("the value of the preference '{}' has an invalid format", preference.preference_type),
                ),
                Some(_) => {}
                None => self.invalid_code(
                    ReferenceDataKind::PreferenceType,
                    &format!("{}.preference_type", property),
                    &preference.preference_type,
                ),
            }
        }
        Ok(())
    }

    async fn tax_numbers(&mut self, tax_numbers: &[TaxNumber]) -> Result<(), PartyError> {
        for (index, tax_number) in tax_numbers.iter().enumerate() {
            let property = format!("tax_numbers[{}]", index);
            self.party_type_code(
                ReferenceDataKind::TaxNumberType,
                &format!("{}.tax_number_type", property),
                &tax_number.tax_number_type,
            )
            .await?;
            self.code(
                ReferenceDataKind::Country,
                &format!("{}.country_of_issue", property),
                &tax_number.country_of_issue,
            )
            .await?;
        }
        Ok(())
    }

    async fn physical_addresses(&mut self, addresses: &[PhysicalAddress]) -> Result<(), PartyError> {
        for (index, address) in addresses.iter().enumerate() {
            let property = format!("physical_addresses[{}]", index);

            for field in address.missing_required_fields() {
                self.fail(
                    format!("{}.{}", property, field),
                    format!("is required for a {} address", address.address_type),
                );
            }

            self.party_type_code(
                ReferenceDataKind::PhysicalAddressType,
                &format!("{}.address_type", property),
                &address.address_type,
            )
            .await?;
            self.party_type_code(
                ReferenceDataKind::PhysicalAddressRole,
                &format!("{}.role", property),
                &address.role,
            )
            .await?;
            for (purpose_index, purpose) in address.purposes.iter().enumerate() {
                self.party_type_code(
                    ReferenceDataKind::PhysicalAddressPurpose,
                    &format!("{}.purposes[{}]", property, purpose_index),
                    purpose,
                )
                .await?;
            }

            self.optional_code(
                ReferenceDataKind::Country,
                &format!("{}.country", property),
                address.country.as_deref(),
            )
            .await?;
            if let (Some(country), Some(region)) = (address.country.as_deref(), address.region.as_deref()) {
                self.child_code(ReferenceDataKind::Region, &format!("{}.region", property), country, region)
                    .await?;
            }
        }
        Ok(())
    }

    /// Applies the constraints of every role held to the attributes and preferences
    async fn role_constraints(
        &mut self,
        roles: &[Role],
        attributes: &[Attribute],
        preferences: &[Preference],
    ) -> Result<(), PartyError> {
        for role in roles {
            let attribute_constraints = self
                .reference
                .get_role_type_attribute_type_constraints(Some(&role.role_type))
                .await?;
            for constraint in attribute_constraints {
                let attribute = attributes
                    .iter()
                    .find(|a| a.attribute_type == constraint.attribute_type);
                let property = format!("attributes[{}]", constraint.attribute_type);
                match attribute {
                    None if constraint.constraint_type == ConstraintType::Required => self.fail(
                        property,
                        format!(
                            "the attribute '{}' is required for the role '{}'",
                            constraint.attribute_type, role.role_type
                        ),
                    ),
                    None => {}
                    Some(attribute) => {
                        if let Some(message) = violates(
                            constraint.constraint_type,
                            constraint.value.as_deref(),
                            attribute.value_as_string().as_deref(),
                            attribute.value_as_decimal(),
                        ) {
                            self.fail(property, format!("{} for the role '{}'", message, role.role_type));
                        }
                    }
                }
            }

            let preference_constraints = self
                .reference
                .get_role_type_preference_type_constraints(Some(&role.role_type))
                .await?;
            for constraint in preference_constraints {
                let preference = preferences
                    .iter()
                    .find(|p| p.preference_type == constraint.preference_type);
                let property = format!("preferences[{}]", constraint.preference_type);
                match preference {
                    None if constraint.constraint_type == ConstraintType::Required => self.fail(
                        property,
                        format!(
                            "the preference '{}' is required for the role '{}'",
                            constraint.preference_type, role.role_type
                        ),
                    ),
                    None => {}
                    Some(preference) => {
                        if let Some(message) = violates(
                            constraint.constraint_type,
                            constraint.value.as_deref(),
                            Some(preference.value.as_str()),
                            preference.value.trim().parse().ok(),
                        ) {
                            self.fail(property, format!("{} for the role '{}'", message, role.role_type));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn finish(mut self) -> ValidationResult {
        self.issues.sort_by(|a, b| a.property.cmp(&b.property));
        self.issues.dedup();
        ValidationResult::from_issues(self.issues)
    }
}

/// Returns a message if the value violates the constraint
///
/// A constraint with a missing or unparseable limit is ignored.
fn violates(
    constraint_type: ConstraintType,
    limit: Option<&str>,
    text: Option<&str>,
    number: Option<Decimal>,
) -> Option<String> {
    let limit = limit?.trim();
    let size = || text.map(|t| t.chars().count());

    match constraint_type {
        ConstraintType::Required => None,
        ConstraintType::MaxSize => {
            let max: usize = limit.parse().ok()?;
            (size()? > max).then(|| format!("must be at most {} characters", max))
        }
        ConstraintType::MinSize => {
            let min: usize = limit.parse().ok()?;
            (size()? < min).then(|| format!("must be at least {} characters", min))
        }
        ConstraintType::Size => {
            let exact: usize = limit.parse().ok()?;
            (size()? != exact).then(|| format!("must be exactly {} characters", exact))
        }
        ConstraintType::Pattern => {
            let pattern = Regex::new(limit).ok()?;
            (!pattern.is_match(text?)).then(|| "has an invalid format".to_string())
        }
        ConstraintType::MaxValue => {
            let max: Decimal = limit.parse().ok()?;
            match number {
                Some(value) if value <= max => None,
                _ => Some(format!("must be a number no greater than {}", max)),
            }
        }
        ConstraintType::MinValue => {
            let min: Decimal = limit.parse().ok()?;
            match number {
                Some(value) if value >= min => None,
                _ => Some(format!("must be a number no less than {}", min)),
            }
        }
    }
}

/// Validates parties, associations and mandates
#[derive(Clone)]
pub struct PartyValidator {
    reference: Arc<PartyReferenceService>,
}

impl PartyValidator {
    pub fn new(reference: Arc<PartyReferenceService>) -> Self {
        Self { reference }
    }

    /// Validates a person
    ///
    /// # Errors
    ///
    /// Returns `PartyError::ServiceUnavailable` if reference data cannot be
    /// loaded. Validation failures are reported in the result, not as errors.
    #[instrument(skip(self, person), fields(person_id = %person.id))]
    pub async fn validate_person(&self, person: &Person) -> Result<ValidationResult, PartyError> {
        let mut checks = Checks::new(&self.reference, person.tenant_id, PartyType::Person);

        if let Err(errors) = person.validate() {
            checks.issues.extend(issues_from_errors(&errors));
        }

        if let (Some(born), Some(died)) = (person.date_of_birth, person.date_of_death) {
            if died < born {
                checks.fail("date_of_death", "must not be before date_of_birth");
            }
        }
        if let Some(time_zone) = person.time_zone.as_deref() {
            if time_zone.parse::<chrono_tz::Tz>().is_err() {
                checks.fail("time_zone", format!("'{}' is not a valid time zone", time_zone));
            }
        }

        checks.optional_code(ReferenceDataKind::Title, "title", person.title.as_deref()).await?;
        checks.optional_code(ReferenceDataKind::Gender, "gender", person.gender.as_deref()).await?;
        checks.optional_code(ReferenceDataKind::Race, "race", person.race.as_deref()).await?;
        checks
            .optional_code(ReferenceDataKind::MaritalStatus, "marital_status", person.marital_status.as_deref())
            .await?;
        match (person.marital_status.as_deref(), person.marriage_type.as_deref()) {
            (Some(status), Some(marriage_type)) => {
                checks
                    .child_code(ReferenceDataKind::MarriageType, "marriage_type", status, marriage_type)
                    .await?
            }
            (None, Some(_)) => checks.fail("marriage_type", "requires a marital_status"),
            _ => {}
        }
        checks
            .optional_code(ReferenceDataKind::EmploymentStatus, "employment_status", person.employment_status.as_deref())
            .await?;
        match (person.employment_status.as_deref(), person.employment_type.as_deref()) {
            (Some(status), Some(employment_type)) => {
                checks
                    .child_code(ReferenceDataKind::EmploymentType, "employment_type", status, employment_type)
                    .await?
            }
            (None, Some(_)) => checks.fail("employment_type", "requires an employment_status"),
            _ => {}
        }
        checks.optional_code(ReferenceDataKind::Occupation, "occupation", person.occupation.as_deref()).await?;
        checks
            .optional_code(ReferenceDataKind::ResidencyStatus, "residency_status", person.residency_status.as_deref())
            .await?;
        checks
            .optional_code(ReferenceDataKind::ResidentialType, "residential_type", person.residential_type.as_deref())
            .await?;
        checks.optional_code(ReferenceDataKind::Language, "language", person.language.as_deref()).await?;
        checks
            .optional_code(ReferenceDataKind::Country, "country_of_birth", person.country_of_birth.as_deref())
            .await?;
        checks
            .optional_code(ReferenceDataKind::Country, "country_of_residence", person.country_of_residence.as_deref())
            .await?;
        checks.countries("countries_of_citizenship", &person.countries_of_citizenship).await?;
        checks.countries("countries_of_tax_residence", &person.countries_of_tax_residence).await?;

        checks.attributes(&person.attributes).await?;
        checks.contact_mechanisms(&person.contact_mechanisms).await?;
        checks.external_references(&person.external_references).await?;
        checks.locks(&person.locks).await?;
        checks.physical_addresses(&person.physical_addresses).await?;
        checks.preferences(&person.preferences).await?;
        checks.roles(&person.roles).await?;
        checks.segment_allocations(&person.segment_allocations).await?;
        checks.statuses(&person.statuses).await?;
        checks.tax_numbers(&person.tax_numbers).await?;

        for (index, consent) in person.consents.iter().enumerate() {
            let property = format!("consents[{}]", index);
            checks
                .code(ReferenceDataKind::ConsentType, &format!("{}.consent_type", property), &consent.consent_type)
                .await?;
            if !effective_period_is_ordered(Some(consent.effective_from), consent.effective_to) {
                checks.fail(format!("{}.effective_to", property), "must not be before effective_from");
            }
        }

        for (index, education) in person.educations.iter().enumerate() {
            let property = format!("educations[{}]", index);
            checks
                .code(
                    ReferenceDataKind::Country,
                    &format!("{}.institution_country", property),
                    &education.institution_country,
                )
                .await?;
            checks
                .code(
                    ReferenceDataKind::QualificationType,
                    &format!("{}.qualification_type", property),
                    &education.qualification_type,
                )
                .await?;
            checks
                .optional_code(
                    ReferenceDataKind::FieldOfStudy,
                    &format!("{}.field_of_study", property),
                    education.field_of_study.as_deref(),
                )
                .await?;
            if let (Some(first), Some(last)) = (education.first_year_attended, education.last_year_attended) {
                if last < first {
                    checks.fail(format!("{}.last_year_attended", property), "must not be before first_year_attended");
                }
            }
        }

        for (index, employment) in person.employments.iter().enumerate() {
            let property = format!("employments[{}]", index);
            if let Some(end_date) = employment.end_date {
                if end_date < employment.start_date {
                    checks.fail(format!("{}.end_date", property), "must not be before start_date");
                }
            }
            checks
                .optional_code(
                    ReferenceDataKind::EmploymentStatus,
                    &format!("{}.employment_status", property),
                    employment.employment_status.as_deref(),
                )
                .await?;
            if let (Some(status), Some(employment_type)) =
                (employment.employment_status.as_deref(), employment.employment_type.as_deref())
            {
                checks
                    .child_code(
                        ReferenceDataKind::EmploymentType,
                        &format!("{}.employment_type", property),
                        status,
                        employment_type,
                    )
                    .await?;
            }
            checks
                .optional_code(
                    ReferenceDataKind::Occupation,
                    &format!("{}.occupation", property),
                    employment.occupation.as_deref(),
                )
                .await?;
        }

        for (index, identity_document) in person.identity_documents.iter().enumerate() {
            let property = format!("identity_documents[{}]", index);
            checks
                .party_type_code(
                    ReferenceDataKind::IdentityDocumentType,
                    &format!("{}.identity_document_type", property),
                    &identity_document.identity_document_type,
                )
                .await?;
            checks
                .code(
                    ReferenceDataKind::Country,
                    &format!("{}.country_of_issue", property),
                    &identity_document.country_of_issue,
                )
                .await?;
            if let Some(expiry) = identity_document.date_of_expiry {
                if expiry < identity_document.date_of_issue {
                    checks.fail(format!("{}.date_of_expiry", property), "must not be before date_of_issue");
                }
            }
        }

        for (index, proficiency) in person.language_proficiencies.iter().enumerate() {
            checks
                .code(
                    ReferenceDataKind::Language,
                    &format!("language_proficiencies[{}].language", index),
                    &proficiency.language,
                )
                .await?;
        }

        for (index, next_of_kin) in person.next_of_kin.iter().enumerate() {
            let property = format!("next_of_kin[{}]", index);
            checks
                .code(
                    ReferenceDataKind::NextOfKinType,
                    &format!("{}.next_of_kin_type", property),
                    &next_of_kin.next_of_kin_type,
                )
                .await?;
            checks
                .optional_code(ReferenceDataKind::Country, &format!("{}.country", property), next_of_kin.country.as_deref())
                .await?;
        }

        for (index, permit) in person.residence_permits.iter().enumerate() {
            let property = format!("residence_permits[{}]", index);
            checks
                .code(
                    ReferenceDataKind::ResidencePermitType,
                    &format!("{}.residence_permit_type", property),
                    &permit.residence_permit_type,
                )
                .await?;
            checks
                .code(ReferenceDataKind::Country, &format!("{}.country_of_issue", property), &permit.country_of_issue)
                .await?;
        }

        for (index, skill) in person.skills.iter().enumerate() {
            checks
                .code(ReferenceDataKind::SkillType, &format!("skills[{}].skill_type", index), &skill.skill_type)
                .await?;
        }

        let mut total_funds = Decimal::ZERO;
        for (index, source) in person.sources_of_funds.iter().enumerate() {
            let property = format!("sources_of_funds[{}]", index);
            checks
                .code(
                    ReferenceDataKind::SourceOfFundsType,
                    &format!("{}.source_of_funds_type", property),
                    &source.source_of_funds_type,
                )
                .await?;
            if let Some(percentage) = source.percentage {
                if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
                    checks.fail(format!("{}.percentage", property), "must be between 0 and 100");
                }
                total_funds += percentage;
            }
        }
        if total_funds > Decimal::ONE_HUNDRED {
            checks.fail("sources_of_funds", "the percentages must not add up to more than 100");
        }

        for (index, source) in person.sources_of_wealth.iter().enumerate() {
            checks
                .code(
                    ReferenceDataKind::SourceOfWealthType,
                    &format!("sources_of_wealth[{}].source_of_wealth_type", index),
                    &source.source_of_wealth_type,
                )
                .await?;
        }

        checks
            .role_constraints(&person.roles, &person.attributes, &person.preferences)
            .await?;

        let result = checks.finish();
        debug!(errors = result.errors.len(), "Validated person");
        Ok(result)
    }

    /// Validates an organization
    #[instrument(skip(self, organization), fields(organization_id = %organization.id))]
    pub async fn validate_organization(&self, organization: &Organization) -> Result<ValidationResult, PartyError> {
        let mut checks = Checks::new(&self.reference, organization.tenant_id, PartyType::Organization);

        if let Err(errors) = organization.validate() {
            checks.issues.extend(issues_from_errors(&errors));
        }

        checks
            .countries("countries_of_tax_residence", &organization.countries_of_tax_residence)
            .await?;
        checks.attributes(&organization.attributes).await?;
        checks.contact_mechanisms(&organization.contact_mechanisms).await?;
        checks.external_references(&organization.external_references).await?;
        checks.locks(&organization.locks).await?;
        checks.physical_addresses(&organization.physical_addresses).await?;
        checks.preferences(&organization.preferences).await?;
        checks.roles(&organization.roles).await?;
        checks.segment_allocations(&organization.segment_allocations).await?;
        checks.statuses(&organization.statuses).await?;
        checks.tax_numbers(&organization.tax_numbers).await?;
        checks
            .role_constraints(&organization.roles, &organization.attributes, &organization.preferences)
            .await?;

        let result = checks.finish();
        debug!(errors = result.errors.len(), "Validated organization");
        Ok(result)
    }

    /// Validates an association
    #[instrument(skip(self, association), fields(association_id = %association.id))]
    pub async fn validate_association(&self, association: &Association) -> Result<ValidationResult, PartyError> {
        let mut checks = Checks::new(&self.reference, association.tenant_id, PartyType::Person);

        if let Err(errors) = association.validate() {
            checks.issues.extend(issues_from_errors(&errors));
        }
        if association.first_party_id == association.second_party_id {
            checks.fail("second_party_id", "must differ from first_party_id");
        }
        if !association.has_valid_effective_period() {
            checks.fail("effective_to", "must not be before effective_from");
        }

        checks
            .code(ReferenceDataKind::AssociationType, "association_type", &association.association_type)
            .await?;
        for (index, property) in association.properties.iter().enumerate() {
            checks
                .code(
                    ReferenceDataKind::AssociationPropertyType,
                    &format!("properties[{}].property_type", index),
                    &property.property_type,
                )
                .await?;
        }

        Ok(checks.finish())
    }

    /// Validates a mandate
    #[instrument(skip(self, mandate), fields(mandate_id = %mandate.id))]
    pub async fn validate_mandate(&self, mandate: &Mandate) -> Result<ValidationResult, PartyError> {
        let mut checks = Checks::new(&self.reference, mandate.tenant_id, PartyType::Person);

        if let Err(errors) = mandate.validate() {
            checks.issues.extend(issues_from_errors(&errors));
        }
        if mandate.mandataries.is_empty() {
            checks.fail("mandataries", "at least one mandatary is required");
        }
        if !mandate.has_valid_effective_period() {
            checks.fail("effective_to", "must not be before effective_from");
        }

        checks.code(ReferenceDataKind::MandateType, "mandate_type", &mandate.mandate_type).await?;
        for (index, mandatary) in mandate.mandataries.iter().enumerate() {
            checks
                .code(ReferenceDataKind::MandataryRole, &format!("mandataries[{}].role", index), &mandatary.role)
                .await?;
        }
        for (index, property) in mandate.properties.iter().enumerate() {
            checks
                .code(
                    ReferenceDataKind::MandatePropertyType,
                    &format!("properties[{}].property_type", index),
                    &property.property_type,
                )
                .await?;
        }

        Ok(checks.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_issue_display() {
        assert_eq!(ValidationIssue::new("name", "is required").to_string(), "name: is required");
    }

    #[test]
    fn test_result_merge_and_into_result() {
        let mut result = ValidationResult::ok();
        result.merge(ValidationResult::from_issues(vec![ValidationIssue::new("gender", "bad")]));
        assert!(!result.is_valid);

        let error = result.into_result("person").unwrap_err();
        assert!(matches!(error, PartyError::InvalidArgument { ref name, .. } if name == "person"));
        assert!(ValidationResult::ok().into_result("person").is_ok());
    }

    #[test]
    fn test_declarative_issue_paths() {
        let mut person = Person::new(TenantId::DEFAULT, "");
        person.add_tax_number(TaxNumber::new("za_income_tax_number", "ZAF", "123"));

        let errors = person.validate().unwrap_err();
        let issues = issues_from_errors(&errors);
        let properties: Vec<&str> = issues.iter().map(|i| i.property.as_str()).collect();

        assert!(properties.contains(&"name"));
        assert!(properties.contains(&"tax_numbers[0].country_of_issue"));
    }

    #[test]
    fn test_constraint_violations() {
        assert_eq!(violates(ConstraintType::MaxSize, Some("3"), Some("abc"), None), None);
        assert!(violates(ConstraintType::MaxSize, Some("3"), Some("abcd"), None).is_some());
        assert!(violates(ConstraintType::Size, Some("2"), Some("abc"), None).is_some());
        assert!(violates(ConstraintType::Pattern, Some(r"^\d+$"), Some("12a"), None).is_some());
        assert!(violates(ConstraintType::MinValue, Some("18"), None, Some(dec!(17))).is_some());
        assert_eq!(violates(ConstraintType::MaxValue, Some("100"), None, Some(dec!(100))), None);
        assert_eq!(violates(ConstraintType::MaxValue, Some("not a number"), None, Some(dec!(1))), None);
    }
}
