//! Party reference data
//!
//! Reference data are the governed code lists used to validate and label
//! the code fields on parties (genders, marital statuses, tax number types,
//! ...). Every list is stored as [`ReferenceCode`] rows tagged with their
//! [`ReferenceDataKind`], a locale and an optional tenant. Codes without a
//! tenant are global and visible to every tenant.
//!
//! The functions in this module are pure filters over already-loaded
//! lists; loading and caching live in [`crate::reference_service`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unic_langid::LanguageIdentifier;

use core_kernel::TenantId;

use crate::error::PartyError;
use crate::party::PartyType;

macro_rules! reference_data_kinds {
    ($($variant:ident => $slug:literal),+ $(,)?) => {
        /// The governed code lists
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum ReferenceDataKind {
            $($variant,)+
        }

        impl ReferenceDataKind {
            /// All reference data kinds
            pub const ALL: &'static [ReferenceDataKind] = &[$(ReferenceDataKind::$variant,)+];

            /// Returns the slug used in URLs and the database
            pub fn slug(&self) -> &'static str {
                match self {
                    $(ReferenceDataKind::$variant => $slug,)+
                }
            }
        }

        impl FromStr for ReferenceDataKind {
            type Err = PartyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($slug => Ok(ReferenceDataKind::$variant),)+
                    other => Err(PartyError::invalid_argument(
                        "kind",
                        format!("unknown reference data kind '{}'", other),
                    )),
                }
            }
        }
    };
}

reference_data_kinds! {
    AssociationPropertyType => "association-property-type",
    AssociationType => "association-type",
    AttributeType => "attribute-type",
    AttributeTypeCategory => "attribute-type-category",
    ConsentType => "consent-type",
    ContactMechanismPurpose => "contact-mechanism-purpose",
    ContactMechanismRole => "contact-mechanism-role",
    ContactMechanismType => "contact-mechanism-type",
    Country => "country",
    EmploymentStatus => "employment-status",
    EmploymentType => "employment-type",
    ExternalReferenceType => "external-reference-type",
    FieldOfStudy => "field-of-study",
    Gender => "gender",
    IdentityDocumentType => "identity-document-type",
    Language => "language",
    LockType => "lock-type",
    LockTypeCategory => "lock-type-category",
    MandataryRole => "mandatary-role",
    MandatePropertyType => "mandate-property-type",
    MandateType => "mandate-type",
    MaritalStatus => "marital-status",
    MarriageType => "marriage-type",
    NextOfKinType => "next-of-kin-type",
    Occupation => "occupation",
    PhysicalAddressPurpose => "physical-address-purpose",
    PhysicalAddressRole => "physical-address-role",
    PhysicalAddressType => "physical-address-type",
    PreferenceType => "preference-type",
    PreferenceTypeCategory => "preference-type-category",
    QualificationType => "qualification-type",
    Race => "race",
    Region => "region",
    ResidencePermitType => "residence-permit-type",
    ResidencyStatus => "residency-status",
    ResidentialType => "residential-type",
    RolePurpose => "role-purpose",
    RoleType => "role-type",
    Segment => "segment",
    SegmentationType => "segmentation-type",
    SkillType => "skill-type",
    SourceOfFundsType => "source-of-funds-type",
    SourceOfWealthType => "source-of-wealth-type",
    StatusType => "status-type",
    StatusTypeCategory => "status-type-category",
    TaxNumberType => "tax-number-type",
    TimeToContact => "time-to-contact",
    Title => "title",
}

impl fmt::Display for ReferenceDataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// The type of value held by an attribute or preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Boolean,
    Date,
    Decimal,
    Double,
    Integer,
    String,
}

impl ValueType {
    pub fn code(&self) -> &'static str {
        match self {
            ValueType::Boolean => "boolean",
            ValueType::Date => "date",
            ValueType::Decimal => "decimal",
            ValueType::Double => "double",
            ValueType::Integer => "integer",
            ValueType::String => "string",
        }
    }
}

impl FromStr for ValueType {
    type Err = PartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boolean" => Ok(ValueType::Boolean),
            "date" => Ok(ValueType::Date),
            "decimal" => Ok(ValueType::Decimal),
            "double" => Ok(ValueType::Double),
            "integer" => Ok(ValueType::Integer),
            "string" => Ok(ValueType::String),
            other => Err(PartyError::invalid_argument(
                "value_type",
                format!("unknown value type '{}'", other),
            )),
        }
    }
}

/// Party types as their plain codes, so XML sequences decode as text
mod party_type_codes {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::party::PartyType;

    pub fn serialize<S: Serializer>(types: &[PartyType], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(types.iter().map(PartyType::code))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<PartyType>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|code| code.parse().map_err(D::Error::custom))
            .collect()
    }
}

/// A single code in a reference data list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCode {
    pub kind: ReferenceDataKind,
    pub code: String,
    /// Locale of the name and description, e.g. "en-US"
    pub locale_id: String,
    /// Owning tenant, or `None` for a global code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_index: Option<i32>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Code of the owning entry in the parent list (e.g. the country of a region)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_code: Option<String>,
    /// Party types the code applies to; empty means all
    #[serde(default, with = "party_type_codes")]
    pub party_types: Vec<PartyType>,
    /// Value type for attribute and preference types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    /// Regular expression that values must match, for typed codes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl ReferenceCode {
    /// Creates a global code with no parent
    pub fn new(
        kind: ReferenceDataKind,
        code: impl Into<String>,
        locale_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            code: code.into(),
            locale_id: locale_id.into(),
            tenant_id: None,
            sort_index: None,
            name: name.into(),
            description: String::new(),
            parent_code: None,
            party_types: Vec::new(),
            value_type: None,
            pattern: None,
        }
    }

    pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn with_parent(mut self, parent_code: impl Into<String>) -> Self {
        self.parent_code = Some(parent_code.into());
        self
    }

    pub fn with_party_types(mut self, party_types: &[PartyType]) -> Self {
        self.party_types = party_types.to_vec();
        self
    }

    pub fn with_sort_index(mut self, sort_index: i32) -> Self {
        self.sort_index = Some(sort_index);
        self
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Returns true if the code is global or owned by the tenant
    pub fn is_visible_to(&self, tenant_id: TenantId) -> bool {
        self.tenant_id.map_or(true, |owner| owner == tenant_id)
    }

    /// Returns true if the code applies to the party type
    pub fn applies_to(&self, party_type: PartyType) -> bool {
        self.party_types.is_empty() || self.party_types.contains(&party_type)
    }

    /// Returns true if the value matches the code's pattern, or there is none
    ///
    /// An invalid pattern never matches.
    pub fn matches_pattern(&self, value: &str) -> bool {
        match &self.pattern {
            Some(pattern) => Regex::new(pattern).map_or(false, |re| re.is_match(value)),
            None => true,
        }
    }
}

/// The kind of constraint a role type places on an attribute or preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    /// The attribute must be present
    Required,
    /// The value must have at most `value` characters
    MaxSize,
    /// The value must have at least `value` characters
    MinSize,
    /// The value must match the regular expression in `value`
    Pattern,
    /// The numeric value must be at most `value`
    MaxValue,
    /// The numeric value must be at least `value`
    MinValue,
    /// The value must have exactly `value` characters
    Size,
}

impl ConstraintType {
    pub fn code(&self) -> &'static str {
        match self {
            ConstraintType::Required => "required",
            ConstraintType::MaxSize => "max_size",
            ConstraintType::MinSize => "min_size",
            ConstraintType::Pattern => "pattern",
            ConstraintType::MaxValue => "max_value",
            ConstraintType::MinValue => "min_value",
            ConstraintType::Size => "size",
        }
    }
}

impl FromStr for ConstraintType {
    type Err = PartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "required" => Ok(ConstraintType::Required),
            "max_size" => Ok(ConstraintType::MaxSize),
            "min_size" => Ok(ConstraintType::MinSize),
            "pattern" => Ok(ConstraintType::Pattern),
            "max_value" => Ok(ConstraintType::MaxValue),
            "min_value" => Ok(ConstraintType::MinValue),
            "size" => Ok(ConstraintType::Size),
            other => Err(PartyError::invalid_argument(
                "constraint_type",
                format!("unknown constraint type '{}'", other),
            )),
        }
    }
}

/// A constraint a role type places on one of the party's attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTypeAttributeTypeConstraint {
    pub role_type: String,
    pub attribute_type: String,
    pub constraint_type: ConstraintType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl RoleTypeAttributeTypeConstraint {
    pub fn new(
        role_type: impl Into<String>,
        attribute_type: impl Into<String>,
        constraint_type: ConstraintType,
        value: Option<&str>,
    ) -> Self {
        Self {
            role_type: role_type.into(),
            attribute_type: attribute_type.into(),
            constraint_type,
            value: value.map(str::to_string),
        }
    }
}

/// A constraint a role type places on one of the party's preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTypePreferenceTypeConstraint {
    pub role_type: String,
    pub preference_type: String,
    pub constraint_type: ConstraintType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl RoleTypePreferenceTypeConstraint {
    pub fn new(
        role_type: impl Into<String>,
        preference_type: impl Into<String>,
        constraint_type: ConstraintType,
        value: Option<&str>,
    ) -> Self {
        Self {
            role_type: role_type.into(),
            preference_type: preference_type.into(),
            constraint_type,
            value: value.map(str::to_string),
        }
    }
}

/// Parses a locale, accepting `_` as the subtag separator
fn parse_locale(locale_id: &str) -> Option<LanguageIdentifier> {
    locale_id.trim().replace('_', "-").parse().ok()
}

/// Whether two locale identifiers name the same locale
///
/// Identifiers that do not parse are compared as text, ignoring case.
fn same_locale(stored: &str, requested: Option<&LanguageIdentifier>, requested_text: &str) -> bool {
    match (parse_locale(stored), requested) {
        (Some(stored), Some(requested)) => stored == *requested,
        _ => stored.eq_ignore_ascii_case(requested_text),
    }
}

/// Returns the codes visible to the tenant in the locale, in display order
///
/// `en_us`, `en-US` and `EN-us` all select the same codes. Codes are ordered
/// by sort index (codes without one last) and then name.
pub fn filter_codes(codes: &[ReferenceCode], tenant_id: TenantId, locale_id: &str) -> Vec<ReferenceCode> {
    let requested = parse_locale(locale_id);
    let mut filtered: Vec<ReferenceCode> = codes
        .iter()
        .filter(|c| c.is_visible_to(tenant_id) && same_locale(&c.locale_id, requested.as_ref(), locale_id))
        .cloned()
        .collect();

    filtered.sort_by(|a, b| {
        let a_index = a.sort_index.unwrap_or(i32::MAX);
        let b_index = b.sort_index.unwrap_or(i32::MAX);
        a_index.cmp(&b_index).then_with(|| a.name.cmp(&b.name))
    });
    filtered
}

/// Returns true if the code exists for the tenant in any locale
pub fn is_valid_code(codes: &[ReferenceCode], tenant_id: TenantId, code: &str) -> bool {
    codes
        .iter()
        .any(|c| c.code == code && c.is_visible_to(tenant_id))
}

/// Returns true if the code exists for the tenant and applies to the party type
pub fn is_valid_code_for_party_type(
    codes: &[ReferenceCode],
    tenant_id: TenantId,
    party_type: PartyType,
    code: &str,
) -> bool {
    codes
        .iter()
        .any(|c| c.code == code && c.is_visible_to(tenant_id) && c.applies_to(party_type))
}

/// Returns true if the code exists for the tenant under the given parent code
pub fn is_valid_code_with_parent(
    codes: &[ReferenceCode],
    tenant_id: TenantId,
    parent_code: &str,
    code: &str,
) -> bool {
    codes.iter().any(|c| {
        c.code == code && c.is_visible_to(tenant_id) && c.parent_code.as_deref() == Some(parent_code)
    })
}

/// Returns the distinct locales present in the list
pub fn available_locales(codes: &[ReferenceCode]) -> Vec<String> {
    let mut locales: Vec<String> = codes.iter().map(|c| c.locale_id.clone()).collect();
    locales.sort();
    locales.dedup();
    locales
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genders() -> Vec<ReferenceCode> {
        vec![
            ReferenceCode::new(ReferenceDataKind::Gender, "male", "en-US", "Male").with_sort_index(2),
            ReferenceCode::new(ReferenceDataKind::Gender, "female", "en-US", "Female").with_sort_index(1),
            ReferenceCode::new(ReferenceDataKind::Gender, "unknown", "en-US", "Unknown"),
            ReferenceCode::new(ReferenceDataKind::Gender, "male", "fr-FR", "Homme"),
        ]
    }

    #[test]
    fn test_slugs_round_trip() {
        for kind in ReferenceDataKind::ALL {
            assert_eq!(kind.slug().parse::<ReferenceDataKind>().unwrap(), *kind);
        }
        assert_eq!(ReferenceDataKind::MaritalStatus.slug(), "marital-status");
        assert!("colour".parse::<ReferenceDataKind>().is_err());
    }

    #[test]
    fn test_serde_uses_slug() {
        let json = serde_json::to_string(&ReferenceDataKind::SourceOfFundsType).unwrap();
        assert_eq!(json, "\"source-of-funds-type\"");
    }

    #[test]
    fn test_filter_codes_orders_by_sort_index_then_name() {
        let filtered = filter_codes(&genders(), TenantId::DEFAULT, "EN-us");
        let codes: Vec<&str> = filtered.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["female", "male", "unknown"]);
    }

    #[test]
    fn test_filter_codes_normalizes_locale_separators() {
        let codes = vec![
            ReferenceCode::new(ReferenceDataKind::Gender, "female", "af_ZA", "Vroulik"),
            ReferenceCode::new(ReferenceDataKind::Gender, "male", "af-za", "Manlik"),
            ReferenceCode::new(ReferenceDataKind::Gender, "female", "en-US", "Female"),
        ];

        for requested in ["af-ZA", "af_za", " AF-za "] {
            let filtered = filter_codes(&codes, TenantId::DEFAULT, requested);
            let names: Vec<&str> = filtered.iter().map(|c| c.name.as_str()).collect();
            assert_eq!(names, vec!["Manlik", "Vroulik"], "requested {requested:?}");
        }
    }

    #[test]
    fn test_filter_codes_compares_unparseable_locales_as_text() {
        let codes = vec![ReferenceCode::new(ReferenceDataKind::Gender, "female", "not a locale", "Female")];
        assert_eq!(filter_codes(&codes, TenantId::DEFAULT, "NOT A LOCALE").len(), 1);
        assert!(filter_codes(&codes, TenantId::DEFAULT, "en-US").is_empty());
    }

    #[test]
    fn test_tenant_scoped_codes() {
        let tenant = TenantId::new();
        let other = TenantId::new();
        let mut codes = genders();
        codes.push(
            ReferenceCode::new(ReferenceDataKind::Gender, "custom", "en-US", "Custom").with_tenant(tenant),
        );

        assert!(is_valid_code(&codes, tenant, "custom"));
        assert!(!is_valid_code(&codes, other, "custom"));
        assert!(is_valid_code(&codes, other, "male"));
        assert_eq!(filter_codes(&codes, other, "en-US").len(), 3);
    }

    #[test]
    fn test_party_type_and_parent_predicates() {
        let codes = vec![
            ReferenceCode::new(ReferenceDataKind::TaxNumberType, "za_income_tax_number", "en-US", "Income Tax")
                .with_party_types(&[PartyType::Person]),
            ReferenceCode::new(ReferenceDataKind::Region, "WC", "en-US", "Western Cape").with_parent("ZA"),
        ];
        let tenant = TenantId::DEFAULT;

        assert!(is_valid_code_for_party_type(&codes, tenant, PartyType::Person, "za_income_tax_number"));
        assert!(!is_valid_code_for_party_type(&codes, tenant, PartyType::Organization, "za_income_tax_number"));
        assert!(is_valid_code_with_parent(&codes, tenant, "ZA", "WC"));
        assert!(!is_valid_code_with_parent(&codes, tenant, "GB", "WC"));
    }

    #[test]
    fn test_pattern_matching() {
        let code = ReferenceCode::new(ReferenceDataKind::AttributeType, "height", "en-US", "Height")
            .with_pattern(r"^\d+$");
        assert!(code.matches_pattern("182"));
        assert!(!code.matches_pattern("tall"));

        let broken = code.clone().with_pattern("(");
        assert!(!broken.matches_pattern("182"));
    }

    #[test]
    fn test_available_locales() {
        assert_eq!(available_locales(&genders()), vec!["en-US".to_string(), "fr-FR".to_string()]);
    }
}
