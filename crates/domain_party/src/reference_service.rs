//! Party reference data service
//!
//! Loads reference code lists through the [`ReferenceDataPort`], caches them
//! per kind, tenant and locale, and answers the validity questions the
//! party validator asks ("is `WC` a region of `ZA`?").
//!
//! # Locales
//!
//! Locale identifiers are normalized with `unic-langid`, so `en_us`,
//! `en-US` and `EN-us` all select the same list. When a list has no codes
//! for the requested locale, `fluent-langneg` picks the closest available
//! locale, falling back to the default locale (`en-US` unless configured).

use std::sync::Arc;
use std::time::Duration;

use fluent_langneg::{negotiate_languages, NegotiationStrategy};
use tracing::{debug, info, instrument};
use unic_langid::LanguageIdentifier;

use core_kernel::TenantId;

use crate::cache::{cache_key, ReferenceDataCache, DEFAULT_TTL};
use crate::error::PartyError;
use crate::party::PartyType;
use crate::ports::ReferenceDataPort;
use crate::reference::{
    available_locales, filter_codes, is_valid_code, is_valid_code_for_party_type,
    is_valid_code_with_parent, ReferenceCode, ReferenceDataKind, RoleTypeAttributeTypeConstraint,
    RoleTypePreferenceTypeConstraint,
};

/// The locale used when none is requested and for fallback
pub const DEFAULT_LOCALE: &str = "en-US";

/// Normalizes a locale identifier to its canonical form, e.g. `en_us` to `en-US`
pub fn normalize_locale(locale_id: &str) -> Result<LanguageIdentifier, PartyError> {
    locale_id
        .trim()
        .replace('_', "-")
        .parse::<LanguageIdentifier>()
        .map_err(|e| PartyError::invalid_argument("locale_id", format!("invalid locale '{}': {}", locale_id, e)))
}

type CodeList = Arc<Vec<ReferenceCode>>;

/// Cached access to party reference data
pub struct PartyReferenceService {
    port: Arc<dyn ReferenceDataPort>,
    codes: ReferenceDataCache<CodeList>,
    attribute_constraints: ReferenceDataCache<Arc<Vec<RoleTypeAttributeTypeConstraint>>>,
    preference_constraints: ReferenceDataCache<Arc<Vec<RoleTypePreferenceTypeConstraint>>>,
    default_locale: LanguageIdentifier,
}

macro_rules! code_accessors {
    ($($get:ident, $is_valid:ident => $kind:ident;)+) => {
        impl PartyReferenceService {
            $(
                #[doc = concat!("Returns the `", stringify!($kind), "` codes for the tenant and locale")]
                pub async fn $get(
                    &self,
                    tenant_id: TenantId,
                    locale_id: Option<&str>,
                ) -> Result<Vec<ReferenceCode>, PartyError> {
                    self.get_codes(ReferenceDataKind::$kind, tenant_id, locale_id).await
                }

                #[doc = concat!("Returns true if the code is a valid `", stringify!($kind), "` for the tenant")]
                pub async fn $is_valid(&self, tenant_id: TenantId, code: &str) -> Result<bool, PartyError> {
                    self.is_valid(ReferenceDataKind::$kind, tenant_id, code).await
                }
            )+
        }
    };
}

macro_rules! party_type_code_accessors {
    ($($get:ident, $is_valid:ident => $kind:ident;)+) => {
        impl PartyReferenceService {
            $(
                #[doc = concat!("Returns the `", stringify!($kind), "` codes for the tenant and locale")]
                pub async fn $get(
                    &self,
                    tenant_id: TenantId,
                    locale_id: Option<&str>,
                ) -> Result<Vec<ReferenceCode>, PartyError> {
                    self.get_codes(ReferenceDataKind::$kind, tenant_id, locale_id).await
                }

                #[doc = concat!("Returns true if the code is a valid `", stringify!($kind), "` for the tenant and party type")]
                pub async fn $is_valid(
                    &self,
                    tenant_id: TenantId,
                    party_type: PartyType,
                    code: &str,
                ) -> Result<bool, PartyError> {
                    self.is_valid_for_party_type(ReferenceDataKind::$kind, tenant_id, party_type, code).await
                }
            )+
        }
    };
}

macro_rules! parent_code_accessors {
    ($($get:ident, $is_valid:ident => $kind:ident;)+) => {
        impl PartyReferenceService {
            $(
                #[doc = concat!("Returns the `", stringify!($kind), "` codes for the tenant and locale")]
                pub async fn $get(
                    &self,
                    tenant_id: TenantId,
                    locale_id: Option<&str>,
                ) -> Result<Vec<ReferenceCode>, PartyError> {
                    self.get_codes(ReferenceDataKind::$kind, tenant_id, locale_id).await
                }

                #[doc = concat!("Returns true if the code is a valid `", stringify!($kind), "` under the parent code")]
                pub async fn $is_valid(
                    &self,
                    tenant_id: TenantId,
                    parent_code: &str,
                    code: &str,
                ) -> Result<bool, PartyError> {
                    self.is_valid_with_parent(ReferenceDataKind::$kind, tenant_id, parent_code, code).await
                }
            )+
        }
    };
}

code_accessors! {
    get_association_property_types, is_valid_association_property_type => AssociationPropertyType;
    get_association_types, is_valid_association_type => AssociationType;
    get_attribute_type_categories, is_valid_attribute_type_category => AttributeTypeCategory;
    get_consent_types, is_valid_consent_type => ConsentType;
    get_contact_mechanism_purposes, is_valid_contact_mechanism_purpose => ContactMechanismPurpose;
    get_countries, is_valid_country => Country;
    get_employment_statuses, is_valid_employment_status => EmploymentStatus;
    get_fields_of_study, is_valid_field_of_study => FieldOfStudy;
    get_genders, is_valid_gender => Gender;
    get_languages, is_valid_language => Language;
    get_lock_type_categories, is_valid_lock_type_category => LockTypeCategory;
    get_mandatary_roles, is_valid_mandatary_role => MandataryRole;
    get_mandate_property_types, is_valid_mandate_property_type => MandatePropertyType;
    get_mandate_types, is_valid_mandate_type => MandateType;
    get_marital_statuses, is_valid_marital_status => MaritalStatus;
    get_next_of_kin_types, is_valid_next_of_kin_type => NextOfKinType;
    get_occupations, is_valid_occupation => Occupation;
    get_preference_type_categories, is_valid_preference_type_category => PreferenceTypeCategory;
    get_qualification_types, is_valid_qualification_type => QualificationType;
    get_races, is_valid_race => Race;
    get_residence_permit_types, is_valid_residence_permit_type => ResidencePermitType;
    get_residency_statuses, is_valid_residency_status => ResidencyStatus;
    get_residential_types, is_valid_residential_type => ResidentialType;
    get_role_purposes, is_valid_role_purpose => RolePurpose;
    get_segmentation_types, is_valid_segmentation_type => SegmentationType;
    get_skill_types, is_valid_skill_type => SkillType;
    get_sources_of_funds_types, is_valid_source_of_funds_type => SourceOfFundsType;
    get_sources_of_wealth_types, is_valid_source_of_wealth_type => SourceOfWealthType;
    get_status_type_categories, is_valid_status_type_category => StatusTypeCategory;
    get_times_to_contact, is_valid_time_to_contact => TimeToContact;
    get_titles, is_valid_title => Title;
}

party_type_code_accessors! {
    get_attribute_types, is_valid_attribute_type => AttributeType;
    get_contact_mechanism_types, is_valid_contact_mechanism_type => ContactMechanismType;
    get_external_reference_types, is_valid_external_reference_type => ExternalReferenceType;
    get_identity_document_types, is_valid_identity_document_type => IdentityDocumentType;
    get_lock_types, is_valid_lock_type => LockType;
    get_physical_address_purposes, is_valid_physical_address_purpose => PhysicalAddressPurpose;
    get_physical_address_roles, is_valid_physical_address_role => PhysicalAddressRole;
    get_physical_address_types, is_valid_physical_address_type => PhysicalAddressType;
    get_preference_types, is_valid_preference_type => PreferenceType;
    get_role_types, is_valid_role_type => RoleType;
    get_segments, is_valid_segment => Segment;
    get_status_types, is_valid_status_type => StatusType;
    get_tax_number_types, is_valid_tax_number_type => TaxNumberType;
}

parent_code_accessors! {
    get_employment_types, is_valid_employment_type => EmploymentType;
    get_marriage_types, is_valid_marriage_type => MarriageType;
    get_regions, is_valid_region => Region;
}

impl PartyReferenceService {
    /// Creates a service with the default locale and cache time-to-live
    pub fn new(port: Arc<dyn ReferenceDataPort>) -> Self {
        Self::with_ttl(port, DEFAULT_TTL)
    }

    /// Creates a service whose cache entries expire after `ttl`
    pub fn with_ttl(port: Arc<dyn ReferenceDataPort>, ttl: Duration) -> Self {
        Self {
            port,
            codes: ReferenceDataCache::with_ttl(ttl),
            attribute_constraints: ReferenceDataCache::with_ttl(ttl),
            preference_constraints: ReferenceDataCache::with_ttl(ttl),
            default_locale: normalize_locale(DEFAULT_LOCALE).unwrap_or_default(),
        }
    }

    /// Sets the locale used when none is requested and for fallback
    pub fn with_default_locale(mut self, locale_id: &str) -> Result<Self, PartyError> {
        self.default_locale = normalize_locale(locale_id)?;
        Ok(self)
    }

    /// Returns the default locale
    pub fn default_locale(&self) -> String {
        self.default_locale.to_string()
    }

    /// Loads every code of the kind, across tenants and locales
    async fn all_codes(&self, kind: ReferenceDataKind) -> Result<CodeList, PartyError> {
        let key = format!("{}.*.*", kind);
        self.codes
            .get_or_try_insert_with(&key, || async {
                let codes = self.port.get_codes(kind).await.map_err(|e| {
                    PartyError::service_unavailable(
                        format!("Failed to retrieve the {} reference data", kind),
                        e,
                    )
                })?;
                debug!(kind = %kind, count = codes.len(), "Loaded reference data");
                Ok(Arc::new(codes))
            })
            .await
    }

    /// Returns the codes of the kind visible to the tenant in any locale
    async fn tenant_codes(&self, kind: ReferenceDataKind, tenant_id: TenantId) -> Result<CodeList, PartyError> {
        let key = cache_key(kind, tenant_id, None);
        self.codes
            .get_or_try_insert_with(&key, || async {
                let all = self.all_codes(kind).await?;
                Ok(Arc::new(
                    all.iter().filter(|c| c.is_visible_to(tenant_id)).cloned().collect(),
                ))
            })
            .await
    }

    /// Returns the codes of the kind for the tenant and locale, in display order
    ///
    /// # Arguments
    ///
    /// * `kind` - The code list
    /// * `tenant_id` - The tenant; global codes are always included
    /// * `locale_id` - The requested locale, or `None` for the default locale
    #[instrument(skip(self, kind), fields(kind = %kind))]
    pub async fn get_codes(
        &self,
        kind: ReferenceDataKind,
        tenant_id: TenantId,
        locale_id: Option<&str>,
    ) -> Result<Vec<ReferenceCode>, PartyError> {
        let requested = match locale_id {
            Some(locale_id) if !locale_id.trim().is_empty() => normalize_locale(locale_id)?,
            _ => self.default_locale.clone(),
        };

        let key = cache_key(kind, tenant_id, Some(&requested.to_string()));
        let codes = self
            .codes
            .get_or_try_insert_with::<_, _, PartyError>(&key, || async {
                let visible = self.tenant_codes(kind, tenant_id).await?;
                let exact = filter_codes(&visible, tenant_id, &requested.to_string());
                if !exact.is_empty() {
                    return Ok(Arc::new(exact));
                }

                match self.negotiate_locale(&requested, &visible) {
                    Some(fallback) => {
                        debug!(requested = %requested, fallback = %fallback, "Falling back to another locale");
                        Ok(Arc::new(filter_codes(&visible, tenant_id, &fallback)))
                    }
                    None => Ok(Arc::new(Vec::new())),
                }
            })
            .await?;

        Ok(codes.as_ref().clone())
    }

    fn negotiate_locale(&self, requested: &LanguageIdentifier, codes: &[ReferenceCode]) -> Option<String> {
        let available: Vec<LanguageIdentifier> = available_locales(codes)
            .iter()
            .filter_map(|locale| normalize_locale(locale).ok())
            .collect();
        if available.is_empty() {
            return None;
        }

        let default = available.iter().find(|locale| **locale == self.default_locale);
        let supported = negotiate_languages(
            std::slice::from_ref(requested),
            &available,
            default,
            NegotiationStrategy::Lookup,
        );
        supported.first().map(|locale| locale.to_string())
    }

    /// Returns the code with the given value, in any locale, if it exists
    pub async fn find_code(
        &self,
        kind: ReferenceDataKind,
        tenant_id: TenantId,
        code: &str,
    ) -> Result<Option<ReferenceCode>, PartyError> {
        let codes = self.tenant_codes(kind, tenant_id).await?;
        Ok(codes.iter().find(|c| c.code == code).cloned())
    }

    /// Returns true if the code exists for the tenant in any locale
    pub async fn is_valid(
        &self,
        kind: ReferenceDataKind,
        tenant_id: TenantId,
        code: &str,
    ) -> Result<bool, PartyError> {
        let codes = self.tenant_codes(kind, tenant_id).await?;
        Ok(is_valid_code(&codes, tenant_id, code))
    }

    /// Returns true if the code exists for the tenant and applies to the party type
    pub async fn is_valid_for_party_type(
        &self,
        kind: ReferenceDataKind,
        tenant_id: TenantId,
        party_type: PartyType,
        code: &str,
    ) -> Result<bool, PartyError> {
        let codes = self.tenant_codes(kind, tenant_id).await?;
        Ok(is_valid_code_for_party_type(&codes, tenant_id, party_type, code))
    }

    /// Returns true if the code exists for the tenant under the parent code
    pub async fn is_valid_with_parent(
        &self,
        kind: ReferenceDataKind,
        tenant_id: TenantId,
        parent_code: &str,
        code: &str,
    ) -> Result<bool, PartyError> {
        let codes = self.tenant_codes(kind, tenant_id).await?;
        Ok(is_valid_code_with_parent(&codes, tenant_id, parent_code, code))
    }

    /// Returns true if the contact mechanism role is valid for the type and party type
    pub async fn is_valid_contact_mechanism_role(
        &self,
        tenant_id: TenantId,
        party_type: PartyType,
        contact_mechanism_type: &str,
        code: &str,
    ) -> Result<bool, PartyError> {
        let codes = self.tenant_codes(ReferenceDataKind::ContactMechanismRole, tenant_id).await?;
        Ok(codes.iter().any(|c| {
            c.code == code
                && c.applies_to(party_type)
                && c.parent_code.as_deref() == Some(contact_mechanism_type)
        }))
    }

    pub async fn get_contact_mechanism_roles(
        &self,
        tenant_id: TenantId,
        locale_id: Option<&str>,
    ) -> Result<Vec<ReferenceCode>, PartyError> {
        self.get_codes(ReferenceDataKind::ContactMechanismRole, tenant_id, locale_id).await
    }

    /// Returns the attribute constraints for a role type, or for all role types
    pub async fn get_role_type_attribute_type_constraints(
        &self,
        role_type: Option<&str>,
    ) -> Result<Vec<RoleTypeAttributeTypeConstraint>, PartyError> {
        let key = role_type.unwrap_or("*").to_string();
        let constraints = self
            .attribute_constraints
            .get_or_try_insert_with::<_, _, PartyError>(&key, || async {
                self.port
                    .get_role_type_attribute_type_constraints(role_type)
                    .await
                    .map(Arc::new)
                    .map_err(|e| {
                        PartyError::service_unavailable(
                            "Failed to retrieve the role type attribute type constraints",
                            e,
                        )
                    })
            })
            .await?;
        Ok(constraints.as_ref().clone())
    }

    /// Returns the preference constraints for a role type, or for all role types
    pub async fn get_role_type_preference_type_constraints(
        &self,
        role_type: Option<&str>,
    ) -> Result<Vec<RoleTypePreferenceTypeConstraint>, PartyError> {
        let key = role_type.unwrap_or("*").to_string();
        let constraints = self
            .preference_constraints
            .get_or_try_insert_with::<_, _, PartyError>(&key, || async {
                self.port
                    .get_role_type_preference_type_constraints(role_type)
                    .await
                    .map(Arc::new)
                    .map_err(|e| {
                        PartyError::service_unavailable(
                            "Failed to retrieve the role type preference type constraints",
                            e,
                        )
                    })
            })
            .await?;
        Ok(constraints.as_ref().clone())
    }

    /// Discards all cached reference data
    pub fn reload(&self) {
        self.codes.invalidate_all();
        self.attribute_constraints.invalidate_all();
        self.preference_constraints.invalidate_all();
        info!("Reference data cache cleared");
    }

    /// Discards the cached lists for one kind
    pub fn reload_kind(&self, kind: ReferenceDataKind) {
        self.codes.invalidate_kind(kind);
    }

    /// Number of cached code lists
    pub fn cached_lists(&self) -> usize {
        self.codes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::InMemoryReferenceDataPort;

    async fn service_with(codes: Vec<ReferenceCode>) -> (Arc<InMemoryReferenceDataPort>, PartyReferenceService) {
        let port = Arc::new(InMemoryReferenceDataPort::with_codes(codes).await);
        let service = PartyReferenceService::new(port.clone());
        (port, service)
    }

    fn gender(code: &str, locale: &str, name: &str) -> ReferenceCode {
        ReferenceCode::new(ReferenceDataKind::Gender, code, locale, name)
    }

    #[test]
    fn test_normalize_locale() {
        assert_eq!(normalize_locale("en_us").unwrap().to_string(), "en-US");
        assert_eq!(normalize_locale("EN-gb").unwrap().to_string(), "en-GB");
        assert!(normalize_locale("not a locale!").is_err());
    }

    #[tokio::test]
    async fn test_codes_are_cached_until_reload() {
        let (port, service) = service_with(vec![gender("female", "en-US", "Female")]).await;

        service.get_genders(TenantId::DEFAULT, Some("en-US")).await.unwrap();
        service.get_genders(TenantId::DEFAULT, Some("en_us")).await.unwrap();
        assert!(service.is_valid_gender(TenantId::DEFAULT, "female").await.unwrap());
        assert_eq!(port.load_count(), 1);

        service.reload();
        service.get_genders(TenantId::DEFAULT, None).await.unwrap();
        assert_eq!(port.load_count(), 2);
    }

    #[tokio::test]
    async fn test_locale_falls_back_to_default() {
        let (_, service) = service_with(vec![
            gender("female", "en-US", "Female"),
            gender("female", "fr-FR", "Femme"),
        ])
        .await;

        let german = service.get_genders(TenantId::DEFAULT, Some("de-DE")).await.unwrap();
        assert_eq!(german.len(), 1);
        assert_eq!(german[0].name, "Female");

        let canadian_french = service.get_genders(TenantId::DEFAULT, Some("fr-CA")).await.unwrap();
        assert_eq!(canadian_french[0].name, "Femme");
    }

    #[tokio::test]
    async fn test_underscored_stored_locales_are_served() {
        let (_, service) = service_with(vec![
            gender("female", "en_US", "Female"),
            gender("female", "af_ZA", "Vroulik"),
        ])
        .await;

        let afrikaans = service.get_genders(TenantId::DEFAULT, Some("af-ZA")).await.unwrap();
        assert_eq!(afrikaans.len(), 1);
        assert_eq!(afrikaans[0].name, "Vroulik");

        let fallback = service.get_genders(TenantId::DEFAULT, Some("de-DE")).await.unwrap();
        assert_eq!(fallback.len(), 1);
        assert_eq!(fallback[0].name, "Female");
    }

    #[tokio::test]
    async fn test_parent_and_party_type_predicates() {
        let (_, service) = service_with(vec![
            ReferenceCode::new(ReferenceDataKind::Region, "WC", "en-US", "Western Cape").with_parent("ZA"),
            ReferenceCode::new(ReferenceDataKind::ContactMechanismRole, "personal_mobile", "en-US", "Personal Mobile")
                .with_parent("mobile_number")
                .with_party_types(&[PartyType::Person]),
        ])
        .await;
        let tenant = TenantId::DEFAULT;

        assert!(service.is_valid_region(tenant, "ZA", "WC").await.unwrap());
        assert!(!service.is_valid_region(tenant, "GB", "WC").await.unwrap());
        assert!(service
            .is_valid_contact_mechanism_role(tenant, PartyType::Person, "mobile_number", "personal_mobile")
            .await
            .unwrap());
        assert!(!service
            .is_valid_contact_mechanism_role(tenant, PartyType::Organization, "mobile_number", "personal_mobile")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_unavailable_port_is_service_unavailable() {
        let (port, service) = service_with(Vec::new()).await;
        port.set_unavailable(true);

        let error = service.is_valid_title(TenantId::DEFAULT, "mr").await.unwrap_err();
        assert!(matches!(error, PartyError::ServiceUnavailable { .. }));
    }
}
