//! JSON and XML encoding of party entities
//!
//! Every entity in this crate derives serde, so the codec functions are
//! generic. XML documents use the type name as their root element.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while encoding or decoding a document
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML encoding error: {0}")]
    XmlEncode(#[from] quick_xml::SeError),

    #[error("XML decoding error: {0}")]
    XmlDecode(#[from] quick_xml::DeError),
}

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    Xml,
}

impl Format {
    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Xml => "application/xml",
        }
    }

    /// Picks a format from an HTTP `Accept` or `Content-Type` value
    ///
    /// Anything that does not name XML is treated as JSON.
    pub fn from_media_type(value: &str) -> Self {
        let value = value.to_ascii_lowercase();
        let prefers_xml = value
            .split(',')
            .map(|part| part.split(';').next().unwrap_or("").trim())
            .find(|media| !media.is_empty() && *media != "*/*")
            .map(|media| media.ends_with("/xml") || media.ends_with("+xml"))
            .unwrap_or(false);

        if prefers_xml {
            Format::Xml
        } else {
            Format::Json
        }
    }
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, CodecError> {
    Ok(serde_json::to_string(value)?)
}

pub fn from_json<T: DeserializeOwned>(document: &str) -> Result<T, CodecError> {
    Ok(serde_json::from_str(document)?)
}

pub fn to_xml<T: Serialize>(value: &T) -> Result<String, CodecError> {
    Ok(quick_xml::se::to_string(value)?)
}

pub fn from_xml<T: DeserializeOwned>(document: &str) -> Result<T, CodecError> {
    Ok(quick_xml::de::from_str(document)?)
}

/// Encodes a value in the given format
pub fn encode<T: Serialize>(value: &T, format: Format) -> Result<String, CodecError> {
    match format {
        Format::Json => to_json(value),
        Format::Xml => to_xml(value),
    }
}

/// Decodes a value from the given format
pub fn decode<T: DeserializeOwned>(document: &str, format: Format) -> Result<T, CodecError> {
    match format {
        Format::Json => from_json(document),
        Format::Xml => from_xml(document),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attribute;
    use crate::contact::ContactMechanism;
    use crate::mandate::{Mandatary, Mandate};
    use crate::organization::Organization;
    use crate::party::{PageRequest, Party, PartyPage, PartyType};
    use crate::person::Person;
    use crate::person_details::SourceOfFunds;
    use crate::reference::{ReferenceCode, ReferenceDataKind, ValueType};
    use core_kernel::{PartyId, TenantId};
    use rust_decimal_macros::dec;

    fn xml_round_trip<T: Serialize + DeserializeOwned>(value: &T) -> T {
        let xml = to_xml(value).unwrap();
        from_xml(&xml).unwrap_or_else(|e| panic!("failed to decode {xml}: {e}"))
    }

    #[test]
    fn test_format_from_media_type() {
        assert_eq!(Format::from_media_type("application/xml"), Format::Xml);
        assert_eq!(Format::from_media_type("text/xml; charset=utf-8"), Format::Xml);
        assert_eq!(Format::from_media_type("*/*, application/xml"), Format::Xml);
        assert_eq!(Format::from_media_type("application/json"), Format::Json);
        assert_eq!(Format::from_media_type("*/*"), Format::Json);
        assert_eq!(Format::from_media_type(""), Format::Json);
    }

    #[test]
    fn test_organization_json_round_trip() {
        let mut organization = Organization::new(TenantId::DEFAULT, "Acme Ltd");
        organization.add_country_of_tax_residence("ZA");

        let json = to_json(&organization).unwrap();
        let decoded: Organization = from_json(&json).unwrap();

        assert_eq!(decoded.id, organization.id);
        assert_eq!(decoded.name, "Acme Ltd");
        assert_eq!(decoded.countries_of_tax_residence, vec!["ZA".to_string()]);
    }

    #[test]
    fn test_organization_xml_round_trip() {
        let mut organization = Organization::new(TenantId::DEFAULT, "Acme Ltd");
        organization.add_contact_mechanism(ContactMechanism::new(
            "email",
            "main",
            "info@acme.example",
        ));

        let xml = to_xml(&organization).unwrap();
        assert!(xml.starts_with("<Organization"));

        let decoded: Organization = from_xml(&xml).unwrap();
        assert_eq!(decoded.id, organization.id);
        assert_eq!(decoded.name, "Acme Ltd");
        assert_eq!(decoded.contact_mechanisms.len(), 1);
        assert_eq!(decoded.contact_mechanisms[0].value, "info@acme.example");
    }

    #[test]
    fn test_person_with_decimals_xml_round_trip() {
        let mut person = Person::new(TenantId::DEFAULT, "Jane Doe");
        person.add_attribute(Attribute::decimal("height", dec!(1.82)));
        person.add_source_of_funds(SourceOfFunds {
            source_of_funds_type: "salary".to_string(),
            percentage: Some(dec!(50)),
        });
        person.add_source_of_funds(SourceOfFunds {
            source_of_funds_type: "gift".to_string(),
            percentage: None,
        });

        let decoded = xml_round_trip(&person);

        let height = decoded.attribute_with_type("height").unwrap();
        assert_eq!(height.decimal_value, Some(dec!(1.82)));
        assert_eq!(
            decoded.source_of_funds_with_type("salary").unwrap().percentage,
            Some(dec!(50))
        );
        assert_eq!(decoded.source_of_funds_with_type("gift").unwrap().percentage, None);
    }

    #[test]
    fn test_decimals_are_strings_in_json() {
        let attribute = Attribute::decimal("height", dec!(1.82));
        let json = to_json(&attribute).unwrap();
        assert!(json.contains("\"decimal_value\":\"1.82\""));

        let decoded: Attribute = from_json(&json).unwrap();
        assert_eq!(decoded.decimal_value, Some(dec!(1.82)));
    }

    #[test]
    fn test_party_page_xml_round_trip() {
        let person = Person::new(TenantId::DEFAULT, "Jane Doe").party();
        let organization = Organization::new(TenantId::DEFAULT, "Acme Ltd").party();
        assert!(person.updated.is_none());

        let decoded: Party = xml_round_trip(&person);
        assert_eq!(decoded.id, person.id);
        assert_eq!(decoded.party_type, PartyType::Person);
        assert!(decoded.updated.is_none());

        let page = PartyPage::new(vec![person, organization], 2, &PageRequest::first_page());
        let decoded = xml_round_trip(&page);
        assert_eq!(decoded.total, 2);
        assert_eq!(decoded.items.len(), 2);
        assert_eq!(decoded.items[1].name, "Acme Ltd");
        assert_eq!(decoded.items[1].party_type, PartyType::Organization);
    }

    #[test]
    fn test_mandate_xml_round_trip() {
        let attorney = PartyId::new();
        let mut mandate = Mandate::new(TenantId::DEFAULT, "power_of_attorney");
        mandate.add_mandatary(Mandatary::new(attorney, "attorney"));

        let decoded = xml_round_trip(&mandate);
        assert_eq!(decoded.id, mandate.id);
        assert_eq!(decoded.mandataries, vec![Mandatary::new(attorney, "attorney")]);
    }

    #[test]
    fn test_reference_code_xml_round_trip() {
        let code = ReferenceCode::new(ReferenceDataKind::AttributeType, "employee_count", "en-US", "Employees")
            .with_party_types(&[PartyType::Organization, PartyType::Person])
            .with_value_type(ValueType::Integer);

        assert_eq!(xml_round_trip(&code), code);

        let global = ReferenceCode::new(ReferenceDataKind::Gender, "female", "en-US", "Female");
        assert_eq!(xml_round_trip(&global), global);
    }

    #[test]
    fn test_reference_code_json_keeps_party_type_codes() {
        let code = ReferenceCode::new(ReferenceDataKind::RoleType, "employer", "en-US", "Employer")
            .with_party_types(&[PartyType::Organization]);

        let json = serde_json::to_value(&code).unwrap();
        assert_eq!(json["party_types"], serde_json::json!(["organization"]));
        assert!(from_json::<ReferenceCode>(r#"{"kind":"role-type","code":"x","locale_id":"en-US","name":"X","party_types":["robot"]}"#).is_err());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let result: Result<Organization, _> = from_json("{not json");
        assert!(matches!(result, Err(CodecError::Json(_))));
    }
}
