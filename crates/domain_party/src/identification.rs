//! Identity documents, tax numbers, residence permits and external references

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// An identity document (passport, national ID card, ...) held by a person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct IdentityDocument {
    /// Code for the identity document type
    #[validate(length(min = 1, max = 50))]
    pub identity_document_type: String,
    /// ISO 3166-1 alpha-2 code of the issuing country
    #[validate(length(equal = 2))]
    pub country_of_issue: String,
    pub date_of_issue: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_expiry: Option<NaiveDate>,
    #[validate(length(min = 1, max = 30))]
    pub number: String,
}

impl IdentityDocument {
    /// Creates a new identity document
    pub fn new(
        identity_document_type: impl Into<String>,
        country_of_issue: impl Into<String>,
        date_of_issue: NaiveDate,
        number: impl Into<String>,
    ) -> Self {
        Self {
            identity_document_type: identity_document_type.into(),
            country_of_issue: country_of_issue.into(),
            date_of_issue,
            date_of_expiry: None,
            number: number.into(),
        }
    }

    /// Returns true if the document has expired as of the given date
    pub fn is_expired_on(&self, date: NaiveDate) -> bool {
        self.date_of_expiry.map_or(false, |expiry| expiry < date)
    }
}

/// A tax number issued to a party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TaxNumber {
    /// Code for the tax number type
    #[validate(length(min = 1, max = 50))]
    pub tax_number_type: String,
    /// ISO 3166-1 alpha-2 code of the issuing country
    #[validate(length(equal = 2))]
    pub country_of_issue: String,
    #[validate(length(min = 1, max = 30))]
    pub number: String,
}

impl TaxNumber {
    /// Creates a new tax number
    pub fn new(
        tax_number_type: impl Into<String>,
        country_of_issue: impl Into<String>,
        number: impl Into<String>,
    ) -> Self {
        Self {
            tax_number_type: tax_number_type.into(),
            country_of_issue: country_of_issue.into(),
            number: number.into(),
        }
    }
}

/// A residence permit held by a person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ResidencePermit {
    /// Code for the residence permit type
    #[validate(length(min = 1, max = 50))]
    pub residence_permit_type: String,
    #[validate(length(equal = 2))]
    pub country_of_issue: String,
    pub date_of_issue: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_expiry: Option<NaiveDate>,
    #[validate(length(min = 1, max = 30))]
    pub number: String,
}

/// A reference to the party in an external system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ExternalReference {
    /// Code for the external reference type
    #[validate(length(min = 1, max = 50))]
    pub external_reference_type: String,
    #[validate(length(min = 1, max = 100))]
    pub value: String,
}

impl ExternalReference {
    /// Creates a new external reference
    pub fn new(external_reference_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            external_reference_type: external_reference_type.into(),
            value: value.into(),
        }
    }
}
