//! Associations between parties
//!
//! An association is a typed, optionally effective-dated relationship from
//! a first party to a second party, e.g. "employer of" or "spouse of".

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{AssociationId, PartyId, TenantId};

use crate::party::keyed_collection;

/// A property recorded against an association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AssociationProperty {
    /// Code for the association property type
    #[validate(length(min = 1, max = 50))]
    pub property_type: String,
    #[validate(length(min = 1, max = 4000))]
    pub value: String,
}

impl AssociationProperty {
    pub fn new(property_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property_type: property_type.into(),
            value: value.into(),
        }
    }
}

/// A relationship between two parties
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Association {
    pub id: AssociationId,
    pub tenant_id: TenantId,
    /// Code for the association type
    #[validate(length(min = 1, max = 50))]
    pub association_type: String,
    pub first_party_id: PartyId,
    pub second_party_id: PartyId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<NaiveDate>,
    #[serde(default)]
    #[validate(nested)]
    pub properties: Vec<AssociationProperty>,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl PartialEq for Association {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Association {}

impl Association {
    /// Creates a new open-ended association between two parties
    pub fn new(
        tenant_id: TenantId,
        association_type: impl Into<String>,
        first_party_id: PartyId,
        second_party_id: PartyId,
    ) -> Self {
        Self {
            id: AssociationId::new(),
            tenant_id,
            association_type: association_type.into(),
            first_party_id,
            second_party_id,
            effective_from: None,
            effective_to: None,
            properties: Vec::new(),
            created: Utc::now(),
            updated: None,
        }
    }

    /// Returns true if the given party is either side of the association
    pub fn involves(&self, party_id: PartyId) -> bool {
        self.first_party_id == party_id || self.second_party_id == party_id
    }

    /// Returns true if the effective period is well ordered
    pub fn has_valid_effective_period(&self) -> bool {
        match (self.effective_from, self.effective_to) {
            (Some(from), Some(to)) => to >= from,
            _ => true,
        }
    }
}

keyed_collection!(Association, properties: AssociationProperty, key = property_type,
    add = add_property, remove = remove_property_with_type,
    get = property_with_type, has = has_property_with_type);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_involves_either_party() {
        let first = PartyId::new();
        let second = PartyId::new();
        let association = Association::new(TenantId::DEFAULT, "employer", first, second);

        assert!(association.involves(first));
        assert!(association.involves(second));
        assert!(!association.involves(PartyId::new()));
    }

    #[test]
    fn test_effective_period() {
        let mut association =
            Association::new(TenantId::DEFAULT, "employer", PartyId::new(), PartyId::new());
        assert!(association.has_valid_effective_period());

        association.effective_from = NaiveDate::from_ymd_opt(2024, 3, 1);
        association.effective_to = NaiveDate::from_ymd_opt(2024, 2, 1);
        assert!(!association.has_valid_effective_period());
    }

    #[test]
    fn test_property_unique_per_type() {
        let mut association =
            Association::new(TenantId::DEFAULT, "employer", PartyId::new(), PartyId::new());
        association.add_property(AssociationProperty::new("job_title", "Clerk"));
        association.add_property(AssociationProperty::new("job_title", "Manager"));

        assert_eq!(association.properties.len(), 1);
        assert_eq!(association.property_with_type("job_title").unwrap().value, "Manager");
    }
}
