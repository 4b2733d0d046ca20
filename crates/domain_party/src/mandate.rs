//! Mandates
//!
//! A mandate grants authority to one or more mandataries, each a party
//! acting in a mandatary role (e.g. "signatory" or "attorney").

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{MandateId, PartyId, TenantId};

use crate::party::keyed_collection;

/// A party acting under a mandate in a given role
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
pub struct Mandatary {
    pub party_id: PartyId,
    /// Code for the mandatary role
    #[validate(length(min = 1, max = 50))]
    pub role: String,
}

impl Mandatary {
    pub fn new(party_id: PartyId, role: impl Into<String>) -> Self {
        Self {
            party_id,
            role: role.into(),
        }
    }
}

/// A property recorded against a mandate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct MandateProperty {
    /// Code for the mandate property type
    #[validate(length(min = 1, max = 50))]
    pub property_type: String,
    #[validate(length(min = 1, max = 4000))]
    pub value: String,
}

impl MandateProperty {
    pub fn new(property_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property_type: property_type.into(),
            value: value.into(),
        }
    }
}

/// Authority granted to a set of mandataries
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Mandate {
    pub id: MandateId,
    pub tenant_id: TenantId,
    /// Code for the mandate type
    #[validate(length(min = 1, max = 50))]
    pub mandate_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<NaiveDate>,
    #[serde(default)]
    #[validate(nested)]
    pub mandataries: Vec<Mandatary>,
    #[serde(default)]
    #[validate(nested)]
    pub properties: Vec<MandateProperty>,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl PartialEq for Mandate {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Mandate {}

impl Mandate {
    /// Creates a new open-ended mandate with no mandataries
    pub fn new(tenant_id: TenantId, mandate_type: impl Into<String>) -> Self {
        Self {
            id: MandateId::new(),
            tenant_id,
            mandate_type: mandate_type.into(),
            effective_from: None,
            effective_to: None,
            mandataries: Vec::new(),
            properties: Vec::new(),
            created: Utc::now(),
            updated: None,
        }
    }

    /// Adds a mandatary unless the same party already holds the same role
    pub fn add_mandatary(&mut self, mandatary: Mandatary) {
        if !self.mandataries.contains(&mandatary) {
            self.mandataries.push(mandatary);
        }
    }

    /// Removes the mandatary for the given party and role
    pub fn remove_mandatary(&mut self, party_id: PartyId, role: &str) -> Option<Mandatary> {
        let position = self
            .mandataries
            .iter()
            .position(|m| m.party_id == party_id && m.role == role)?;
        Some(self.mandataries.remove(position))
    }

    /// Returns the mandataries holding the given role
    pub fn mandataries_with_role(&self, role: &str) -> Vec<&Mandatary> {
        self.mandataries.iter().filter(|m| m.role == role).collect()
    }

    /// Returns true if the given party is a mandatary in any role
    pub fn has_mandatary(&self, party_id: PartyId) -> bool {
        self.mandataries.iter().any(|m| m.party_id == party_id)
    }

    /// Returns true if the effective period is well ordered
    pub fn has_valid_effective_period(&self) -> bool {
        match (self.effective_from, self.effective_to) {
            (Some(from), Some(to)) => to >= from,
            _ => true,
        }
    }
}

keyed_collection!(Mandate, properties: MandateProperty, key = property_type,
    add = add_property, remove = remove_property_with_type,
    get = property_with_type, has = has_property_with_type);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mandatary_unique_per_party_and_role() {
        let party_id = PartyId::new();
        let mut mandate = Mandate::new(TenantId::DEFAULT, "power_of_attorney");
        mandate.add_mandatary(Mandatary::new(party_id, "attorney"));
        mandate.add_mandatary(Mandatary::new(party_id, "attorney"));
        mandate.add_mandatary(Mandatary::new(party_id, "signatory"));

        assert_eq!(mandate.mandataries.len(), 2);
        assert_eq!(mandate.mandataries_with_role("attorney").len(), 1);
        assert!(mandate.has_mandatary(party_id));
    }

    #[test]
    fn test_remove_mandatary() {
        let party_id = PartyId::new();
        let mut mandate = Mandate::new(TenantId::DEFAULT, "power_of_attorney");
        mandate.add_mandatary(Mandatary::new(party_id, "attorney"));

        assert!(mandate.remove_mandatary(party_id, "signatory").is_none());
        assert!(mandate.remove_mandatary(party_id, "attorney").is_some());
        assert!(!mandate.has_mandatary(party_id));
    }
}
