//! Physical addresses
//!
//! The physical address type decides which fields must be populated:
//!
//! | type           | required fields                               |
//! |----------------|-----------------------------------------------|
//! | `building`     | `building_name`, `street_name`                |
//! | `complex`      | `complex_name`, `complex_unit_number`         |
//! | `farm`         | `farm_number`                                 |
//! | `international`| `line1`                                       |
//! | `site`         | `site_block`, `site_number`                   |
//! | `street`       | `street_name`, `street_number`                |
//! | `unstructured` | `line1`                                       |
//!
//! Every type except `international` and `unstructured` also requires a
//! `city` and `country`.

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::PhysicalAddressId;

/// Physical address type codes with structural rules
pub mod types {
    pub const BUILDING: &str = "building";
    pub const COMPLEX: &str = "complex";
    pub const FARM: &str = "farm";
    pub const INTERNATIONAL: &str = "international";
    pub const SITE: &str = "site";
    pub const STREET: &str = "street";
    pub const UNSTRUCTURED: &str = "unstructured";
}

/// A physical address for a party
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PhysicalAddress {
    pub id: PhysicalAddressId,
    /// Code for the physical address type
    #[validate(length(min = 1, max = 50))]
    pub address_type: String,
    /// Code for the physical address role
    #[validate(length(min = 1, max = 50))]
    pub role: String,
    /// Codes for the physical address purposes
    #[serde(default)]
    pub purposes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub line3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20))]
    pub building_floor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub building_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub building_room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub complex_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub complex_unit_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub farm_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub farm_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 250))]
    pub farm_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub site_block: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub site_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub street_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub street_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub suburb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub city: Option<String>,
    /// Code for the region (scoped to the country)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 10))]
    pub region: Option<String>,
    /// ISO 3166-1 alpha-2 country code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 2))]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub latitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub longitude: Option<String>,
}

impl PartialEq for PhysicalAddress {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl PhysicalAddress {
    /// Creates a new address of the given type and role with no fields set
    pub fn new(address_type: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: PhysicalAddressId::new(),
            address_type: address_type.into(),
            role: role.into(),
            purposes: Vec::new(),
            line1: None,
            line2: None,
            line3: None,
            building_floor: None,
            building_name: None,
            building_room: None,
            complex_name: None,
            complex_unit_number: None,
            farm_number: None,
            farm_name: None,
            farm_description: None,
            site_block: None,
            site_number: None,
            street_name: None,
            street_number: None,
            suburb: None,
            city: None,
            region: None,
            country: None,
            postal_code: None,
            latitude: None,
            longitude: None,
        }
    }

    /// Creates a street address
    pub fn street(
        role: impl Into<String>,
        street_number: impl Into<String>,
        street_name: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            street_number: Some(street_number.into()),
            street_name: Some(street_name.into()),
            city: Some(city.into()),
            country: Some(country.into()),
            ..Self::new(types::STREET, role)
        }
    }

    /// Creates an unstructured address from free-form lines
    pub fn unstructured(role: impl Into<String>, lines: &[&str]) -> Self {
        let mut address = Self::new(types::UNSTRUCTURED, role);
        let mut lines = lines.iter().map(|line| line.to_string());
        address.line1 = lines.next();
        address.line2 = lines.next();
        address.line3 = lines.next();
        address
    }

    /// Adds a purpose to this address
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        let purpose = purpose.into();
        if !self.purposes.contains(&purpose) {
            self.purposes.push(purpose);
        }
        self
    }

    /// Returns true if the address has the given purpose
    pub fn has_purpose(&self, purpose: &str) -> bool {
        self.purposes.iter().any(|p| p == purpose)
    }

    /// Returns the names of fields required by the address type that are blank
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        fn blank(value: &Option<String>) -> bool {
            value.as_deref().map_or(true, |v| v.trim().is_empty())
        }

        let mut required: Vec<(&'static str, &Option<String>)> = match self.address_type.as_str() {
            types::BUILDING => vec![
                ("building_name", &self.building_name),
                ("street_name", &self.street_name),
            ],
            types::COMPLEX => vec![
                ("complex_name", &self.complex_name),
                ("complex_unit_number", &self.complex_unit_number),
            ],
            types::FARM => vec![("farm_number", &self.farm_number)],
            types::SITE => vec![
                ("site_block", &self.site_block),
                ("site_number", &self.site_number),
            ],
            types::STREET => vec![
                ("street_name", &self.street_name),
                ("street_number", &self.street_number),
            ],
            types::INTERNATIONAL | types::UNSTRUCTURED => vec![("line1", &self.line1)],
            _ => Vec::new(),
        };

        if !matches!(
            self.address_type.as_str(),
            types::INTERNATIONAL | types::UNSTRUCTURED
        ) {
            required.push(("city", &self.city));
            required.push(("country", &self.country));
        }

        required
            .into_iter()
            .filter(|(_, value)| blank(value))
            .map(|(name, _)| name)
            .collect()
    }

    /// Formats the address for display, one line per populated component
    pub fn format(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        let mut push = |value: &Option<String>| {
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                lines.push(value.to_string());
            }
        };

        push(&self.line1);
        push(&self.line2);
        push(&self.line3);
        push(&self.building_name);
        push(&self.complex_name);
        push(&self.farm_name);
        push(&self.farm_number.as_ref().map(|n| format!("Farm {}", n)));
        push(&match (&self.street_number, &self.street_name) {
            (Some(number), Some(name)) => Some(format!("{} {}", number, name)),
            (None, Some(name)) => Some(name.clone()),
            _ => None,
        });
        push(&self.suburb);
        push(&match (&self.city, &self.postal_code) {
            (Some(city), Some(code)) => Some(format!("{} {}", city, code)),
            (Some(city), None) => Some(city.clone()),
            (None, Some(code)) => Some(code.clone()),
            (None, None) => None,
        });
        push(&self.country);

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_street_address_is_complete() {
        let address = PhysicalAddress::street("residential", "12", "Main Road", "Cape Town", "ZA");
        assert!(address.missing_required_fields().is_empty());
        assert_eq!(address.format(), "12 Main Road\nCape Town\nZA");
    }

    #[test]
    fn test_complex_requires_unit_number() {
        let mut address = PhysicalAddress::new(types::COMPLEX, "residential");
        address.complex_name = Some("Sunset Villas".to_string());
        address.city = Some("Durban".to_string());
        address.country = Some("ZA".to_string());

        assert_eq!(address.missing_required_fields(), vec!["complex_unit_number"]);
    }

    #[test]
    fn test_unstructured_requires_only_line1() {
        let address = PhysicalAddress::unstructured("business", &["PO Box 12", "Sandton"]);
        assert!(address.missing_required_fields().is_empty());
        assert_eq!(address.line2.as_deref(), Some("Sandton"));

        let empty = PhysicalAddress::new(types::UNSTRUCTURED, "business");
        assert_eq!(empty.missing_required_fields(), vec!["line1"]);
    }

    #[test]
    fn test_purposes_are_unique() {
        let address = PhysicalAddress::new(types::FARM, "business")
            .with_purpose("billing")
            .with_purpose("billing");
        assert_eq!(address.purposes.len(), 1);
        assert!(address.has_purpose("billing"));
    }
}
