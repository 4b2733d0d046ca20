//! Attributes and preferences
//!
//! An attribute is a typed value recorded against a party, identified by an
//! attribute type code from reference data. The attribute type declares a
//! value type, and exactly one of the typed value fields should be set.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::reference::ValueType;

/// An attribute recorded against a party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Attribute {
    /// Code for the attribute type
    #[validate(length(min = 1, max = 50))]
    pub attribute_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_value: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::str_option")]
    pub decimal_value: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integer_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 4000))]
    pub string_value: Option<String>,
}

impl Attribute {
    fn empty(attribute_type: impl Into<String>) -> Self {
        Self {
            attribute_type: attribute_type.into(),
            boolean_value: None,
            date_value: None,
            decimal_value: None,
            double_value: None,
            integer_value: None,
            string_value: None,
        }
    }

    /// Creates a string attribute
    pub fn string(attribute_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            string_value: Some(value.into()),
            ..Self::empty(attribute_type)
        }
    }

    /// Creates a boolean attribute
    pub fn boolean(attribute_type: impl Into<String>, value: bool) -> Self {
        Self {
            boolean_value: Some(value),
            ..Self::empty(attribute_type)
        }
    }

    /// Creates a date attribute
    pub fn date(attribute_type: impl Into<String>, value: NaiveDate) -> Self {
        Self {
            date_value: Some(value),
            ..Self::empty(attribute_type)
        }
    }

    /// Creates a decimal attribute
    pub fn decimal(attribute_type: impl Into<String>, value: Decimal) -> Self {
        Self {
            decimal_value: Some(value),
            ..Self::empty(attribute_type)
        }
    }

    /// Creates a double attribute
    pub fn double(attribute_type: impl Into<String>, value: f64) -> Self {
        Self {
            double_value: Some(value),
            ..Self::empty(attribute_type)
        }
    }

    /// Creates an integer attribute
    pub fn integer(attribute_type: impl Into<String>, value: i64) -> Self {
        Self {
            integer_value: Some(value),
            ..Self::empty(attribute_type)
        }
    }

    /// Returns the value types that are populated on this attribute
    pub fn populated_value_types(&self) -> Vec<ValueType> {
        let mut types = Vec::new();
        if self.boolean_value.is_some() {
            types.push(ValueType::Boolean);
        }
        if self.date_value.is_some() {
            types.push(ValueType::Date);
        }
        if self.decimal_value.is_some() {
            types.push(ValueType::Decimal);
        }
        if self.double_value.is_some() {
            types.push(ValueType::Double);
        }
        if self.integer_value.is_some() {
            types.push(ValueType::Integer);
        }
        if self.string_value.is_some() {
            types.push(ValueType::String);
        }
        types
    }

    /// Returns the populated value rendered as text, if any
    pub fn value_as_string(&self) -> Option<String> {
        if let Some(value) = self.boolean_value {
            return Some(value.to_string());
        }
        if let Some(value) = self.date_value {
            return Some(value.format("%Y-%m-%d").to_string());
        }
        if let Some(value) = self.decimal_value {
            return Some(value.to_string());
        }
        if let Some(value) = self.double_value {
            return Some(value.to_string());
        }
        if let Some(value) = self.integer_value {
            return Some(value.to_string());
        }
        self.string_value.clone()
    }

    /// Returns the populated value as a decimal, if it is numeric
    pub fn value_as_decimal(&self) -> Option<Decimal> {
        if let Some(value) = self.decimal_value {
            return Some(value);
        }
        if let Some(value) = self.integer_value {
            return Some(Decimal::from(value));
        }
        if let Some(value) = self.double_value {
            return Decimal::try_from(value).ok();
        }
        self.string_value
            .as_deref()
            .and_then(|value| value.trim().parse().ok())
    }
}

/// A preference recorded against a party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Preference {
    /// Code for the preference type
    #[validate(length(min = 1, max = 50))]
    pub preference_type: String,
    /// The preference value
    #[validate(length(min = 1, max = 200))]
    pub value: String,
}

impl Preference {
    /// Creates a new preference
    pub fn new(preference_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            preference_type: preference_type.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_typed_constructors() {
        let attribute = Attribute::decimal("height", dec!(1.82));
        assert_eq!(attribute.populated_value_types(), vec![ValueType::Decimal]);
        assert_eq!(attribute.value_as_string().as_deref(), Some("1.82"));
        assert_eq!(attribute.value_as_decimal(), Some(dec!(1.82)));
    }

    #[test]
    fn test_string_value_parses_as_decimal() {
        let attribute = Attribute::string("weight", " 75 ");
        assert_eq!(attribute.value_as_decimal(), Some(dec!(75)));
        assert_eq!(Attribute::string("nickname", "Bob").value_as_decimal(), None);
    }

    #[test]
    fn test_date_renders_iso() {
        let date = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        assert_eq!(
            Attribute::date("anniversary", date).value_as_string().as_deref(),
            Some("2020-02-29")
        );
    }

    #[test]
    fn test_json_omits_unset_values() {
        let json = serde_json::to_value(Attribute::boolean("smoker", false)).unwrap();
        assert_eq!(json["boolean_value"], false);
        assert!(json.get("string_value").is_none());
    }
}
