//! Records that only apply to persons: education, employment, next of kin,
//! skills, sources of funds and wealth, and language proficiencies.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{EducationId, EmploymentId, NextOfKinId};

/// An education record for a person
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Education {
    pub id: EducationId,
    #[validate(length(min = 1, max = 100))]
    pub institution_name: String,
    /// ISO 3166-1 alpha-2 code of the country of the institution
    #[validate(length(equal = 2))]
    pub institution_country: String,
    /// Code for the qualification type
    #[validate(length(min = 1, max = 50))]
    pub qualification_type: String,
    #[validate(length(min = 1, max = 100))]
    pub qualification_name: String,
    /// Code for the field of study
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub field_of_study: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_year_attended: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_year_attended: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualification_year: Option<i32>,
}

impl PartialEq for Education {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Education {
    /// Creates a new education record
    pub fn new(
        institution_name: impl Into<String>,
        institution_country: impl Into<String>,
        qualification_type: impl Into<String>,
        qualification_name: impl Into<String>,
    ) -> Self {
        Self {
            id: EducationId::new(),
            institution_name: institution_name.into(),
            institution_country: institution_country.into(),
            qualification_type: qualification_type.into(),
            qualification_name: qualification_name.into(),
            field_of_study: None,
            first_year_attended: None,
            last_year_attended: None,
            qualification_year: None,
        }
    }
}

/// An employment record for a person
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Employment {
    pub id: EmploymentId,
    #[validate(length(min = 1, max = 100))]
    pub employer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub employer_phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub employer_email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 250))]
    pub employer_address: Option<String>,
    /// Code for the employment status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub employment_status: Option<String>,
    /// Code for the employment type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub employment_type: Option<String>,
    /// Code for the occupation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub occupation: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl PartialEq for Employment {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Employment {
    /// Creates a new employment record starting on the given date
    pub fn new(employer_name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            id: EmploymentId::new(),
            employer_name: employer_name.into(),
            employer_phone_number: None,
            employer_email_address: None,
            employer_address: None,
            employment_status: None,
            employment_type: None,
            occupation: None,
            start_date,
            end_date: None,
        }
    }

    /// Returns true if the employment has not ended
    pub fn is_current(&self) -> bool {
        self.end_date.is_none()
    }
}

/// A next of kin for a person
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NextOfKin {
    pub id: NextOfKinId,
    /// Code for the next of kin type (spouse, parent, sibling, ...)
    #[validate(length(min = 1, max = 50))]
    pub next_of_kin_type: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub surname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub mobile_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub home_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub work_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub address_line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub address_line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 10))]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 2))]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub postal_code: Option<String>,
}

impl PartialEq for NextOfKin {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl NextOfKin {
    /// Creates a new next of kin
    pub fn new(next_of_kin_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: NextOfKinId::new(),
            next_of_kin_type: next_of_kin_type.into(),
            name: name.into(),
            given_name: None,
            surname: None,
            mobile_number: None,
            home_number: None,
            work_number: None,
            email_address: None,
            address_line1: None,
            address_line2: None,
            city: None,
            region: None,
            country: None,
            postal_code: None,
        }
    }
}

/// A skill held by a person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Skill {
    /// Code for the skill type
    #[validate(length(min = 1, max = 50))]
    pub skill_type: String,
}

/// A source of funds for a person, with the share it contributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SourceOfFunds {
    /// Code for the source of funds type
    #[validate(length(min = 1, max = 50))]
    pub source_of_funds_type: String,
    /// Percentage of total funds, 0 to 100
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::str_option")]
    pub percentage: Option<Decimal>,
}

/// A source of wealth for a person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SourceOfWealth {
    /// Code for the source of wealth type
    #[validate(length(min = 1, max = 50))]
    pub source_of_wealth_type: String,
}

/// Proficiency level for a language skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProficiencyLevel {
    Beginner,
    Intermediate,
    Advanced,
    Proficient,
}

/// A person's proficiency in a language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LanguageProficiency {
    /// ISO 639-1 code of the language
    #[validate(length(equal = 2))]
    pub language: String,
    pub listening_level: ProficiencyLevel,
    pub reading_level: ProficiencyLevel,
    pub speaking_level: ProficiencyLevel,
    pub writing_level: ProficiencyLevel,
}

impl LanguageProficiency {
    /// Creates a proficiency with the same level for every skill
    pub fn uniform(language: impl Into<String>, level: ProficiencyLevel) -> Self {
        Self {
            language: language.into(),
            listening_level: level,
            reading_level: level,
            speaking_level: level,
            writing_level: level,
        }
    }
}
