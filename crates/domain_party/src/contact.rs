//! Contact mechanisms
//!
//! A contact mechanism (phone number, email address, social media handle)
//! is recorded against a party in a role such as "personal mobile" or
//! "work email". A party holds at most one contact mechanism per role.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Contact mechanism type codes with special validation rules
pub mod types {
    pub const EMAIL_ADDRESS: &str = "email_address";
    pub const FAX_NUMBER: &str = "fax_number";
    pub const MOBILE_NUMBER: &str = "mobile_number";
    pub const PHONE_NUMBER: &str = "phone_number";
    pub const SOCIAL_MEDIA: &str = "social_media";
}

/// A contact mechanism for a party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContactMechanism {
    /// Code for the contact mechanism type
    #[validate(length(min = 1, max = 50))]
    pub contact_mechanism_type: String,
    /// Code for the contact mechanism role
    #[validate(length(min = 1, max = 50))]
    pub role: String,
    /// The contact mechanism value
    #[validate(length(min = 1, max = 200))]
    pub value: String,
    /// Codes for the contact mechanism purposes
    #[serde(default)]
    pub purposes: Vec<String>,
}

impl ContactMechanism {
    /// Creates a new contact mechanism
    ///
    /// # Arguments
    ///
    /// * `contact_mechanism_type` - The contact mechanism type code
    /// * `role` - The contact mechanism role code
    /// * `value` - The number, address or handle
    pub fn new(
        contact_mechanism_type: impl Into<String>,
        role: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            contact_mechanism_type: contact_mechanism_type.into(),
            role: role.into(),
            value: value.into(),
            purposes: Vec::new(),
        }
    }

    /// Adds a purpose to this contact mechanism
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        let purpose = purpose.into();
        if !self.purposes.contains(&purpose) {
            self.purposes.push(purpose);
        }
        self
    }

    /// Returns true if this is an email address
    pub fn is_email_address(&self) -> bool {
        self.contact_mechanism_type == types::EMAIL_ADDRESS
    }
}
