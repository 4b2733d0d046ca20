//! Party domain errors
//!
//! Services translate port failures in a fixed order: the domain-specific
//! "not found" and "duplicate" cases are surfaced as their own variants, and
//! every other failure is wrapped in [`PartyError::ServiceUnavailable`]
//! together with the original cause.

use thiserror::Error;

use core_kernel::PortError;

use crate::validation::ValidationIssue;

/// Errors that can occur in the party domain
#[derive(Debug, Error)]
pub enum PartyError {
    /// Party with the given ID was not found
    #[error("The party ({0}) could not be found")]
    PartyNotFound(String),

    /// Person with the given ID was not found
    #[error("The person ({0}) could not be found")]
    PersonNotFound(String),

    /// Organization with the given ID was not found
    #[error("The organization ({0}) could not be found")]
    OrganizationNotFound(String),

    /// Association with the given ID was not found
    #[error("The association ({0}) could not be found")]
    AssociationNotFound(String),

    /// Mandate with the given ID was not found
    #[error("The mandate ({0}) could not be found")]
    MandateNotFound(String),

    /// Attempted to create a party that already exists
    #[error("The party ({0}) already exists")]
    DuplicateParty(String),

    /// Attempted to create an association that already exists
    #[error("The association ({0}) already exists")]
    DuplicateAssociation(String),

    /// Attempted to create a mandate that already exists
    #[error("The mandate ({0}) already exists")]
    DuplicateMandate(String),

    /// An argument failed validation
    #[error("Invalid argument ({name}): {}", summarize(.issues))]
    InvalidArgument {
        name: String,
        issues: Vec<ValidationIssue>,
    },

    /// Any other failure, with the cause preserved
    #[error("{message}")]
    ServiceUnavailable {
        message: String,
        #[source]
        source: PortError,
    },
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl PartyError {
    /// Creates an InvalidArgument error with a single issue
    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        PartyError::InvalidArgument {
            issues: vec![ValidationIssue::new(name.clone(), message)],
            name,
        }
    }

    /// Creates an InvalidArgument error from validation issues
    pub fn validation_failed(name: impl Into<String>, issues: Vec<ValidationIssue>) -> Self {
        PartyError::InvalidArgument {
            name: name.into(),
            issues,
        }
    }

    /// Wraps a port error that has no domain-specific meaning
    pub fn service_unavailable(message: impl Into<String>, source: PortError) -> Self {
        PartyError::ServiceUnavailable {
            message: message.into(),
            source,
        }
    }

    /// Returns true for any of the "not found" variants
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PartyError::PartyNotFound(_)
                | PartyError::PersonNotFound(_)
                | PartyError::OrganizationNotFound(_)
                | PartyError::AssociationNotFound(_)
                | PartyError::MandateNotFound(_)
        )
    }

    /// Returns true for any of the "duplicate" variants
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            PartyError::DuplicateParty(_)
                | PartyError::DuplicateAssociation(_)
                | PartyError::DuplicateMandate(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_invalid_argument_message() {
        let error = PartyError::invalid_argument("person", "name is required");
        assert_eq!(error.to_string(), "Invalid argument (person): person: name is required");
    }

    #[test]
    fn test_service_unavailable_keeps_source() {
        let error = PartyError::service_unavailable(
            "Failed to retrieve the person",
            PortError::connection("connection refused"),
        );
        assert!(error.source().is_some());
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_classification() {
        assert!(PartyError::MandateNotFound("x".into()).is_not_found());
        assert!(PartyError::DuplicateAssociation("x".into()).is_duplicate());
    }
}
