//! Custom Assertion Helpers
//!
//! Provides assertions for validation outcomes, party errors and pages.

use domain_party::{PartyError, PartyPage, ValidationResult};

/// Asserts that a validation result has no issues
pub fn assert_valid(result: &ValidationResult) {
    assert!(
        result.is_valid && result.errors.is_empty(),
        "Expected a valid result, got issues: {:?}",
        result.errors
    );
}

/// Asserts that a validation result reports an issue for the property
pub fn assert_has_issue(result: &ValidationResult, property: &str) {
    assert!(!result.is_valid, "Expected an invalid result");
    assert!(
        result.errors.iter().any(|issue| issue.property == property),
        "Expected an issue for '{}', got: {:?}",
        property,
        result.errors
    );
}

/// Asserts that an operation failed with `InvalidArgument` naming the property
pub fn assert_invalid_argument<T: std::fmt::Debug>(result: &Result<T, PartyError>, property: &str) {
    match result {
        Err(PartyError::InvalidArgument { issues, .. }) => assert!(
            issues.iter().any(|issue| issue.property == property),
            "Expected an issue for '{}', got: {:?}",
            property,
            issues
        ),
        other => panic!("Expected InvalidArgument for '{}', got {:?}", property, other),
    }
}

/// Asserts that an operation failed because something was not found
pub fn assert_not_found<T: std::fmt::Debug>(result: &Result<T, PartyError>) {
    match result {
        Err(e) if e.is_not_found() => {}
        other => panic!("Expected a not found error, got {:?}", other),
    }
}

/// Asserts the total and item count of a page
pub fn assert_page<T>(page: &PartyPage<T>, total: u64, items: usize) {
    assert_eq!(page.total, total, "Unexpected page total");
    assert_eq!(page.items.len(), items, "Unexpected number of items on the page");
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_party::ValidationIssue;

    #[test]
    fn test_assert_valid() {
        assert_valid(&ValidationResult::ok());
    }

    #[test]
    fn test_assert_has_issue() {
        let result = ValidationResult::from_issues(vec![ValidationIssue::new("gender", "unknown code")]);
        assert_has_issue(&result, "gender");
    }

    #[test]
    #[should_panic(expected = "Expected an issue for 'title'")]
    fn test_assert_has_issue_fails_for_other_property() {
        let result = ValidationResult::from_issues(vec![ValidationIssue::new("gender", "unknown code")]);
        assert_has_issue(&result, "title");
    }
}
