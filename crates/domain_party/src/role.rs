//! Effective-dated markers on a party: roles, locks, statuses and consents,
//! plus segment allocations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Returns true if `date` falls within the optional effective period
fn in_effect(from: Option<NaiveDate>, to: Option<NaiveDate>, date: NaiveDate) -> bool {
    from.map_or(true, |from| from <= date) && to.map_or(true, |to| date <= to)
}

/// A role played by a party (customer, employee, supplier, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Role {
    /// Code for the role type
    #[validate(length(min = 1, max = 50))]
    pub role_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<NaiveDate>,
}

impl Role {
    /// Creates an open-ended role
    pub fn new(role_type: impl Into<String>) -> Self {
        Self {
            role_type: role_type.into(),
            effective_from: None,
            effective_to: None,
        }
    }

    /// Returns true if the role is in effect on the given date
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        in_effect(self.effective_from, self.effective_to, date)
    }
}

/// A lock applied to a party (e.g. suspected fraud)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Lock {
    /// Code for the lock type
    #[validate(length(min = 1, max = 50))]
    pub lock_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<NaiveDate>,
}

impl Lock {
    /// Creates an open-ended lock
    pub fn new(lock_type: impl Into<String>) -> Self {
        Self {
            lock_type: lock_type.into(),
            effective_from: None,
            effective_to: None,
        }
    }

    /// Returns true if the lock is in effect on the given date
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        in_effect(self.effective_from, self.effective_to, date)
    }
}

/// A status assigned to a party (e.g. KYC verified)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Status {
    /// Code for the status type
    #[validate(length(min = 1, max = 50))]
    pub status_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<NaiveDate>,
}

impl Status {
    /// Creates an open-ended status
    pub fn new(status_type: impl Into<String>) -> Self {
        Self {
            status_type: status_type.into(),
            effective_from: None,
            effective_to: None,
        }
    }
}

/// A consent given by a person (e.g. marketing communications)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Consent {
    /// Code for the consent type
    #[validate(length(min = 1, max = 50))]
    pub consent_type: String,
    pub effective_from: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<NaiveDate>,
}

impl Consent {
    /// Creates a consent effective from the given date
    pub fn new(consent_type: impl Into<String>, effective_from: NaiveDate) -> Self {
        Self {
            consent_type: consent_type.into(),
            effective_from,
            effective_to: None,
        }
    }

    /// Returns true if the consent is in effect on the given date
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        in_effect(Some(self.effective_from), self.effective_to, date)
    }
}

/// Allocation of a party to a segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SegmentAllocation {
    /// Code for the segment
    #[validate(length(min = 1, max = 50))]
    pub segment: String,
}

impl SegmentAllocation {
    pub fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_open_ended_role_is_always_effective() {
        assert!(Role::new("customer").is_effective_on(date(1900, 1, 1)));
    }

    #[test]
    fn test_effective_period_is_inclusive() {
        let lock = Lock {
            lock_type: "suspected_fraud".to_string(),
            effective_from: Some(date(2024, 1, 1)),
            effective_to: Some(date(2024, 1, 31)),
        };
        assert!(lock.is_effective_on(date(2024, 1, 1)));
        assert!(lock.is_effective_on(date(2024, 1, 31)));
        assert!(!lock.is_effective_on(date(2024, 2, 1)));
    }

    #[test]
    fn test_consent_starts_on_effective_from() {
        let consent = Consent::new("marketing", date(2024, 6, 1));
        assert!(!consent.is_effective_on(date(2024, 5, 31)));
        assert!(consent.is_effective_on(date(2030, 1, 1)));
    }
}
