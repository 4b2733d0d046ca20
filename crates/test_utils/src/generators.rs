//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants, plus `fake` helpers for realistic
//! names and contact details.

use chrono::NaiveDate;
use core_kernel::{PartyId, TenantId};
use domain_party::{PageRequest, Person, ReferenceDataKind, SortDirection};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use proptest::prelude::*;
use uuid::Uuid;

use crate::builders::{OrganizationBuilder, PersonBuilder};

/// Strategy for generating party identifiers
pub fn party_id_strategy() -> impl Strategy<Value = PartyId> {
    any::<u128>().prop_map(|bits| PartyId::from(Uuid::from_u128(bits)))
}

/// Strategy for generating tenant identifiers, including the default tenant
pub fn tenant_id_strategy() -> impl Strategy<Value = TenantId> {
    prop_oneof![
        Just(TenantId::DEFAULT),
        any::<u128>().prop_map(|bits| TenantId::from(Uuid::from_u128(bits))),
    ]
}

/// Strategy for generating a single name part
pub fn name_part_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{1,15}"
}

/// Strategy for generating sort directions
pub fn sort_direction_strategy() -> impl Strategy<Value = SortDirection> {
    prop_oneof![Just(SortDirection::Ascending), Just(SortDirection::Descending)]
}

/// Strategy for generating page requests, including out-of-range sizes
pub fn page_request_strategy() -> impl Strategy<Value = PageRequest> {
    (
        proptest::option::of("[a-z]{0,8}"),
        sort_direction_strategy(),
        0u32..50,
        0u32..500,
    )
        .prop_map(|(filter, direction, index, size)| {
            let mut request = PageRequest::first_page().sorted(direction).page(index, size);
            if let Some(filter) = filter {
                request = request.with_filter(filter);
            }
            request
        })
}

/// Strategy for generating reference data kinds
pub fn reference_data_kind_strategy() -> impl Strategy<Value = ReferenceDataKind> {
    proptest::sample::select(ReferenceDataKind::ALL)
}

/// Strategy for generating dates of birth between 1920 and 2005
pub fn date_of_birth_strategy() -> impl Strategy<Value = NaiveDate> {
    (1920i32..2005, 1u32..=12, 1u32..=28)
        .prop_filter_map("valid date", |(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
}

prop_compose! {
    /// Strategy for generating persons that pass validation against the seed codes
    pub fn valid_person_strategy()(
        given_name in name_part_strategy(),
        surname in name_part_strategy(),
        date_of_birth in date_of_birth_strategy(),
        male in any::<bool>(),
    ) -> Person {
        let (gender, title) = if male { ("male", "mr") } else { ("female", "ms") };
        PersonBuilder::new()
            .named(&given_name, &surname)
            .gender(Some(gender))
            .title(Some(title))
            .date_of_birth(Some(date_of_birth))
            .build()
    }
}

/// A person with a fake name and email address
pub fn fake_person() -> Person {
    let given_name: String = FirstName().fake();
    let surname: String = LastName().fake();
    let email: String = SafeEmail().fake();

    PersonBuilder::new()
        .named(&given_name, &surname)
        .email(Some(&email))
        .build()
}

/// An organization with a fake company name
pub fn fake_organization() -> domain_party::Organization {
    let name: String = CompanyName().fake();
    OrganizationBuilder::new().name(&name).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_party::MAX_PAGE_SIZE;

    proptest! {
        #[test]
        fn prop_normalized_page_size_is_bounded(request in page_request_strategy()) {
            let normalized = request.normalized();
            prop_assert!(normalized.page_size >= 1);
            prop_assert!(normalized.page_size <= MAX_PAGE_SIZE);
        }

        #[test]
        fn prop_valid_person_has_full_name(person in valid_person_strategy()) {
            let given = person.given_name.clone().unwrap_or_default();
            prop_assert!(person.name.starts_with(&given));
            prop_assert!(person.gender.is_some());
        }

        #[test]
        fn prop_kind_slug_round_trips(kind in reference_data_kind_strategy()) {
            prop_assert_eq!(kind.slug().parse::<ReferenceDataKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_fake_person_has_email() {
        let person = fake_person();
        assert!(person.contact_mechanism_with_role("personal_email_address").is_some());
        assert!(!person.name.is_empty());
    }
}
