//! Integration Tests for party management
//!
//! These tests verify workflows that span persons, organizations and their
//! relationships, run against the in-memory ports.

use chrono::NaiveDate;
use core_kernel::PartyId;
use domain_party::{PageRequest, PartyError, PartyType, SortDirection};
use test_utils::{
    assert_has_issue, assert_invalid_argument, assert_not_found, assert_page, assert_valid,
    AssociationBuilder, MandateBuilder, OrganizationBuilder, PartyHarness, PersonBuilder,
    TenantFixtures,
};

mod employment_workflow {
    use super::*;

    /// An employer, an employee and the association between them
    #[tokio::test]
    async fn test_employer_association_lifecycle() {
        let h = PartyHarness::new().await;
        let tenant = TenantFixtures::default_tenant();

        let employer = h
            .service
            .create_organization(tenant, OrganizationBuilder::new().employer().build())
            .await
            .expect("Failed to create employer");
        let employee = h
            .service
            .create_person(tenant, PersonBuilder::new().build())
            .await
            .expect("Failed to create employee");

        let association = h
            .service
            .create_association(tenant, AssociationBuilder::new(employer.id, employee.id).build())
            .await
            .expect("Failed to create association");

        let page = h
            .service
            .get_associations_for_party(tenant, employee.id, PageRequest::first_page())
            .await
            .unwrap();
        assert_page(&page, 1, 1);
        assert_eq!(page.items[0].id, association.id);

        h.service.delete_association(tenant, association.id).await.unwrap();
        assert_not_found(&h.service.get_association(tenant, association.id).await);
    }

    /// The employer role requires an employee count
    #[tokio::test]
    async fn test_employer_without_employee_count_is_rejected() {
        let h = PartyHarness::new().await;
        let organization = OrganizationBuilder::new().role("employer").build();

        let result = h.service.validate_organization(&organization).await.unwrap();
        assert!(!result.is_valid);

        let created = h
            .service
            .create_organization(TenantFixtures::default_tenant(), organization)
            .await;
        assert!(matches!(created, Err(PartyError::InvalidArgument { .. })));
    }

    #[tokio::test]
    async fn test_association_with_unknown_party_is_rejected() {
        let h = PartyHarness::new().await;
        let tenant = TenantFixtures::default_tenant();
        let person = h.service.create_person(tenant, PersonBuilder::new().build()).await.unwrap();

        let result = h
            .service
            .create_association(tenant, AssociationBuilder::new(PartyId::new(), person.id).build())
            .await;
        assert!(result.is_err());
    }
}

mod mandate_workflow {
    use super::*;

    #[tokio::test]
    async fn test_mandate_is_listed_for_its_mandataries() {
        let h = PartyHarness::new().await;
        let tenant = TenantFixtures::default_tenant();

        let attorney = h
            .service
            .create_person(tenant, PersonBuilder::new().named("Sipho", "Dlamini").build())
            .await
            .unwrap();
        let bystander = h
            .service
            .create_person(tenant, PersonBuilder::new().named("Anna", "Botha").build())
            .await
            .unwrap();

        let mandate = h
            .service
            .create_mandate(tenant, MandateBuilder::new().attorney(attorney.id).build())
            .await
            .unwrap();

        let listed = h
            .service
            .get_mandates_for_party(tenant, attorney.id, PageRequest::first_page())
            .await
            .unwrap();
        assert_page(&listed, 1, 1);
        assert_eq!(listed.items[0].id, mandate.id);

        let none = h
            .service
            .get_mandates_for_party(tenant, bystander.id, PageRequest::first_page())
            .await
            .unwrap();
        assert_page(&none, 0, 0);
    }

    #[tokio::test]
    async fn test_mandate_with_reversed_period_is_rejected() {
        let h = PartyHarness::new().await;
        let mandate = MandateBuilder::new()
            .attorney(PartyId::new())
            .effective(NaiveDate::from_ymd_opt(2025, 1, 1), NaiveDate::from_ymd_opt(2024, 1, 1))
            .build();

        let result = h.service.validate_mandate(&mandate).await.unwrap();
        assert!(!result.is_valid);
    }
}

mod person_workflow {
    use super::*;

    #[tokio::test]
    async fn test_builder_defaults_are_valid() {
        let h = PartyHarness::new().await;

        let person = PersonBuilder::new().with_residential_address().build();
        assert_valid(&h.service.validate_person(&person).await.unwrap());

        let organization = OrganizationBuilder::new().employer().build();
        assert_valid(&h.service.validate_organization(&organization).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_gender_is_reported() {
        let h = PartyHarness::new().await;
        let person = PersonBuilder::new().gender(Some("unknown")).build();

        let result = h.service.validate_person(&person).await.unwrap();
        assert_has_issue(&result, "gender");

        let created = h.service.create_person(TenantFixtures::default_tenant(), person).await;
        assert_invalid_argument(&created, "gender");
    }

    #[tokio::test]
    async fn test_listing_is_scoped_filtered_and_sorted() {
        let h = PartyHarness::new().await;
        let tenant = TenantFixtures::default_tenant();
        let other = TenantFixtures::other_tenant();

        for (given, surname) in [("Zola", "Mbeki"), ("Adam", "Smith"), ("Mary", "Smith")] {
            h.service
                .create_person(tenant, PersonBuilder::new().named(given, surname).build())
                .await
                .unwrap();
        }
        h.service
            .create_person(other, PersonBuilder::new().named("Olga", "Smith").tenant(other).build())
            .await
            .unwrap();

        let page = h
            .service
            .get_persons(
                tenant,
                PageRequest::first_page()
                    .with_filter("smith")
                    .sorted(SortDirection::Descending),
            )
            .await
            .unwrap();
        assert_page(&page, 2, 2);
        assert_eq!(page.items[0].name, "Mary Smith");
        assert_eq!(page.items[1].name, "Adam Smith");

        let parties = h.service.get_parties(other, PageRequest::first_page()).await.unwrap();
        assert_page(&parties, 1, 1);
        assert_eq!(parties.items[0].party_type, PartyType::Person);
    }

    #[tokio::test]
    async fn test_person_is_not_an_organization() {
        let h = PartyHarness::new().await;
        let tenant = TenantFixtures::default_tenant();
        let person = h.service.create_person(tenant, PersonBuilder::new().build()).await.unwrap();

        assert_not_found(&h.service.get_organization(tenant, person.id).await);
        assert_eq!(h.service.get_party(tenant, person.id).await.unwrap().name, "Jane Doe");
    }
}
