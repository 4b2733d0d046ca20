//! Database integration tests for the Postgres party adapters
//!
//! These tests start a PostgreSQL container and are ignored by default.
//! Run them with `cargo test -p test_utils -- --ignored`.

use std::sync::Arc;

use core_kernel::{AdapterHealth, HealthCheckable};
use domain_party::{
    PageRequest, PartyPort, PartyReferenceService, PartyService, ReferenceDataKind,
    ReferenceDataPort,
};
use infra_db::{PostgresPartyAdapter, PostgresReferenceDataAdapter};
use test_utils::{
    assert_not_found, assert_page, db_test, AssociationBuilder, IdFixtures, MandateBuilder, OrganizationBuilder,
    PersonBuilder, TenantFixtures, ALTERNATE_LOCALE,
};

fn service(pool: &sqlx::PgPool) -> PartyService {
    let reference = Arc::new(PartyReferenceService::new(Arc::new(
        PostgresReferenceDataAdapter::new(pool.clone()),
    )));
    PartyService::new(Arc::new(PostgresPartyAdapter::new(pool.clone())), reference)
}

db_test!(test_person_round_trip, |db| {
    let service = service(db.pool());
    let tenant = TenantFixtures::default_tenant();

    let created = service
        .create_person(tenant, PersonBuilder::new().with_residential_address().build())
        .await
        .expect("Failed to create person");
    let loaded = service.get_person(tenant, created.id).await.unwrap();

    assert_eq!(loaded.name, "Jane Doe");
    assert_eq!(loaded.physical_addresses.len(), 1);
    assert!(loaded.contact_mechanism_with_role("personal_email_address").is_some());

    service.delete_person(tenant, created.id).await.unwrap();
    assert_not_found(&service.get_person(tenant, created.id).await);
});

db_test!(test_parties_are_tenant_scoped, |db| {
    let service = service(db.pool());
    let other = TenantFixtures::other_tenant();

    let created = service
        .create_organization(other, OrganizationBuilder::new().employer().build())
        .await
        .unwrap();

    assert_not_found(&service.get_organization(TenantFixtures::default_tenant(), created.id).await);
    let page = service.get_parties(other, PageRequest::first_page()).await.unwrap();
    assert_page(&page, 1, 1);
});

db_test!(test_relationships_follow_their_parties, |db| {
    let service = service(db.pool());
    let tenant = TenantFixtures::default_tenant();

    let employer = service
        .create_organization(tenant, OrganizationBuilder::new().employer().build())
        .await
        .unwrap();
    let employee = service.create_person(tenant, PersonBuilder::new().build()).await.unwrap();

    service
        .create_association(tenant, AssociationBuilder::new(employer.id, employee.id).build())
        .await
        .unwrap();
    let mandate = service
        .create_mandate(tenant, MandateBuilder::new().attorney(employee.id).build())
        .await
        .unwrap();

    let mandates = service
        .get_mandates_for_party(tenant, employee.id, PageRequest::first_page())
        .await
        .unwrap();
    assert_page(&mandates, 1, 1);
    assert!(mandates.items[0].has_mandatary(employee.id));
    assert_eq!(mandates.items[0].id, mandate.id);

    service.delete_person(tenant, employee.id).await.unwrap();
    assert_not_found(&service.get_mandate(tenant, mandate.id).await);
    assert_eq!(db.count_rows("mandates").await.unwrap(), 0);
    let associations = service
        .get_associations_for_party(tenant, employer.id, PageRequest::first_page())
        .await
        .unwrap();
    assert_page(&associations, 0, 0);
});

db_test!(test_reference_codes_are_served_per_locale, |db| {
    let port = Arc::new(PostgresReferenceDataAdapter::new(db.pool().clone()));
    assert_eq!(port.health_check().await.status, AdapterHealth::Healthy);

    let codes = port.get_codes(ReferenceDataKind::Gender).await.unwrap();
    assert_eq!(codes.len(), 4);

    let reference = PartyReferenceService::new(port);
    let localized = reference
        .get_codes(ReferenceDataKind::Gender, TenantFixtures::default_tenant(), Some(ALTERNATE_LOCALE))
        .await
        .unwrap();
    assert!(localized.iter().any(|code| code.name == "Vroulik"));
});

db_test!(test_party_adapter_reports_health, |db| {
    let port = PostgresPartyAdapter::new(db.pool().clone());
    let result = port.health_check().await;
    assert_eq!(result.status, AdapterHealth::Healthy);
    let exists = port
        .party_exists(TenantFixtures::default_tenant(), IdFixtures::unknown_party_id())
        .await
        .unwrap();
    assert!(!exists);
});

db_test!(test_reset_keeps_reference_data, |db| {
    let service = service(db.pool());
    let tenant = TenantFixtures::default_tenant();
    service.create_person(tenant, PersonBuilder::new().build()).await.unwrap();
    assert_eq!(db.count_rows("parties").await.unwrap(), 1);

    db.reset().await.unwrap();

    assert_eq!(db.count_rows("parties").await.unwrap(), 0);
    assert!(db.count_rows("reference_codes").await.unwrap() > 0);
});
