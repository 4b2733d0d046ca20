//! Router tests for interface_api, run against the in-memory ports

use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use rust_decimal_macros::dec;
use serde_json::Value;

use core_kernel::{PartyId, TenantId};
use domain_party::{
    codec, Attribute, InMemoryPartyPort, InMemoryReferenceDataPort, Organization, PartyPage, PartyPort, PartyType,
    Person, ReferenceCode, ReferenceDataKind, SourceOfFunds, ValueType,
};
use interface_api::auth::{create_token, permissions};
use interface_api::config::ApiConfig;
use interface_api::dto::reference::{ReferenceCodeList, ValidityResponse};
use interface_api::error::ErrorResponse;
use interface_api::{create_router, AppState};

const SECRET: &str = "api-test-secret";

struct Harness {
    server: TestServer,
    party_port: Arc<InMemoryPartyPort>,
    reference_port: Arc<InMemoryReferenceDataPort>,
}

fn code(kind: ReferenceDataKind, code: &str, locale: &str, name: &str) -> ReferenceCode {
    ReferenceCode::new(kind, code, locale, name)
}

async fn harness() -> Harness {
    let party_port = Arc::new(InMemoryPartyPort::new());
    let reference_port = Arc::new(
        InMemoryReferenceDataPort::with_codes(vec![
            code(ReferenceDataKind::Gender, "female", "en-US", "Female"),
            code(ReferenceDataKind::Gender, "male", "en-US", "Male"),
            code(ReferenceDataKind::Gender, "female", "af-ZA", "Vroulik"),
            code(ReferenceDataKind::Title, "ms", "en-US", "Ms"),
            code(ReferenceDataKind::RoleType, "employer", "en-US", "Employer")
                .with_party_types(&[PartyType::Organization]),
            code(ReferenceDataKind::AttributeType, "height", "en-US", "Height").with_value_type(ValueType::Decimal),
            code(ReferenceDataKind::SourceOfFundsType, "salary", "en-US", "Salary"),
        ])
        .await,
    );

    let mut config = ApiConfig::default();
    config.auth.jwt_secret = SECRET.to_string();
    let state = AppState::new(party_port.clone(), reference_port.clone(), config).unwrap();
    let server = TestServer::new(create_router(state)).unwrap();

    Harness {
        server,
        party_port,
        reference_port,
    }
}

fn token(roles: &[&str]) -> HeaderValue {
    let token = create_token("tester", roles.iter().map(|r| r.to_string()).collect(), SECRET, 300).unwrap();
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

fn as_admin(request: TestRequest) -> TestRequest {
    request.add_header(header::AUTHORIZATION, token(&["admin"]))
}

fn with_tenant(request: TestRequest, tenant: TenantId) -> TestRequest {
    request.add_header(
        HeaderName::from_static("x-tenant-id"),
        HeaderValue::from_str(&tenant.to_string()).unwrap(),
    )
}

fn person(name: &str) -> Person {
    let mut person = Person::new(TenantId::DEFAULT, name);
    person.gender = Some("female".to_string());
    person
}

// ============================================================================
// Authentication
// ============================================================================

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_is_public() {
        let h = harness().await;
        let response = h.server.get("/health").await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let h = harness().await;
        let response = h.server.get("/api/v1/parties").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthorized() {
        let h = harness().await;
        let response = h
            .server
            .get("/api/v1/parties")
            .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer not-a-token"))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_read_only_token_cannot_write() {
        let h = harness().await;
        let response = h
            .server
            .post("/api/v1/parties/persons")
            .add_header(header::AUTHORIZATION, token(&[permissions::PARTY_READ]))
            .json(&person("Jane Doe"))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }
}

// ============================================================================
// Persons and Organizations
// ============================================================================

mod party_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_person() {
        let h = harness().await;
        let created = as_admin(h.server.post("/api/v1/parties/persons"))
            .json(&person("Jane Doe"))
            .await;
        assert_eq!(created.status_code(), StatusCode::CREATED);
        let created: Person = created.json();

        let response = as_admin(h.server.get(&format!("/api/v1/parties/persons/{}", created.id))).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let loaded: Person = response.json();
        assert_eq!(loaded.id, created.id);
        assert_eq!(loaded.gender.as_deref(), Some("female"));
    }

    #[tokio::test]
    async fn test_unknown_person_is_not_found() {
        let h = harness().await;
        let response = as_admin(h.server.get(&format!("/api/v1/parties/persons/{}", PartyId::new()))).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["error"], "not_found");
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let h = harness().await;
        let response = as_admin(h.server.get("/api/v1/parties/persons/12345")).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_person_is_conflict() {
        let h = harness().await;
        let jane = person("Jane Doe");
        as_admin(h.server.post("/api/v1/parties/persons")).json(&jane).await;

        let response = as_admin(h.server.post("/api/v1/parties/persons")).json(&jane).await;
        assert_eq!(response.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_invalid_person_lists_issues() {
        let h = harness().await;
        let mut jane = person("Jane Doe");
        jane.gender = Some("unknown".to_string());

        let response = as_admin(h.server.post("/api/v1/parties/persons")).json(&jane).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["error"], "invalid_argument");
        let details = body["details"].as_array().unwrap();
        assert!(details.iter().any(|d| d["property"] == "gender"));
    }

    #[tokio::test]
    async fn test_validate_endpoint_does_not_store() {
        let h = harness().await;
        let mut jane = person("Jane Doe");
        jane.gender = Some("unknown".to_string());

        let response = as_admin(h.server.post("/api/v1/parties/persons/validate"))
            .json(&jane)
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["is_valid"], false);

        let listed: PartyPage<Person> = as_admin(h.server.get("/api/v1/parties/persons")).await.json();
        assert_eq!(listed.total, 0);
    }

    #[tokio::test]
    async fn test_update_with_mismatched_id_is_bad_request() {
        let h = harness().await;
        let jane = person("Jane Doe");
        as_admin(h.server.post("/api/v1/parties/persons")).json(&jane).await;

        let response = as_admin(h.server.put(&format!("/api/v1/parties/persons/{}", PartyId::new())))
            .json(&jane)
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_person() {
        let h = harness().await;
        let jane = person("Jane Doe");
        as_admin(h.server.post("/api/v1/parties/persons")).json(&jane).await;

        let path = format!("/api/v1/parties/persons/{}", jane.id);
        assert_eq!(as_admin(h.server.delete(&path)).await.status_code(), StatusCode::NO_CONTENT);
        assert_eq!(as_admin(h.server.get(&path)).await.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_organization_is_not_a_person() {
        let h = harness().await;
        let acme = Organization::new(TenantId::DEFAULT, "Acme");
        let created = as_admin(h.server.post("/api/v1/parties/organizations")).json(&acme).await;
        assert_eq!(created.status_code(), StatusCode::CREATED);

        let as_person = as_admin(h.server.get(&format!("/api/v1/parties/persons/{}", acme.id))).await;
        assert_eq!(as_person.status_code(), StatusCode::NOT_FOUND);

        let as_party: Value = as_admin(h.server.get(&format!("/api/v1/parties/{}", acme.id))).await.json();
        assert_eq!(as_party["party_type"], "organization");
    }

    #[tokio::test]
    async fn test_listing_honors_query_parameters() {
        let h = harness().await;
        for name in ["charlie", "Alice", "bob"] {
            as_admin(h.server.post("/api/v1/parties/persons")).json(&person(name)).await;
        }

        let page: PartyPage<Person> = as_admin(h.server.get("/api/v1/parties/persons"))
            .add_query_param("sortDirection", "descending")
            .add_query_param("pageSize", 500)
            .add_query_param("pageIndex", -1)
            .await
            .json();

        let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["charlie", "bob", "Alice"]);
        assert_eq!(page.page_size, 100);
        assert_eq!(page.page_index, 0);
    }

    #[tokio::test]
    async fn test_tenant_header_scopes_parties() {
        let h = harness().await;
        let other = TenantId::new();
        let jane = person("Jane Doe");
        with_tenant(as_admin(h.server.post("/api/v1/parties/persons")), other)
            .json(&jane)
            .await;

        let path = format!("/api/v1/parties/persons/{}", jane.id);
        assert_eq!(as_admin(h.server.get(&path)).await.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            with_tenant(as_admin(h.server.get(&path)), other).await.status_code(),
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_invalid_tenant_header_is_bad_request() {
        let h = harness().await;
        let response = as_admin(h.server.get("/api/v1/parties"))
            .add_header(HeaderName::from_static("x-tenant-id"), HeaderValue::from_static("acme"))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_xml_response_when_accepted() {
        let h = harness().await;
        let jane = person("Jane Doe");
        as_admin(h.server.post("/api/v1/parties/persons")).json(&jane).await;

        let response = as_admin(h.server.get(&format!("/api/v1/parties/persons/{}", jane.id)))
            .add_header(header::ACCEPT, HeaderValue::from_static("application/xml"))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.header(header::CONTENT_TYPE), "application/xml");
        let loaded: Person = codec::from_xml(&response.text()).unwrap();
        assert_eq!(loaded.id, jane.id);
        assert_eq!(loaded.tenant_id, jane.tenant_id);
        assert_eq!(loaded.name, "Jane Doe");
        assert_eq!(loaded.gender.as_deref(), Some("female"));
    }

    #[tokio::test]
    async fn test_create_person_from_xml() {
        let h = harness().await;
        let mut jane = person("Jane Doe");
        jane.add_attribute(Attribute::decimal("height", dec!(1.82)));
        jane.add_source_of_funds(SourceOfFunds {
            source_of_funds_type: "salary".to_string(),
            percentage: Some(dec!(75.5)),
        });

        let response = as_admin(h.server.post("/api/v1/parties/persons"))
            .text(codec::to_xml(&jane).unwrap())
            .content_type("application/xml")
            .add_header(header::ACCEPT, HeaderValue::from_static("application/xml"))
            .await;

        assert_eq!(response.status_code(), StatusCode::CREATED);
        let created: Person = codec::from_xml(&response.text()).unwrap();
        assert_eq!(created.id, jane.id);
        assert_eq!(created.attribute_with_type("height").unwrap().decimal_value, Some(dec!(1.82)));
        assert_eq!(
            created.source_of_funds_with_type("salary").unwrap().percentage,
            Some(dec!(75.5))
        );

        let stored = h.party_port.get_person(TenantId::DEFAULT, jane.id).await.unwrap();
        assert_eq!(stored.attribute_with_type("height").unwrap().decimal_value, Some(dec!(1.82)));
    }

    #[tokio::test]
    async fn test_not_found_is_xml_when_accepted() {
        let h = harness().await;
        let response = as_admin(h.server.get(&format!("/api/v1/parties/persons/{}", PartyId::new())))
            .add_header(header::ACCEPT, HeaderValue::from_static("application/xml"))
            .await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(response.header(header::CONTENT_TYPE), "application/xml");
        let body: ErrorResponse = codec::from_xml(&response.text()).unwrap();
        assert_eq!(body.error, "not_found");
        assert!(body.details.is_none());
    }

    #[tokio::test]
    async fn test_rejected_token_is_xml_when_accepted() {
        let h = harness().await;
        let response = h
            .server
            .get("/api/v1/parties")
            .add_header(header::ACCEPT, HeaderValue::from_static("application/xml"))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = codec::from_xml(&response.text()).unwrap();
        assert_eq!(body.error, "unauthorized");
    }

    #[tokio::test]
    async fn test_store_failure_is_service_unavailable() {
        let h = harness().await;
        h.party_port.set_unavailable(true);

        let response = as_admin(h.server.get(&format!("/api/v1/parties/persons/{}", PartyId::new()))).await;
        assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let ready = h.server.get("/health/ready").await;
        assert_eq!(ready.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

// ============================================================================
// Associations and Mandates
// ============================================================================

mod relationship_tests {
    use super::*;
    use domain_party::{Association, Mandate};

    #[tokio::test]
    async fn test_associations_for_unknown_party_are_not_found() {
        let h = harness().await;
        let response = as_admin(h.server.get(&format!("/api/v1/parties/{}/associations", PartyId::new()))).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_association_requires_existing_parties() {
        let h = harness().await;
        let association = Association::new(TenantId::DEFAULT, "employer_of", PartyId::new(), PartyId::new());

        let response = as_admin(h.server.post("/api/v1/parties/associations"))
            .json(&association)
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_mandate_is_not_found() {
        let h = harness().await;
        let mandate = Mandate::new(TenantId::DEFAULT, "power_of_attorney");
        let response = as_admin(h.server.get(&format!("/api/v1/parties/mandates/{}", mandate.id))).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

        let response = as_admin(h.server.delete(&format!("/api/v1/parties/mandates/{}", mandate.id))).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }
}

// ============================================================================
// Reference Data
// ============================================================================

mod reference_tests {
    use super::*;

    #[tokio::test]
    async fn test_codes_for_default_locale() {
        let h = harness().await;
        let response = as_admin(h.server.get("/api/v1/party-reference/gender")).await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let list: ReferenceCodeList = response.json();
        assert_eq!(list.kind, "gender");
        assert_eq!(list.locale_id, "en-US");
        let codes: Vec<&str> = list.codes.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["female", "male"]);
    }

    #[tokio::test]
    async fn test_codes_for_requested_locale() {
        let h = harness().await;
        let list: ReferenceCodeList = as_admin(h.server.get("/api/v1/party-reference/gender"))
            .add_query_param("localeId", "af-ZA")
            .await
            .json();

        assert_eq!(list.codes.len(), 1);
        assert_eq!(list.codes[0].name, "Vroulik");
    }

    #[tokio::test]
    async fn test_unknown_kind_is_bad_request() {
        let h = harness().await;
        let response = as_admin(h.server.get("/api/v1/party-reference/colours")).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_code_validity() {
        let h = harness().await;
        let valid: ValidityResponse = as_admin(h.server.get("/api/v1/party-reference/title/ms/valid"))
            .await
            .json();
        assert!(valid.valid);

        let invalid: ValidityResponse = as_admin(h.server.get("/api/v1/party-reference/title/dr/valid"))
            .await
            .json();
        assert!(!invalid.valid);
    }

    #[tokio::test]
    async fn test_reload_requires_admin_and_clears_cache() {
        let h = harness().await;
        as_admin(h.server.get("/api/v1/party-reference/gender")).await;
        let loads = h.reference_port.load_count();

        let forbidden = h
            .server
            .post("/api/v1/party-reference/reload")
            .add_header(header::AUTHORIZATION, token(&[permissions::REFERENCE_READ]))
            .await;
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

        let reloaded = as_admin(h.server.post("/api/v1/party-reference/reload")).await;
        assert_eq!(reloaded.status_code(), StatusCode::OK);

        as_admin(h.server.get("/api/v1/party-reference/gender")).await;
        assert_eq!(h.reference_port.load_count(), loads + 1);
    }

    #[tokio::test]
    async fn test_reference_failure_is_service_unavailable() {
        let h = harness().await;
        h.reference_port.set_unavailable(true);

        let response = as_admin(h.server.get("/api/v1/party-reference/gender")).await;
        assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
