//! Party handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
};

use core_kernel::{AssociationId, MandateId, PartyId};
use domain_party::{Association, Mandate, Organization, Party, PartyPage, Person, ValidationResult};

use crate::auth::{permissions, require_role, Claims};
use crate::dto::party::ListQuery;
use crate::error::ApiError;
use crate::extract::{parse_id, Negotiated, Payload, ResponseFormat, Tenant};
use crate::AppState;

type ApiResult<T> = Result<Negotiated<T>, ApiError>;

fn ensure_same_id<T: PartialEq + std::fmt::Display>(path: T, body: T) -> Result<(), ApiError> {
    if path == body {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "The id in the path ({}) does not match the id in the body ({})",
            path, body
        )))
    }
}

// ============================================================================
// Parties
// ============================================================================

/// Lists the headers of all persons and organizations
pub async fn list_parties(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Query(query): Query<ListQuery>,
) -> ApiResult<PartyPage<Party>> {
    require_role(&claims, permissions::PARTY_READ)?;
    let page = state.parties.get_parties(tenant, query.into_page_request()?).await?;
    Ok(format.ok(page))
}

/// Gets the header of a person or organization
pub async fn get_party(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Path(id): Path<String>,
) -> ApiResult<Party> {
    require_role(&claims, permissions::PARTY_READ)?;
    let id: PartyId = parse_id(&id, "party id")?;
    Ok(format.ok(state.parties.get_party(tenant, id).await?))
}

// ============================================================================
// Persons
// ============================================================================

pub async fn list_persons(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Query(query): Query<ListQuery>,
) -> ApiResult<PartyPage<Person>> {
    require_role(&claims, permissions::PARTY_READ)?;
    let page = state.parties.get_persons(tenant, query.into_page_request()?).await?;
    Ok(format.ok(page))
}

pub async fn get_person(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Path(id): Path<String>,
) -> ApiResult<Person> {
    require_role(&claims, permissions::PARTY_READ)?;
    let id: PartyId = parse_id(&id, "person id")?;
    Ok(format.ok(state.parties.get_person(tenant, id).await?))
}

/// Creates a new person
pub async fn create_person(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Payload(person): Payload<Person>,
) -> ApiResult<Person> {
    require_role(&claims, permissions::PARTY_WRITE)?;
    Ok(format.created(state.parties.create_person(tenant, person).await?))
}

/// Replaces a person
pub async fn update_person(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Path(id): Path<String>,
    Payload(person): Payload<Person>,
) -> ApiResult<Person> {
    require_role(&claims, permissions::PARTY_WRITE)?;
    ensure_same_id(parse_id::<PartyId>(&id, "person id")?, person.id)?;
    Ok(format.ok(state.parties.update_person(tenant, person).await?))
}

pub async fn delete_person(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_role(&claims, permissions::PARTY_WRITE)?;
    let id: PartyId = parse_id(&id, "person id")?;
    state.parties.delete_person(tenant, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Validates a person without storing it
pub async fn validate_person(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Payload(mut person): Payload<Person>,
) -> ApiResult<ValidationResult> {
    require_role(&claims, permissions::PARTY_READ)?;
    person.tenant_id = tenant;
    Ok(format.ok(state.parties.validate_person(&person).await?))
}

// ============================================================================
// Organizations
// ============================================================================

pub async fn list_organizations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Query(query): Query<ListQuery>,
) -> ApiResult<PartyPage<Organization>> {
    require_role(&claims, permissions::PARTY_READ)?;
    let page = state
        .parties
        .get_organizations(tenant, query.into_page_request()?)
        .await?;
    Ok(format.ok(page))
}

pub async fn get_organization(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Path(id): Path<String>,
) -> ApiResult<Organization> {
    require_role(&claims, permissions::PARTY_READ)?;
    let id: PartyId = parse_id(&id, "organization id")?;
    Ok(format.ok(state.parties.get_organization(tenant, id).await?))
}

/// Creates a new organization
pub async fn create_organization(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Payload(organization): Payload<Organization>,
) -> ApiResult<Organization> {
    require_role(&claims, permissions::PARTY_WRITE)?;
    Ok(format.created(state.parties.create_organization(tenant, organization).await?))
}

/// Replaces an organization
pub async fn update_organization(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Path(id): Path<String>,
    Payload(organization): Payload<Organization>,
) -> ApiResult<Organization> {
    require_role(&claims, permissions::PARTY_WRITE)?;
    ensure_same_id(parse_id::<PartyId>(&id, "organization id")?, organization.id)?;
    Ok(format.ok(state.parties.update_organization(tenant, organization).await?))
}

pub async fn delete_organization(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_role(&claims, permissions::PARTY_WRITE)?;
    let id: PartyId = parse_id(&id, "organization id")?;
    state.parties.delete_organization(tenant, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Validates an organization without storing it
pub async fn validate_organization(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Payload(mut organization): Payload<Organization>,
) -> ApiResult<ValidationResult> {
    require_role(&claims, permissions::PARTY_READ)?;
    organization.tenant_id = tenant;
    Ok(format.ok(state.parties.validate_organization(&organization).await?))
}

// ============================================================================
// Associations
// ============================================================================

pub async fn list_associations_for_party(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PartyPage<Association>> {
    require_role(&claims, permissions::PARTY_READ)?;
    let id: PartyId = parse_id(&id, "party id")?;
    let page = state
        .parties
        .get_associations_for_party(tenant, id, query.into_page_request()?)
        .await?;
    Ok(format.ok(page))
}

pub async fn get_association(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Path(id): Path<String>,
) -> ApiResult<Association> {
    require_role(&claims, permissions::PARTY_READ)?;
    let id: AssociationId = parse_id(&id, "association id")?;
    Ok(format.ok(state.parties.get_association(tenant, id).await?))
}

pub async fn create_association(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Payload(association): Payload<Association>,
) -> ApiResult<Association> {
    require_role(&claims, permissions::PARTY_WRITE)?;
    Ok(format.created(state.parties.create_association(tenant, association).await?))
}

pub async fn update_association(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Path(id): Path<String>,
    Payload(association): Payload<Association>,
) -> ApiResult<Association> {
    require_role(&claims, permissions::PARTY_WRITE)?;
    ensure_same_id(parse_id::<AssociationId>(&id, "association id")?, association.id)?;
    Ok(format.ok(state.parties.update_association(tenant, association).await?))
}

pub async fn delete_association(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_role(&claims, permissions::PARTY_WRITE)?;
    let id: AssociationId = parse_id(&id, "association id")?;
    state.parties.delete_association(tenant, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Mandates
// ============================================================================

pub async fn list_mandates_for_party(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PartyPage<Mandate>> {
    require_role(&claims, permissions::PARTY_READ)?;
    let id: PartyId = parse_id(&id, "party id")?;
    let page = state
        .parties
        .get_mandates_for_party(tenant, id, query.into_page_request()?)
        .await?;
    Ok(format.ok(page))
}

pub async fn get_mandate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Path(id): Path<String>,
) -> ApiResult<Mandate> {
    require_role(&claims, permissions::PARTY_READ)?;
    let id: MandateId = parse_id(&id, "mandate id")?;
    Ok(format.ok(state.parties.get_mandate(tenant, id).await?))
}

pub async fn create_mandate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Payload(mandate): Payload<Mandate>,
) -> ApiResult<Mandate> {
    require_role(&claims, permissions::PARTY_WRITE)?;
    Ok(format.created(state.parties.create_mandate(tenant, mandate).await?))
}

pub async fn update_mandate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Path(id): Path<String>,
    Payload(mandate): Payload<Mandate>,
) -> ApiResult<Mandate> {
    require_role(&claims, permissions::PARTY_WRITE)?;
    ensure_same_id(parse_id::<MandateId>(&id, "mandate id")?, mandate.id)?;
    Ok(format.ok(state.parties.update_mandate(tenant, mandate).await?))
}

pub async fn delete_mandate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_role(&claims, permissions::PARTY_WRITE)?;
    let id: MandateId = parse_id(&id, "mandate id")?;
    state.parties.delete_mandate(tenant, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
