//! PostgreSQL Party Adapter
//!
//! This module provides the internal (database) adapter for the party domain,
//! implementing the `PartyPort` trait using PostgreSQL via the `PartyRepository`.
//!
//! # Overview
//!
//! The `PostgresPartyAdapter` serves as the bridge between the domain layer's
//! port interface and the database layer. It:
//!
//! - Serializes persons, organizations, associations and mandates into the
//!   JSON documents stored by the repository
//! - Restores the column values (`name`, `created`, `updated`) over the
//!   document on read, since the columns are authoritative
//! - Translates database errors into port errors
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresPartyAdapter;
//! use domain_party::PartyPort;
//! use std::sync::Arc;
//!
//! let port: Arc<dyn PartyPort> = Arc::new(PostgresPartyAdapter::new(pool));
//! let person = port.get_person(tenant_id, person_id).await?;
//! ```

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    AssociationId, DomainPort, HealthCheckResult, HealthCheckable, MandateId, PartyId,
    PortError, TenantId,
};
use domain_party::{
    Association, Mandatary, Mandate, Organization, PageRequest, Party, PartyPage, PartyPort, PartyType,
    Person,
};

use crate::repositories::party::{
    AssociationRow, MandataryRow, MandateRow, PartyHeaderRow, PartyRepository, PartyRow,
};

/// PostgreSQL-backed implementation of the PartyPort trait
///
/// # Health Checking
///
/// The adapter implements `HealthCheckable` with a `SELECT 1` round trip.
///
/// # Error Handling
///
/// - missing rows -> `PortError::NotFound`
/// - duplicate keys -> `PortError::Conflict`
/// - references to parties that do not exist -> `PortError::Validation`
/// - other database errors -> `PortError::Internal` or `PortError::Connection`
#[derive(Debug, Clone)]
pub struct PostgresPartyAdapter {
    repository: PartyRepository,
    pool: PgPool,
}

impl PostgresPartyAdapter {
    /// Creates a new PostgreSQL party adapter
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PartyRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &PartyRepository {
        &self.repository
    }

    async fn require_party(&self, tenant_id: TenantId, id: PartyId, field: &str) -> Result<(), PortError> {
        if self.repository.exists(tenant_id.into(), id.into()).await? {
            Ok(())
        } else {
            Err(PortError::validation_field(
                format!("The party ({}) does not exist", id),
                field,
            ))
        }
    }

    async fn with_mandataries(&self, rows: Vec<MandateRow>) -> Result<Vec<Mandate>, PortError> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut mandataries: HashMap<Uuid, Vec<Mandatary>> = HashMap::new();
        for row in self.repository.get_mandataries(&ids).await? {
            mandataries
                .entry(row.mandate_id)
                .or_default()
                .push(Mandatary::new(PartyId::from(row.party_id), row.role));
        }

        rows.into_iter()
            .map(|row| {
                let entries = mandataries.remove(&row.id).unwrap_or_default();
                row_to_mandate(row, entries)
            })
            .collect()
    }
}

impl DomainPort for PostgresPartyAdapter {}

#[async_trait]
impl HealthCheckable for PostgresPartyAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        database_health_check(&self.pool, "postgres-party-adapter").await
    }
}

/// Performs a `SELECT 1` round trip and reports the latency
pub(crate) async fn database_health_check(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult::healthy(adapter_id, latency_ms),
        Err(e) => HealthCheckResult::unhealthy(adapter_id, latency_ms, format!("Database error: {}", e)),
    }
}

#[async_trait]
impl PartyPort for PostgresPartyAdapter {
    async fn party_exists(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError> {
        Ok(self.repository.exists(tenant_id.into(), id.into()).await?)
    }

    #[instrument(skip(self), fields(party_id = %id))]
    async fn get_party(&self, tenant_id: TenantId, id: PartyId) -> Result<Party, PortError> {
        self.repository
            .get_header(tenant_id.into(), id.into())
            .await?
            .ok_or_else(|| PortError::not_found("Party", id))
            .and_then(header_to_party)
    }

    #[instrument(skip(self))]
    async fn get_parties(&self, tenant_id: TenantId, request: &PageRequest) -> Result<PartyPage<Party>, PortError> {
        let (rows, total) = self.repository.list_headers(tenant_id.into(), request).await?;
        let parties = rows.into_iter().map(header_to_party).collect::<Result<Vec<_>, _>>()?;
        debug!(count = parties.len(), total, "Listed parties");
        Ok(PartyPage::new(parties, to_total(total), &request.normalized()))
    }

    #[instrument(skip(self), fields(person_id = %id))]
    async fn get_person(&self, tenant_id: TenantId, id: PartyId) -> Result<Person, PortError> {
        self.repository
            .get(tenant_id.into(), id.into(), PartyType::Person.code())
            .await?
            .ok_or_else(|| PortError::not_found("Person", id))
            .and_then(row_to_person)
    }

    #[instrument(skip(self))]
    async fn get_persons(&self, tenant_id: TenantId, request: &PageRequest) -> Result<PartyPage<Person>, PortError> {
        let (rows, total) = self
            .repository
            .list(tenant_id.into(), PartyType::Person.code(), request)
            .await?;
        let persons = rows.into_iter().map(row_to_person).collect::<Result<Vec<_>, _>>()?;
        Ok(PartyPage::new(persons, to_total(total), &request.normalized()))
    }

    #[instrument(skip(self, person), fields(person_id = %person.id))]
    async fn create_person(&self, person: Person) -> Result<Person, PortError> {
        let row = party_row(&person.party(), &person)?;
        self.repository.insert(&row).await?;
        debug!("Inserted person");
        Ok(person)
    }

    #[instrument(skip(self, person), fields(person_id = %person.id))]
    async fn update_person(&self, mut person: Person) -> Result<Person, PortError> {
        person.updated = Some(Utc::now());
        let row = party_row(&person.party(), &person)?;
        person.created = self
            .repository
            .update(&row)
            .await?
            .ok_or_else(|| PortError::not_found("Person", person.id))?;
        Ok(person)
    }

    #[instrument(skip(self), fields(organization_id = %id))]
    async fn get_organization(&self, tenant_id: TenantId, id: PartyId) -> Result<Organization, PortError> {
        self.repository
            .get(tenant_id.into(), id.into(), PartyType::Organization.code())
            .await?
            .ok_or_else(|| PortError::not_found("Organization", id))
            .and_then(row_to_organization)
    }

    #[instrument(skip(self))]
    async fn get_organizations(
        &self,
        tenant_id: TenantId,
        request: &PageRequest,
    ) -> Result<PartyPage<Organization>, PortError> {
        let (rows, total) = self
            .repository
            .list(tenant_id.into(), PartyType::Organization.code(), request)
            .await?;
        let organizations = rows
            .into_iter()
            .map(row_to_organization)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PartyPage::new(organizations, to_total(total), &request.normalized()))
    }

    #[instrument(skip(self, organization), fields(organization_id = %organization.id))]
    async fn create_organization(&self, organization: Organization) -> Result<Organization, PortError> {
        let row = party_row(&organization.party(), &organization)?;
        self.repository.insert(&row).await?;
        debug!("Inserted organization");
        Ok(organization)
    }

    #[instrument(skip(self, organization), fields(organization_id = %organization.id))]
    async fn update_organization(&self, mut organization: Organization) -> Result<Organization, PortError> {
        organization.updated = Some(Utc::now());
        let row = party_row(&organization.party(), &organization)?;
        organization.created = self
            .repository
            .update(&row)
            .await?
            .ok_or_else(|| PortError::not_found("Organization", organization.id))?;
        Ok(organization)
    }

    #[instrument(skip(self))]
    async fn delete_party(&self, tenant_id: TenantId, id: PartyId, party_type: PartyType) -> Result<(), PortError> {
        if self
            .repository
            .delete(tenant_id.into(), id.into(), party_type.code())
            .await?
        {
            Ok(())
        } else {
            Err(PortError::not_found(party_type.code(), id))
        }
    }

    #[instrument(skip(self), fields(association_id = %id))]
    async fn get_association(&self, tenant_id: TenantId, id: AssociationId) -> Result<Association, PortError> {
        self.repository
            .get_association(tenant_id.into(), id.into())
            .await?
            .ok_or_else(|| PortError::not_found("Association", id))
            .and_then(row_to_association)
    }

    #[instrument(skip(self))]
    async fn get_associations_for_party(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        request: &PageRequest,
    ) -> Result<PartyPage<Association>, PortError> {
        let (rows, total) = self
            .repository
            .list_associations_for_party(tenant_id.into(), party_id.into(), request)
            .await?;
        let associations = rows
            .into_iter()
            .map(row_to_association)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PartyPage::new(associations, to_total(total), &request.normalized()))
    }

    #[instrument(skip(self, association), fields(association_id = %association.id))]
    async fn create_association(&self, association: Association) -> Result<Association, PortError> {
        self.require_party(association.tenant_id, association.first_party_id, "first_party_id")
            .await?;
        self.require_party(association.tenant_id, association.second_party_id, "second_party_id")
            .await?;

        self.repository.insert_association(&association_row(&association)?).await?;
        Ok(association)
    }

    #[instrument(skip(self, association), fields(association_id = %association.id))]
    async fn update_association(&self, mut association: Association) -> Result<Association, PortError> {
        self.require_party(association.tenant_id, association.first_party_id, "first_party_id")
            .await?;
        self.require_party(association.tenant_id, association.second_party_id, "second_party_id")
            .await?;

        association.updated = Some(Utc::now());
        association.created = self
            .repository
            .update_association(&association_row(&association)?)
            .await?
            .ok_or_else(|| PortError::not_found("Association", association.id))?;
        Ok(association)
    }

    #[instrument(skip(self))]
    async fn delete_association(&self, tenant_id: TenantId, id: AssociationId) -> Result<(), PortError> {
        if self.repository.delete_association(tenant_id.into(), id.into()).await? {
            Ok(())
        } else {
            Err(PortError::not_found("Association", id))
        }
    }

    #[instrument(skip(self), fields(mandate_id = %id))]
    async fn get_mandate(&self, tenant_id: TenantId, id: MandateId) -> Result<Mandate, PortError> {
        let row = self
            .repository
            .get_mandate(tenant_id.into(), id.into())
            .await?
            .ok_or_else(|| PortError::not_found("Mandate", id))?;

        self.with_mandataries(vec![row])
            .await?
            .pop()
            .ok_or_else(|| PortError::not_found("Mandate", id))
    }

    #[instrument(skip(self))]
    async fn get_mandates_for_party(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        request: &PageRequest,
    ) -> Result<PartyPage<Mandate>, PortError> {
        let (rows, total) = self
            .repository
            .list_mandates_for_party(tenant_id.into(), party_id.into(), request)
            .await?;
        let mandates = self.with_mandataries(rows).await?;
        Ok(PartyPage::new(mandates, to_total(total), &request.normalized()))
    }

    #[instrument(skip(self, mandate), fields(mandate_id = %mandate.id))]
    async fn create_mandate(&self, mandate: Mandate) -> Result<Mandate, PortError> {
        for mandatary in &mandate.mandataries {
            self.require_party(mandate.tenant_id, mandatary.party_id, "mandataries").await?;
        }

        let (row, mandataries) = mandate_rows(&mandate)?;
        self.repository.insert_mandate(&row, &mandataries).await?;
        Ok(mandate)
    }

    #[instrument(skip(self, mandate), fields(mandate_id = %mandate.id))]
    async fn update_mandate(&self, mut mandate: Mandate) -> Result<Mandate, PortError> {
        for mandatary in &mandate.mandataries {
            self.require_party(mandate.tenant_id, mandatary.party_id, "mandataries").await?;
        }

        mandate.updated = Some(Utc::now());
        let (row, mandataries) = mandate_rows(&mandate)?;
        mandate.created = self
            .repository
            .update_mandate(&row, &mandataries)
            .await?
            .ok_or_else(|| PortError::not_found("Mandate", mandate.id))?;
        Ok(mandate)
    }

    #[instrument(skip(self))]
    async fn delete_mandate(&self, tenant_id: TenantId, id: MandateId) -> Result<(), PortError> {
        if self.repository.delete_mandate(tenant_id.into(), id.into()).await? {
            Ok(())
        } else {
            Err(PortError::not_found("Mandate", id))
        }
    }
}

// ============================================================================
// Conversion helpers
// ============================================================================

fn to_total(total: i64) -> u64 {
    u64::try_from(total).unwrap_or(0)
}

fn to_document<T: Serialize>(value: &T) -> Result<serde_json::Value, PortError> {
    serde_json::to_value(value).map_err(|e| PortError::internal_with_source("Failed to serialize the document", e))
}

fn from_document<T: DeserializeOwned>(data: serde_json::Value) -> Result<T, PortError> {
    serde_json::from_value(data).map_err(|e| PortError::internal_with_source("Failed to read the stored document", e))
}

fn party_row<T: Serialize>(party: &Party, document: &T) -> Result<PartyRow, PortError> {
    Ok(PartyRow {
        id: party.id.into(),
        tenant_id: party.tenant_id.into(),
        party_type: party.party_type.code().to_string(),
        name: party.name.clone(),
        created: party.created,
        updated: party.updated,
        data: to_document(document)?,
    })
}

fn header_to_party(row: PartyHeaderRow) -> Result<Party, PortError> {
    let party_type = PartyType::from_str(&row.party_type)
        .map_err(|e| PortError::internal(format!("Invalid stored party type: {}", e)))?;

    Ok(Party {
        id: PartyId::from(row.id),
        tenant_id: TenantId::from(row.tenant_id),
        party_type,
        name: row.name,
        created: row.created,
        updated: row.updated,
    })
}

fn row_to_person(row: PartyRow) -> Result<Person, PortError> {
    let mut person: Person = from_document(row.data)?;
    person.id = PartyId::from(row.id);
    person.tenant_id = TenantId::from(row.tenant_id);
    person.name = row.name;
    person.created = row.created;
    person.updated = row.updated;
    Ok(person)
}

fn row_to_organization(row: PartyRow) -> Result<Organization, PortError> {
    let mut organization: Organization = from_document(row.data)?;
    organization.id = PartyId::from(row.id);
    organization.tenant_id = TenantId::from(row.tenant_id);
    organization.name = row.name;
    organization.created = row.created;
    organization.updated = row.updated;
    Ok(organization)
}

fn association_row(association: &Association) -> Result<AssociationRow, PortError> {
    Ok(AssociationRow {
        id: association.id.into(),
        tenant_id: association.tenant_id.into(),
        association_type: association.association_type.clone(),
        first_party_id: association.first_party_id.into(),
        second_party_id: association.second_party_id.into(),
        created: association.created,
        updated: association.updated,
        data: to_document(association)?,
    })
}

fn row_to_association(row: AssociationRow) -> Result<Association, PortError> {
    let mut association: Association = from_document(row.data)?;
    association.id = AssociationId::from(row.id);
    association.tenant_id = TenantId::from(row.tenant_id);
    association.association_type = row.association_type;
    association.first_party_id = PartyId::from(row.first_party_id);
    association.second_party_id = PartyId::from(row.second_party_id);
    association.created = row.created;
    association.updated = row.updated;
    Ok(association)
}

fn mandate_rows(mandate: &Mandate) -> Result<(MandateRow, Vec<MandataryRow>), PortError> {
    let row = MandateRow {
        id: mandate.id.into(),
        tenant_id: mandate.tenant_id.into(),
        mandate_type: mandate.mandate_type.clone(),
        created: mandate.created,
        updated: mandate.updated,
        data: to_document(mandate)?,
    };
    let mandataries = mandate
        .mandataries
        .iter()
        .map(|m| MandataryRow {
            mandate_id: mandate.id.into(),
            party_id: m.party_id.into(),
            role: m.role.clone(),
        })
        .collect();
    Ok((row, mandataries))
}

/// Rebuilds a mandate; the join table is authoritative for the mandataries
fn row_to_mandate(row: MandateRow, mandataries: Vec<Mandatary>) -> Result<Mandate, PortError> {
    let mut mandate: Mandate = from_document(row.data)?;
    mandate.id = MandateId::from(row.id);
    mandate.tenant_id = TenantId::from(row.tenant_id);
    mandate.mandate_type = row.mandate_type;
    mandate.created = row.created;
    mandate.updated = row.updated;
    mandate.mandataries = mandataries;
    Ok(mandate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_row_round_trip_restores_columns() {
        let mut person = Person::new(TenantId::DEFAULT, "Jane Doe");
        person.gender = Some("female".to_string());

        let mut row = party_row(&person.party(), &person).unwrap();
        assert_eq!(row.party_type, "person");
        row.name = "Jane Smith".to_string();

        let restored = row_to_person(row).unwrap();
        assert_eq!(restored.id, person.id);
        assert_eq!(restored.name, "Jane Smith");
        assert_eq!(restored.gender.as_deref(), Some("female"));
    }

    #[test]
    fn test_mandate_rows_use_join_table_on_read() {
        let first = PartyId::new();
        let second = PartyId::new();
        let mut mandate = Mandate::new(TenantId::DEFAULT, "power_of_attorney");
        mandate.add_mandatary(Mandatary::new(first, "attorney"));
        mandate.add_mandatary(Mandatary::new(second, "attorney"));

        let (row, mandataries) = mandate_rows(&mandate).unwrap();
        assert_eq!(mandataries.len(), 2);

        let restored = row_to_mandate(row, vec![Mandatary::new(first, "attorney")]).unwrap();
        assert_eq!(restored.mandataries.len(), 1);
        assert!(!restored.has_mandatary(second));
    }

    #[test]
    fn test_invalid_header_type_is_internal_error() {
        let row = PartyHeaderRow {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            party_type: "robot".to_string(),
            name: "R2".to_string(),
            created: Utc::now(),
            updated: None,
        };
        assert!(matches!(header_to_party(row), Err(PortError::Internal { .. })));
    }
}
