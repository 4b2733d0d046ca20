//! PostgreSQL Reference Data Adapter
//!
//! Implements `ReferenceDataPort` over the `reference_codes` table and the
//! role type constraint tables. Rows whose enumerated columns cannot be
//! parsed are skipped with a warning rather than failing the whole list.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError, TenantId};
use domain_party::{
    ConstraintType, PartyType, ReferenceCode, ReferenceDataKind, ReferenceDataPort, RoleTypeAttributeTypeConstraint,
    RoleTypePreferenceTypeConstraint, ValueType,
};

use super::party::database_health_check;
use crate::repositories::reference::{
    AttributeConstraintRow, PreferenceConstraintRow, ReferenceCodeRow, ReferenceDataRepository,
};

#[derive(Debug, Clone)]
pub struct PostgresReferenceDataAdapter {
    repository: ReferenceDataRepository,
    pool: PgPool,
}

impl PostgresReferenceDataAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ReferenceDataRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn repository(&self) -> &ReferenceDataRepository {
        &self.repository
    }
}

impl DomainPort for PostgresReferenceDataAdapter {}

#[async_trait]
impl HealthCheckable for PostgresReferenceDataAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        database_health_check(&self.pool, "postgres-reference-data-adapter").await
    }
}

#[async_trait]
impl ReferenceDataPort for PostgresReferenceDataAdapter {
    #[instrument(skip(self), fields(kind = %kind))]
    async fn get_codes(&self, kind: ReferenceDataKind) -> Result<Vec<ReferenceCode>, PortError> {
        let rows = self.repository.get_codes(kind.slug()).await?;
        let codes: Vec<ReferenceCode> = rows.into_iter().map(|row| row_to_code(kind, row)).collect();
        debug!(count = codes.len(), "Loaded reference codes");
        Ok(codes)
    }

    #[instrument(skip(self))]
    async fn get_role_type_attribute_type_constraints(
        &self,
        role_type: Option<&str>,
    ) -> Result<Vec<RoleTypeAttributeTypeConstraint>, PortError> {
        let rows = self.repository.get_attribute_constraints(role_type).await?;
        Ok(rows.into_iter().filter_map(row_to_attribute_constraint).collect())
    }

    #[instrument(skip(self))]
    async fn get_role_type_preference_type_constraints(
        &self,
        role_type: Option<&str>,
    ) -> Result<Vec<RoleTypePreferenceTypeConstraint>, PortError> {
        let rows = self.repository.get_preference_constraints(role_type).await?;
        Ok(rows.into_iter().filter_map(row_to_preference_constraint).collect())
    }
}

fn row_to_code(kind: ReferenceDataKind, row: ReferenceCodeRow) -> ReferenceCode {
    let party_types = row
        .party_types
        .iter()
        .filter_map(|value| match PartyType::from_str(value) {
            Ok(party_type) => Some(party_type),
            Err(e) => {
                warn!(code = %row.code, error = %e, "Ignoring unknown party type on reference code");
                None
            }
        })
        .collect();

    let value_type = row.value_type.as_deref().and_then(|value| match ValueType::from_str(value) {
        Ok(value_type) => Some(value_type),
        Err(e) => {
            warn!(code = %row.code, error = %e, "Ignoring unknown value type on reference code");
            None
        }
    });

    ReferenceCode {
        kind,
        code: row.code,
        locale_id: row.locale_id,
        tenant_id: row.tenant_id.map(TenantId::from),
        sort_index: row.sort_index,
        name: row.name,
        description: row.description,
        parent_code: row.parent_code,
        party_types,
        value_type,
        pattern: row.pattern,
    }
}

/// Converts a domain code into a row, for seeding
pub fn code_to_row(code: &ReferenceCode) -> ReferenceCodeRow {
    ReferenceCodeRow {
        kind: code.kind.slug().to_string(),
        code: code.code.clone(),
        locale_id: code.locale_id.clone(),
        tenant_id: code.tenant_id.map(Into::into),
        sort_index: code.sort_index,
        name: code.name.clone(),
        description: code.description.clone(),
        parent_code: code.parent_code.clone(),
        party_types: code.party_types.iter().map(|t| t.code().to_string()).collect(),
        value_type: code.value_type.map(|v| v.code().to_string()),
        pattern: code.pattern.clone(),
    }
}

fn parse_constraint_type(role_type: &str, value: &str) -> Option<ConstraintType> {
    match ConstraintType::from_str(value) {
        Ok(constraint_type) => Some(constraint_type),
        Err(e) => {
            warn!(role_type, error = %e, "Ignoring role type constraint");
            None
        }
    }
}

fn row_to_attribute_constraint(row: AttributeConstraintRow) -> Option<RoleTypeAttributeTypeConstraint> {
    let constraint_type = parse_constraint_type(&row.role_type, &row.constraint_type)?;
    Some(RoleTypeAttributeTypeConstraint {
        role_type: row.role_type,
        attribute_type: row.attribute_type,
        constraint_type,
        value: row.value,
    })
}

fn row_to_preference_constraint(row: PreferenceConstraintRow) -> Option<RoleTypePreferenceTypeConstraint> {
    let constraint_type = parse_constraint_type(&row.role_type, &row.constraint_type)?;
    Some(RoleTypePreferenceTypeConstraint {
        role_type: row.role_type,
        preference_type: row.preference_type,
        constraint_type,
        value: row.value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_row_conversion() {
        let code = ReferenceCode::new(ReferenceDataKind::AttributeType, "height", "en-US", "Height")
            .with_party_types(&[PartyType::Person])
            .with_value_type(ValueType::Decimal)
            .with_tenant(TenantId::DEFAULT);

        let row = code_to_row(&code);
        assert_eq!(row.kind, "attribute-type");
        assert_eq!(row.party_types, vec!["person".to_string()]);
        assert_eq!(row.value_type.as_deref(), Some("decimal"));

        assert_eq!(row_to_code(ReferenceDataKind::AttributeType, row), code);
    }

    #[test]
    fn test_unknown_enumerations_are_dropped() {
        let mut row = code_to_row(&ReferenceCode::new(ReferenceDataKind::Gender, "female", "en-US", "Female"));
        row.party_types = vec!["robot".to_string(), "person".to_string()];
        row.value_type = Some("complex".to_string());

        let code = row_to_code(ReferenceDataKind::Gender, row);
        assert_eq!(code.party_types, vec![PartyType::Person]);
        assert_eq!(code.value_type, None);
    }

    #[test]
    fn test_constraint_rows() {
        let row = AttributeConstraintRow {
            role_type: "employer".into(),
            attribute_type: "employee_count".into(),
            constraint_type: "REQUIRED".into(),
            value: None,
        };
        let constraint = row_to_attribute_constraint(row).unwrap();
        assert_eq!(constraint.constraint_type, ConstraintType::Required);

        let row = PreferenceConstraintRow {
            role_type: "customer".into(),
            preference_type: "correspondence_language".into(),
            constraint_type: "sometimes".into(),
            value: None,
        };
        assert!(row_to_preference_constraint(row).is_none());
    }
}
