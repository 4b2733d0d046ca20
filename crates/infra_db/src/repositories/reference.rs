//! Reference data repository
//!
//! Code lists live in a single `reference_codes` table keyed by kind. Rows
//! with a NULL `tenant_id` are global.

use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::DatabaseError;

#[derive(Debug, Clone)]
pub struct ReferenceDataRepository {
    pool: PgPool,
}

impl ReferenceDataRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves every code of a kind, across tenants and locales
    pub async fn get_codes(&self, kind: &str) -> Result<Vec<ReferenceCodeRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ReferenceCodeRow>(
            r#"
            SELECT kind, code, locale_id, tenant_id, sort_index, name, description,
                   parent_code, party_types, value_type, pattern
            FROM reference_codes
            WHERE kind = $1
            ORDER BY locale_id, sort_index NULLS LAST, name
            "#,
        )
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Inserts or replaces a code
    pub async fn upsert_code(&self, row: &ReferenceCodeRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO reference_codes
                (kind, code, locale_id, tenant_id, sort_index, name, description,
                 parent_code, party_types, value_type, pattern)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (kind, code, lower(locale_id), COALESCE(tenant_id, '00000000-0000-0000-0000-000000000000'))
            DO UPDATE SET
                sort_index = EXCLUDED.sort_index,
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                parent_code = EXCLUDED.parent_code,
                party_types = EXCLUDED.party_types,
                value_type = EXCLUDED.value_type,
                pattern = EXCLUDED.pattern
            "#,
        )
        .bind(&row.kind)
        .bind(&row.code)
        .bind(&row.locale_id)
        .bind(row.tenant_id)
        .bind(row.sort_index)
        .bind(&row.name)
        .bind(&row.description)
        .bind(&row.parent_code)
        .bind(&row.party_types)
        .bind(&row.value_type)
        .bind(&row.pattern)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Retrieves attribute constraints, optionally for a single role type
    pub async fn get_attribute_constraints(
        &self,
        role_type: Option<&str>,
    ) -> Result<Vec<AttributeConstraintRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, AttributeConstraintRow>(
            r#"
            SELECT role_type, attribute_type, type, value
            FROM role_type_attribute_type_constraints
            WHERE $1::VARCHAR IS NULL OR role_type = $1
            ORDER BY role_type, attribute_type, type
            "#,
        )
        .bind(role_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Retrieves preference constraints, optionally for a single role type
    pub async fn get_preference_constraints(
        &self,
        role_type: Option<&str>,
    ) -> Result<Vec<PreferenceConstraintRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PreferenceConstraintRow>(
            r#"
            SELECT role_type, preference_type, type, value
            FROM role_type_preference_type_constraints
            WHERE $1::VARCHAR IS NULL OR role_type = $1
            ORDER BY role_type, preference_type, type
            "#,
        )
        .bind(role_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn insert_attribute_constraint(&self, row: &AttributeConstraintRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO role_type_attribute_type_constraints (role_type, attribute_type, type, value)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&row.role_type)
        .bind(&row.attribute_type)
        .bind(&row.constraint_type)
        .bind(&row.value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert_preference_constraint(&self, row: &PreferenceConstraintRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO role_type_preference_type_constraints (role_type, preference_type, type, value)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&row.role_type)
        .bind(&row.preference_type)
        .bind(&row.constraint_type)
        .bind(&row.value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ReferenceCodeRow {
    pub kind: String,
    pub code: String,
    pub locale_id: String,
    pub tenant_id: Option<Uuid>,
    pub sort_index: Option<i32>,
    pub name: String,
    pub description: String,
    pub parent_code: Option<String>,
    pub party_types: Vec<String>,
    pub value_type: Option<String>,
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AttributeConstraintRow {
    pub role_type: String,
    pub attribute_type: String,
    #[sqlx(rename = "type")]
    pub constraint_type: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PreferenceConstraintRow {
    pub role_type: String,
    pub preference_type: String,
    #[sqlx(rename = "type")]
    pub constraint_type: String,
    pub value: Option<String>,
}
