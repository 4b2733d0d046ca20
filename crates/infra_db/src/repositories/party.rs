//! Party repository implementation
//!
//! Persons and organizations are stored as JSON documents in the `parties`
//! table, next to the columns needed for scoping, listing and sorting
//! (`tenant_id`, `type`, `name`). Associations and mandates follow the same
//! layout. Mandataries are kept in `mandate_mandataries` so that deleting a
//! party cascades to the mandates that name it.
//!
//! Every query is scoped by tenant.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use tracing::debug;

use domain_party::{PageRequest, SortDirection};

use crate::error::DatabaseError;

fn order(request: &PageRequest) -> &'static str {
    match request.sort_direction {
        SortDirection::Ascending => "ASC",
        SortDirection::Descending => "DESC",
    }
}

fn limit_offset(request: &PageRequest) -> (i64, i64) {
    let request = request.normalized();
    (
        i64::from(request.page_size),
        i64::try_from(request.offset()).unwrap_or(i64::MAX),
    )
}

/// Repository for parties, associations and mandates
#[derive(Debug, Clone)]
pub struct PartyRepository {
    pool: PgPool,
}

impl PartyRepository {
    /// Creates a new PartyRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------
    // Parties
    // ------------------------------------------------------------------

    /// Returns true if the party exists for the tenant
    pub async fn exists(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM parties WHERE tenant_id = $1 AND id = $2)",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Retrieves the header columns of a party
    pub async fn get_header(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<PartyHeaderRow>, DatabaseError> {
        let row = sqlx::query_as::<_, PartyHeaderRow>(
            r#"
            SELECT id, tenant_id, type, name, created, updated
            FROM parties
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Retrieves a party of the given type
    pub async fn get(&self, tenant_id: Uuid, id: Uuid, party_type: &str) -> Result<Option<PartyRow>, DatabaseError> {
        let row = sqlx::query_as::<_, PartyRow>(
            r#"
            SELECT id, tenant_id, type, name, created, updated, data
            FROM parties
            WHERE tenant_id = $1 AND id = $2 AND type = $3
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(party_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Lists party headers, optionally restricted to one type
    ///
    /// # Returns
    ///
    /// The rows for the requested page and the total number of matches
    pub async fn list_headers(
        &self,
        tenant_id: Uuid,
        request: &PageRequest,
    ) -> Result<(Vec<PartyHeaderRow>, i64), DatabaseError> {
        let (limit, offset) = limit_offset(request);
        let sql = format!(
            r#"
            SELECT id, tenant_id, type, name, created, updated
            FROM parties
            WHERE tenant_id = $1
              AND ($2::VARCHAR IS NULL OR strpos(lower(name), lower($2)) > 0)
            ORDER BY lower(name) {}
            LIMIT $3 OFFSET $4
            "#,
            order(request)
        );

        let rows = sqlx::query_as::<_, PartyHeaderRow>(&sql)
            .bind(tenant_id)
            .bind(request.filter.as_deref())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total = self.count(tenant_id, None, request).await?;
        Ok((rows, total))
    }

    /// Lists full party rows of one type
    pub async fn list(
        &self,
        tenant_id: Uuid,
        party_type: &str,
        request: &PageRequest,
    ) -> Result<(Vec<PartyRow>, i64), DatabaseError> {
        let (limit, offset) = limit_offset(request);
        let sql = format!(
            r#"
            SELECT id, tenant_id, type, name, created, updated, data
            FROM parties
            WHERE tenant_id = $1
              AND type = $2
              AND ($3::VARCHAR IS NULL OR strpos(lower(name), lower($3)) > 0)
            ORDER BY lower(name) {}
            LIMIT $4 OFFSET $5
            "#,
            order(request)
        );

        let rows = sqlx::query_as::<_, PartyRow>(&sql)
            .bind(tenant_id)
            .bind(party_type)
            .bind(request.filter.as_deref())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total = self.count(tenant_id, Some(party_type), request).await?;
        Ok((rows, total))
    }

    async fn count(
        &self,
        tenant_id: Uuid,
        party_type: Option<&str>,
        request: &PageRequest,
    ) -> Result<i64, DatabaseError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM parties
            WHERE tenant_id = $1
              AND ($2::VARCHAR IS NULL OR type = $2)
              AND ($3::VARCHAR IS NULL OR strpos(lower(name), lower($3)) > 0)
            "#,
        )
        .bind(tenant_id)
        .bind(party_type)
        .bind(request.filter.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Inserts a new party
    ///
    /// # Errors
    ///
    /// Returns a unique `DatabaseError::Integrity` if the id is taken
    pub async fn insert(&self, row: &PartyRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO parties (id, tenant_id, type, name, created, updated, data)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(row.id)
        .bind(row.tenant_id)
        .bind(&row.party_type)
        .bind(&row.name)
        .bind(row.created)
        .bind(row.updated)
        .bind(&row.data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replaces a party's name and document
    ///
    /// # Returns
    ///
    /// The original creation timestamp, or `None` if no party of that type
    /// exists for the tenant
    pub async fn update(&self, row: &PartyRow) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        let created = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            UPDATE parties
            SET name = $4, updated = $5, data = $6
            WHERE tenant_id = $1 AND id = $2 AND type = $3
            RETURNING created
            "#,
        )
        .bind(row.tenant_id)
        .bind(row.id)
        .bind(&row.party_type)
        .bind(&row.name)
        .bind(row.updated)
        .bind(&row.data)
        .fetch_optional(&self.pool)
        .await?;

        Ok(created)
    }

    /// Deletes a party and, through the foreign keys, its associations and
    /// mandatary entries
    ///
    /// Mandates left without any mandatary are deleted in the same
    /// transaction.
    ///
    /// # Returns
    ///
    /// True if a party was deleted
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid, party_type: &str) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let mandate_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT DISTINCT mandate_id FROM mandate_mandataries WHERE party_id = $1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM parties WHERE tenant_id = $1 AND id = $2 AND type = $3")
            .bind(tenant_id)
            .bind(id)
            .bind(party_type)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        if !mandate_ids.is_empty() {
            let orphaned = sqlx::query(
                r#"
                DELETE FROM mandates m
                WHERE m.id = ANY($1)
                  AND NOT EXISTS (SELECT 1 FROM mandate_mandataries mm WHERE mm.mandate_id = m.id)
                "#,
            )
            .bind(&mandate_ids)
            .execute(&mut *tx)
            .await?;
            debug!(mandates = orphaned.rows_affected(), "Deleted mandates left without mandataries");
        }

        tx.commit().await?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Associations
    // ------------------------------------------------------------------

    pub async fn get_association(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<AssociationRow>, DatabaseError> {
        let row = sqlx::query_as::<_, AssociationRow>(
            r#"
            SELECT id, tenant_id, type, first_party_id, second_party_id, created, updated, data
            FROM associations
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Lists the associations where the party is on either side, ordered by type
    pub async fn list_associations_for_party(
        &self,
        tenant_id: Uuid,
        party_id: Uuid,
        request: &PageRequest,
    ) -> Result<(Vec<AssociationRow>, i64), DatabaseError> {
        let (limit, offset) = limit_offset(request);
        let sql = format!(
            r#"
            SELECT id, tenant_id, type, first_party_id, second_party_id, created, updated, data
            FROM associations
            WHERE tenant_id = $1
              AND (first_party_id = $2 OR second_party_id = $2)
              AND ($3::VARCHAR IS NULL OR strpos(lower(type), lower($3)) > 0)
            ORDER BY lower(type) {}, created
            LIMIT $4 OFFSET $5
            "#,
            order(request)
        );

        let rows = sqlx::query_as::<_, AssociationRow>(&sql)
            .bind(tenant_id)
            .bind(party_id)
            .bind(request.filter.as_deref())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM associations
            WHERE tenant_id = $1
              AND (first_party_id = $2 OR second_party_id = $2)
              AND ($3::VARCHAR IS NULL OR strpos(lower(type), lower($3)) > 0)
            "#,
        )
        .bind(tenant_id)
        .bind(party_id)
        .bind(request.filter.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok((rows, total))
    }

    pub async fn insert_association(&self, row: &AssociationRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO associations
                (id, tenant_id, type, first_party_id, second_party_id, created, updated, data)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(row.id)
        .bind(row.tenant_id)
        .bind(&row.association_type)
        .bind(row.first_party_id)
        .bind(row.second_party_id)
        .bind(row.created)
        .bind(row.updated)
        .bind(&row.data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replaces an association, returning its creation timestamp if it exists
    pub async fn update_association(&self, row: &AssociationRow) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        let created = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            UPDATE associations
            SET type = $3, first_party_id = $4, second_party_id = $5, updated = $6, data = $7
            WHERE tenant_id = $1 AND id = $2
            RETURNING created
            "#,
        )
        .bind(row.tenant_id)
        .bind(row.id)
        .bind(&row.association_type)
        .bind(row.first_party_id)
        .bind(row.second_party_id)
        .bind(row.updated)
        .bind(&row.data)
        .fetch_optional(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn delete_association(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM associations WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------
    // Mandates
    // ------------------------------------------------------------------

    pub async fn get_mandate(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<MandateRow>, DatabaseError> {
        let row = sqlx::query_as::<_, MandateRow>(
            r#"
            SELECT id, tenant_id, type, created, updated, data
            FROM mandates
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Retrieves the mandataries of the given mandates
    pub async fn get_mandataries(&self, mandate_ids: &[Uuid]) -> Result<Vec<MandataryRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, MandataryRow>(
            r#"
            SELECT mandate_id, party_id, role
            FROM mandate_mandataries
            WHERE mandate_id = ANY($1)
            ORDER BY mandate_id, role, party_id
            "#,
        )
        .bind(mandate_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Lists the mandates that name the party as a mandatary, ordered by type
    pub async fn list_mandates_for_party(
        &self,
        tenant_id: Uuid,
        party_id: Uuid,
        request: &PageRequest,
    ) -> Result<(Vec<MandateRow>, i64), DatabaseError> {
        let (limit, offset) = limit_offset(request);
        let sql = format!(
            r#"
            SELECT m.id, m.tenant_id, m.type, m.created, m.updated, m.data
            FROM mandates m
            WHERE m.tenant_id = $1
              AND EXISTS (
                  SELECT 1 FROM mandate_mandataries mm
                  WHERE mm.mandate_id = m.id AND mm.party_id = $2
              )
              AND ($3::VARCHAR IS NULL OR strpos(lower(m.type), lower($3)) > 0)
            ORDER BY lower(m.type) {}, m.created
            LIMIT $4 OFFSET $5
            "#,
            order(request)
        );

        let rows = sqlx::query_as::<_, MandateRow>(&sql)
            .bind(tenant_id)
            .bind(party_id)
            .bind(request.filter.as_deref())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM mandates m
            WHERE m.tenant_id = $1
              AND EXISTS (
                  SELECT 1 FROM mandate_mandataries mm
                  WHERE mm.mandate_id = m.id AND mm.party_id = $2
              )
              AND ($3::VARCHAR IS NULL OR strpos(lower(m.type), lower($3)) > 0)
            "#,
        )
        .bind(tenant_id)
        .bind(party_id)
        .bind(request.filter.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok((rows, total))
    }

    /// Inserts a mandate and its mandataries in one transaction
    pub async fn insert_mandate(&self, row: &MandateRow, mandataries: &[MandataryRow]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO mandates (id, tenant_id, type, created, updated, data)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(row.id)
        .bind(row.tenant_id)
        .bind(&row.mandate_type)
        .bind(row.created)
        .bind(row.updated)
        .bind(&row.data)
        .execute(&mut *tx)
        .await?;

        insert_mandataries(&mut tx, mandataries).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Replaces a mandate and its mandataries in one transaction
    ///
    /// # Returns
    ///
    /// The original creation timestamp, or `None` if the mandate does not exist
    pub async fn update_mandate(
        &self,
        row: &MandateRow,
        mandataries: &[MandataryRow],
    ) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            UPDATE mandates
            SET type = $3, updated = $4, data = $5
            WHERE tenant_id = $1 AND id = $2
            RETURNING created
            "#,
        )
        .bind(row.tenant_id)
        .bind(row.id)
        .bind(&row.mandate_type)
        .bind(row.updated)
        .bind(&row.data)
        .fetch_optional(&mut *tx)
        .await?;

        if created.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query("DELETE FROM mandate_mandataries WHERE mandate_id = $1")
            .bind(row.id)
            .execute(&mut *tx)
            .await?;
        insert_mandataries(&mut tx, mandataries).await?;

        tx.commit().await?;
        Ok(created)
    }

    pub async fn delete_mandate(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM mandates WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn insert_mandataries(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    mandataries: &[MandataryRow],
) -> Result<(), DatabaseError> {
    for mandatary in mandataries {
        sqlx::query("INSERT INTO mandate_mandataries (mandate_id, party_id, role) VALUES ($1, $2, $3)")
            .bind(mandatary.mandate_id)
            .bind(mandatary.party_id)
            .bind(&mandatary.role)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

// ============================================================================
// Row types
// ============================================================================

/// The header columns of a party
#[derive(Debug, Clone, FromRow)]
pub struct PartyHeaderRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    #[sqlx(rename = "type")]
    pub party_type: String,
    pub name: String,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

/// A party with its JSON document
#[derive(Debug, Clone, FromRow)]
pub struct PartyRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    #[sqlx(rename = "type")]
    pub party_type: String,
    pub name: String,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, FromRow)]
pub struct AssociationRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    #[sqlx(rename = "type")]
    pub association_type: String,
    pub first_party_id: Uuid,
    pub second_party_id: Uuid,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, FromRow)]
pub struct MandateRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    #[sqlx(rename = "type")]
    pub mandate_type: String,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct MandataryRow {
    pub mandate_id: Uuid,
    pub party_id: Uuid,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_offset_uses_normalized_page() {
        let request = PageRequest::first_page().page(3, 500);
        assert_eq!(limit_offset(&request), (100, 300));

        let request = PageRequest::first_page().page(2, 25);
        assert_eq!(limit_offset(&request), (25, 50));
    }

    #[test]
    fn test_order() {
        assert_eq!(order(&PageRequest::default()), "ASC");
        assert_eq!(order(&PageRequest::default().sorted(SortDirection::Descending)), "DESC");
    }
}
