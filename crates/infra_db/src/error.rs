//! Database errors and their translation into [`PortError`]
//!
//! PostgreSQL reports integrity failures by SQLSTATE and constraint name.
//! Both are kept so the adapters can tell a duplicate party from a
//! relationship that points at a missing one.

use thiserror::Error;

use core_kernel::PortError;

/// SQLSTATE codes from <https://www.postgresql.org/docs/current/errcodes-appendix.html>
mod sqlstate {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const CHECK_VIOLATION: &str = "23514";
    pub const NOT_NULL_VIOLATION: &str = "23502";
}

/// Which integrity rule a statement broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityRule {
    Unique,
    ForeignKey,
    Check,
    NotNull,
}

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Record not found")]
    RowNotFound,

    /// An integrity constraint rejected the statement
    #[error("{rule:?} violation on {}: {message}", .constraint.as_deref().unwrap_or("unnamed constraint"))]
    Integrity {
        rule: IntegrityRule,
        constraint: Option<String>,
        message: String,
    },

    #[error("Migration failed: {0}")]
    MigrationFailed(#[from] sqlx::migrate::MigrateError),

    #[error("SQL error: {0}")]
    Sql(#[source] sqlx::Error),
}

impl DatabaseError {
    pub fn is_integrity(&self, expected: IntegrityRule) -> bool {
        matches!(self, Self::Integrity { rule, .. } if *rule == expected)
    }

    /// The document field a relationship foreign key guards
    ///
    /// Names are the ones declared in the initial migration.
    fn referencing_field(constraint: &str) -> Option<&'static str> {
        match constraint {
            "associations_first_party_fk" => Some("first_party_id"),
            "associations_second_party_fk" => Some("second_party_id"),
            "mandate_mandataries_party_fk" => Some("mandataries"),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        let rule = match &error {
            sqlx::Error::RowNotFound => return Self::RowNotFound,
            sqlx::Error::PoolTimedOut => return Self::PoolExhausted,
            sqlx::Error::Io(e) => return Self::ConnectionFailed(e.to_string()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(sqlstate::UNIQUE_VIOLATION) => Some(IntegrityRule::Unique),
                Some(sqlstate::FOREIGN_KEY_VIOLATION) => Some(IntegrityRule::ForeignKey),
                Some(sqlstate::CHECK_VIOLATION) => Some(IntegrityRule::Check),
                Some(sqlstate::NOT_NULL_VIOLATION) => Some(IntegrityRule::NotNull),
                _ => None,
            },
            _ => None,
        };

        match (rule, error) {
            (Some(rule), sqlx::Error::Database(db_err)) => Self::Integrity {
                rule,
                constraint: db_err.constraint().map(str::to_string),
                message: db_err.message().to_string(),
            },
            (_, other) => Self::Sql(other),
        }
    }
}

/// Duplicates become conflicts, broken references and checks become
/// validation failures, pool and socket trouble stays transient
impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::RowNotFound => PortError::not_found("Record", "unknown"),
            DatabaseError::Integrity {
                rule: IntegrityRule::Unique,
                message,
                ..
            } => PortError::conflict(message),
            DatabaseError::Integrity {
                rule: IntegrityRule::ForeignKey,
                constraint,
                message,
            } => match constraint.as_deref().and_then(DatabaseError::referencing_field) {
                Some(field) => PortError::validation_field(message, field),
                None => PortError::validation(message),
            },
            DatabaseError::Integrity { message, .. } => PortError::validation(message),
            DatabaseError::ConnectionFailed(message) => PortError::connection(message),
            DatabaseError::PoolExhausted => PortError::service_unavailable("postgres"),
            other => PortError::internal_with_source("Database operation failed", other),
        }
    }
}
