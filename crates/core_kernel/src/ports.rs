//! Port plumbing shared by the party stores
//!
//! The domain crate builds `PartyPort` and `ReferenceDataPort` on the marker
//! and health traits defined here. Every store, whether PostgreSQL or the
//! in-memory one used by tests, reports failures as a [`PortError`].
//!
//! ```text
//!   PartyService / PartyReferenceService
//!                 |
//!      PartyPort / ReferenceDataPort      (domain_party)
//!          ^                   ^
//!   PostgreSQL adapter     in-memory adapter
//!     (infra_db)           (tests, `mock`)
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

/// Failure reported by a store
#[derive(Debug, Error)]
pub enum PortError {
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// The store refused the data, optionally naming the offending field
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// A row with the same identity already exists
    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    #[error("Service unavailable: {service}")]
    ServiceUnavailable { service: String },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Validation failure attributed to `field`
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into() }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub fn service_unavailable(service: impl Into<String>) -> Self {
        Self::ServiceUnavailable { service: service.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Internal failure that keeps its cause reachable through `source()`
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether retrying the same call could succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Timeout { .. } | Self::ServiceUnavailable { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Marker for port traits; implementors must be shareable across tasks
pub trait DomainPort: Send + Sync + 'static {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    /// Answering, but slowly or partially
    Degraded,
    Unhealthy,
    Unknown,
}

impl AdapterHealth {
    /// Whether the adapter can still serve requests
    pub fn is_available(self) -> bool {
        matches!(self, Self::Healthy | Self::Degraded)
    }
}

/// Outcome of a single adapter probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub adapter_id: String,
    pub status: AdapterHealth,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl HealthCheckResult {
    pub fn healthy(adapter_id: impl Into<String>, latency_ms: u64) -> Self {
        Self::probe(adapter_id, AdapterHealth::Healthy, latency_ms, None)
    }

    pub fn unhealthy(adapter_id: impl Into<String>, latency_ms: u64, message: impl Into<String>) -> Self {
        Self::probe(adapter_id, AdapterHealth::Unhealthy, latency_ms, Some(message.into()))
    }

    /// Attaches a note to the result
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn probe(adapter_id: impl Into<String>, status: AdapterHealth, latency_ms: u64, message: Option<String>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_entity_and_id() {
        let error = PortError::not_found("Party", "PTY-1");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert_eq!(error.to_string(), "Not found: Party with id PTY-1");
    }

    #[test]
    fn test_transient_errors() {
        let timeout = PortError::Timeout {
            operation: "get_person".to_string(),
            duration_ms: 5000,
        };
        assert!(timeout.is_transient());
        assert!(PortError::connection("refused").is_transient());
        assert!(PortError::service_unavailable("postgres").is_transient());
        assert!(!PortError::validation("bad email").is_transient());
        assert!(!PortError::conflict("duplicate").is_transient());
    }

    #[test]
    fn test_validation_field_is_kept() {
        match PortError::validation_field("unknown party", "first_party_id") {
            PortError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("first_party_id")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_internal_with_source_keeps_cause() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let error = PortError::internal_with_source("write failed", io);
        assert!(error.source().is_some());
        assert!(PortError::internal("write failed").source().is_none());
    }

    #[test]
    fn test_health_constructors() {
        let up = HealthCheckResult::healthy("postgres-party-adapter", 3);
        assert_eq!(up.status, AdapterHealth::Healthy);
        assert!(up.status.is_available());
        assert!(up.message.is_none());

        let down = HealthCheckResult::unhealthy("postgres-party-adapter", 30, "refused");
        assert!(!down.status.is_available());
        assert_eq!(down.message.as_deref(), Some("refused"));

        assert!(AdapterHealth::Degraded.is_available());
        assert!(!AdapterHealth::Unknown.is_available());
    }

    #[test]
    fn test_health_serialization() {
        assert_eq!(serde_json::to_string(&AdapterHealth::Degraded).unwrap(), "\"degraded\"");

        let json = serde_json::to_value(HealthCheckResult::healthy("store", 1)).unwrap();
        assert_eq!(json["status"], "healthy");
        assert!(json.get("message").is_none());
    }
}
