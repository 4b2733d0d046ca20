//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use domain_party::{CodecError, PartyError, ValidationIssue};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        issues: Vec<ValidationIssue>,
    },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            issues: Vec::new(),
        }
    }
}

/// Error response body
///
/// Rendered as JSON here and kept in the response extensions so
/// [`error_format_middleware`](crate::middleware::error_format_middleware)
/// can re-encode it for clients that accept XML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationIssue>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_argument"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let (message, details) = match self {
            ApiError::NotFound(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Conflict(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::Internal(msg) => (msg, None),
            ApiError::BadRequest { message, issues } => {
                (message, if issues.is_empty() { None } else { Some(issues) })
            }
            ApiError::Unauthorized => ("Unauthorized".to_string(), None),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

impl From<PartyError> for ApiError {
    fn from(err: PartyError) -> Self {
        match err {
            PartyError::PartyNotFound(_)
            | PartyError::PersonNotFound(_)
            | PartyError::OrganizationNotFound(_)
            | PartyError::AssociationNotFound(_)
            | PartyError::MandateNotFound(_) => ApiError::NotFound(err.to_string()),
            PartyError::DuplicateParty(_) | PartyError::DuplicateAssociation(_) | PartyError::DuplicateMandate(_) => {
                ApiError::Conflict(err.to_string())
            }
            PartyError::InvalidArgument { name, issues } => ApiError::BadRequest {
                message: format!("Invalid argument ({})", name),
                issues,
            },
            PartyError::ServiceUnavailable { message, source } => {
                error!(error = %source, "{}", message);
                ApiError::ServiceUnavailable(message)
            }
        }
    }
}

impl From<CodecError> for ApiError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Json(_) | CodecError::XmlDecode(_) => {
                warn!(error = %err, "Failed to decode request body");
                ApiError::bad_request(format!("Malformed request body: {}", err))
            }
            CodecError::XmlEncode(_) => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::PortError;

    #[test]
    fn test_party_error_status_codes() {
        let cases = vec![
            (PartyError::PersonNotFound("PTY-1".into()), StatusCode::NOT_FOUND),
            (PartyError::DuplicateMandate("MDT-1".into()), StatusCode::CONFLICT),
            (PartyError::invalid_argument("person", "name is required"), StatusCode::BAD_REQUEST),
            (
                PartyError::service_unavailable("Failed to retrieve the person", PortError::connection("refused")),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).into_response().status(), status);
        }
    }

    #[test]
    fn test_invalid_argument_keeps_issues() {
        let error = ApiError::from(PartyError::invalid_argument("name", "must not be blank"));
        match error {
            ApiError::BadRequest { message, issues } => {
                assert_eq!(message, "Invalid argument (name)");
                assert_eq!(issues, vec![ValidationIssue::new("name", "must not be blank")]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_response_carries_body_for_renegotiation() {
        let response = ApiError::Conflict("Duplicate person".to_string()).into_response();
        let body = response.extensions().get::<ErrorResponse>().unwrap();
        assert_eq!(body.error, "conflict");
        assert_eq!(body.message, "Duplicate person");
    }
}
