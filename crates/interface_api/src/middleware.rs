//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};

use domain_party::{codec, Format};

use crate::auth::Claims;
use crate::error::{ApiError, ErrorResponse};
use crate::extract::{media_type_format, TENANT_HEADER};
use crate::AppState;

/// Header set by the request id layer
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Authentication middleware
///
/// Validates JWT bearer tokens and stores the claims in the request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        warn!("Missing or invalid Authorization header");
        return Err(ApiError::Unauthorized);
    };

    let claims = crate::auth::validate_token(token, &state.config.auth.jwt_secret).map_err(|e| {
        warn!(error = %e, "Rejected bearer token");
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Audit logging middleware
///
/// Records the caller, tenant, request id and outcome of every API request.
/// Server errors are logged at `warn`.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let user = request
        .extensions()
        .get::<Claims>()
        .map(|c| c.sub.clone())
        .unwrap_or_else(|| "anonymous".to_string());
    let tenant = header_value(&request, TENANT_HEADER).unwrap_or_else(|| "default".to_string());
    let request_id = header_value(&request, REQUEST_ID_HEADER).unwrap_or_default();

    let started = Instant::now();
    let response = next.run(request).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    if response.status().is_server_error() {
        warn!(%method, %path, %user, %tenant, %request_id, status, elapsed_ms, "Party API request failed");
    } else {
        info!(%method, %path, %user, %tenant, %request_id, status, elapsed_ms, "Party API request");
    }

    response
}

fn header_value(request: &Request<Body>, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}

/// Re-encodes error bodies as XML when the `Accept` header prefers it
///
/// Layered outside authentication so rejected tokens are covered too.
pub async fn error_format_middleware(request: Request<Body>, next: Next) -> Response {
    let format = media_type_format(request.headers().get(header::ACCEPT));
    let response = next.run(request).await;
    if format != Format::Xml {
        return response;
    }

    let Some(body) = response.extensions().get::<ErrorResponse>().cloned() else {
        return response;
    };
    let xml = match codec::to_xml(&body) {
        Ok(xml) => xml,
        Err(e) => {
            warn!(error = %e, "Failed to encode the error body as XML");
            return response;
        }
    };

    let (mut parts, _) = response.into_parts();
    parts
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(Format::Xml.content_type()));
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(xml))
}

