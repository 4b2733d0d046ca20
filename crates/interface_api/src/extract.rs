//! Request extractors and content negotiation
//!
//! Bodies are read and written as JSON unless the `Content-Type` or `Accept`
//! header names XML.

use std::str::FromStr;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};

use core_kernel::TenantId;
use domain_party::{codec, Format};

use crate::error::ApiError;

/// Header carrying the tenant of the request
pub const TENANT_HEADER: &str = "X-Tenant-ID";

/// The tenant from the `X-Tenant-ID` header, or the default tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tenant(pub TenantId);

#[async_trait]
impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.headers.get(TENANT_HEADER) {
            None => Ok(Tenant(TenantId::DEFAULT)),
            Some(value) => value
                .to_str()
                .ok()
                .map(str::trim)
                .and_then(|value| TenantId::from_str(value).ok())
                .map(Tenant)
                .ok_or_else(|| ApiError::bad_request(format!("Invalid {} header", TENANT_HEADER))),
        }
    }
}

/// The response format preferred by the `Accept` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponseFormat(pub Format);

#[async_trait]
impl<S> FromRequestParts<S> for ResponseFormat
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ResponseFormat(media_type_format(parts.headers.get(header::ACCEPT))))
    }
}

impl ResponseFormat {
    pub fn ok<T: Serialize>(self, value: T) -> Negotiated<T> {
        Negotiated {
            status: StatusCode::OK,
            format: self.0,
            value,
        }
    }

    pub fn created<T: Serialize>(self, value: T) -> Negotiated<T> {
        Negotiated {
            status: StatusCode::CREATED,
            format: self.0,
            value,
        }
    }
}

/// A request body decoded from JSON or XML according to `Content-Type`
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let format = media_type_format(request.headers().get(header::CONTENT_TYPE));
        let body = String::from_request(request, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        Ok(Payload(codec::decode(&body, format)?))
    }
}

/// A response body encoded in the negotiated format
#[derive(Debug)]
pub struct Negotiated<T> {
    pub status: StatusCode,
    pub format: Format,
    pub value: T,
}

impl<T: Serialize> IntoResponse for Negotiated<T> {
    fn into_response(self) -> Response {
        match codec::encode(&self.value, self.format) {
            Ok(body) => (
                self.status,
                [(header::CONTENT_TYPE, HeaderValue::from_static(self.format.content_type()))],
                body,
            )
                .into_response(),
            Err(e) => ApiError::from(e).into_response(),
        }
    }
}

pub(crate) fn media_type_format(value: Option<&HeaderValue>) -> Format {
    value
        .and_then(|v| v.to_str().ok())
        .map(Format::from_media_type)
        .unwrap_or_default()
}

/// Parses an identifier from a path segment, with or without its prefix
pub fn parse_id<T: FromStr>(value: &str, name: &str) -> Result<T, ApiError> {
    T::from_str(value).map_err(|_| ApiError::bad_request(format!("Invalid {} ({})", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::PartyId;

    #[test]
    fn test_parse_id_accepts_prefixed_and_bare_values() {
        let id = PartyId::new();
        let bare = id.as_uuid().to_string();

        assert_eq!(parse_id::<PartyId>(&id.to_string(), "id").unwrap(), id);
        assert_eq!(parse_id::<PartyId>(&bare, "id").unwrap(), id);
        assert!(parse_id::<PartyId>("not-an-id", "id").is_err());
    }

    #[test]
    fn test_media_type_format() {
        let xml = HeaderValue::from_static("application/xml");
        assert_eq!(media_type_format(Some(&xml)), Format::Xml);
        assert_eq!(media_type_format(None), Format::Json);
    }
}
