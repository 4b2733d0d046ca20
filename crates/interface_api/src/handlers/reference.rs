//! Party reference data handlers

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use tracing::info;

use domain_party::ReferenceDataKind;

use crate::auth::{permissions, require_role, Claims};
use crate::dto::reference::{ReferenceCodeList, ReferenceQuery, ReloadResponse, ValidityResponse};
use crate::error::ApiError;
use crate::extract::{Negotiated, ResponseFormat, Tenant};
use crate::AppState;

/// Lists the codes of a kind for the tenant and locale
///
/// `localeId` defaults to the configured default locale.
pub async fn get_codes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Path(kind): Path<String>,
    Query(query): Query<ReferenceQuery>,
) -> Result<Negotiated<ReferenceCodeList>, ApiError> {
    require_role(&claims, permissions::REFERENCE_READ)?;
    let kind = ReferenceDataKind::from_str(&kind)?;
    let locale_id = query
        .locale_id
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| state.reference.default_locale());

    let codes = state.reference.get_codes(kind, tenant, Some(&locale_id)).await?;

    Ok(format.ok(ReferenceCodeList {
        kind: kind.slug().to_string(),
        locale_id,
        codes,
    }))
}

/// Checks whether a code exists for the tenant in any locale
pub async fn is_valid(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Tenant(tenant): Tenant,
    format: ResponseFormat,
    Path((kind, code)): Path<(String, String)>,
) -> Result<Negotiated<ValidityResponse>, ApiError> {
    require_role(&claims, permissions::REFERENCE_READ)?;
    let kind = ReferenceDataKind::from_str(&kind)?;
    let valid = state.reference.is_valid(kind, tenant, &code).await?;

    Ok(format.ok(ValidityResponse {
        kind: kind.slug().to_string(),
        code,
        valid,
    }))
}

/// Drops every cached reference data list
pub async fn reload(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    format: ResponseFormat,
) -> Result<Negotiated<ReloadResponse>, ApiError> {
    require_role(&claims, permissions::REFERENCE_ADMIN)?;
    state.reference.reload();
    info!(user = %claims.sub, "Reloaded party reference data");

    Ok(format.ok(ReloadResponse {
        status: "reloaded".to_string(),
    }))
}
