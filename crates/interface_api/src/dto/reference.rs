//! Party reference data DTOs

use serde::{Deserialize, Serialize};

use domain_party::ReferenceCode;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceQuery {
    pub locale_id: Option<String>,
}

/// The codes of one list for a tenant and locale
#[derive(Debug, Serialize, Deserialize)]
pub struct ReferenceCodeList {
    pub kind: String,
    pub locale_id: String,
    #[serde(default)]
    pub codes: Vec<ReferenceCode>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidityResponse {
    pub kind: String,
    pub code: String,
    pub valid: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub status: String,
}
