//! Party DTOs

use std::str::FromStr;

use serde::Deserialize;

use domain_party::{PageRequest, SortDirection};

use crate::error::ApiError;

/// Query string of the listing endpoints
///
/// Missing or negative paging values fall back to the first page with the
/// maximum page size.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub filter: Option<String>,
    pub sort_direction: Option<String>,
    pub page_index: Option<i64>,
    pub page_size: Option<i64>,
}

impl ListQuery {
    pub fn into_page_request(self) -> Result<PageRequest, ApiError> {
        let sort_direction = match self.sort_direction.as_deref() {
            Some(value) if !value.trim().is_empty() => SortDirection::from_str(value.trim())?,
            _ => SortDirection::default(),
        };

        let page_index = clamp(self.page_index);
        let page_size = clamp(self.page_size);

        Ok(PageRequest::first_page()
            .with_filter(self.filter.unwrap_or_default())
            .sorted(sort_direction)
            .page(page_index, page_size)
            .normalized())
    }
}

fn clamp(value: Option<i64>) -> u32 {
    value
        .map(|v| u32::try_from(v.max(0)).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_party::MAX_PAGE_SIZE;

    #[test]
    fn test_defaults_to_first_full_page() {
        let request = ListQuery::default().into_page_request().unwrap();
        assert_eq!(request.page_index, 0);
        assert_eq!(request.page_size, MAX_PAGE_SIZE);
        assert_eq!(request.filter, None);
        assert_eq!(request.sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn test_negative_and_oversized_values() {
        let query = ListQuery {
            filter: Some("  smith ".into()),
            sort_direction: Some("desc".into()),
            page_index: Some(-3),
            page_size: Some(5000),
        };
        let request = query.into_page_request().unwrap();

        assert_eq!(request.page_index, 0);
        assert_eq!(request.page_size, MAX_PAGE_SIZE);
        assert_eq!(request.filter.as_deref(), Some("smith"));
        assert_eq!(request.sort_direction, SortDirection::Descending);
    }

    #[test]
    fn test_unknown_sort_direction_is_rejected() {
        let query = ListQuery {
            sort_direction: Some("sideways".into()),
            ..Default::default()
        };
        assert!(matches!(query.into_page_request(), Err(ApiError::BadRequest { .. })));
    }
}
