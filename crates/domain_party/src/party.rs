//! Party header and listing types
//!
//! Every party, whether a person or an organization, shares a common header
//! (`Party`) that carries its identity, owning tenant, type and display name.
//! Listings of parties, persons and organizations are returned as
//! [`PartyPage`]s built from a [`PageRequest`].
//!
//! # Child collections
//!
//! Persons and organizations own collections of child records (attributes,
//! roles, tax numbers, ...) where each record is unique per type code within
//! its parent. The `keyed_collection!` macro generates the add/remove/get
//! accessors that maintain that invariant: adding a record replaces any
//! existing record with the same key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{PartyId, TenantId};

use crate::error::PartyError;

/// Maximum number of items returned in a single page
pub const MAX_PAGE_SIZE: u32 = 100;

/// The type of a party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyType {
    /// A legal entity such as a company, trust or government body
    Organization,
    /// A natural person
    Person,
}

impl PartyType {
    /// Returns the code stored in the database and used by reference data
    pub fn code(&self) -> &'static str {
        match self {
            PartyType::Organization => "organization",
            PartyType::Person => "person",
        }
    }
}

impl fmt::Display for PartyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PartyType {
    type Err = PartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "organization" => Ok(PartyType::Organization),
            "person" => Ok(PartyType::Person),
            other => Err(PartyError::invalid_argument(
                "party_type",
                format!("unknown party type '{}'", other),
            )),
        }
    }
}

/// The common header of a person or organization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    /// Unique identifier
    pub id: PartyId,
    /// Tenant that owns the party
    pub tenant_id: TenantId,
    /// Whether this is a person or an organization
    pub party_type: PartyType,
    /// Display name
    pub name: String,
    /// When the party was created
    pub created: DateTime<Utc>,
    /// When the party was last updated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl PartialEq for Party {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Party {}

/// Sort direction for party listings, applied to the party name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortDirection {
    type Err = PartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(PartyError::invalid_argument(
                "sort_direction",
                format!("unknown sort direction '{}'", other),
            )),
        }
    }
}

/// Filter, sort and paging parameters for a listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Case-insensitive substring matched against the party name
    pub filter: Option<String>,
    pub sort_direction: SortDirection,
    /// Zero-based page index
    pub page_index: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Creates a request for the first page with the maximum page size
    pub fn first_page() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            ..Default::default()
        }
    }

    /// Sets the name filter, ignoring blank values
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        self.filter = if filter.trim().is_empty() {
            None
        } else {
            Some(filter.trim().to_string())
        };
        self
    }

    /// Sets the sort direction
    pub fn sorted(mut self, sort_direction: SortDirection) -> Self {
        self.sort_direction = sort_direction;
        self
    }

    /// Sets the page index and size
    pub fn page(mut self, page_index: u32, page_size: u32) -> Self {
        self.page_index = page_index;
        self.page_size = page_size;
        self
    }

    /// Returns a copy with the page size clamped to `1..=MAX_PAGE_SIZE`
    pub fn normalized(&self) -> Self {
        let mut normalized = self.clone();
        normalized.page_size = match self.page_size {
            0 => MAX_PAGE_SIZE,
            size => size.min(MAX_PAGE_SIZE),
        };
        normalized
    }

    /// Number of items to skip for this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page_index) * u64::from(self.page_size)
    }

    /// Returns true if the name matches the filter (or there is no filter)
    pub fn matches(&self, name: &str) -> bool {
        match &self.filter {
            Some(filter) => name.to_lowercase().contains(&filter.to_lowercase()),
            None => true,
        }
    }

    /// Applies filter, sort and paging to an in-memory list
    ///
    /// # Arguments
    ///
    /// * `items` - All candidate items
    /// * `name` - Accessor for the name used to filter and sort
    pub fn apply<T>(&self, items: Vec<T>, name: impl Fn(&T) -> &str) -> PartyPage<T> {
        let request = self.normalized();
        let mut matching: Vec<T> = items
            .into_iter()
            .filter(|item| request.matches(name(item)))
            .collect();

        matching.sort_by(|a, b| name(a).to_lowercase().cmp(&name(b).to_lowercase()));
        if request.sort_direction == SortDirection::Descending {
            matching.reverse();
        }

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.page_size as usize)
            .collect();

        PartyPage::new(items, total, &request)
    }
}

/// A single page of a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyPage<T> {
    /// The items on this page
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Total number of matching items across all pages
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub sort_direction: SortDirection,
    pub page_index: u32,
    pub page_size: u32,
}

impl<T> PartyPage<T> {
    /// Creates a page for the given request
    pub fn new(items: Vec<T>, total: u64, request: &PageRequest) -> Self {
        Self {
            items,
            total,
            filter: request.filter.clone(),
            sort_direction: request.sort_direction,
            page_index: request.page_index,
            page_size: request.page_size,
        }
    }

    /// Maps the items on this page, keeping the paging metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PartyPage<U> {
        PartyPage {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            filter: self.filter,
            sort_direction: self.sort_direction,
            page_index: self.page_index,
            page_size: self.page_size,
        }
    }
}

/// Generates add/remove/get accessors for a child collection keyed by a code
///
/// `add` replaces an existing child with the same key.
macro_rules! keyed_collection {
    ($owner:ty, $field:ident: $item:ty, key = $key:ident,
     add = $add:ident, remove = $remove:ident, get = $get:ident, has = $has:ident) => {
        impl $owner {
            #[doc = concat!("Adds to `", stringify!($field), "`, replacing any entry with the same `", stringify!($key), "`")]
            pub fn $add(&mut self, item: $item) {
                self.$field.retain(|existing| existing.$key != item.$key);
                self.$field.push(item);
            }

            #[doc = concat!("Removes the entry in `", stringify!($field), "` with the given `", stringify!($key), "`")]
            pub fn $remove(&mut self, key: &str) -> Option<$item> {
                let position = self.$field.iter().position(|existing| existing.$key == key)?;
                Some(self.$field.remove(position))
            }

            #[doc = concat!("Returns the entry in `", stringify!($field), "` with the given `", stringify!($key), "`")]
            pub fn $get(&self, key: &str) -> Option<&$item> {
                self.$field.iter().find(|existing| existing.$key == key)
            }

            #[doc = concat!("Returns true if `", stringify!($field), "` has an entry with the given `", stringify!($key), "`")]
            pub fn $has(&self, key: &str) -> bool {
                self.$get(key).is_some()
            }
        }
    };
}

/// Generates add/remove/get accessors for a child collection keyed by id
macro_rules! identified_collection {
    ($owner:ty, $field:ident: $item:ty, id = $id:ty,
     add = $add:ident, remove = $remove:ident, get = $get:ident) => {
        impl $owner {
            #[doc = concat!("Adds to `", stringify!($field), "`, replacing any entry with the same id")]
            pub fn $add(&mut self, item: $item) {
                self.$field.retain(|existing| existing.id != item.id);
                self.$field.push(item);
            }

            #[doc = concat!("Removes the entry in `", stringify!($field), "` with the given id")]
            pub fn $remove(&mut self, id: $id) -> Option<$item> {
                let position = self.$field.iter().position(|existing| existing.id == id)?;
                Some(self.$field.remove(position))
            }

            #[doc = concat!("Returns the entry in `", stringify!($field), "` with the given id")]
            pub fn $get(&self, id: $id) -> Option<&$item> {
                self.$field.iter().find(|existing| existing.id == id)
            }
        }
    };
}

pub(crate) use identified_collection;
pub(crate) use keyed_collection;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_type_codes() {
        assert_eq!(PartyType::Person.code(), "person");
        assert_eq!("Organization".parse::<PartyType>().unwrap(), PartyType::Organization);
        assert!("trust".parse::<PartyType>().is_err());
    }

    #[test]
    fn test_party_equality_is_by_id() {
        let id = PartyId::new();
        let a = Party {
            id,
            tenant_id: TenantId::DEFAULT,
            party_type: PartyType::Person,
            name: "Alice".to_string(),
            created: Utc::now(),
            updated: None,
        };
        let mut b = a.clone();
        b.name = "Someone Else".to_string();
        assert_eq!(a, b);
    }

    #[test]
    fn test_page_request_normalizes_size() {
        assert_eq!(PageRequest::default().normalized().page_size, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::default().page(0, 500).normalized().page_size, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::default().page(2, 10).normalized().offset(), 20);
    }

    #[test]
    fn test_page_request_apply() {
        let names = vec!["charlie", "Alpha", "bravo", "alphabet"];
        let request = PageRequest::first_page()
            .with_filter("ALPHA")
            .sorted(SortDirection::Descending);

        let page = request.apply(names, |n| n);
        assert_eq!(page.total, 2);
        assert_eq!(page.items, vec!["alphabet", "Alpha"]);
        assert_eq!(page.filter.as_deref(), Some("ALPHA"));
    }

    #[test]
    fn test_page_request_paging() {
        let names: Vec<String> = (0..25).map(|i| format!("party-{:02}", i)).collect();
        let page = PageRequest::default().page(2, 10).apply(names, |n| n.as_str());
        assert_eq!(page.total, 25);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0], "party-20");
    }

    #[test]
    fn test_blank_filter_is_ignored() {
        assert_eq!(PageRequest::default().with_filter("   ").filter, None);
    }
}
