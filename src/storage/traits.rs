//! Storage trait definitions for client and scope configuration.
//!
//! Each call is one self-contained unit of work: a backend acquires whatever
//! connection or lock it needs and releases it before returning.

use crate::admin::types::{ClientRecord, ScopeRecord};
use crate::errors::StorageError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, StorageError>;

/// One page of listing rows plus the size of the whole filtered set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub total: usize,
    pub items: Vec<T>,
}

/// Listing filter and window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Case-insensitive substring matched against the display name
    pub filter: Option<String>,
    pub start: usize,
    pub count: usize,
}

impl ListQuery {
    pub fn new(filter: Option<&str>, start: usize, count: usize) -> Self {
        let filter = filter
            .map(str::trim)
            .filter(|filter| !filter.is_empty())
            .map(str::to_string);
        Self {
            filter,
            start,
            count,
        }
    }

    /// True when `name` passes the filter
    pub fn matches(&self, name: &str) -> bool {
        match &self.filter {
            Some(filter) => name.to_lowercase().contains(&filter.to_lowercase()),
            None => true,
        }
    }

    /// `count` as a SQL `LIMIT`, saturating at `i64::MAX`
    pub fn limit(&self) -> i64 {
        i64::try_from(self.count).unwrap_or(i64::MAX)
    }

    /// `start` as a SQL `OFFSET`, saturating at `i64::MAX`
    pub fn offset(&self) -> i64 {
        i64::try_from(self.start).unwrap_or(i64::MAX)
    }

    /// Cuts this query's window out of the full, already ordered match list
    pub fn window<T>(&self, matched: Vec<T>) -> Page<T> {
        Page {
            total: matched.len(),
            items: matched
                .into_iter()
                .skip(self.start)
                .take(self.count)
                .collect(),
        }
    }
}

/// Client row as shown in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientListing {
    pub id: i64,
    pub client_id: String,
    pub client_name: String,
}

/// Scope row as shown in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeListing {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Trait for storing and retrieving client configuration
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Retrieve a client and all of its child rows
    async fn get_client(&self, id: i64) -> Result<Option<ClientRecord>>;

    /// List clients ordered by name, then id
    async fn query_clients(&self, query: &ListQuery) -> Result<Page<ClientListing>>;

    async fn count_clients(&self) -> Result<usize>;

    /// Insert a new client with its children and return the assigned id
    async fn insert_client(&self, client: &ClientRecord) -> Result<i64>;

    /// Persist scalars and synchronise child rows: rows with id 0 are
    /// inserted, known ids are updated, ids no longer present are deleted
    async fn update_client(&self, client: &ClientRecord) -> Result<()>;

    /// Delete a client and, by cascade, all of its children
    async fn delete_client(&self, id: i64) -> Result<()>;
}

/// Trait for storing and retrieving scope configuration
#[async_trait]
pub trait ScopeStore: Send + Sync {
    async fn get_scope(&self, id: i64) -> Result<Option<ScopeRecord>>;

    async fn query_scopes(&self, query: &ListQuery) -> Result<Page<ScopeListing>>;

    async fn count_scopes(&self) -> Result<usize>;

    async fn insert_scope(&self, scope: &ScopeRecord) -> Result<i64>;

    async fn update_scope(&self, scope: &ScopeRecord) -> Result<()>;

    async fn delete_scope(&self, id: i64) -> Result<()>;
}

/// Combined storage for everything the admin manager edits
pub trait AdminStorage: ClientStore + ScopeStore + Send + Sync {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_filter_is_no_filter() {
        assert_eq!(ListQuery::new(Some("   "), 0, 10).filter, None);
        assert_eq!(ListQuery::new(Some(" App "), 0, 10).filter.as_deref(), Some("App"));
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let query = ListQuery::new(Some("ONE"), 0, 10);
        assert!(query.matches("App One"));
        assert!(!query.matches("App Two"));
        assert!(ListQuery::default().matches("anything"));
    }

    #[test]
    fn test_oversized_window_saturates() {
        let query = ListQuery::new(None, usize::MAX, usize::MAX);
        assert_eq!(query.offset(), i64::MAX);
        assert_eq!(query.limit(), i64::MAX);
        assert!(query.window(vec![1, 2, 3]).items.is_empty());
        assert_eq!(query.window(vec![1, 2, 3]).total, 3);

        let query = ListQuery::new(None, 1, 1);
        assert_eq!(query.window(vec![1, 2, 3]).items, [2]);
    }
}
