//! SQLite storage implementations
//!
//! SQLite is suitable for single-instance deployments and development.
//! Child rows cascade on parent delete, which needs `foreign_keys` enabled on
//! every connection; [`connect`] takes care of that.

mod children;
mod clients;
mod scopes;

use crate::admin::types::{ClientRecord, ScopeRecord};
use crate::errors::StorageError;
use crate::storage::traits::*;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;

pub use clients::SqliteClientStore;
pub use scopes::SqliteScopeStore;

/// Open a pool for `database_url`, creating the database file if needed
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| StorageError::ConnectionFailed(format!("Invalid SQLite URL: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true);

    // An in-memory database exists per connection, so keep exactly one
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|e| StorageError::ConnectionFailed(format!("SQLite connection failed: {}", e)))
}

/// SQLite storage for clients and scopes
pub struct SqliteAdminStorage {
    pool: SqlitePool,
    client_store: Arc<SqliteClientStore>,
    scope_store: Arc<SqliteScopeStore>,
}

impl SqliteAdminStorage {
    pub fn new(pool: SqlitePool) -> Self {
        let client_store = Arc::new(SqliteClientStore::new(pool.clone()));
        let scope_store = Arc::new(SqliteScopeStore::new(pool.clone()));

        Self {
            pool,
            client_store,
            scope_store,
        }
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations/sqlite")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::DatabaseError(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl ClientStore for SqliteAdminStorage {
    async fn get_client(&self, id: i64) -> Result<Option<ClientRecord>> {
        self.client_store.get_client(id).await
    }

    async fn query_clients(&self, query: &ListQuery) -> Result<Page<ClientListing>> {
        self.client_store.query_clients(query).await
    }

    async fn count_clients(&self) -> Result<usize> {
        self.client_store.count_clients().await
    }

    async fn insert_client(&self, client: &ClientRecord) -> Result<i64> {
        self.client_store.insert_client(client).await
    }

    async fn update_client(&self, client: &ClientRecord) -> Result<()> {
        self.client_store.update_client(client).await
    }

    async fn delete_client(&self, id: i64) -> Result<()> {
        self.client_store.delete_client(id).await
    }
}

#[async_trait]
impl ScopeStore for SqliteAdminStorage {
    async fn get_scope(&self, id: i64) -> Result<Option<ScopeRecord>> {
        self.scope_store.get_scope(id).await
    }

    async fn query_scopes(&self, query: &ListQuery) -> Result<Page<ScopeListing>> {
        self.scope_store.query_scopes(query).await
    }

    async fn count_scopes(&self) -> Result<usize> {
        self.scope_store.count_scopes().await
    }

    async fn insert_scope(&self, scope: &ScopeRecord) -> Result<i64> {
        self.scope_store.insert_scope(scope).await
    }

    async fn update_scope(&self, scope: &ScopeRecord) -> Result<()> {
        self.scope_store.update_scope(scope).await
    }

    async fn delete_scope(&self, id: i64) -> Result<()> {
        self.scope_store.delete_scope(id).await
    }
}

impl AdminStorage for SqliteAdminStorage {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::types::{
        ClientRedirectUriRow, Flow, ScopeClaimRow, ScopeType, SecretRow, TokenUsage,
    };
    use chrono::DateTime;

    async fn storage() -> SqliteAdminStorage {
        let pool = connect("sqlite::memory:").await.unwrap();
        let storage = SqliteAdminStorage::new(pool);
        storage.migrate().await.unwrap();
        storage
    }

    fn client(client_id: &str, client_name: &str) -> ClientRecord {
        ClientRecord {
            client_id: client_id.to_string(),
            client_name: client_name.to_string(),
            enabled: true,
            flow: Flow::Hybrid,
            refresh_token_usage: TokenUsage::ReUse,
            access_token_lifetime: 3600,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_client_round_trip_with_children() {
        let storage = storage().await;
        let mut record = client("app1", "App One");
        record.client_uri = Some("https://app.example.com".to_string());
        record.redirect_uris.push(ClientRedirectUriRow {
            id: 0,
            uri: "https://app.example.com/cb".to_string(),
        });
        record.client_secrets.push(SecretRow {
            id: 0,
            secret_type: Some("SharedSecret".to_string()),
            value: "s3cret".to_string(),
            description: Some("primary".to_string()),
            expiration: Some(DateTime::parse_from_rfc3339("2030-01-01T10:00:00+05:30").unwrap()),
        });

        let id = storage.insert_client(&record).await.unwrap();
        let stored = storage.get_client(id).await.unwrap().unwrap();

        assert_eq!(stored.client_id, "app1");
        assert_eq!(stored.flow, Flow::Hybrid);
        assert_eq!(stored.refresh_token_usage, TokenUsage::ReUse);
        assert!(stored.enabled);
        assert!(!stored.require_consent);
        assert_eq!(stored.client_uri.as_deref(), Some("https://app.example.com"));
        assert_eq!(stored.redirect_uris.len(), 1);
        assert_ne!(stored.redirect_uris[0].id, 0);
        assert_eq!(
            stored.client_secrets[0].expiration.unwrap().to_rfc3339(),
            "2030-01-01T10:00:00+05:30"
        );
    }

    #[tokio::test]
    async fn test_update_synchronises_children() {
        let storage = storage().await;
        let mut record = client("app1", "App One");
        for uri in ["https://a.example.com/cb", "https://b.example.com/cb"] {
            record.redirect_uris.push(ClientRedirectUriRow {
                id: 0,
                uri: uri.to_string(),
            });
        }
        let id = storage.insert_client(&record).await.unwrap();

        let mut stored = storage.get_client(id).await.unwrap().unwrap();
        let kept = stored.redirect_uris[1].id;
        stored.redirect_uris.remove(0);
        stored.redirect_uris.push(ClientRedirectUriRow {
            id: 0,
            uri: "https://c.example.com/cb".to_string(),
        });
        stored.require_consent = true;
        storage.update_client(&stored).await.unwrap();

        let stored = storage.get_client(id).await.unwrap().unwrap();
        assert!(stored.require_consent);
        let uris: Vec<_> = stored.redirect_uris.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(uris, ["https://b.example.com/cb", "https://c.example.com/cb"]);
        assert_eq!(stored.redirect_uris[0].id, kept);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_children() {
        let storage = storage().await;
        let mut scope = ScopeRecord {
            name: "profile".to_string(),
            scope_type: ScopeType::Identity,
            ..Default::default()
        };
        scope.scope_claims.push(ScopeClaimRow {
            name: "name".to_string(),
            ..Default::default()
        });
        let id = storage.insert_scope(&scope).await.unwrap();
        storage.delete_scope(id).await.unwrap();

        assert!(storage.get_scope(id).await.unwrap().is_none());
        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scope_claims")
            .fetch_one(&storage.pool)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_duplicate_scope_name_is_reported() {
        let storage = storage().await;
        let scope = ScopeRecord {
            name: "api".to_string(),
            ..Default::default()
        };
        storage.insert_scope(&scope).await.unwrap();
        let result = storage.insert_scope(&scope).await;
        assert!(matches!(result, Err(StorageError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_query_filters_case_insensitively() {
        let storage = storage().await;
        for (client_id, name) in [("c", "Charlie"), ("a", "Alpha App"), ("b", "Bravo app")] {
            storage.insert_client(&client(client_id, name)).await.unwrap();
        }

        let page = storage
            .query_clients(&ListQuery::new(Some("APP"), 0, 10))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        let names: Vec<_> = page.items.iter().map(|c| c.client_name.as_str()).collect();
        assert_eq!(names, ["Alpha App", "Bravo app"]);

        let page = storage
            .query_clients(&ListQuery::new(None, 2, 10))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].client_name, "Charlie");
    }

    #[tokio::test]
    async fn test_oversized_window_returns_empty_page() {
        let storage = storage().await;
        storage.insert_client(&client("a", "Alpha")).await.unwrap();

        let page = storage
            .query_clients(&ListQuery::new(None, usize::MAX, usize::MAX))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert!(page.items.is_empty());

        let page = storage
            .query_clients(&ListQuery::new(None, 0, usize::MAX))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_filter_folds_non_ascii_case() {
        let storage = storage().await;
        for (client_id, name) in [("e", "École Portal"), ("z", "Zeta")] {
            storage.insert_client(&client(client_id, name)).await.unwrap();
        }
        storage
            .insert_scope(&ScopeRecord {
                name: "Éditeur".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let page = storage
            .query_clients(&ListQuery::new(Some("éCOLE"), 0, 10))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].client_name, "École Portal");

        let page = storage
            .query_scopes(&ListQuery::new(Some("édit"), 0, 10))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    }
}
