//! PostgreSQL storage implementations
//!
//! PostgreSQL is suitable for production deployments with several admin
//! instances sharing one database.

mod children;
mod clients;
mod scopes;

use crate::admin::types::{ClientRecord, ScopeRecord};
use crate::errors::StorageError;
use crate::storage::traits::*;
use async_trait::async_trait;
use sqlx::postgres::PgPool;
use std::sync::Arc;

pub use clients::PostgresClientStore;
pub use scopes::PostgresScopeStore;

/// PostgreSQL storage for clients and scopes
pub struct PostgresAdminStorage {
    pool: PgPool,
    client_store: Arc<PostgresClientStore>,
    scope_store: Arc<PostgresScopeStore>,
}

impl PostgresAdminStorage {
    pub fn new(pool: PgPool) -> Self {
        let client_store = Arc::new(PostgresClientStore::new(pool.clone()));
        let scope_store = Arc::new(PostgresScopeStore::new(pool.clone()));

        Self {
            pool,
            client_store,
            scope_store,
        }
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations/postgres")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::DatabaseError(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl ClientStore for PostgresAdminStorage {
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
impl ScopeStore for PostgresAdminStorage {
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

impl AdminStorage for PostgresAdminStorage {}
