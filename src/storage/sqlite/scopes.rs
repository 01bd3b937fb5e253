//! SQLite implementation for scope configuration storage

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnection, SqlitePool, SqliteRow};
use sqlx::Row;

use super::children::{self, placeholder};
use crate::admin::types::ScopeRecord;
use crate::errors::StorageError;
use crate::storage::child_rows::{
    SCOPE_CLAIMS, SCOPE_COLUMNS, SCOPE_SECRETS, insert_parent_sql, parse_column,
    select_parent_sql, update_parent_sql, write_error,
};
use crate::storage::traits::{ListQuery, Page, Result, ScopeListing, ScopeStore};

/// SQLite implementation of scope storage
pub struct SqliteScopeStore {
    pool: SqlitePool,
}

impl SqliteScopeStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T>
    where
        T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
    {
        row.try_get(name)
            .map_err(|e| StorageError::DatabaseError(format!("Failed to get {}: {}", name, e)))
    }

    fn listing(row: &SqliteRow) -> Result<ScopeListing> {
        Ok(ScopeListing {
            id: Self::column(row, "id")?,
            name: Self::column(row, "name")?,
            description: Self::column(row, "description")?,
        })
    }

    fn row_to_scope(row: &SqliteRow) -> Result<ScopeRecord> {
        let scope_type: String = Self::column(row, "scope_type")?;

        Ok(ScopeRecord {
            id: Self::column(row, "id")?,
            name: Self::column(row, "name")?,
            display_name: Self::column(row, "display_name")?,
            description: Self::column(row, "description")?,
            claims_rule: Self::column(row, "claims_rule")?,
            required: Self::column(row, "required")?,
            emphasize: Self::column(row, "emphasize")?,
            scope_type: parse_column("scope_type", &scope_type)?,
            include_all_claims_for_user: Self::column(row, "include_all_claims_for_user")?,
            show_in_discovery_document: Self::column(row, "show_in_discovery_document")?,
            enabled: Self::column(row, "enabled")?,
            allow_unrestricted_introspection: Self::column(row, "allow_unrestricted_introspection")?,
            scope_claims: Vec::new(),
            scope_secrets: Vec::new(),
        })
    }

    /// Binds the scalar columns in `SCOPE_COLUMNS` order
    fn bind_scalars<'q>(
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
        scope: &'q ScopeRecord,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        query
            .bind(&scope.name)
            .bind(&scope.display_name)
            .bind(&scope.description)
            .bind(&scope.claims_rule)
            .bind(scope.required)
            .bind(scope.emphasize)
            .bind(scope.scope_type.as_str())
            .bind(scope.include_all_claims_for_user)
            .bind(scope.show_in_discovery_document)
            .bind(scope.enabled)
            .bind(scope.allow_unrestricted_introspection)
    }

    async fn sync_children(conn: &mut SqliteConnection, id: i64, scope: &ScopeRecord) -> Result<()> {
        children::sync(conn, &SCOPE_CLAIMS, id, &scope.scope_claims).await?;
        children::sync(conn, &SCOPE_SECRETS, id, &scope.scope_secrets).await?;
        Ok(())
    }
}

#[async_trait]
impl ScopeStore for SqliteScopeStore {
    async fn get_scope(&self, id: i64) -> Result<Option<ScopeRecord>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let sql = format!("{} WHERE id = ?", select_parent_sql("scopes", SCOPE_COLUMNS));
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => {
                let mut scope = Self::row_to_scope(&row)?;
                scope.scope_claims = children::load(&mut conn, &SCOPE_CLAIMS, id).await?;
                scope.scope_secrets = children::load(&mut conn, &SCOPE_SECRETS, id).await?;
                Ok(Some(scope))
            }
            None => Ok(None),
        }
    }

    async fn query_scopes(&self, query: &ListQuery) -> Result<Page<ScopeListing>> {
        // lower() folds ASCII only; filtered listings are matched with ListQuery::matches
        if query.filter.is_some() {
            let rows = sqlx::query("SELECT id, name, description FROM scopes ORDER BY name, id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
            let mut matched = Vec::new();
            for row in &rows {
                let listing = Self::listing(row)?;
                if query.matches(&listing.name) {
                    matched.push(listing);
                }
            }
            return Ok(query.window(matched));
        }

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scopes")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let rows = sqlx::query("SELECT id, name, description FROM scopes ORDER BY name, id LIMIT ? OFFSET ?")
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let items = rows.iter().map(Self::listing).collect::<Result<Vec<_>>>()?;

        Ok(Page {
            total: total as usize,
            items,
        })
    }

    async fn count_scopes(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scopes")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        Ok(count as usize)
    }

    async fn insert_scope(&self, scope: &ScopeRecord) -> Result<i64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let sql = insert_parent_sql("scopes", SCOPE_COLUMNS, placeholder);
        let result = Self::bind_scalars(sqlx::query(&sql), scope)
            .execute(&mut *tx)
            .await
            .map_err(write_error)?;
        let id = result.last_insert_rowid();

        Self::sync_children(&mut tx, id, scope).await?;

        tx.commit()
            .await
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        Ok(id)
    }

    async fn update_scope(&self, scope: &ScopeRecord) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let sql = update_parent_sql("scopes", SCOPE_COLUMNS, placeholder);
        let result = Self::bind_scalars(sqlx::query(&sql), scope)
            .bind(scope.id)
            .execute(&mut *tx)
            .await
            .map_err(write_error)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("scope {}", scope.id)));
        }

        Self::sync_children(&mut tx, scope.id, scope).await?;

        tx.commit()
            .await
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    async fn delete_scope(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM scopes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("scope {}", id)));
        }
        Ok(())
    }
}
