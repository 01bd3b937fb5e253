//! PostgreSQL implementation for scope configuration storage

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::postgres::{PgArguments, PgConnection, PgPool, PgRow, Postgres};
use sqlx::Row;

use super::children::{self, placeholder};
use crate::admin::types::ScopeRecord;
use crate::errors::StorageError;
use crate::storage::child_rows::{
    SCOPE_CLAIMS, SCOPE_COLUMNS, SCOPE_SECRETS, insert_parent_sql, parse_column,
    select_parent_sql, update_parent_sql, write_error,
};
use crate::storage::traits::{ListQuery, Page, Result, ScopeListing, ScopeStore};

/// PostgreSQL implementation of scope storage
pub struct PostgresScopeStore {
    pool: PgPool,
}

impl PostgresScopeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T>
    where
        T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
    {
        row.try_get(name)
            .map_err(|e| StorageError::DatabaseError(format!("Failed to get {}: {}", name, e)))
    }

    fn row_to_scope(row: &PgRow) -> Result<ScopeRecord> {
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
        query: Query<'q, Postgres, PgArguments>,
        scope: &'q ScopeRecord,
    ) -> Query<'q, Postgres, PgArguments> {
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

    async fn sync_children(conn: &mut PgConnection, id: i64, scope: &ScopeRecord) -> Result<()> {
        children::sync(conn, &SCOPE_CLAIMS, id, &scope.scope_claims).await?;
        children::sync(conn, &SCOPE_SECRETS, id, &scope.scope_secrets).await?;
        Ok(())
    }
}

// lower() folds non-ASCII case under a UTF-8 database encoding
const FILTER: &str = "($1::TEXT IS NULL OR strpos(lower(name), lower($1)) > 0)";

#[async_trait]
impl ScopeStore for PostgresScopeStore {
    async fn get_scope(&self, id: i64) -> Result<Option<ScopeRecord>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let sql = format!("{} WHERE id = $1", select_parent_sql("scopes", SCOPE_COLUMNS));
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
        let filter = query.filter.as_deref();

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM scopes WHERE {}", FILTER))
            .bind(filter)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let rows = sqlx::query(&format!(
            "SELECT id, name, description FROM scopes WHERE {} ORDER BY name, id LIMIT $2 OFFSET $3",
            FILTER
        ))
        .bind(filter)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let items = rows
            .iter()
            .map(|row| {
                Ok(ScopeListing {
                    id: Self::column(row, "id")?,
                    name: Self::column(row, "name")?,
                    description: Self::column(row, "description")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

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

        let sql = format!(
            "{} RETURNING id",
            insert_parent_sql("scopes", SCOPE_COLUMNS, placeholder)
        );
        let row = Self::bind_scalars(sqlx::query(&sql), scope)
            .fetch_one(&mut *tx)
            .await
            .map_err(write_error)?;
        let id: i64 = Self::column(&row, "id")?;

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
        let result = sqlx::query("DELETE FROM scopes WHERE id = $1")
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
