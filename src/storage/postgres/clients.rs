//! PostgreSQL implementation for client configuration storage

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::postgres::{PgArguments, PgConnection, PgPool, PgRow, Postgres};
use sqlx::Row;

use super::children::{self, placeholder};
use crate::admin::types::ClientRecord;
use crate::errors::StorageError;
use crate::storage::child_rows::{
    CLIENT_CLAIMS, CLIENT_COLUMNS, CLIENT_CORS_ORIGINS, CLIENT_CUSTOM_GRANT_TYPES,
    CLIENT_IDP_RESTRICTIONS, CLIENT_POST_LOGOUT_REDIRECT_URIS, CLIENT_REDIRECT_URIS,
    CLIENT_SCOPES, CLIENT_SECRETS, insert_parent_sql, parse_column, select_parent_sql,
    update_parent_sql, write_error,
};
use crate::storage::traits::{ClientListing, ClientStore, ListQuery, Page, Result};

/// PostgreSQL implementation of client storage
pub struct PostgresClientStore {
    pool: PgPool,
}

impl PostgresClientStore {
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

    /// Convert PostgreSQL row to a client record without children
    fn row_to_client(row: &PgRow) -> Result<ClientRecord> {
        let flow: String = Self::column(row, "flow")?;
        let refresh_token_usage: String = Self::column(row, "refresh_token_usage")?;
        let refresh_token_expiration: String = Self::column(row, "refresh_token_expiration")?;
        let access_token_type: String = Self::column(row, "access_token_type")?;

        Ok(ClientRecord {
            id: Self::column(row, "id")?,
            client_id: Self::column(row, "client_id")?,
            client_name: Self::column(row, "client_name")?,
            client_uri: Self::column(row, "client_uri")?,
            logo_uri: Self::column(row, "logo_uri")?,
            enabled: Self::column(row, "enabled")?,
            require_consent: Self::column(row, "require_consent")?,
            allow_remember_consent: Self::column(row, "allow_remember_consent")?,
            allow_access_tokens_via_browser: Self::column(row, "allow_access_tokens_via_browser")?,
            flow: parse_column("flow", &flow)?,
            allow_client_credentials_only: Self::column(row, "allow_client_credentials_only")?,
            logout_uri: Self::column(row, "logout_uri")?,
            logout_session_required: Self::column(row, "logout_session_required")?,
            require_sign_out_prompt: Self::column(row, "require_sign_out_prompt")?,
            allow_access_to_all_scopes: Self::column(row, "allow_access_to_all_scopes")?,
            identity_token_lifetime: Self::column(row, "identity_token_lifetime")?,
            access_token_lifetime: Self::column(row, "access_token_lifetime")?,
            authorization_code_lifetime: Self::column(row, "authorization_code_lifetime")?,
            absolute_refresh_token_lifetime: Self::column(row, "absolute_refresh_token_lifetime")?,
            sliding_refresh_token_lifetime: Self::column(row, "sliding_refresh_token_lifetime")?,
            refresh_token_usage: parse_column("refresh_token_usage", &refresh_token_usage)?,
            update_access_token_on_refresh: Self::column(row, "update_access_token_on_refresh")?,
            refresh_token_expiration: parse_column(
                "refresh_token_expiration",
                &refresh_token_expiration,
            )?,
            access_token_type: parse_column("access_token_type", &access_token_type)?,
            enable_local_login: Self::column(row, "enable_local_login")?,
            include_jwt_id: Self::column(row, "include_jwt_id")?,
            always_send_client_claims: Self::column(row, "always_send_client_claims")?,
            prefix_client_claims: Self::column(row, "prefix_client_claims")?,
            allow_access_to_all_grant_types: Self::column(row, "allow_access_to_all_grant_types")?,
            ..Default::default()
        })
    }

    /// Binds the scalar columns in `CLIENT_COLUMNS` order
    fn bind_scalars<'q>(
        query: Query<'q, Postgres, PgArguments>,
        client: &'q ClientRecord,
    ) -> Query<'q, Postgres, PgArguments> {
        query
            .bind(&client.client_id)
            .bind(&client.client_name)
            .bind(&client.client_uri)
            .bind(&client.logo_uri)
            .bind(client.enabled)
            .bind(client.require_consent)
            .bind(client.allow_remember_consent)
            .bind(client.allow_access_tokens_via_browser)
            .bind(client.flow.as_str())
            .bind(client.allow_client_credentials_only)
            .bind(&client.logout_uri)
            .bind(client.logout_session_required)
            .bind(client.require_sign_out_prompt)
            .bind(client.allow_access_to_all_scopes)
            .bind(client.identity_token_lifetime)
            .bind(client.access_token_lifetime)
            .bind(client.authorization_code_lifetime)
            .bind(client.absolute_refresh_token_lifetime)
            .bind(client.sliding_refresh_token_lifetime)
            .bind(client.refresh_token_usage.as_str())
            .bind(client.update_access_token_on_refresh)
            .bind(client.refresh_token_expiration.as_str())
            .bind(client.access_token_type.as_str())
            .bind(client.enable_local_login)
            .bind(client.include_jwt_id)
            .bind(client.always_send_client_claims)
            .bind(client.prefix_client_claims)
            .bind(client.allow_access_to_all_grant_types)
    }

    async fn load_children(conn: &mut PgConnection, client: &mut ClientRecord) -> Result<()> {
        let id = client.id;
        client.claims = children::load(conn, &CLIENT_CLAIMS, id).await?;
        client.client_secrets = children::load(conn, &CLIENT_SECRETS, id).await?;
        client.redirect_uris = children::load(conn, &CLIENT_REDIRECT_URIS, id).await?;
        client.post_logout_redirect_uris =
            children::load(conn, &CLIENT_POST_LOGOUT_REDIRECT_URIS, id).await?;
        client.allowed_cors_origins = children::load(conn, &CLIENT_CORS_ORIGINS, id).await?;
        client.allowed_custom_grant_types =
            children::load(conn, &CLIENT_CUSTOM_GRANT_TYPES, id).await?;
        client.allowed_scopes = children::load(conn, &CLIENT_SCOPES, id).await?;
        client.identity_provider_restrictions =
            children::load(conn, &CLIENT_IDP_RESTRICTIONS, id).await?;
        Ok(())
    }

    async fn sync_children(conn: &mut PgConnection, id: i64, client: &ClientRecord) -> Result<()> {
        children::sync(conn, &CLIENT_CLAIMS, id, &client.claims).await?;
        children::sync(conn, &CLIENT_SECRETS, id, &client.client_secrets).await?;
        children::sync(conn, &CLIENT_REDIRECT_URIS, id, &client.redirect_uris).await?;
        children::sync(
            conn,
            &CLIENT_POST_LOGOUT_REDIRECT_URIS,
            id,
            &client.post_logout_redirect_uris,
        )
        .await?;
        children::sync(conn, &CLIENT_CORS_ORIGINS, id, &client.allowed_cors_origins).await?;
        children::sync(
            conn,
            &CLIENT_CUSTOM_GRANT_TYPES,
            id,
            &client.allowed_custom_grant_types,
        )
        .await?;
        children::sync(conn, &CLIENT_SCOPES, id, &client.allowed_scopes).await?;
        children::sync(
            conn,
            &CLIENT_IDP_RESTRICTIONS,
            id,
            &client.identity_provider_restrictions,
        )
        .await?;
        Ok(())
    }
}

// lower() folds non-ASCII case under a UTF-8 database encoding
const FILTER: &str = "($1::TEXT IS NULL OR strpos(lower(client_name), lower($1)) > 0)";

#[async_trait]
impl ClientStore for PostgresClientStore {
    async fn get_client(&self, id: i64) -> Result<Option<ClientRecord>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let sql = format!("{} WHERE id = $1", select_parent_sql("clients", CLIENT_COLUMNS));
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => {
                let mut client = Self::row_to_client(&row)?;
                Self::load_children(&mut conn, &mut client).await?;
                Ok(Some(client))
            }
            None => Ok(None),
        }
    }

    async fn query_clients(&self, query: &ListQuery) -> Result<Page<ClientListing>> {
        let filter = query.filter.as_deref();

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM clients WHERE {}", FILTER))
            .bind(filter)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let rows = sqlx::query(&format!(
            "SELECT id, client_id, client_name FROM clients WHERE {} ORDER BY client_name, id LIMIT $2 OFFSET $3",
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
                Ok(ClientListing {
                    id: Self::column(row, "id")?,
                    client_id: Self::column(row, "client_id")?,
                    client_name: Self::column(row, "client_name")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            total: total as usize,
            items,
        })
    }

    async fn count_clients(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        Ok(count as usize)
    }

    async fn insert_client(&self, client: &ClientRecord) -> Result<i64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let sql = format!(
            "{} RETURNING id",
            insert_parent_sql("clients", CLIENT_COLUMNS, placeholder)
        );
        let row = Self::bind_scalars(sqlx::query(&sql), client)
            .fetch_one(&mut *tx)
            .await
            .map_err(write_error)?;
        let id: i64 = Self::column(&row, "id")?;

        Self::sync_children(&mut tx, id, client).await?;

        tx.commit()
            .await
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        Ok(id)
    }

    async fn update_client(&self, client: &ClientRecord) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let sql = update_parent_sql("clients", CLIENT_COLUMNS, placeholder);
        let result = Self::bind_scalars(sqlx::query(&sql), client)
            .bind(client.id)
            .execute(&mut *tx)
            .await
            .map_err(write_error)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("client {}", client.id)));
        }

        Self::sync_children(&mut tx, client.id, client).await?;

        tx.commit()
            .await
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    async fn delete_client(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("client {}", id)));
        }
        Ok(())
    }
}
