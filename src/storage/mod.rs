//! Trait-based storage abstractions with in-memory, SQLite, and PostgreSQL backends.

pub mod inmemory;
pub mod traits;

#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub(crate) mod child_rows;

// Feature-gated storage implementations
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use inmemory::MemoryAdminStorage;
pub use traits::*;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteAdminStorage;

#[cfg(feature = "postgres")]
pub use postgres::PostgresAdminStorage;

use crate::errors::StorageError;
use std::sync::Arc;

/// Storage backend configuration and factory
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    #[cfg(feature = "sqlite")]
    Sqlite(String), // Connection string/path
    #[cfg(feature = "postgres")]
    Postgres(String), // Connection string
}

/// Create a storage backend based on configuration, running migrations for SQL backends
pub async fn create_storage_backend(
    backend: StorageBackend,
) -> std::result::Result<Arc<dyn AdminStorage>, StorageError> {
    match backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryAdminStorage::new())),
        #[cfg(feature = "sqlite")]
        StorageBackend::Sqlite(database_url) => {
            let pool = sqlite::connect(&database_url).await?;
            let storage = SqliteAdminStorage::new(pool);

            // Run migrations
            storage.migrate().await?;

            Ok(Arc::new(storage))
        }
        #[cfg(feature = "postgres")]
        StorageBackend::Postgres(database_url) => {
            let pool = sqlx::postgres::PgPool::connect(&database_url)
                .await
                .map_err(|e| {
                    StorageError::ConnectionFailed(format!("PostgreSQL connection failed: {}", e))
                })?;

            let storage = PostgresAdminStorage::new(pool);

            // Run migrations
            storage.migrate().await?;

            Ok(Arc::new(storage))
        }
    }
}

/// Parse storage backend from configuration string
pub fn parse_storage_backend(
    backend_name: &str,
    database_url: Option<&str>,
) -> std::result::Result<StorageBackend, StorageError> {
    match backend_name {
        "memory" => Ok(StorageBackend::Memory),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let url = database_url.unwrap_or("sqlite:idadmin.db");
            Ok(StorageBackend::Sqlite(url.to_string()))
        }
        #[cfg(feature = "postgres")]
        "postgres" => {
            let url = database_url.ok_or_else(|| {
                StorageError::InvalidData("DATABASE_URL required for postgres backend".to_string())
            })?;
            Ok(StorageBackend::Postgres(url.to_string()))
        }
        _ => Err(StorageError::InvalidData(format!(
            "Unknown storage backend: {}",
            backend_name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_memory_backend() {
        assert_eq!(
            parse_storage_backend("memory", None).unwrap(),
            StorageBackend::Memory
        );
    }

    #[test]
    fn test_parse_unknown_backend() {
        let err = parse_storage_backend("redis", None).unwrap_err();
        assert!(err.to_string().contains("Unknown storage backend: redis"));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_parse_sqlite_defaults_database_file() {
        assert_eq!(
            parse_storage_backend("sqlite", None).unwrap(),
            StorageBackend::Sqlite("sqlite:idadmin.db".to_string())
        );
    }

    #[tokio::test]
    async fn test_create_memory_backend_starts_empty() {
        let storage = create_storage_backend(StorageBackend::Memory).await.unwrap();
        assert_eq!(storage.count_clients().await.unwrap(), 0);
        assert_eq!(storage.count_scopes().await.unwrap(), 0);
    }
}
