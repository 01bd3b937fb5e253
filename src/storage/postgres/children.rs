//! PostgreSQL read and sync paths for child tables

use sqlx::query::Query;
use sqlx::postgres::{PgArguments, PgConnection, PgRow, Postgres};
use sqlx::Row;

use crate::errors::StorageError;
use crate::storage::child_rows::{
    ChildTable, ColumnKind, ColumnValue, ColumnValues, SqlChildRow, write_error,
};
use crate::storage::traits::Result;

pub(super) fn placeholder(index: usize) -> String {
    format!("${}", index)
}

pub(super) fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: ColumnValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        ColumnValue::Text(value) => query.bind(value),
        ColumnValue::OptionalText(value) => query.bind(value),
        ColumnValue::Flag(value) => query.bind(value),
    }
}

fn read_column(row: &PgRow, index: usize, name: &str, kind: ColumnKind) -> Result<ColumnValue> {
    let failed = |e: sqlx::Error| StorageError::DatabaseError(format!("Failed to get {}: {}", name, e));
    Ok(match kind {
        ColumnKind::Text => ColumnValue::Text(row.try_get(index).map_err(failed)?),
        ColumnKind::OptionalText => ColumnValue::OptionalText(row.try_get(index).map_err(failed)?),
        ColumnKind::Flag => ColumnValue::Flag(row.try_get(index).map_err(failed)?),
    })
}

/// Loads every row of `table` owned by `parent`, in id order
pub(super) async fn load<R: SqlChildRow>(
    conn: &mut PgConnection,
    table: &ChildTable,
    parent: i64,
) -> Result<Vec<R>> {
    let sql = table.select_sql(placeholder);
    let rows = sqlx::query(&sql)
        .bind(parent)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| StorageError::DatabaseError(format!("Failed to load {}: {}", table.table, e)))?;

    rows.iter()
        .map(|row| {
            let id: i64 = row
                .try_get(0)
                .map_err(|e| StorageError::DatabaseError(format!("Failed to get id: {}", e)))?;
            let values = table
                .columns
                .iter()
                .enumerate()
                .map(|(index, (name, kind))| read_column(row, index + 1, name, *kind))
                .collect::<Result<Vec<_>>>()?;
            R::from_values(id, ColumnValues::new(table.table, values))
        })
        .collect()
}

/// Makes the stored children of `parent` equal `rows`
pub(super) async fn sync<R: SqlChildRow>(
    conn: &mut PgConnection,
    table: &ChildTable,
    parent: i64,
    rows: &[R],
) -> Result<()> {
    let existing: Vec<i64> = sqlx::query_scalar::<_, i64>(&table.ids_sql(placeholder))
        .bind(parent)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| StorageError::DatabaseError(format!("Failed to load {}: {}", table.table, e)))?;

    let delete_sql = table.delete_sql(placeholder);
    for id in existing
        .iter()
        .filter(|id| !rows.iter().any(|row| row.id() == **id))
    {
        sqlx::query(&delete_sql)
            .bind(*id)
            .bind(parent)
            .execute(&mut *conn)
            .await
            .map_err(write_error)?;
    }

    let update_sql = table.update_sql(placeholder);
    let insert_sql = table.insert_sql(placeholder);
    for row in rows {
        if existing.contains(&row.id()) {
            let mut query = sqlx::query(&update_sql);
            for value in row.to_values() {
                query = bind_value(query, value);
            }
            query
                .bind(row.id())
                .bind(parent)
                .execute(&mut *conn)
                .await
                .map_err(write_error)?;
        } else {
            let mut query = sqlx::query(&insert_sql).bind(parent);
            for value in row.to_values() {
                query = bind_value(query, value);
            }
            query.execute(&mut *conn).await.map_err(write_error)?;
        }
    }

    Ok(())
}
