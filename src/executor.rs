//! Query execution — run one synthesized statement against the store and
//! normalize the result into columns + text-rendered rows.

use anyhow::Result;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{Column, Executor, Row, TypeInfo, ValueRef};

use crate::models::QueryOutput;

/// Execute a single statement and materialize all rows.
///
/// The connection is checked out of the pool for the duration of the
/// statement and returned on every exit path. Any store failure (syntax
/// error, unknown column, type mismatch) surfaces as an `Err` carrying the
/// underlying message; callers must not forward that message to end users.
pub async fn execute(pool: &SqlitePool, sql: &str) -> Result<QueryOutput> {
    let fetched = sqlx::query(sql).fetch_all(pool).await?;

    // Column names are visible on any row; for an empty result set they
    // come from preparing the statement instead.
    let columns: Vec<String> = match fetched.first() {
        Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
        None => pool
            .describe(sql)
            .await?
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect(),
    };

    let mut rows = Vec::with_capacity(fetched.len());
    for row in &fetched {
        let mut cells = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            cells.push(cell_to_text(row, idx)?);
        }
        rows.push(cells);
    }

    Ok(QueryOutput { columns, rows })
}

/// Render one cell as text, preserving NULL as `None`.
///
/// SQLite values are dynamically typed per cell, so the storage class is
/// inspected before decoding.
fn cell_to_text(row: &SqliteRow, idx: usize) -> Result<Option<String>> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(None);
    }
    let storage_class = raw.type_info().name().to_string();

    let text = match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => row.try_get::<i64, _>(idx)?.to_string(),
        "REAL" => row.try_get::<f64, _>(idx)?.to_string(),
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get(idx)?;
            format!("<{} bytes>", bytes.len())
        }
        _ => row.try_get::<String, _>(idx)?,
    };

    Ok(Some(text))
}
