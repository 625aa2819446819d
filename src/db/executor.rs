//! Statement execution primitives.
//!
//! Two generic operations cover everything the entity layer needs:
//! [`Db::query`] for reads and [`Db::execute`] for writes. Both acquire a
//! connection from the pool for the duration of exactly one statement; sqlx
//! returns the connection on every exit path, including errors.
//!
//! Arguments are bound strictly positionally, in order, to the `?`
//! placeholders in the statement. Both supported drivers use `?` as their
//! native positional marker, so the portable placeholder maps one-to-one.

use crate::db::pool::{Db, DbPool};
use crate::db::row::{RowMap, RowToMap};
use crate::error::{OrmError, OrmResult};
use futures_util::StreamExt;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

/// A positional bind argument, bridged from the entity layer's JSON values
/// to whatever the driver expects.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl SqlParam {
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => SqlParam::Null,
            JsonValue::Bool(v) => SqlParam::Bool(*v),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlParam::Int(i)
                } else if let Some(f) = n.as_f64() {
                    SqlParam::Float(f)
                } else {
                    // u64 above i64::MAX; keep the digits
                    SqlParam::String(n.to_string())
                }
            }
            JsonValue::String(s) => SqlParam::String(s.clone()),
            // structured values are stored as their JSON text
            other => SqlParam::String(other.to_string()),
        }
    }
}

impl Db {
    /// Run a read statement and return its rows as column-name maps, in the
    /// order the database produced them. When `limit` is given, at most that
    /// many rows are fetched from the stream.
    pub async fn query(
        &self,
        sql: &str,
        args: &[JsonValue],
        limit: Option<usize>,
    ) -> OrmResult<Vec<RowMap>> {
        let params: Vec<SqlParam> = args.iter().map(SqlParam::from_json).collect();
        debug!(sql = %sql, args = params.len(), "SQL");

        let rows = match self.pool() {
            DbPool::MySql(pool) => mysql::fetch_rows(pool, sql, &params, limit).await?,
            DbPool::Sqlite(pool) => sqlite::fetch_rows(pool, sql, &params, limit).await?,
        };

        info!(rows = rows.len(), "rows returned");
        Ok(rows)
    }

    /// Run a mutating statement (insert, update, delete) and return the
    /// affected-row count. Driver errors propagate unchanged.
    pub async fn execute(&self, sql: &str, args: &[JsonValue]) -> OrmResult<u64> {
        let params: Vec<SqlParam> = args.iter().map(SqlParam::from_json).collect();
        debug!(sql = %sql, args = params.len(), "SQL");

        let affected = match self.pool() {
            DbPool::MySql(pool) => mysql::execute_write(pool, sql, &params).await?,
            DbPool::Sqlite(pool) => sqlite::execute_write(pool, sql, &params).await?,
        };
        Ok(affected)
    }
}

fn collect_rows<R>(results: Vec<Result<R, sqlx::Error>>) -> OrmResult<Vec<R>> {
    let mut rows = Vec::with_capacity(results.len());
    for result in results {
        rows.push(result.map_err(OrmError::from)?);
    }
    Ok(rows)
}

// =============================================================================
// Driver-Specific Implementations
// =============================================================================
//
// Each module below provides the same interface adapted to its driver. The
// code structure is intentionally parallel to make differences obvious.

mod mysql {
    use super::*;
    use sqlx::MySqlPool;
    use sqlx::mysql::MySqlArguments;

    pub async fn fetch_rows(
        pool: &MySqlPool,
        sql: &str,
        params: &[SqlParam],
        limit: Option<usize>,
    ) -> OrmResult<Vec<RowMap>> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_param(query, param);
        }

        let rows = match limit {
            Some(size) => {
                let results = query.fetch(pool).take(size).collect::<Vec<_>>().await;
                collect_rows(results)?
            }
            None => query.fetch_all(pool).await.map_err(OrmError::from)?,
        };
        Ok(rows.iter().map(RowToMap::to_row_map).collect())
    }

    pub async fn execute_write(
        pool: &MySqlPool,
        sql: &str,
        params: &[SqlParam],
    ) -> OrmResult<u64> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_param(query, param);
        }
        let result = query.execute(pool).await.map_err(OrmError::from)?;
        Ok(result.rows_affected())
    }

    fn bind_param<'q>(
        query: sqlx::query::Query<'q, sqlx::MySql, MySqlArguments>,
        param: &'q SqlParam,
    ) -> sqlx::query::Query<'q, sqlx::MySql, MySqlArguments> {
        match param {
            SqlParam::Null => query.bind(None::<String>),
            SqlParam::Bool(v) => query.bind(*v),
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Float(v) => query.bind(*v),
            SqlParam::String(v) => query.bind(v.as_str()),
        }
    }
}

mod sqlite {
    use super::*;
    use sqlx::SqlitePool;
    use sqlx::sqlite::SqliteArguments;

    pub async fn fetch_rows(
        pool: &SqlitePool,
        sql: &str,
        params: &[SqlParam],
        limit: Option<usize>,
    ) -> OrmResult<Vec<RowMap>> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_param(query, param);
        }

        let rows = match limit {
            Some(size) => {
                let results = query.fetch(pool).take(size).collect::<Vec<_>>().await;
                collect_rows(results)?
            }
            None => query.fetch_all(pool).await.map_err(OrmError::from)?,
        };
        Ok(rows.iter().map(RowToMap::to_row_map).collect())
    }

    pub async fn execute_write(
        pool: &SqlitePool,
        sql: &str,
        params: &[SqlParam],
    ) -> OrmResult<u64> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_param(query, param);
        }
        let result = query.execute(pool).await.map_err(OrmError::from)?;
        Ok(result.rows_affected())
    }

    fn bind_param<'q>(
        query: sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>,
        param: &'q SqlParam,
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>> {
        match param {
            SqlParam::Null => query.bind(None::<String>),
            SqlParam::Bool(v) => query.bind(*v),
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Float(v) => query.bind(*v),
            SqlParam::String(v) => query.bind(v.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_from_json_scalars() {
        assert_eq!(SqlParam::from_json(&JsonValue::Null), SqlParam::Null);
        assert_eq!(SqlParam::from_json(&json!(true)), SqlParam::Bool(true));
        assert_eq!(SqlParam::from_json(&json!(42)), SqlParam::Int(42));
        assert_eq!(SqlParam::from_json(&json!(2.5)), SqlParam::Float(2.5));
        assert_eq!(
            SqlParam::from_json(&json!("abc")),
            SqlParam::String("abc".to_string())
        );
    }

    #[test]
    fn test_param_from_json_structured() {
        assert_eq!(
            SqlParam::from_json(&json!([1, 2])),
            SqlParam::String("[1,2]".to_string())
        );
    }
}
