//! Connection pool management.
//!
//! One pool is created at process startup and shared by every concurrent
//! flow; each statement borrows a connection for exactly its own duration.
//! The pool lives behind an explicit, cloneable [`Db`] handle rather than
//! process-global state, so no statement can run before the pool exists.

use crate::config::PoolConfig;
use crate::error::OrmResult;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{MySqlPool, SqlitePool};
use std::str::FromStr;
use tracing::info;

/// Driver-specific connection pool.
///
/// MySQL is the primary target. The SQLite variant exists because every
/// statement this ORM emits (backtick-quoted identifiers, `?` placeholders)
/// is accepted verbatim by SQLite, which makes it the natural embedded and
/// test backend.
#[derive(Debug, Clone)]
pub enum DbPool {
    MySql(MySqlPool),
    Sqlite(SqlitePool),
}

/// Handle to the shared connection pool.
#[derive(Debug, Clone)]
pub struct Db {
    pool: DbPool,
}

impl Db {
    /// Create the MySQL connection pool. Intended to be called once at
    /// process startup; the returned handle is cheap to clone and share.
    pub async fn connect(config: PoolConfig) -> OrmResult<Self> {
        config.validate()?;
        info!(
            host = %config.host,
            port = config.port,
            db = %config.db,
            "create database connection pool"
        );

        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.db)
            .charset(&config.charset);

        let mut pool_options = MySqlPoolOptions::new()
            .min_connections(config.minsize)
            .max_connections(config.maxsize);
        if !config.autocommit {
            pool_options = pool_options.after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("set autocommit = 0").execute(&mut *conn).await?;
                    Ok(())
                })
            });
        }

        let pool = pool_options.connect_with(options).await?;
        Ok(Self {
            pool: DbPool::MySql(pool),
        })
    }

    /// Create a SQLite connection pool, e.g. `sqlite::memory:` or
    /// `sqlite:/path/to/db.sqlite`. The file is created if missing.
    pub async fn connect_sqlite(url: &str) -> OrmResult<Self> {
        info!(url = %url, "create database connection pool");
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self {
            pool: DbPool::Sqlite(pool),
        })
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        match &self.pool {
            DbPool::MySql(pool) => pool.close().await,
            DbPool::Sqlite(pool) => pool.close().await,
        }
        info!("database connection pool closed");
    }

    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }
}
