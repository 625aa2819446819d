//! miniorm
//!
//! A minimal async ORM: declare row schemas as typed field descriptors,
//! get the four canonical SQL templates derived at definition time, and
//! run CRUD against a shared connection pool without writing raw SQL for
//! the common cases.
//!
//! ```ignore
//! use miniorm::{Db, Field, FindOptions, Model, PoolConfig, model};
//!
//! model! {
//!     pub struct User ("users") {
//!         id => Field::string().primary_key().default_fn(next_id),
//!         email => Field::string(),
//!         admin => Field::boolean(),
//!     }
//! }
//!
//! let db = Db::connect(PoolConfig::new("www", "password", "awesome")).await?;
//! let mut user = User::new();
//! user.set("email", "test@example.com");
//! user.save(&db).await?;
//! let admins = User::find_all(&db, FindOptions::new().where_clause("`admin`=?")
//!     .args(vec![true.into()])).await?;
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod orm;

pub use config::PoolConfig;
pub use db::{Db, DbPool, RowMap};
pub use error::{OrmError, OrmResult};
pub use orm::{AttrMap, Field, FieldDefault, FindOptions, Model, Schema};
