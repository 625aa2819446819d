//! Database access layer.
//!
//! This module provides the pieces below the entity mapping:
//! - Connection pool management
//! - Generic read/write statement execution
//! - Row decoding into column-name maps

pub mod executor;
pub mod pool;
pub mod row;

pub use executor::SqlParam;
pub use pool::{Db, DbPool};
pub use row::RowMap;
