//! Object-relational mapping layer.
//!
//! - Field descriptors declare columns
//! - The schema registrar derives SQL templates once per entity type
//! - The `Model` trait binds instances to those templates

pub mod field;
pub mod model;
pub mod schema;

pub use field::{Field, FieldDefault};
pub use model::{AttrMap, FindOptions, Model};
pub use schema::{Schema, placeholders, quote_ident};
