//! Generic resource component.
//!
//! A resource is a table plus the list of columns clients may write, each
//! with its JSON field name, type and validation rules. Handlers validate a
//! request body into a [`Draft`] with [`ResourceDef::validate`], add server
//! fields, and persist it with the operations in [`ops`]. Rows come back as
//! [`scanguard_sql::Row`] and are mapped to typed models through [`FromRow`].

pub mod filter;
pub mod ops;
pub mod resource;

pub use filter::Filter;
pub use ops::{FromRow, rows_into, storage_err};
pub use resource::{Column, ColumnKind, Draft, ResourceDef};
