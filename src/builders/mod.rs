//! SQL generation for every CRUD operation.
//!
//! Each operation is a method on [`StatementBuilder`] returning a
//! [`Statement`]. Identifiers come from the resolved metadata and are
//! interpolated; values are always bound as `@name` parameters. Raw
//! condition and order-by text passed in by callers is interpolated
//! verbatim and must not contain untrusted input.

mod delete;
mod insert;
mod select;
mod statement;
mod update;

pub use insert::{InsertKey, InsertPlan};
pub use statement::{Statement, StatementBuilder};
