//! crudrs - convention-based CRUD statements for plain Rust types
//!
//! Describe a type once, with the [`entity!`] macro or a hand-written
//! [`Entity`] implementation, and crudrs works out its table, key and
//! columns, then builds parameterized SQL for Get, GetList, GetListPaged,
//! Insert, Update, Upsert, Delete, DeleteList and RecordCount in the
//! SQL Server, PostgreSQL, SQLite, MySQL, Oracle or DB2 dialect.
//!
//! # Example
//! ```ignore
//! use crudrs::{entity, CrudRsClient, Filter, Parameters};
//!
//! entity! {
//!     table = "Users",
//!     #[derive(Debug, Default)]
//!     pub struct User {
//!         pub id: i32,
//!         pub name: String,
//!         pub age: Option<i32>,
//!     }
//! }
//!
//! let client = CrudRsClient::connect("postgres://localhost/mydb").await?;
//! let querier = client.querier();
//!
//! let mut user = User { name: "John".into(), ..Default::default() };
//! let id: i32 = querier.insert(&mut user).await?;
//!
//! let john = querier.get::<User>(id).await?;
//! let adults = querier
//!     .get_list_where::<User>("where age >= @age", Parameters::new().bind("age", 18))
//!     .await?;
//! let unknown_age = querier.get_list::<User>(&Filter::new().is_null("age")).await?;
//! ```

pub mod builders;
pub mod cache;
pub mod clauses;
pub mod dialect;
pub mod drivers;
pub mod error;
pub mod guid;
pub mod metadata;
pub mod querier;
pub mod traits;
pub mod types;

mod client;
mod macros;

// Re-export main types for convenient access
pub use builders::{InsertKey, InsertPlan, Statement, StatementBuilder};
pub use clauses::WhereClause;
pub use client::{ClientConfig, CrudRsClient};
pub use dialect::{get_dialect, set_dialect, Dialect, DialectProfile};
pub use error::{CrudRsError, Result};
pub use querier::Querier;
pub use traits::{CommandOptions, DatabaseDriver, Entity, FieldType, TransactionId};
pub use types::{EntityId, Filter, Parameters, QueryResult, RawQueryResult, Row, SqlValue};
