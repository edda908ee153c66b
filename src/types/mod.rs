mod filter;
mod parameters;
mod row;
mod sql_value;

pub use filter::{EntityId, Filter};
pub use parameters::Parameters;
pub use row::{QueryResult, RawQueryResult, Row};
pub use sql_value::SqlValue;
