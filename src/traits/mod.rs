mod driver;
mod entity;
mod field_type;

pub use driver::{CommandOptions, DatabaseDriver, TransactionId};
pub use entity::Entity;
pub use field_type::FieldType;
