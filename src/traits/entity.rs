use crate::error::Result;
use crate::metadata::EntityDef;
use crate::types::{Row, SqlValue};

/// A plain data type stored in one table.
///
/// Usually implemented through [`crate::entity!`]. Hand-written
/// implementations describe their fields with the [`EntityDef`] and
/// [`crate::metadata::FieldDef`] builders.
pub trait Entity: Sized + Send + Sync + 'static {
    /// Type name, table markers and fields in declaration order.
    fn describe() -> EntityDef;

    /// Current value of a field, `None` if the field does not exist.
    fn field_value(&self, field: &str) -> Option<SqlValue>;

    /// Assigns a field, used to write generated keys back.
    fn set_field_value(&mut self, field: &str, value: &SqlValue) -> Result<()>;

    /// Materializes an entity from a selected row.
    fn from_row(row: &Row) -> Result<Self>;
}
