use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::types::SqlValue;

/// Exact-match conditions keyed by entity field name.
///
/// Used by `get_list`, `record_count` and as a composite id. A
/// [`SqlValue::Null`] value matches rows where the column is null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Vec<(String, SqlValue)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `field = value`, or `field is null` when `value` converts to null.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.fields.push((field.into(), value.into()));
        self
    }

    pub fn is_null(self, field: impl Into<String>) -> Self {
        self.eq(field, SqlValue::Null)
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Identifies a row by its key field values.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityId {
    /// The value of the single key field.
    Single(SqlValue),
    /// One value per key field, named after the field.
    Composite(Filter),
}

impl From<SqlValue> for EntityId {
    fn from(value: SqlValue) -> Self {
        EntityId::Single(value)
    }
}

impl From<Filter> for EntityId {
    fn from(filter: Filter) -> Self {
        EntityId::Composite(filter)
    }
}

macro_rules! impl_single_id {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for EntityId {
                fn from(value: $ty) -> Self {
                    EntityId::Single(value.into())
                }
            }
        )*
    };
}

impl_single_id!(
    i16,
    i32,
    i64,
    u16,
    u32,
    u64,
    &str,
    String,
    Uuid,
    NaiveDate,
    NaiveDateTime,
    DateTime<Utc>,
);
