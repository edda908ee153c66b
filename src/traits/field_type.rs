use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::error::{CrudRsError, Result};
use crate::metadata::FieldKind;
use crate::types::SqlValue;

/// Rust types that can be stored in an entity field.
///
/// `KIND` drives the mapping conventions: complex kinds are left out of
/// generated SQL unless marked editable, and only integer, uuid and text
/// kinds can be insert keys. Implement it for your own enums with
/// `FieldKind::Enum`.
pub trait FieldType: Sized {
    const KIND: FieldKind;

    fn to_sql(&self) -> SqlValue;

    fn from_sql(value: &SqlValue) -> Result<Self>;
}

fn mismatch(expected: &'static str, value: &SqlValue) -> CrudRsError {
    CrudRsError::ValueConversion {
        expected,
        found: value.type_name().to_string(),
    }
}

macro_rules! impl_integer {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FieldType for $ty {
                const KIND: FieldKind = FieldKind::$kind;

                fn to_sql(&self) -> SqlValue {
                    (*self).into()
                }

                fn from_sql(value: &SqlValue) -> Result<Self> {
                    let widened = match value {
                        // Some drivers hand back DECIMAL identities as text.
                        SqlValue::Text(text) => text.trim().parse::<i128>().ok(),
                        other => other.as_integer(),
                    };
                    widened
                        .and_then(|v| <$ty>::try_from(v).ok())
                        .ok_or_else(|| mismatch(stringify!($ty), value))
                }
            }
        )*
    };
}

impl_integer! {
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
}

impl FieldType for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn to_sql(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }

    fn from_sql(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Bool(v) => Ok(*v),
            other => other
                .as_integer()
                .map(|v| v != 0)
                .ok_or_else(|| mismatch("bool", other)),
        }
    }
}

impl FieldType for f32 {
    const KIND: FieldKind = FieldKind::Float;

    fn to_sql(&self) -> SqlValue {
        SqlValue::Float(*self)
    }

    fn from_sql(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Float(v) => Ok(*v),
            SqlValue::Double(v) => Ok(*v as f32),
            other => Err(mismatch("f32", other)),
        }
    }
}

impl FieldType for f64 {
    const KIND: FieldKind = FieldKind::Double;

    fn to_sql(&self) -> SqlValue {
        SqlValue::Double(*self)
    }

    fn from_sql(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Double(v) => Ok(*v),
            SqlValue::Float(v) => Ok(f64::from(*v)),
            other => other
                .as_integer()
                .map(|v| v as f64)
                .ok_or_else(|| mismatch("f64", other)),
        }
    }
}

impl FieldType for String {
    const KIND: FieldKind = FieldKind::Text;

    fn to_sql(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }

    fn from_sql(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Text(v) => Ok(v.clone()),
            SqlValue::Uuid(v) => Ok(v.to_string()),
            other => Err(mismatch("String", other)),
        }
    }
}

impl FieldType for Vec<u8> {
    const KIND: FieldKind = FieldKind::Bytes;

    fn to_sql(&self) -> SqlValue {
        SqlValue::Bytes(self.clone())
    }

    fn from_sql(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Bytes(v) => Ok(v.clone()),
            other => Err(mismatch("Vec<u8>", other)),
        }
    }
}

impl FieldType for Uuid {
    const KIND: FieldKind = FieldKind::Uuid;

    fn to_sql(&self) -> SqlValue {
        SqlValue::Uuid(*self)
    }

    fn from_sql(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Uuid(v) => Ok(*v),
            SqlValue::Text(v) => Uuid::parse_str(v).map_err(|_| mismatch("Uuid", value)),
            SqlValue::Bytes(v) => Uuid::from_slice(v).map_err(|_| mismatch("Uuid", value)),
            other => Err(mismatch("Uuid", other)),
        }
    }
}

impl FieldType for NaiveDate {
    const KIND: FieldKind = FieldKind::Date;

    fn to_sql(&self) -> SqlValue {
        SqlValue::Date(*self)
    }

    fn from_sql(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Date(v) => Ok(*v),
            SqlValue::DateTime(v) => Ok(v.date()),
            other => Err(mismatch("NaiveDate", other)),
        }
    }
}

impl FieldType for NaiveDateTime {
    const KIND: FieldKind = FieldKind::DateTime;

    fn to_sql(&self) -> SqlValue {
        SqlValue::DateTime(*self)
    }

    fn from_sql(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::DateTime(v) => Ok(*v),
            SqlValue::DateTimeUtc(v) => Ok(v.naive_utc()),
            other => Err(mismatch("NaiveDateTime", other)),
        }
    }
}

impl FieldType for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::DateTimeOffset;

    fn to_sql(&self) -> SqlValue {
        SqlValue::DateTimeUtc(*self)
    }

    fn from_sql(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::DateTimeUtc(v) => Ok(*v),
            SqlValue::DateTime(v) => Ok(v.and_utc()),
            other => Err(mismatch("DateTime<Utc>", other)),
        }
    }
}

impl<T: FieldType> FieldType for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn to_sql(&self) -> SqlValue {
        match self {
            Some(v) => v.to_sql(),
            None => SqlValue::Null,
        }
    }

    fn from_sql(value: &SqlValue) -> Result<Self> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql(other).map(Some),
        }
    }
}
