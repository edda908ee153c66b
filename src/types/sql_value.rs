use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

/// Represents a SQL parameter value in a driver-agnostic way.
/// Drivers are responsible for converting these to their native types.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    DateTimeUtc(DateTime<Utc>),
}

impl SqlValue {
    /// Short name of the variant, used in conversion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int16(_) => "int16",
            SqlValue::Int32(_) => "int32",
            SqlValue::Int64(_) => "int64",
            SqlValue::UInt16(_) => "uint16",
            SqlValue::UInt32(_) => "uint32",
            SqlValue::UInt64(_) => "uint64",
            SqlValue::Float(_) => "float",
            SqlValue::Double(_) => "double",
            SqlValue::Text(_) => "text",
            SqlValue::Bytes(_) => "bytes",
            SqlValue::Uuid(_) => "uuid",
            SqlValue::Date(_) => "date",
            SqlValue::DateTime(_) => "datetime",
            SqlValue::DateTimeUtc(_) => "datetime with time zone",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Widens any integer variant to i128, `None` for everything else.
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            SqlValue::Int16(v) => Some(v.into()),
            SqlValue::Int32(v) => Some(v.into()),
            SqlValue::Int64(v) => Some(v.into()),
            SqlValue::UInt16(v) => Some(v.into()),
            SqlValue::UInt32(v) => Some(v.into()),
            SqlValue::UInt64(v) => Some(v.into()),
            _ => None,
        }
    }

    /// True for null, integer zero, the nil uuid and the empty string.
    /// These are the values a key holds before the database assigns one.
    pub fn is_unset_key(&self) -> bool {
        match self {
            SqlValue::Null => true,
            SqlValue::Uuid(v) => v.is_nil(),
            SqlValue::Text(v) => v.is_empty(),
            other => other.as_integer() == Some(0),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(value: $ty) -> Self {
                    SqlValue::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float,
    f64 => Double,
    String => Text,
    Vec<u8> => Bytes,
    Uuid => Uuid,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    DateTime<Utc> => DateTimeUtc,
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}
