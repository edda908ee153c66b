#![allow(dead_code)]

use std::sync::Arc;

use crudrs::drivers::InMemoryTestDriver;
use crudrs::metadata::{EntityDef, FieldDef, FieldKind};
use crudrs::{
    entity, ClientConfig, CrudRsClient, CrudRsError, DatabaseDriver, Dialect, Entity, FieldType,
    Querier, Result, Row, SqlValue,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A querier pinned to `dialect`, plus the driver behind it.
pub fn setup(driver: InMemoryTestDriver, dialect: Dialect) -> (Arc<InMemoryTestDriver>, Querier) {
    init_logging();
    let in_memory_test_driver = Arc::new(driver);
    let driver: Arc<dyn DatabaseDriver> =
        Arc::clone(&in_memory_test_driver) as Arc<dyn DatabaseDriver>;
    let client = CrudRsClient::with_config(
        driver,
        ClientConfig {
            dialect: Some(dialect),
            command_timeout: None,
        },
    );
    (in_memory_test_driver, client.querier())
}

/// Hand-written entity: explicit key, column names differ from field idents.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Car {
    pub car_id: i32,
    pub make: String,
    pub model: String,
}

impl Entity for Car {
    fn describe() -> EntityDef {
        EntityDef::new("Car")
            .field(FieldDef::new("CarId", FieldKind::Int32).key())
            .field(FieldDef::new("Make", FieldKind::Text))
            .field(FieldDef::new("Model", FieldKind::Text))
    }

    fn field_value(&self, field: &str) -> Option<SqlValue> {
        match field {
            "CarId" => Some(self.car_id.into()),
            "Make" => Some(self.make.as_str().into()),
            "Model" => Some(self.model.as_str().into()),
            _ => None,
        }
    }

    fn set_field_value(&mut self, field: &str, value: &SqlValue) -> Result<()> {
        match field {
            "CarId" => self.car_id = i32::from_sql(value)?,
            "Make" => self.make = String::from_sql(value)?,
            "Model" => self.model = String::from_sql(value)?,
            _ => {
                return Err(CrudRsError::UnknownField {
                    entity: "Car".into(),
                    field: field.into(),
                })
            }
        }
        Ok(())
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            car_id: row.try_get("CarId")?,
            make: row.try_get("Make")?,
            model: row.try_get("Model")?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DayOfWeek {
    #[default]
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl FieldType for DayOfWeek {
    const KIND: FieldKind = FieldKind::Enum;

    fn to_sql(&self) -> SqlValue {
        SqlValue::Int32(*self as i32)
    }

    fn from_sql(value: &SqlValue) -> Result<Self> {
        use DayOfWeek::*;
        match i32::from_sql(value)? {
            0 => Ok(Sunday),
            1 => Ok(Monday),
            2 => Ok(Tuesday),
            3 => Ok(Wednesday),
            4 => Ok(Thursday),
            5 => Ok(Friday),
            6 => Ok(Saturday),
            _ => Err(CrudRsError::ValueConversion {
                expected: "DayOfWeek",
                found: value.type_name().to_string(),
            }),
        }
    }
}

entity! {
    table = "Users",
    #[allow(non_snake_case)]
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct User {
        pub Id: i32,
        pub Name: String,
        pub Age: i32,
        pub ScheduledDayOff: Option<DayOfWeek>,
        @editable(false)
        pub CreatedDate: Option<chrono::NaiveDateTime>,
    }
}

entity! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct City {
        @key
        pub name: String,
        pub population: i64,
    }
}

entity! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct GuidTest {
        @key
        pub guid: uuid::Uuid,
        pub name: String,
    }
}

entity! {
    table = "StrangeColumnNames",
    schema = "Log",
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct StrangeColumnNames {
        @key
        @column("itemid")
        pub item_id: i32,
        pub word: String,
        @column("colstringstrangeword")
        pub strange_word: String,
        @not_mapped
        pub extra_field: String,
    }
}

entity! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct KeyMaster {
        @key
        pub key1: i32,
        @key
        pub key2: i32,
        pub note: String,
    }
}
