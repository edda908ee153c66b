use crate::builders::statement::{Statement, StatementBuilder};
use crate::cache::StatementKind;
use crate::error::{CrudRsError, Result};
use crate::guid::sequential_guid;
use crate::metadata::{resolve_table, FieldKind, TableDescriptor};
use crate::traits::Entity;
use crate::types::{Parameters, SqlValue};

/// Where the key of an inserted row comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertKey {
    /// The database assigns it; the statement ends with the dialect's
    /// identity query and returns it in an `id` column.
    Identity,
    /// Already known: supplied by the caller or generated before the insert.
    Supplied(SqlValue),
}

/// An INSERT together with how to obtain the new row's key.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertPlan {
    pub statement: Statement,
    pub key: InsertKey,
    pub key_field: String,
    pub key_kind: FieldKind,
}

impl StatementBuilder {
    /// Builds the INSERT for `entity`.
    ///
    /// A nil uuid key is replaced by a sequential GUID, written back to
    /// `entity`. An unset integer key is left to the database when the
    /// dialect can report identities.
    pub fn insert<T: Entity>(&self, entity: &mut T) -> Result<InsertPlan> {
        let table = resolve_table::<T>();
        let key = table.single_key("Insert")?;
        if !key.kind.is_insert_key() {
            return Err(CrudRsError::UnsupportedKeyType {
                entity: table.entity_name.clone(),
                kind: key.kind.to_string(),
            });
        }

        let mut value = entity.field_value(&key.name).unwrap_or(SqlValue::Null);
        let insert_key = match key.kind {
            FieldKind::Uuid => {
                if value.is_unset_key() {
                    value = SqlValue::Uuid(sequential_guid());
                    entity.set_field_value(&key.name, &value)?;
                }
                InsertKey::Supplied(value)
            }
            kind if kind.is_integer()
                && !key.is_required
                && value.is_unset_key()
                && self.profile().identity_sql.is_some() =>
            {
                InsertKey::Identity
            }
            _ => InsertKey::Supplied(value),
        };

        let mut params = Parameters::new();
        for field in table.insertable_fields() {
            let value = entity.field_value(&field.name).unwrap_or(SqlValue::Null);
            params.insert(field.name.clone(), value);
        }

        let base = self.cached::<T>(StatementKind::Insert, || Ok(self.insert_sql(&table)))?;
        let sql = match (&insert_key, self.profile().identity_sql) {
            (InsertKey::Identity, Some(identity)) => format!("{};{}", base, identity),
            _ => base.to_string(),
        };

        Ok(InsertPlan {
            statement: Statement::new(sql, params),
            key: insert_key,
            key_field: key.name.clone(),
            key_kind: key.kind,
        })
    }

    pub(crate) fn insert_columns(&self, table: &TableDescriptor) -> (String, String) {
        let (columns, values): (Vec<_>, Vec<_>) = table
            .insertable_fields()
            .map(|field| (field.column_name.clone(), format!("@{}", field.name)))
            .unzip();
        (columns.join(", "), values.join(", "))
    }

    fn insert_sql(&self, table: &TableDescriptor) -> String {
        let (columns, values) = self.insert_columns(table);
        if columns.is_empty() {
            format!(
                "INSERT INTO {} {}",
                self.table_name(table),
                self.profile().default_values_sql
            )
        } else {
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.table_name(table),
                columns,
                values
            )
        }
    }
}
