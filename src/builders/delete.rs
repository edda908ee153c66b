use crate::builders::statement::{
    append_conditions, bind_entity_keys, bind_id, key_condition, Statement, StatementBuilder,
};
use crate::cache::StatementKind;
use crate::error::{CrudRsError, Result};
use crate::metadata::{resolve_table, TableDescriptor};
use crate::traits::Entity;
use crate::types::{EntityId, Parameters};

impl StatementBuilder {
    /// Deletes the row with the keys of `entity`.
    pub fn delete<T: Entity>(&self, entity: &T) -> Result<Statement> {
        let table = resolve_table::<T>();
        let keys = table.require_keys("Delete")?;
        let mut params = Parameters::new();
        bind_entity_keys(&keys, entity, &mut params)?;
        self.delete_by_key::<T>(&table, params)
    }

    /// Deletes the row with the given id.
    pub fn delete_by_id<T: Entity>(&self, id: impl Into<EntityId>) -> Result<Statement> {
        let table = resolve_table::<T>();
        let keys = table.require_keys("Delete")?;
        let mut params = Parameters::new();
        bind_id(&table, &keys, id.into(), "Delete", &mut params)?;
        self.delete_by_key::<T>(&table, params)
    }

    /// `DELETE FROM t <conditions>`.
    ///
    /// `conditions` must contain a `where` keyword so that a missing
    /// condition never empties the table.
    pub fn delete_list<T: Entity>(&self, conditions: &str, params: Parameters) -> Result<Statement> {
        if conditions.trim().is_empty() {
            return Err(CrudRsError::MissingWhereClause("conditions are empty"));
        }
        if !has_where_keyword(conditions) {
            return Err(CrudRsError::MissingWhereClause(
                "conditions must contain the WHERE keyword",
            ));
        }

        let table = resolve_table::<T>();
        let mut sql = format!("DELETE FROM {}", self.table_name(&table));
        append_conditions(&mut sql, conditions);
        Ok(Statement::new(sql, params))
    }

    fn delete_by_key<T: Entity>(&self, table: &TableDescriptor, params: Parameters) -> Result<Statement> {
        let sql = self.cached::<T>(StatementKind::Delete, || {
            let keys = table.require_keys("Delete")?;
            Ok(format!(
                "DELETE FROM {} WHERE {}",
                self.table_name(table),
                key_condition(&keys)
            ))
        })?;
        Ok(Statement::new(&*sql, params))
    }
}

fn has_where_keyword(conditions: &str) -> bool {
    conditions
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|token| token.eq_ignore_ascii_case("where"))
}
