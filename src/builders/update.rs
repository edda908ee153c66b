use crate::builders::statement::{bind_entity_keys, key_condition, Statement, StatementBuilder};
use crate::cache::StatementKind;
use crate::error::{CrudRsError, Result};
use crate::metadata::{resolve_table, TableDescriptor};
use crate::traits::Entity;
use crate::types::{Parameters, SqlValue};

impl StatementBuilder {
    /// `UPDATE t SET c = @f, ... WHERE k = @k [AND ...]`
    pub fn update<T: Entity>(&self, entity: &T) -> Result<Statement> {
        let table = resolve_table::<T>();
        let params = self.update_params(&table, entity)?;
        let sql = self.cached::<T>(StatementKind::Update, || self.update_sql(&table))?;
        Ok(Statement::new(&*sql, params))
    }

    /// An UPDATE that inserts the entity when no row was affected.
    pub fn upsert<T: Entity>(&self, entity: &T) -> Result<Statement> {
        let template = self
            .profile()
            .upsert_sql
            .ok_or_else(|| CrudRsError::UpsertNotSupported {
                dialect: self.profile().name.to_string(),
            })?;

        let table = resolve_table::<T>();
        let mut params = self.update_params(&table, entity)?;
        for field in table.insertable_fields() {
            let value = entity.field_value(&field.name).unwrap_or(SqlValue::Null);
            params.insert(field.name.clone(), value);
        }

        let sql = self.cached::<T>(StatementKind::Upsert, || {
            let (columns, values) = self.insert_columns(&table);
            Ok(template
                .replace("{UpdateStatement}", &self.update_sql(&table)?)
                .replace("{TableName}", &self.table_name(&table))
                .replace("{InsertColumns}", &columns)
                .replace("{InsertValues}", &values))
        })?;
        Ok(Statement::new(&*sql, params))
    }

    fn update_params<T: Entity>(&self, table: &TableDescriptor, entity: &T) -> Result<Parameters> {
        let keys = table.require_keys("Update")?;
        let mut params = Parameters::new();
        for field in table.updatable_fields() {
            let value = entity.field_value(&field.name).unwrap_or(SqlValue::Null);
            params.insert(field.name.clone(), value);
        }
        if params.is_empty() {
            return Err(CrudRsError::NoUpdatableFields {
                entity: table.entity_name.clone(),
            });
        }
        bind_entity_keys(&keys, entity, &mut params)?;
        Ok(params)
    }

    fn update_sql(&self, table: &TableDescriptor) -> Result<String> {
        let keys = table.require_keys("Update")?;
        let assignments: Vec<_> = table
            .updatable_fields()
            .map(|field| format!("{} = @{}", field.column_name, field.name))
            .collect();
        if assignments.is_empty() {
            return Err(CrudRsError::NoUpdatableFields {
                entity: table.entity_name.clone(),
            });
        }
        Ok(format!(
            "UPDATE {} SET {} WHERE {}",
            self.table_name(table),
            assignments.join(", "),
            key_condition(&keys)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    crate::entity! {
        #[derive(Debug, Default)]
        struct Member {
            @key
            org: i32,
            @key
            user: i32,
            @column("display_name")
            name: String,
            @ignore_update
            joined: String,
        }
    }

    crate::entity! {
        #[derive(Debug, Default)]
        struct Link {
            id: i32,
            @read_only
            label: String,
        }
    }

    fn member() -> Member {
        Member {
            org: 1,
            user: 2,
            name: "ann".into(),
            joined: "today".into(),
        }
    }

    #[test]
    fn test_build_update() {
        let statement = StatementBuilder::for_dialect(Dialect::SqlServer)
            .update(&member())
            .unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE [Member] SET display_name = @name WHERE org = @org AND user = @user"
        );
        let names: Vec<_> = statement.params.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["name", "org", "user"]);
    }

    #[test]
    fn test_no_updatable_fields() {
        let link = Link::default();
        assert!(matches!(
            StatementBuilder::for_dialect(Dialect::SqlServer).update(&link),
            Err(CrudRsError::NoUpdatableFields { entity }) if entity == "Link"
        ));
    }

    #[test]
    fn test_build_upsert() {
        let statement = StatementBuilder::for_dialect(Dialect::SqlServer)
            .upsert(&member())
            .unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE [Member] SET display_name = @name WHERE org = @org AND user = @user; \
             IF @@ROWCOUNT = 0 BEGIN INSERT INTO [Member] (display_name, joined) \
             VALUES (@name, @joined) END"
        );
        assert_eq!(statement.params.len(), 4);

        let statement = StatementBuilder::for_dialect(Dialect::PostgreSql)
            .upsert(&member())
            .unwrap();
        assert!(statement.sql.starts_with("WITH upsert AS (UPDATE \"Member\" SET"));
        assert!(statement.sql.ends_with("WHERE NOT EXISTS (SELECT 1 FROM upsert)"));
    }

    #[test]
    fn test_upsert_unsupported() {
        for dialect in [Dialect::Oracle, Dialect::Db2] {
            assert!(matches!(
                StatementBuilder::for_dialect(dialect).upsert(&member()),
                Err(CrudRsError::UpsertNotSupported { .. })
            ));
        }
    }
}
