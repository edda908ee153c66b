use std::any::TypeId;
use std::sync::Arc;

use crate::cache::{SqlCache, StatementKind};
use crate::clauses::WhereClause;
use crate::dialect::{self, Dialect, DialectProfile};
use crate::error::{CrudRsError, Result};
use crate::metadata::{FieldDescriptor, TableDescriptor};
use crate::traits::Entity;
use crate::types::{EntityId, Filter, Parameters, SqlValue};

/// Generated SQL text and the values it binds.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Parameters,
}

impl Statement {
    pub(crate) fn new(sql: impl Into<String>, params: Parameters) -> Self {
        let statement = Self {
            sql: sql.into(),
            params,
        };
        log::debug!("Built statement: {}", statement.sql);
        statement
    }
}

/// Builds CRUD statements for entity types under one dialect.
///
/// Builders are cheap to copy. The dialect is fixed when the builder is
/// created, so a builder keeps producing the same dialect even if the
/// process-wide setting changes.
#[derive(Debug, Clone, Copy)]
pub struct StatementBuilder {
    profile: DialectProfile,
    use_cache: bool,
}

impl StatementBuilder {
    pub fn new(profile: DialectProfile) -> Self {
        Self {
            profile,
            use_cache: true,
        }
    }

    pub fn for_dialect(dialect: Dialect) -> Self {
        Self::new(dialect.profile())
    }

    /// Snapshots the process-wide dialect.
    pub fn current() -> Self {
        Self::for_dialect(dialect::get_dialect())
    }

    /// Rebuilds every statement instead of using the global [`SqlCache`].
    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    pub fn profile(&self) -> &DialectProfile {
        &self.profile
    }

    pub(crate) fn cached<T: Entity>(
        &self,
        kind: StatementKind,
        build: impl FnOnce() -> Result<String>,
    ) -> Result<Arc<str>> {
        if !self.use_cache {
            return build().map(Into::into);
        }
        SqlCache::global().get_or_try_insert_with(TypeId::of::<T>(), self.profile.name, kind, build)
    }

    pub(crate) fn table_name(&self, table: &TableDescriptor) -> String {
        table.table_name(&self.profile)
    }

    /// `col1,col2 AS Name,...` for every selectable field.
    pub(crate) fn select_columns<T: Entity>(&self, table: &TableDescriptor) -> Result<Arc<str>> {
        self.cached::<T>(StatementKind::SelectColumns, || {
            Ok(table
                .selectable_fields()
                .map(FieldDescriptor::select_expression)
                .collect::<Vec<_>>()
                .join(","))
        })
    }
}

/// `k1 = @k1 AND k2 = @k2` over the given key fields.
pub(crate) fn key_condition(keys: &[&FieldDescriptor]) -> String {
    keys.iter()
        .map(|key| WhereClause::eq(&key.column_name, &key.name, SqlValue::Null).render())
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Binds the key values of `entity`.
pub(crate) fn bind_entity_keys<T: Entity>(
    keys: &[&FieldDescriptor],
    entity: &T,
    params: &mut Parameters,
) -> Result<()> {
    for key in keys {
        let value = entity
            .field_value(&key.name)
            .ok_or_else(|| CrudRsError::MissingKeyValue {
                field: key.name.clone(),
            })?;
        params.insert(key.name.clone(), value);
    }
    Ok(())
}

/// Binds an explicit id to the key fields.
pub(crate) fn bind_id(
    table: &TableDescriptor,
    keys: &[&FieldDescriptor],
    id: EntityId,
    operation: &'static str,
    params: &mut Parameters,
) -> Result<()> {
    match id {
        EntityId::Single(value) => match keys {
            [key] => {
                params.insert(key.name.clone(), value);
                Ok(())
            }
            _ => Err(CrudRsError::MultipleKeys {
                entity: table.entity_name.clone(),
                operation,
                count: keys.len(),
            }),
        },
        EntityId::Composite(filter) => {
            for key in keys {
                let value = filter
                    .get(&key.name)
                    .ok_or_else(|| CrudRsError::MissingKeyValue {
                        field: key.name.clone(),
                    })?;
                params.insert(key.name.clone(), value.clone());
            }
            Ok(())
        }
    }
}

/// WHERE clause for a filter, null-aware. Unknown fields are rejected.
pub(crate) fn filter_clause(
    table: &TableDescriptor,
    filter: Option<&Filter>,
) -> Result<Option<WhereClause>> {
    let Some(filter) = filter else {
        return Ok(None);
    };
    let clauses = filter
        .iter()
        .map(|(name, value)| {
            let field = table.field(name)?;
            Ok(WhereClause::matching(
                &field.column_name,
                &field.name,
                value.clone(),
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(WhereClause::all(clauses))
}

/// Appends caller-supplied condition text after a single space.
pub(crate) fn append_conditions(sql: &mut String, conditions: &str) {
    let conditions = conditions.trim();
    if !conditions.is_empty() {
        sql.push(' ');
        sql.push_str(conditions);
    }
}
