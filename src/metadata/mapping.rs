//! Fluent table mappings, registered at runtime.
//!
//! A mapping overrides whatever an entity declares inline. Register one
//! directly with [`register_mapping`], or declare it anywhere in the program
//! and let [`register_all_mappings`] collect it:
//!
//! ```ignore
//! use crudrs::metadata::{TableMap, TABLE_MAPPINGS};
//!
//! #[linkme::distributed_slice(TABLE_MAPPINGS)]
//! static USER_MAP: fn() -> TableMap = || {
//!     TableMap::new::<User>()
//!         .to_table("Log.Users")
//!         .map("Age", |c| c.column("UserAge"))
//! };
//! ```

use std::any::TypeId;
use std::sync::LazyLock;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use indexmap::IndexMap;

use crate::cache::SqlCache;
use crate::error::{CrudRsError, Result};
use crate::metadata::{resolver, ColumnProperties, TableName};
use crate::traits::Entity;

/// Mapping definitions collected by [`register_all_mappings`].
#[linkme::distributed_slice]
pub static TABLE_MAPPINGS: [fn() -> TableMap];

/// Fluent mapping of one entity type.
#[derive(Debug, Clone)]
pub struct TableMap {
    type_id: TypeId,
    entity_name: String,
    field_names: Vec<String>,
    table: Option<TableName>,
    columns: IndexMap<String, ColumnProperties>,
    duplicates: Vec<String>,
}

impl TableMap {
    pub fn new<T: Entity>() -> Self {
        let def = T::describe();
        Self {
            type_id: TypeId::of::<T>(),
            entity_name: def.name,
            field_names: def.fields.into_iter().map(|f| f.name).collect(),
            table: None,
            columns: IndexMap::new(),
            duplicates: Vec::new(),
        }
    }

    /// Target table, optionally qualified as `schema.table`.
    pub fn to_table(mut self, table: &str) -> Self {
        self.table = Some(TableName::parse(table));
        self
    }

    /// Maps one field. A mapped field ignores every inline marker it has.
    pub fn map(
        mut self,
        field: &str,
        configure: impl FnOnce(ColumnProperties) -> ColumnProperties,
    ) -> Self {
        if self.columns.contains_key(field) {
            self.duplicates.push(field.to_string());
            return self;
        }
        self.columns
            .insert(field.to_string(), configure(ColumnProperties::new()));
        self
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    pub fn table(&self) -> Option<&TableName> {
        self.table.as_ref()
    }

    pub fn column(&self, field: &str) -> Option<&ColumnProperties> {
        self.columns.get(field)
    }

    fn validate(&self) -> Result<()> {
        if let Some(field) = self.duplicates.first() {
            return Err(CrudRsError::DuplicateMapping(format!(
                "{}.{}",
                self.entity_name, field
            )));
        }
        match self
            .columns
            .keys()
            .find(|field| !self.field_names.contains(field))
        {
            Some(field) => Err(CrudRsError::UnknownField {
                entity: self.entity_name.clone(),
                field: field.clone(),
            }),
            None => Ok(()),
        }
    }
}

static MAPPINGS: LazyLock<DashMap<TypeId, TableMap>> = LazyLock::new(DashMap::new);

pub(crate) fn with_mapping<R>(type_id: TypeId, f: impl FnOnce(&TableMap) -> R) -> Option<R> {
    MAPPINGS.get(&type_id).map(|entry| f(entry.value()))
}

/// Registers a mapping. Each type can be mapped once.
pub fn register_mapping(map: TableMap) -> Result<()> {
    map.validate()?;

    let type_id = map.type_id;
    match MAPPINGS.entry(type_id) {
        Entry::Occupied(_) => {
            return Err(CrudRsError::DuplicateMapping(map.entity_name));
        }
        Entry::Vacant(entry) => {
            log::debug!("Registered table mapping for {}", map.entity_name);
            entry.insert(map);
        }
    }

    resolver::invalidate(type_id);
    SqlCache::global().invalidate_type(type_id);
    Ok(())
}

/// Replaces the registry with every mapping in [`TABLE_MAPPINGS`].
///
/// Returns how many mappings were registered.
pub fn register_all_mappings() -> Result<usize> {
    clear_mappings();
    for build in TABLE_MAPPINGS {
        register_mapping(build())?;
    }
    log::debug!("Registered {} table mappings", TABLE_MAPPINGS.len());
    Ok(TABLE_MAPPINGS.len())
}

/// Drops every registered mapping together with the caches derived from them.
pub fn clear_mappings() {
    MAPPINGS.clear();
    resolver::invalidate_all();
    SqlCache::global().clear();
}
