use std::any::TypeId;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use crate::metadata::mapping;
use crate::metadata::{
    ColumnProperties, EntityDef, FieldDef, FieldDescriptor, TableDescriptor, TableName,
};
use crate::traits::Entity;

/// One source of mapping information.
///
/// Resolvers are consulted in order and the first one returning `Some` wins,
/// for each field and for the table name separately.
pub trait ColumnPropertiesResolver: Send + Sync {
    fn column_properties(
        &self,
        type_id: TypeId,
        entity: &EntityDef,
        field: &FieldDef,
    ) -> Option<ColumnProperties>;

    fn table_name(&self, type_id: TypeId, entity: &EntityDef) -> Option<TableName>;
}

/// Reads mappings registered with [`crate::metadata::register_mapping`].
pub struct FluentMappingResolver;

impl ColumnPropertiesResolver for FluentMappingResolver {
    fn column_properties(
        &self,
        type_id: TypeId,
        _entity: &EntityDef,
        field: &FieldDef,
    ) -> Option<ColumnProperties> {
        mapping::with_mapping(type_id, |map| map.column(&field.name).cloned()).flatten()
    }

    fn table_name(&self, type_id: TypeId, _entity: &EntityDef) -> Option<TableName> {
        mapping::with_mapping(type_id, |map| map.table().cloned()).flatten()
    }
}

/// Reads the markers an entity declares inline.
pub struct MarkerResolver;

impl ColumnPropertiesResolver for MarkerResolver {
    fn column_properties(
        &self,
        _type_id: TypeId,
        _entity: &EntityDef,
        field: &FieldDef,
    ) -> Option<ColumnProperties> {
        (!field.markers.is_default()).then(|| field.markers.clone())
    }

    fn table_name(&self, _type_id: TypeId, entity: &EntityDef) -> Option<TableName> {
        if entity.table.is_none() && entity.schema.is_none() {
            return None;
        }
        let name = entity.table.as_deref().unwrap_or(&entity.name);
        Some(TableName::new(name).with_schema(entity.schema.clone()))
    }
}

/// Column named after the field, table named after the type.
pub struct ConventionResolver;

impl ColumnPropertiesResolver for ConventionResolver {
    fn column_properties(
        &self,
        _type_id: TypeId,
        _entity: &EntityDef,
        _field: &FieldDef,
    ) -> Option<ColumnProperties> {
        Some(ColumnProperties::default())
    }

    fn table_name(&self, _type_id: TypeId, entity: &EntityDef) -> Option<TableName> {
        Some(TableName::new(&entity.name))
    }
}

/// Chains resolvers into a [`TableDescriptor`].
pub struct MetadataResolver {
    resolvers: Vec<Box<dyn ColumnPropertiesResolver>>,
}

impl MetadataResolver {
    pub fn new(resolvers: Vec<Box<dyn ColumnPropertiesResolver>>) -> Self {
        Self { resolvers }
    }

    pub fn describe(&self, type_id: TypeId, entity: &EntityDef) -> TableDescriptor {
        let resolved: Vec<(&FieldDef, ColumnProperties)> = entity
            .fields
            .iter()
            .map(|field| {
                let props = self
                    .resolvers
                    .iter()
                    .find_map(|r| r.column_properties(type_id, entity, field))
                    .unwrap_or_default();
                (field, props)
            })
            .collect();

        // A single explicit key marker switches the "Id" convention off.
        let explicit_keys = resolved.iter().any(|(_, props)| props.key);

        let fields = resolved
            .iter()
            .map(|(field, props)| {
                let is_key = if explicit_keys {
                    props.key
                } else {
                    field.name.eq_ignore_ascii_case("id")
                };
                FieldDescriptor::resolve(&field.name, field.kind, props, is_key)
            })
            .collect();

        let table = self
            .resolvers
            .iter()
            .find_map(|r| r.table_name(type_id, entity))
            .unwrap_or_else(|| TableName::new(&entity.name));

        TableDescriptor {
            entity_name: entity.name.clone(),
            table,
            fields,
        }
    }
}

impl Default for MetadataResolver {
    fn default() -> Self {
        Self::new(vec![
            Box::new(FluentMappingResolver),
            Box::new(MarkerResolver),
            Box::new(ConventionResolver),
        ])
    }
}

static RESOLVER: LazyLock<MetadataResolver> = LazyLock::new(MetadataResolver::default);

static DESCRIPTORS: LazyLock<DashMap<TypeId, Arc<TableDescriptor>>> = LazyLock::new(DashMap::new);

/// Resolved mapping of `T`, computed once and cached for the process.
pub fn resolve_table<T: Entity>() -> Arc<TableDescriptor> {
    let type_id = TypeId::of::<T>();
    if let Some(descriptor) = DESCRIPTORS.get(&type_id) {
        return Arc::clone(descriptor.value());
    }

    // Built under the entry lock: a registration either lands before the
    // mapping is read or removes the finished entry afterwards.
    let entry = DESCRIPTORS.entry(type_id).or_insert_with(|| {
        let descriptor = RESOLVER.describe(type_id, &T::describe());
        log::trace!(
            "Resolved {} to table {:?} with {} fields",
            descriptor.entity_name,
            descriptor.table,
            descriptor.fields.len()
        );
        Arc::new(descriptor)
    });
    Arc::clone(entry.value())
}

pub(crate) fn invalidate(type_id: TypeId) {
    DESCRIPTORS.remove(&type_id);
}

pub(crate) fn invalidate_all() {
    DESCRIPTORS.clear();
}
