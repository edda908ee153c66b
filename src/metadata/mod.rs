//! Turns an entity's self-description into a resolved [`TableDescriptor`].
//!
//! Sources, highest precedence first: a registered [`TableMap`], the markers
//! an entity declares inline, then naming convention.

mod field;
mod mapping;
mod resolver;
mod table;

pub use field::{ColumnProperties, FieldDef, FieldDescriptor, FieldKind};
pub use mapping::{clear_mappings, register_all_mappings, register_mapping, TableMap, TABLE_MAPPINGS};
pub use resolver::{
    resolve_table, ColumnPropertiesResolver, ConventionResolver, FluentMappingResolver,
    MarkerResolver, MetadataResolver,
};
pub use table::{EntityDef, TableDescriptor, TableName};
