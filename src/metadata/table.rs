use crate::dialect::DialectProfile;
use crate::error::{CrudRsError, Result};
use crate::metadata::{FieldDef, FieldDescriptor};

/// Everything an entity declares about itself, see [`crate::Entity::describe`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDef {
    pub name: String,
    pub table: Option<String>,
    pub schema: Option<String>,
    pub fields: Vec<FieldDef>,
}

impl EntityDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            schema: None,
            fields: Vec::new(),
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

/// Unquoted table name with an optional schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    pub name: String,
    pub schema: Option<String>,
}

impl TableName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
        }
    }

    /// Splits `schema.table` on the first `.`.
    pub fn parse(qualified: &str) -> Self {
        match qualified.split_once('.') {
            Some((schema, name)) => Self {
                name: name.to_string(),
                schema: Some(schema.to_string()),
            },
            None => Self::new(qualified),
        }
    }

    pub fn with_schema(mut self, schema: Option<String>) -> Self {
        self.schema = schema;
        self
    }

    pub fn quoted(&self, profile: &DialectProfile) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", profile.quote(schema), profile.quote(&self.name)),
            None => profile.quote(&self.name),
        }
    }
}

/// Resolved mapping of one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor {
    pub entity_name: String,
    pub table: TableName,
    /// In declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl TableDescriptor {
    pub fn field(&self, name: &str) -> Result<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.name == name && !f.is_unmapped)
            .ok_or_else(|| CrudRsError::UnknownField {
                entity: self.entity_name.clone(),
                field: name.to_string(),
            })
    }

    pub fn id_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_key)
    }

    pub fn selectable_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_selectable)
    }

    pub fn insertable_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_insertable)
    }

    pub fn updatable_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_updatable)
    }

    /// All key fields, or `NoKey` when there are none.
    pub fn require_keys(&self, operation: &'static str) -> Result<Vec<&FieldDescriptor>> {
        let keys: Vec<_> = self.id_fields().collect();
        if keys.is_empty() {
            return Err(CrudRsError::NoKey {
                entity: self.entity_name.clone(),
                operation,
            });
        }
        Ok(keys)
    }

    /// The only key field, or `NoKey` / `MultipleKeys`.
    pub fn single_key(&self, operation: &'static str) -> Result<&FieldDescriptor> {
        let keys = self.require_keys(operation)?;
        match keys.as_slice() {
            [key] => Ok(*key),
            _ => Err(CrudRsError::MultipleKeys {
                entity: self.entity_name.clone(),
                operation,
                count: keys.len(),
            }),
        }
    }

    pub fn table_name(&self, profile: &DialectProfile) -> String {
        self.table.quoted(profile)
    }
}
