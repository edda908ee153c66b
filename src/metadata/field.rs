use std::fmt;

/// Declared value class of an entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Int16,
    Int32,
    Int64,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    Decimal,
    Bool,
    Text,
    Char,
    Uuid,
    Date,
    DateTime,
    DateTimeOffset,
    Time,
    Bytes,
    Enum,
    /// Anything that is not a scalar: nested structs, collections.
    Complex,
}

impl FieldKind {
    /// Scalar kinds take part in generated SQL by default.
    pub fn is_simple(self) -> bool {
        self != FieldKind::Complex
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            FieldKind::Int16
                | FieldKind::Int32
                | FieldKind::Int64
                | FieldKind::UInt16
                | FieldKind::UInt32
                | FieldKind::UInt64
        )
    }

    /// Kinds `insert` knows how to produce or return a key for.
    pub fn is_insert_key(self) -> bool {
        self.is_integer() || matches!(self, FieldKind::Uuid | FieldKind::Text)
    }

    /// Whether a key stored as `key` can be returned as this kind. Integer
    /// widths convert into each other, everything else must match exactly.
    pub fn can_return_key(self, key: FieldKind) -> bool {
        self == key || (self.is_integer() && key.is_integer())
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Per-field mapping markers.
///
/// Produced either inline by an entity's [`FieldDef`]s or by a registered
/// [`crate::metadata::TableMap`]. Unset markers fall back to convention.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnProperties {
    pub column: Option<String>,
    pub key: bool,
    pub required: bool,
    pub read_only: bool,
    pub editable: Option<bool>,
    pub ignore_select: bool,
    pub ignore_insert: bool,
    pub ignore_update: bool,
    pub not_mapped: bool,
}

impl ColumnProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the field in a differently named column.
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column = Some(name.into());
        self
    }

    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    /// The key value is supplied by the caller, not generated by the database.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Overrides the simple-type convention for SELECT/INSERT/UPDATE.
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = Some(editable);
        self
    }

    pub fn ignore_select(mut self) -> Self {
        self.ignore_select = true;
        self
    }

    pub fn ignore_insert(mut self) -> Self {
        self.ignore_insert = true;
        self
    }

    pub fn ignore_update(mut self) -> Self {
        self.ignore_update = true;
        self
    }

    pub fn not_mapped(mut self) -> Self {
        self.not_mapped = true;
        self
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A field as declared by an entity, with its inline markers.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    pub markers: ColumnProperties,
}

macro_rules! forward_markers {
    ($($method:ident),*) => {
        $(
            pub fn $method(mut self) -> Self {
                self.markers = self.markers.$method();
                self
            }
        )*
    };
}

impl FieldDef {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            markers: ColumnProperties::default(),
        }
    }

    forward_markers!(
        key,
        required,
        read_only,
        ignore_select,
        ignore_insert,
        ignore_update,
        not_mapped
    );

    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.markers = self.markers.column(name);
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.markers = self.markers.editable(editable);
        self
    }
}

/// A fully resolved field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub column_name: String,
    /// Set only when the column was renamed; SELECT emits `column AS name`.
    pub alias_name: Option<String>,
    pub is_key: bool,
    pub is_required: bool,
    pub is_selectable: bool,
    pub is_insertable: bool,
    pub is_updatable: bool,
    pub is_read_only: bool,
    pub is_unmapped: bool,
}

impl FieldDescriptor {
    /// Combines resolved markers with the table-level key decision.
    pub(crate) fn resolve(
        name: &str,
        kind: FieldKind,
        props: &ColumnProperties,
        is_key: bool,
    ) -> Self {
        let column_name = props.column.clone().unwrap_or_else(|| name.to_string());
        let alias_name = (column_name != name).then(|| name.to_string());
        if alias_name.is_some() {
            log::trace!("Column name for {} overridden to {}", name, column_name);
        }

        if props.not_mapped {
            return Self {
                name: name.to_string(),
                kind,
                column_name,
                alias_name,
                is_key: false,
                is_required: false,
                is_selectable: false,
                is_insertable: false,
                is_updatable: false,
                is_read_only: false,
                is_unmapped: true,
            };
        }

        let editable = props.editable.unwrap_or_else(|| kind.is_simple());
        let writable = editable && !props.read_only;
        // Database-generated keys stay out of INSERT; uuid and text keys
        // always come from the caller.
        let key_insertable =
            !is_key || props.required || matches!(kind, FieldKind::Uuid | FieldKind::Text);

        Self {
            name: name.to_string(),
            kind,
            column_name,
            alias_name,
            is_key,
            is_required: props.required,
            is_selectable: editable && !props.ignore_select,
            is_insertable: writable && !props.ignore_insert && key_insertable,
            is_updatable: writable && !props.ignore_update && !is_key,
            is_read_only: props.read_only,
            is_unmapped: false,
        }
    }

    /// `column` or `column AS name` for a select list.
    pub fn select_expression(&self) -> String {
        match &self.alias_name {
            Some(alias) => format!("{} AS {}", self.column_name, alias),
            None => self.column_name.clone(),
        }
    }
}
