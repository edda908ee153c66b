/// Declares a struct and implements [`Entity`](crate::Entity) for it.
///
/// `table` and `schema` are optional and name the target table. Fields take
/// `@marker` prefixes that map one to one onto the
/// [`FieldDef`](crate::metadata::FieldDef) builder methods: `@key`,
/// `@required`, `@read_only`, `@not_mapped`, `@ignore_select`,
/// `@ignore_insert`, `@ignore_update`, `@editable(bool)` and
/// `@column("name")`. Markers go before a field's own attributes.
///
/// Every field type must implement [`FieldType`](crate::FieldType) and
/// `Default`; fields missing from a result row are left at their default.
///
/// # Examples
///
/// ```ignore
/// crudrs::entity! {
///     table = "Users",
///     schema = "Log",
///     #[derive(Debug, Default)]
///     pub struct User {
///         @key
///         pub user_id: i32,
///         @column("strange_word")
///         pub word: String,
///         @not_mapped
///         pub scratch: String,
///     }
/// }
/// ```
#[macro_export]
macro_rules! entity {
    (
        @emit ($table:expr, $schema:expr, [$($meta:tt)*] $vis:vis $name:ident)
        [$({
            [$($marker:tt)*]
            $(#[$field_meta:meta])*
            $field_vis:vis $field:ident : $field_type:ty
        })*]
    ) => {
        $($meta)*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field : $field_type,
            )*
        }

        impl $crate::Entity for $name {
            fn describe() -> $crate::metadata::EntityDef {
                let mut def = $crate::metadata::EntityDef::new(stringify!($name));
                let table: Option<&str> = $table;
                let schema: Option<&str> = $schema;
                if let Some(table) = table {
                    def = def.table(table);
                }
                if let Some(schema) = schema {
                    def = def.schema(schema);
                }
                def
                $(
                    .field(
                        $crate::metadata::FieldDef::new(
                            stringify!($field),
                            <$field_type as $crate::FieldType>::KIND,
                        )
                        $($marker)*
                    )
                )*
            }

            fn field_value(&self, field: &str) -> Option<$crate::SqlValue> {
                match field {
                    $(
                        stringify!($field) => Some($crate::FieldType::to_sql(&self.$field)),
                    )*
                    _ => None,
                }
            }

            fn set_field_value(
                &mut self,
                field: &str,
                value: &$crate::SqlValue,
            ) -> $crate::Result<()> {
                match field {
                    $(
                        stringify!($field) => {
                            self.$field = <$field_type as $crate::FieldType>::from_sql(value)?;
                            Ok(())
                        }
                    )*
                    _ => Err($crate::CrudRsError::UnknownField {
                        entity: stringify!($name).to_string(),
                        field: field.to_string(),
                    }),
                }
            }

            fn from_row(row: &$crate::Row) -> $crate::Result<Self> {
                Ok(Self {
                    $(
                        $field: row.get_or_default::<$field_type>(stringify!($field))?,
                    )*
                })
            }
        }
    };

    // Fields are munched one token group at a time: markers collect into the
    // second bracket until the field they belong to is reached.
    (@fields $head:tt [$($done:tt)*] []) => {
        $crate::entity! { @emit $head [$($done)*] }
    };

    (@fields $head:tt [$($done:tt)*] [$($markers:tt)*] @ $marker:ident ( $($arg:tt)* ) $($rest:tt)*) => {
        $crate::entity! { @fields $head [$($done)*] [$($markers)* .$marker($($arg)*)] $($rest)* }
    };

    (@fields $head:tt [$($done:tt)*] [$($markers:tt)*] @ $marker:ident $($rest:tt)*) => {
        $crate::entity! { @fields $head [$($done)*] [$($markers)* .$marker()] $($rest)* }
    };

    (
        @fields $head:tt [$($done:tt)*] [$($markers:tt)*]
        $(#[$field_meta:meta])*
        $field_vis:vis $field:ident : $field_type:ty
        $(, $($rest:tt)*)?
    ) => {
        $crate::entity! {
            @fields $head
            [$($done)* { [$($markers)*] $(#[$field_meta])* $field_vis $field : $field_type }]
            []
            $($($rest)*)?
        }
    };

    (
        @impl $table:expr, $schema:expr,
        $(#[$meta:meta])*
        $vis:vis struct $name:ident { $($body:tt)* }
    ) => {
        $crate::entity! { @fields ($table, $schema, [$(#[$meta])*] $vis $name) [] [] $($body)* }
    };

    (table = $table:literal, schema = $schema:literal, $($rest:tt)*) => {
        $crate::entity! { @impl Some($table), Some($schema), $($rest)* }
    };

    (table = $table:literal, $($rest:tt)*) => {
        $crate::entity! { @impl Some($table), None, $($rest)* }
    };

    (schema = $schema:literal, $($rest:tt)*) => {
        $crate::entity! { @impl None, Some($schema), $($rest)* }
    };

    ($($rest:tt)*) => {
        $crate::entity! { @impl None, None, $($rest)* }
    };
}
