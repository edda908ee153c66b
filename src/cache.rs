//! Cache of generated statement text.
//!
//! Only statements whose text depends on nothing but the entity type and the
//! dialect are cached. Parameter values are always bound per call.

use std::any::TypeId;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    SelectColumns,
    Get,
    Insert,
    Update,
    Upsert,
    Delete,
}

type CacheKey = (TypeId, &'static str, StatementKind);

/// Statement text keyed by entity type, dialect name and statement kind.
///
/// Two threads missing the same key may both build the text; the last
/// insert wins and both results are identical.
#[derive(Debug, Default)]
pub struct SqlCache {
    entries: DashMap<CacheKey, Arc<str>>,
}

static GLOBAL: LazyLock<SqlCache> = LazyLock::new(SqlCache::new);

impl SqlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by every [`crate::StatementBuilder`].
    pub fn global() -> &'static SqlCache {
        &GLOBAL
    }

    pub fn get_or_try_insert_with(
        &self,
        type_id: TypeId,
        dialect: &'static str,
        kind: StatementKind,
        build: impl FnOnce() -> Result<String>,
    ) -> Result<Arc<str>> {
        let key = (type_id, dialect, kind);
        if let Some(sql) = self.entries.get(&key) {
            return Ok(Arc::clone(sql.value()));
        }

        let sql: Arc<str> = build()?.into();
        log::trace!("Caching {:?} statement for {}: {}", kind, dialect, sql);
        self.entries.insert(key, Arc::clone(&sql));
        Ok(sql)
    }

    pub fn invalidate_type(&self, type_id: TypeId) {
        self.entries.retain(|(cached, _, _), _| *cached != type_id);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyed_by_dialect_and_kind() {
        let cache = SqlCache::new();
        let id = TypeId::of::<u8>();

        let a = cache
            .get_or_try_insert_with(id, "SQLServer", StatementKind::Get, || Ok("A".into()))
            .unwrap();
        let again = cache
            .get_or_try_insert_with(id, "SQLServer", StatementKind::Get, || Ok("changed".into()))
            .unwrap();
        let b = cache
            .get_or_try_insert_with(id, "MySQL", StatementKind::Get, || Ok("B".into()))
            .unwrap();

        assert_eq!(&*a, "A");
        assert_eq!(&*again, "A");
        assert_eq!(&*b, "B");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = SqlCache::new();
        let id = TypeId::of::<u8>();
        let err = cache.get_or_try_insert_with(id, "SQLite", StatementKind::Update, || {
            Err(crate::CrudRsError::NoUpdatableFields {
                entity: "u8".into(),
            })
        });
        assert!(err.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_type() {
        let cache = SqlCache::new();
        let (a, b) = (TypeId::of::<u8>(), TypeId::of::<u16>());
        for id in [a, b] {
            cache
                .get_or_try_insert_with(id, "DB2", StatementKind::Delete, || Ok("x".into()))
                .unwrap();
        }
        cache.invalidate_type(a);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
