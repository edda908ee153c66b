use std::sync::Arc;

use crate::builders::{InsertKey, Statement, StatementBuilder};
use crate::dialect::DialectProfile;
use crate::error::{CrudRsError, Result};
use crate::metadata::resolve_table;
use crate::traits::{CommandOptions, DatabaseDriver, Entity, FieldType, TransactionId};
use crate::types::{EntityId, Filter, Parameters, QueryResult, SqlValue};

/// Runs CRUD statements against a driver.
/// Created from a CrudRsClient.
///
/// Without a pinned dialect every call builds its statement for the
/// process-wide dialect at that moment.
#[derive(Clone)]
pub struct Querier {
    driver: Arc<dyn DatabaseDriver>,
    profile: Option<DialectProfile>,
    options: CommandOptions,
}

impl Querier {
    pub(crate) fn new(driver: Arc<dyn DatabaseDriver>, profile: Option<DialectProfile>) -> Self {
        Self {
            driver,
            profile,
            options: CommandOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CommandOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs subsequent commands inside a driver transaction.
    pub fn in_transaction(mut self, transaction: TransactionId) -> Self {
        self.options.transaction = Some(transaction);
        self
    }

    /// Command timeout in seconds, forwarded to the driver.
    pub fn timeout(mut self, seconds: u32) -> Self {
        self.options.timeout = Some(seconds);
        self
    }

    pub fn options(&self) -> &CommandOptions {
        &self.options
    }

    /// The builder used for the next statement.
    pub fn builder(&self) -> StatementBuilder {
        match self.profile {
            Some(profile) => StatementBuilder::new(profile),
            None => StatementBuilder::current(),
        }
    }

    /// Fetches one entity by key. `None` when no row matches.
    pub async fn get<T: Entity>(&self, id: impl Into<EntityId>) -> Result<Option<T>> {
        let statement = self.builder().get::<T>(id)?;
        let result = self.fetch(&statement).await?;
        result.first_row().map(|row| T::from_row(&row)).transpose()
    }

    /// Fetches every entity matching `filter` exactly.
    pub async fn get_list<T: Entity>(&self, filter: &Filter) -> Result<Vec<T>> {
        let statement = self.builder().get_list::<T>(Some(filter))?;
        self.fetch_all(&statement).await
    }

    pub async fn get_all<T: Entity>(&self) -> Result<Vec<T>> {
        let statement = self.builder().get_list::<T>(None)?;
        self.fetch_all(&statement).await
    }

    /// Fetches entities with caller-written conditions, e.g.
    /// `"where age > @age order by name"`.
    pub async fn get_list_where<T: Entity>(
        &self,
        conditions: &str,
        params: Parameters,
    ) -> Result<Vec<T>> {
        let statement = self.builder().get_list_where::<T>(conditions, params)?;
        self.fetch_all(&statement).await
    }

    pub async fn get_list_paged<T: Entity>(
        &self,
        page: u32,
        rows_per_page: u32,
        conditions: &str,
        order_by: Option<&str>,
        params: Parameters,
    ) -> Result<Vec<T>> {
        let statement = self
            .builder()
            .get_list_paged::<T>(page, rows_per_page, conditions, order_by, params)?;
        self.fetch_all(&statement).await
    }

    /// Inserts `entity` and returns its key as `K`.
    ///
    /// Generated uuid keys and database identities are written back to
    /// `entity`.
    pub async fn insert<T: Entity, K: FieldType>(&self, entity: &mut T) -> Result<K> {
        let table = resolve_table::<T>();
        let key = table.single_key("Insert")?;
        if !K::KIND.is_insert_key() {
            return Err(CrudRsError::UnsupportedKeyType {
                entity: table.entity_name.clone(),
                kind: K::KIND.to_string(),
            });
        }
        if key.kind.is_insert_key() && !K::KIND.can_return_key(key.kind) {
            return Err(CrudRsError::KeyTypeMismatch {
                entity: table.entity_name.clone(),
                key: key.kind.to_string(),
                requested: K::KIND.to_string(),
            });
        }

        let plan = self.builder().insert(entity)?;
        match plan.key {
            InsertKey::Identity => {
                let row = self
                    .fetch(&plan.statement)
                    .await?
                    .first_row()
                    .ok_or(CrudRsError::UnexpectedRowCount {
                        expected: 1,
                        actual: 0,
                    })?;
                let id = row
                    .get("id")
                    .cloned()
                    .ok_or_else(|| CrudRsError::ColumnNotFound("id".to_string()))?;
                entity.set_field_value(&plan.key_field, &id)?;
                K::from_sql(&id)
            }
            InsertKey::Supplied(id) => {
                self.run(&plan.statement).await?;
                K::from_sql(&id)
            }
        }
    }

    /// Updates the row with the entity's keys. Returns the affected row count.
    pub async fn update<T: Entity>(&self, entity: &T) -> Result<u64> {
        let statement = self.builder().update(entity)?;
        self.run(&statement).await
    }

    pub async fn upsert<T: Entity>(&self, entity: &T) -> Result<u64> {
        let statement = self.builder().upsert(entity)?;
        self.run(&statement).await
    }

    pub async fn delete<T: Entity>(&self, entity: &T) -> Result<u64> {
        let statement = self.builder().delete(entity)?;
        self.run(&statement).await
    }

    pub async fn delete_by_id<T: Entity>(&self, id: impl Into<EntityId>) -> Result<u64> {
        let statement = self.builder().delete_by_id::<T>(id)?;
        self.run(&statement).await
    }

    pub async fn delete_list<T: Entity>(&self, conditions: &str, params: Parameters) -> Result<u64> {
        let statement = self.builder().delete_list::<T>(conditions, params)?;
        self.run(&statement).await
    }

    pub async fn record_count<T: Entity>(&self, conditions: &str, params: Parameters) -> Result<i64> {
        let statement = self.builder().record_count::<T>(conditions, params)?;
        self.count(&statement).await
    }

    pub async fn record_count_filter<T: Entity>(&self, filter: &Filter) -> Result<i64> {
        let statement = self.builder().record_count_filter::<T>(Some(filter))?;
        self.count(&statement).await
    }

    /// Executes raw SQL and returns the affected row count.
    pub async fn execute(&self, sql: &str, params: &Parameters) -> Result<u64> {
        self.driver.execute(sql, params, &self.options).await
    }

    /// Executes raw SQL and returns its rows.
    pub async fn query(&self, sql: &str, params: &Parameters) -> Result<QueryResult> {
        let raw = self.driver.query(sql, params, &self.options).await?;
        Ok(QueryResult::from_raw(raw))
    }

    async fn run(&self, statement: &Statement) -> Result<u64> {
        self.execute(&statement.sql, &statement.params).await
    }

    async fn fetch(&self, statement: &Statement) -> Result<QueryResult> {
        self.query(&statement.sql, &statement.params).await
    }

    async fn fetch_all<T: Entity>(&self, statement: &Statement) -> Result<Vec<T>> {
        self.fetch(statement)
            .await?
            .rows_ref()
            .iter()
            .map(T::from_row)
            .collect()
    }

    async fn count(&self, statement: &Statement) -> Result<i64> {
        let value = self
            .driver
            .query_scalar(&statement.sql, &statement.params, &self.options)
            .await?;
        match value {
            SqlValue::Null => Ok(0),
            value => i64::from_sql(&value),
        }
    }
}
