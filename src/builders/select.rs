use crate::builders::statement::{
    append_conditions, bind_id, filter_clause, key_condition, Statement, StatementBuilder,
};
use crate::cache::StatementKind;
use crate::error::{CrudRsError, Result};
use crate::metadata::resolve_table;
use crate::traits::Entity;
use crate::types::{EntityId, Filter, Parameters};

impl StatementBuilder {
    /// `SELECT ... FROM t WHERE k = @k [AND ...]`
    pub fn get<T: Entity>(&self, id: impl Into<EntityId>) -> Result<Statement> {
        let table = resolve_table::<T>();
        let keys = table.require_keys("Get")?;

        let mut params = Parameters::new();
        bind_id(&table, &keys, id.into(), "Get", &mut params)?;

        let sql = self.cached::<T>(StatementKind::Get, || {
            Ok(format!(
                "SELECT {} FROM {} WHERE {}",
                self.select_columns::<T>(&table)?,
                self.table_name(&table),
                key_condition(&keys)
            ))
        })?;
        Ok(Statement::new(&*sql, params))
    }

    /// `SELECT ... FROM t [WHERE ...]` with one exact match per filter field.
    pub fn get_list<T: Entity>(&self, filter: Option<&Filter>) -> Result<Statement> {
        let table = resolve_table::<T>();
        table.require_keys("GetList")?;

        let mut sql = format!(
            "SELECT {} FROM {}",
            self.select_columns::<T>(&table)?,
            self.table_name(&table)
        );
        let mut params = Parameters::new();
        if let Some(clause) = filter_clause(&table, filter)? {
            sql.push_str(" WHERE ");
            sql.push_str(&clause.build_sql(&mut params));
        }
        Ok(Statement::new(sql, params))
    }

    /// `SELECT ... FROM t <conditions>`, conditions appended verbatim.
    pub fn get_list_where<T: Entity>(
        &self,
        conditions: &str,
        params: Parameters,
    ) -> Result<Statement> {
        let table = resolve_table::<T>();
        table.require_keys("GetList")?;

        let mut sql = format!(
            "SELECT {} FROM {}",
            self.select_columns::<T>(&table)?,
            self.table_name(&table)
        );
        append_conditions(&mut sql, conditions);
        Ok(Statement::new(sql, params))
    }

    /// One page of rows through the dialect's paging template.
    ///
    /// `page` starts at 1. Without `order_by` rows are ordered by the first
    /// key column.
    pub fn get_list_paged<T: Entity>(
        &self,
        page: u32,
        rows_per_page: u32,
        conditions: &str,
        order_by: Option<&str>,
        params: Parameters,
    ) -> Result<Statement> {
        let template = self
            .profile()
            .paged_sql
            .ok_or_else(|| CrudRsError::PagingNotSupported {
                dialect: self.profile().name.to_string(),
            })?;
        if page < 1 {
            return Err(CrudRsError::InvalidPageNumber(page));
        }

        let table = resolve_table::<T>();
        let keys = table.require_keys("GetListPaged")?;
        let order_by = match order_by.map(str::trim) {
            Some(order) if !order.is_empty() => order.to_string(),
            _ => keys[0].column_name.clone(),
        };
        let offset = u64::from(page - 1) * u64::from(rows_per_page);

        let sql = template
            .replace("{SelectColumns}", &self.select_columns::<T>(&table)?)
            .replace("{TableName}", &self.table_name(&table))
            .replace("{WhereClause}", conditions.trim())
            .replace("{OrderBy}", &order_by)
            .replace("{PageNumber}", &page.to_string())
            .replace("{RowsPerPage}", &rows_per_page.to_string())
            .replace("{Offset}", &offset.to_string());
        Ok(Statement::new(sql, params))
    }

    /// `SELECT count(1) FROM t <conditions>`
    pub fn record_count<T: Entity>(&self, conditions: &str, params: Parameters) -> Result<Statement> {
        let table = resolve_table::<T>();
        let mut sql = format!("SELECT count(1) FROM {}", self.table_name(&table));
        append_conditions(&mut sql, conditions);
        Ok(Statement::new(sql, params))
    }

    /// `SELECT count(1) FROM t [WHERE ...]` with the same matching as `get_list`.
    pub fn record_count_filter<T: Entity>(&self, filter: Option<&Filter>) -> Result<Statement> {
        let table = resolve_table::<T>();
        let mut sql = format!("SELECT count(1) FROM {}", self.table_name(&table));
        let mut params = Parameters::new();
        if let Some(clause) = filter_clause(&table, filter)? {
            sql.push_str(" WHERE ");
            sql.push_str(&clause.build_sql(&mut params));
        }
        Ok(Statement::new(sql, params))
    }
}
