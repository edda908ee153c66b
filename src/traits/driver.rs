use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Parameters, RawQueryResult, SqlValue};

/// Opaque handle of a driver-side transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(pub u64);

/// Per-command settings forwarded untouched to the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandOptions {
    pub transaction: Option<TransactionId>,
    /// Seconds.
    pub timeout: Option<u32>,
}

/// Trait for database driver implementations.
/// Drivers are responsible for:
/// - Connecting to the database
/// - Converting SqlValue parameters to native types
/// - Executing statements and converting results to RawQueryResult
///
/// Statements reference parameters as `@name`; a driver for a database with
/// positional placeholders rewrites them. Statement text may hold several
/// statements separated by `;`.
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Execute a statement and return the number of affected rows.
    async fn execute(
        &self,
        sql: &str,
        params: &Parameters,
        options: &CommandOptions,
    ) -> Result<u64>;

    /// Execute a statement and return the rows it produced.
    async fn query(
        &self,
        sql: &str,
        params: &Parameters,
        options: &CommandOptions,
    ) -> Result<RawQueryResult>;

    /// First column of the first row, or null when nothing came back.
    async fn query_scalar(
        &self,
        sql: &str,
        params: &Parameters,
        options: &CommandOptions,
    ) -> Result<SqlValue> {
        let result = self.query(sql, params, options).await?;
        Ok(result
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .unwrap_or(SqlValue::Null))
    }
}
