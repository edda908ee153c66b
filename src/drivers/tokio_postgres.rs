use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, NoTls, Row, Statement};
use uuid::Uuid;

use crate::error::{CrudRsError, Result};
use crate::traits::{CommandOptions, DatabaseDriver};
use crate::types::{Parameters, RawQueryResult, SqlValue};

type BoxedParam = Box<dyn ToSql + Sync + Send>;

/// PostgreSQL driver implementation using tokio-postgres.
///
/// `@name` markers are rewritten to `$n` and statement text holding several
/// statements is run one statement at a time; `query` returns the rows of
/// the last one.
pub struct TokioPostgresDriver {
    client: Client,
}

impl TokioPostgresDriver {
    /// Connect to a PostgreSQL database.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(|e| CrudRsError::ConnectionFailed(e.to_string()))?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("PostgreSQL connection error: {}", e);
            }
        });

        Ok(Self { client })
    }

    async fn prepare(&self, sql: &str, params: &Parameters) -> Result<(Statement, Vec<BoxedParam>)> {
        let (positional, names) = rewrite_parameters(sql);
        let statement = self
            .client
            .prepare(&positional)
            .await
            .map_err(|e| CrudRsError::QueryFailed(e.to_string()))?;

        let values = names
            .iter()
            .zip(statement.params())
            .map(|(name, ty)| {
                let value = params.get(name).ok_or_else(|| {
                    CrudRsError::QueryFailed(format!("No value bound for parameter @{}", name))
                })?;
                to_sql_for(value, ty)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((statement, values))
    }

    async fn execute_one(&self, sql: &str, params: &Parameters) -> Result<u64> {
        let (statement, values) = self.prepare(sql, params).await?;
        self.client
            .execute(&statement, &param_refs(&values))
            .await
            .map_err(|e| CrudRsError::QueryFailed(e.to_string()))
    }

    async fn query_one(&self, sql: &str, params: &Parameters) -> Result<RawQueryResult> {
        let (statement, values) = self.prepare(sql, params).await?;
        let rows = self
            .client
            .query(&statement, &param_refs(&values))
            .await
            .map_err(|e| CrudRsError::QueryFailed(e.to_string()))?;

        let columns = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let rows = rows
            .iter()
            .map(convert_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(RawQueryResult::new(columns, rows))
    }

    async fn run_execute(&self, sql: &str, params: &Parameters) -> Result<u64> {
        let mut affected = 0;
        for statement in split_statements(sql) {
            affected += self.execute_one(statement, params).await?;
        }
        Ok(affected)
    }

    async fn run_query(&self, sql: &str, params: &Parameters) -> Result<RawQueryResult> {
        let statements = split_statements(sql);
        let Some((last, leading)) = statements.split_last() else {
            return Ok(RawQueryResult::empty());
        };
        for statement in leading {
            self.execute_one(statement, params).await?;
        }
        self.query_one(last, params).await
    }
}

#[async_trait]
impl DatabaseDriver for TokioPostgresDriver {
    async fn execute(
        &self,
        sql: &str,
        params: &Parameters,
        options: &CommandOptions,
    ) -> Result<u64> {
        check_options(options)?;
        with_timeout(options, self.run_execute(sql, params)).await
    }

    async fn query(
        &self,
        sql: &str,
        params: &Parameters,
        options: &CommandOptions,
    ) -> Result<RawQueryResult> {
        check_options(options)?;
        with_timeout(options, self.run_query(sql, params)).await
    }
}

fn check_options(options: &CommandOptions) -> Result<()> {
    match options.transaction {
        Some(transaction) => Err(CrudRsError::QueryFailed(format!(
            "TokioPostgresDriver does not manage transactions (got {:?})",
            transaction
        ))),
        None => Ok(()),
    }
}

async fn with_timeout<T>(
    options: &CommandOptions,
    work: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    match options.timeout {
        Some(seconds) => tokio::time::timeout(Duration::from_secs(u64::from(seconds)), work)
            .await
            .map_err(|_| CrudRsError::QueryFailed(format!("Command timed out after {}s", seconds)))?,
        None => work.await,
    }
}

fn param_refs(values: &[BoxedParam]) -> Vec<&(dyn ToSql + Sync)> {
    values
        .iter()
        .map(|b| b.as_ref() as &(dyn ToSql + Sync))
        .collect()
}

/// Splits on `;` outside quoted text, dropping empty statements.
fn split_statements(sql: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in sql.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ';') => {
                statements.push(&sql[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    statements.push(&sql[start..]);
    statements
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Rewrites `@name` markers to `$n`, returning the names in placeholder order.
/// A name used twice keeps its first number; `@@` and quoted text are left alone.
fn rewrite_parameters(sql: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(sql.len());
    let mut names: Vec<String> = Vec::new();
    let mut quote: Option<char> = None;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            out.push(c);
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                out.push(c);
            }
            '@' if chars.peek() == Some(&'@') => {
                out.push_str("@@");
                chars.next();
            }
            '@' if chars.peek().is_some_and(|n| n.is_alphabetic() || *n == '_') => {
                let mut name = String::new();
                while let Some(&n) = chars.peek() {
                    if !(n.is_alphanumeric() || n == '_') {
                        break;
                    }
                    name.push(n);
                    chars.next();
                }
                let position = match names.iter().position(|existing| existing.eq_ignore_ascii_case(&name)) {
                    Some(position) => position,
                    None => {
                        names.push(name);
                        names.len() - 1
                    }
                };
                out.push('$');
                out.push_str(&(position + 1).to_string());
            }
            _ => out.push(c),
        }
    }
    (out, names)
}

fn conversion(expected: &'static str, value: &SqlValue) -> CrudRsError {
    CrudRsError::ValueConversion {
        expected,
        found: value.type_name().to_string(),
    }
}

/// Converts a value to the Rust type tokio-postgres expects for `ty`.
fn to_sql_for(value: &SqlValue, ty: &Type) -> Result<BoxedParam> {
    if let Some(int) = value.as_integer() {
        return integer_for(int, value, ty);
    }
    let boxed: BoxedParam = match value {
        SqlValue::Null => null_for(ty),
        SqlValue::Bool(v) => Box::new(*v),
        SqlValue::Float(v) if *ty == Type::FLOAT8 => Box::new(f64::from(*v)),
        SqlValue::Float(v) => Box::new(*v),
        SqlValue::Double(v) if *ty == Type::FLOAT4 => Box::new(*v as f32),
        SqlValue::Double(v) => Box::new(*v),
        SqlValue::Text(v) => Box::new(v.clone()),
        SqlValue::Bytes(v) => Box::new(v.clone()),
        SqlValue::Uuid(v) => Box::new(*v),
        SqlValue::Date(v) => Box::new(*v),
        SqlValue::DateTime(v) if *ty == Type::TIMESTAMPTZ => Box::new(v.and_utc()),
        SqlValue::DateTime(v) => Box::new(*v),
        SqlValue::DateTimeUtc(v) if *ty == Type::TIMESTAMP => Box::new(v.naive_utc()),
        SqlValue::DateTimeUtc(v) => Box::new(*v),
        other => return Err(conversion("a PostgreSQL parameter", other)),
    };
    Ok(boxed)
}

fn integer_for(int: i128, value: &SqlValue, ty: &Type) -> Result<BoxedParam> {
    let boxed: BoxedParam = if *ty == Type::INT2 {
        Box::new(i16::try_from(int).map_err(|_| conversion("i16", value))?)
    } else if *ty == Type::INT4 {
        Box::new(i32::try_from(int).map_err(|_| conversion("i32", value))?)
    } else if *ty == Type::OID {
        Box::new(u32::try_from(int).map_err(|_| conversion("u32", value))?)
    } else if *ty == Type::FLOAT4 {
        Box::new(int as f32)
    } else if *ty == Type::FLOAT8 {
        Box::new(int as f64)
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR {
        Box::new(int.to_string())
    } else {
        Box::new(i64::try_from(int).map_err(|_| conversion("i64", value))?)
    };
    Ok(boxed)
}

fn null_for(ty: &Type) -> BoxedParam {
    if *ty == Type::BOOL {
        Box::new(None::<bool>)
    } else if *ty == Type::INT2 {
        Box::new(None::<i16>)
    } else if *ty == Type::INT4 {
        Box::new(None::<i32>)
    } else if *ty == Type::INT8 {
        Box::new(None::<i64>)
    } else if *ty == Type::FLOAT4 {
        Box::new(None::<f32>)
    } else if *ty == Type::FLOAT8 {
        Box::new(None::<f64>)
    } else if *ty == Type::BYTEA {
        Box::new(None::<Vec<u8>>)
    } else if *ty == Type::UUID {
        Box::new(None::<Uuid>)
    } else if *ty == Type::DATE {
        Box::new(None::<NaiveDate>)
    } else if *ty == Type::TIMESTAMP {
        Box::new(None::<NaiveDateTime>)
    } else if *ty == Type::TIMESTAMPTZ {
        Box::new(None::<DateTime<Utc>>)
    } else {
        Box::new(None::<String>)
    }
}

fn convert_row(row: &Row) -> Result<Vec<SqlValue>> {
    (0..row.len())
        .map(|i| convert_value(row, i, row.columns()[i].type_()))
        .collect()
}

fn get<'a, T>(row: &'a Row, index: usize) -> Result<SqlValue>
where
    T: tokio_postgres::types::FromSql<'a> + Into<SqlValue>,
{
    row.try_get::<_, Option<T>>(index)
        .map(SqlValue::from)
        .map_err(|e| CrudRsError::QueryFailed(e.to_string()))
}

/// Convert a row value at a given index to a SqlValue.
fn convert_value(row: &Row, index: usize, ty: &Type) -> Result<SqlValue> {
    if *ty == Type::BOOL {
        get::<bool>(row, index)
    } else if *ty == Type::INT2 {
        get::<i16>(row, index)
    } else if *ty == Type::INT4 {
        get::<i32>(row, index)
    } else if *ty == Type::INT8 {
        get::<i64>(row, index)
    } else if *ty == Type::OID {
        get::<u32>(row, index)
    } else if *ty == Type::FLOAT4 {
        get::<f32>(row, index)
    } else if *ty == Type::FLOAT8 {
        get::<f64>(row, index)
    } else if *ty == Type::BYTEA {
        get::<Vec<u8>>(row, index)
    } else if *ty == Type::UUID {
        get::<Uuid>(row, index)
    } else if *ty == Type::DATE {
        get::<NaiveDate>(row, index)
    } else if *ty == Type::TIMESTAMP {
        get::<NaiveDateTime>(row, index)
    } else if *ty == Type::TIMESTAMPTZ {
        get::<DateTime<Utc>>(row, index)
    } else {
        // Text-like and anything else the server can hand back as text.
        get::<String>(row, index)
    }
}
