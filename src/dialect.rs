//! SQL dialect profiles and the process-wide dialect setting.
//!
//! A [`DialectProfile`] carries everything that differs between databases:
//! identifier quoting, the statement appended to an INSERT to read back the
//! generated identity, and the templates for paged selects and upserts.

use std::fmt;
use std::str::FromStr;

use parking_lot::RwLock;

use crate::error::{CrudRsError, Result};

/// Supported database dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    #[default]
    SqlServer,
    PostgreSql,
    Sqlite,
    MySql,
    Oracle,
    Db2,
}

impl Dialect {
    pub const ALL: [Dialect; 6] = [
        Dialect::SqlServer,
        Dialect::PostgreSql,
        Dialect::Sqlite,
        Dialect::MySql,
        Dialect::Oracle,
        Dialect::Db2,
    ];

    pub fn name(self) -> &'static str {
        self.profile().name
    }

    pub fn profile(self) -> DialectProfile {
        match self {
            Dialect::SqlServer => SQL_SERVER,
            Dialect::PostgreSql => POSTGRESQL,
            Dialect::Sqlite => SQLITE,
            Dialect::MySql => MYSQL,
            Dialect::Oracle => ORACLE,
            Dialect::Db2 => DB2,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = CrudRsError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Dialect::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CrudRsError::UnknownDialect(s.to_string()))
    }
}

/// Immutable description of one SQL dialect.
///
/// Paged templates understand `{SelectColumns}`, `{TableName}`,
/// `{WhereClause}`, `{OrderBy}`, `{PageNumber}`, `{RowsPerPage}` and
/// `{Offset}`. Upsert templates understand `{UpdateStatement}`,
/// `{TableName}`, `{InsertColumns}` and `{InsertValues}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectProfile {
    pub name: &'static str,
    pub quote_open: char,
    pub quote_close: char,
    /// Appended after `;` to an INSERT whose integer key the database assigns.
    pub identity_sql: Option<&'static str>,
    pub paged_sql: Option<&'static str>,
    pub upsert_sql: Option<&'static str>,
    /// Tail of an INSERT that has no insertable columns.
    pub default_values_sql: &'static str,
}

impl DialectProfile {
    /// Quotes an identifier, doubling any embedded closing quote.
    pub fn quote(&self, identifier: &str) -> String {
        let mut out = String::with_capacity(identifier.len() + 2);
        out.push(self.quote_open);
        for c in identifier.chars() {
            if c == self.quote_close {
                out.push(c);
            }
            out.push(c);
        }
        out.push(self.quote_close);
        out
    }
}

pub const SQL_SERVER: DialectProfile = DialectProfile {
    name: "SQLServer",
    quote_open: '[',
    quote_close: ']',
    identity_sql: Some("SELECT CAST(SCOPE_IDENTITY() AS BIGINT) AS [id]"),
    paged_sql: Some(
        "SELECT * FROM (SELECT ROW_NUMBER() OVER(ORDER BY {OrderBy}) AS PagedNumber, {SelectColumns} FROM {TableName} {WhereClause}) AS u WHERE PagedNumber BETWEEN (({PageNumber}-1) * {RowsPerPage} + 1) AND ({PageNumber} * {RowsPerPage})",
    ),
    upsert_sql: Some(
        "{UpdateStatement}; IF @@ROWCOUNT = 0 BEGIN INSERT INTO {TableName} ({InsertColumns}) VALUES ({InsertValues}) END",
    ),
    default_values_sql: "DEFAULT VALUES",
};

pub const POSTGRESQL: DialectProfile = DialectProfile {
    name: "PostgreSQL",
    quote_open: '"',
    quote_close: '"',
    identity_sql: Some("SELECT LASTVAL() AS id"),
    paged_sql: Some(
        "SELECT {SelectColumns} FROM {TableName} {WhereClause} ORDER BY {OrderBy} LIMIT {RowsPerPage} OFFSET {Offset}",
    ),
    upsert_sql: Some(
        "WITH upsert AS ({UpdateStatement} RETURNING 1) INSERT INTO {TableName} ({InsertColumns}) SELECT {InsertValues} WHERE NOT EXISTS (SELECT 1 FROM upsert)",
    ),
    default_values_sql: "DEFAULT VALUES",
};

pub const SQLITE: DialectProfile = DialectProfile {
    name: "SQLite",
    quote_open: '"',
    quote_close: '"',
    identity_sql: Some("SELECT LAST_INSERT_ROWID() AS id"),
    paged_sql: Some(
        "SELECT {SelectColumns} FROM {TableName} {WhereClause} ORDER BY {OrderBy} LIMIT {RowsPerPage} OFFSET {Offset}",
    ),
    upsert_sql: Some(
        "{UpdateStatement}; INSERT INTO {TableName} ({InsertColumns}) SELECT {InsertValues} WHERE changes() = 0",
    ),
    default_values_sql: "DEFAULT VALUES",
};

// ROW_COUNT() reports changed rows, so an UPDATE writing identical values
// still falls through to the INSERT unless the connection uses CLIENT_FOUND_ROWS.
pub const MYSQL: DialectProfile = DialectProfile {
    name: "MySQL",
    quote_open: '`',
    quote_close: '`',
    identity_sql: Some("SELECT LAST_INSERT_ID() AS id"),
    paged_sql: Some(
        "SELECT {SelectColumns} FROM {TableName} {WhereClause} ORDER BY {OrderBy} LIMIT {Offset},{RowsPerPage}",
    ),
    upsert_sql: Some(
        "{UpdateStatement}; INSERT INTO {TableName} ({InsertColumns}) SELECT {InsertValues} FROM DUAL WHERE ROW_COUNT() = 0",
    ),
    default_values_sql: "() VALUES ()",
};

/// Keys must be supplied by the caller or assigned by a trigger.
pub const ORACLE: DialectProfile = DialectProfile {
    name: "Oracle",
    quote_open: '"',
    quote_close: '"',
    identity_sql: None,
    paged_sql: Some(
        "SELECT * FROM (SELECT ROWNUM PagedNumber, u.* FROM (SELECT {SelectColumns} FROM {TableName} {WhereClause} ORDER BY {OrderBy}) u) WHERE PagedNumber BETWEEN (({PageNumber}-1) * {RowsPerPage} + 1) AND ({PageNumber} * {RowsPerPage})",
    ),
    upsert_sql: None,
    default_values_sql: "DEFAULT VALUES",
};

pub const DB2: DialectProfile = DialectProfile {
    name: "DB2",
    quote_open: '"',
    quote_close: '"',
    identity_sql: Some(
        "SELECT CAST(IDENTITY_VAL_LOCAL() AS DEC(31,0)) AS \"id\" FROM SYSIBM.SYSDUMMY1",
    ),
    paged_sql: Some(
        "SELECT * FROM (SELECT ROW_NUMBER() OVER(ORDER BY {OrderBy}) AS PagedNumber, {SelectColumns} FROM {TableName} {WhereClause}) AS u WHERE PagedNumber BETWEEN (({PageNumber}-1) * {RowsPerPage} + 1) AND ({PageNumber} * {RowsPerPage})",
    ),
    upsert_sql: None,
    default_values_sql: "DEFAULT VALUES",
};

static CURRENT: RwLock<Dialect> = parking_lot::const_rwlock(Dialect::SqlServer);

/// Sets the process-wide dialect used by [`crate::StatementBuilder::current`].
///
/// Last write wins. Builders created before the call keep the dialect they
/// captured.
pub fn set_dialect(dialect: Dialect) {
    log::debug!("Switching SQL dialect to {}", dialect);
    *CURRENT.write() = dialect;
}

/// Returns the process-wide dialect.
pub fn get_dialect() -> Dialect {
    *CURRENT.read()
}
