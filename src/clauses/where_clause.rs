use crate::types::{Parameters, SqlValue};

/// Represents a WHERE clause condition over mapped columns.
/// Values are bound as `@param`, never interpolated.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    /// column = @param
    Eq {
        column: String,
        param: String,
        value: SqlValue,
    },
    /// column is null
    IsNull(String),
    /// clause AND clause AND ...
    And(Vec<WhereClause>),
}

impl WhereClause {
    /// Creates an equality condition bound to a parameter named after the field.
    pub fn eq(column: impl Into<String>, param: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        WhereClause::Eq {
            column: column.into(),
            param: param.into(),
            value: value.into(),
        }
    }

    /// Like [`WhereClause::eq`], except a null value becomes `column is null`.
    pub fn matching(column: impl Into<String>, param: impl Into<String>, value: SqlValue) -> Self {
        if value.is_null() {
            WhereClause::IsNull(column.into())
        } else {
            WhereClause::eq(column, param, value)
        }
    }

    /// Combines this clause with another using AND
    pub fn and(self, other: WhereClause) -> Self {
        match self {
            WhereClause::And(mut clauses) => {
                clauses.push(other);
                WhereClause::And(clauses)
            }
            clause => WhereClause::And(vec![clause, other]),
        }
    }

    /// Builds the SQL text without binding anything.
    pub fn render(&self) -> String {
        match self {
            WhereClause::Eq { column, param, .. } => format!("{} = @{}", column, param),
            WhereClause::IsNull(column) => format!("{} is null", column),
            WhereClause::And(clauses) => clauses
                .iter()
                .map(WhereClause::render)
                .collect::<Vec<_>>()
                .join(" AND "),
        }
    }

    /// Binds the values of every equality condition.
    pub fn bind(&self, params: &mut Parameters) {
        match self {
            WhereClause::Eq { param, value, .. } => params.insert(param.clone(), value.clone()),
            WhereClause::IsNull(_) => {}
            WhereClause::And(clauses) => clauses.iter().for_each(|c| c.bind(params)),
        }
    }

    /// Builds the SQL string and collects parameters.
    pub fn build_sql(&self, params: &mut Parameters) -> String {
        self.bind(params);
        self.render()
    }

    /// AND-joins `clauses`; `None` when there are none.
    pub fn all(clauses: impl IntoIterator<Item = WhereClause>) -> Option<Self> {
        clauses.into_iter().reduce(WhereClause::and)
    }
}
