//! INSERT / UPDATE / DELETE text for entity writes.
//!
//! Table and column names come from `Entity` metadata and are quoted, values
//! are bound. Nulls are written as the `NULL` literal so the database never
//! has to infer a type for an untyped null parameter.

use crate::codec::{self, AnyQuery};
use recordkit_data::query::quote_identifier;
use recordkit_data::Dialect;
use serde_json::Value;

#[derive(Debug, Clone)]
pub(crate) struct Statement {
    dialect: Dialect,
    pub(crate) sql: String,
    pub(crate) params: Vec<Value>,
}

impl Statement {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    fn push_ident(&mut self, ident: &str) {
        self.sql.push_str(&quote_identifier(ident, self.dialect, false));
    }

    fn push_value(&mut self, value: Value) {
        if value.is_null() {
            self.sql.push_str("NULL");
        } else {
            self.params.push(value);
            self.sql.push_str(&self.dialect.placeholder(self.params.len()));
        }
    }

    pub(crate) fn query(&self) -> AnyQuery<'_> {
        codec::bind_all(sqlx::query(&self.sql), &self.params)
    }
}

pub(crate) fn insert(
    dialect: Dialect,
    table: &str,
    values: &[(&str, Value)],
    returning: Option<&str>,
) -> Statement {
    let mut stmt = Statement::new(dialect);
    stmt.push("INSERT INTO ");
    stmt.push_ident(table);
    if values.is_empty() {
        match dialect {
            Dialect::MySql => stmt.push(" () VALUES ()"),
            _ => stmt.push(" DEFAULT VALUES"),
        }
    } else {
        stmt.push(" (");
        for (i, (column, _)) in values.iter().enumerate() {
            if i > 0 {
                stmt.push(", ");
            }
            stmt.push_ident(column);
        }
        stmt.push(") VALUES (");
        for (i, (_, value)) in values.iter().enumerate() {
            if i > 0 {
                stmt.push(", ");
            }
            stmt.push_value(value.clone());
        }
        stmt.push(")");
    }
    if let Some(column) = returning {
        stmt.push(" RETURNING ");
        stmt.push_ident(column);
    }
    stmt
}

pub(crate) fn update(
    dialect: Dialect,
    table: &str,
    values: &[(&str, Value)],
    id_column: &str,
    id: Value,
) -> Statement {
    let mut stmt = Statement::new(dialect);
    stmt.push("UPDATE ");
    stmt.push_ident(table);
    stmt.push(" SET ");
    for (i, (column, value)) in values.iter().enumerate() {
        if i > 0 {
            stmt.push(", ");
        }
        stmt.push_ident(column);
        stmt.push(" = ");
        stmt.push_value(value.clone());
    }
    stmt.push(" WHERE ");
    stmt.push_ident(id_column);
    stmt.push(" = ");
    stmt.push_value(id);
    stmt
}

pub(crate) fn delete(dialect: Dialect, table: &str, column: &str, value: Value) -> Statement {
    let mut stmt = Statement::new(dialect);
    stmt.push("DELETE FROM ");
    stmt.push_ident(table);
    stmt.push(" WHERE ");
    stmt.push_ident(column);
    stmt.push(" = ");
    stmt.push_value(value);
    stmt
}

pub(crate) fn exists(dialect: Dialect, table: &str, id_column: &str, id: Value) -> Statement {
    let mut stmt = Statement::new(dialect);
    stmt.push("SELECT 1 FROM ");
    stmt.push_ident(table);
    stmt.push(" WHERE ");
    stmt.push_ident(id_column);
    stmt.push(" = ");
    stmt.push_value(id);
    stmt
}
