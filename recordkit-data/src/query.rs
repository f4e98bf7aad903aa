use crate::entity::{Entity, Relation, RelationKind, REFERENCE_ID};
use crate::row;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Separator between a table alias and a column in selected column aliases
/// (`object__name`).
pub const ALIAS_SEPARATOR: &str = "__";

/// Alias of the root table in repository queries.
pub const ROOT_ALIAS: &str = "object";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Generic SQL using `?` placeholders (default).
    Generic,
    /// SQLite-style `?` placeholders.
    Sqlite,
    /// MySQL-style `?` placeholders with backtick quoting.
    MySql,
    /// Postgres-style `$1, $2, ...` placeholders.
    Postgres,
}

impl Dialect {
    /// Pick the dialect matching a connection URL scheme.
    pub fn from_url(url: &str) -> Self {
        let scheme = url.split(':').next().unwrap_or_default().to_ascii_lowercase();
        match scheme.as_str() {
            "postgres" | "postgresql" => Dialect::Postgres,
            "mysql" | "mariadb" => Dialect::MySql,
            "sqlite" => Dialect::Sqlite,
            _ => Dialect::Generic,
        }
    }

    pub fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Generic | Dialect::Sqlite | Dialect::MySql => "?".to_string(),
        }
    }

    pub fn quote_char(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Generic | Dialect::Sqlite | Dialect::Postgres => '"',
        }
    }

    /// Render `expr` converted to text so it can be matched with `LIKE`.
    pub fn cast_to_text(self, expr: &str) -> String {
        match self {
            Dialect::Postgres => format!("{expr}::text"),
            Dialect::MySql => format!("CAST({expr} AS CHAR)"),
            Dialect::Generic | Dialect::Sqlite => format!("CAST({expr} AS TEXT)"),
        }
    }

    /// The case-sensitive substring match operator.
    ///
    /// MySQL's default collations compare case-insensitively, so the pattern
    /// is matched byte for byte there.
    pub fn like_operator(self) -> &'static str {
        match self {
            Dialect::MySql => "LIKE BINARY",
            Dialect::Generic | Dialect::Sqlite | Dialect::Postgres => "LIKE",
        }
    }

    /// Whether `INSERT ... RETURNING` is available.
    pub fn supports_returning(self) -> bool {
        !matches!(self, Dialect::MySql)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum IdentifierPolicy {
    /// Validate identifiers against a conservative pattern.
    Validate,
    /// Validate and quote identifiers using the dialect quoting style.
    Quote,
}

/// A fluent builder for SELECT and COUNT queries over one entity table.
///
/// Every identifier is validated before it reaches the SQL text, and every
/// value is bound through a placeholder.
///
/// # Example
///
/// ```ignore
/// let q = QueryBuilder::for_entity::<Person>("object")
///     .dialect(Dialect::Postgres)
///     .or_where_like("object.name", "%foo%", false)
///     .or_where_like("object.age", "%foo%", true)
///     .order_by("object.name", true)
///     .offset(10)
///     .limit(10)
///     .left_join_and_select("team", "team");
/// let (sql, params) = q.build_select()?;
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    alias: Option<String>,
    columns: Vec<String>,
    id_column: String,
    relations: &'static [Relation],
    conditions: Vec<Condition>,
    any_of: Vec<Condition>,
    joins: Vec<Join>,
    order: Vec<(String, bool)>,
    limit_val: Option<u64>,
    offset_val: Option<u64>,
    dialect: Dialect,
    identifier_policy: IdentifierPolicy,
}

#[derive(Debug, Clone)]
enum Condition {
    Eq(String, Value),
    Like(String, String),
    /// `LIKE` against the column converted to text.
    TextLike(String, String),
}

#[derive(Debug, Clone)]
struct Join {
    field: String,
    alias: String,
}

impl QueryBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            alias: None,
            columns: Vec::new(),
            id_column: REFERENCE_ID.to_string(),
            relations: &[],
            conditions: Vec::new(),
            any_of: Vec::new(),
            joins: Vec::new(),
            order: Vec::new(),
            limit_val: None,
            offset_val: None,
            dialect: Dialect::Generic,
            identifier_policy: IdentifierPolicy::Validate,
        }
    }

    /// Create a builder selecting `E`'s columns from its table under `alias`.
    pub fn for_entity<E: Entity>(alias: &str) -> Self {
        let mut builder = Self::new(E::table_name());
        builder.alias = Some(alias.to_string());
        builder.columns = E::columns().iter().map(|c| c.to_string()).collect();
        builder.id_column = E::id_column().to_string();
        builder.relations = E::relations();
        builder.identifier_policy = IdentifierPolicy::Quote;
        builder
    }

    /// Set the SQL dialect (affects placeholder style, quoting and casts).
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Configure identifier quoting behavior.
    pub fn identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    pub fn where_eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Eq(column.to_string(), value.into()));
        self
    }

    /// Add a `LIKE` predicate to the OR group.
    ///
    /// All OR predicates render as one parenthesised group, ANDed with the
    /// [`where_eq`](Self::where_eq) conditions. With `cast_to_text` the column is
    /// converted to text first, so numeric columns can be matched by
    /// partial text.
    pub fn or_where_like(mut self, column: &str, pattern: &str, cast_to_text: bool) -> Self {
        let condition = if cast_to_text {
            Condition::TextLike(column.to_string(), pattern.to_string())
        } else {
            Condition::Like(column.to_string(), pattern.to_string())
        };
        self.any_of.push(condition);
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order.push((column.to_string(), ascending));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_val = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset_val = Some(offset);
        self
    }

    /// Eagerly join the relation declared on `field` and select its columns
    /// under `alias`.
    pub fn left_join_and_select(mut self, field: &str, alias: &str) -> Self {
        self.joins.push(Join {
            field: field.to_string(),
            alias: alias.to_string(),
        });
        self
    }

    /// Build the SELECT query returning `(sql, bind_values)`.
    pub fn build_select(&self) -> Result<(String, Vec<Value>), QueryError> {
        let columns = self.select_list()?;
        let mut sql = format!("SELECT {columns} FROM {}", self.from_clause()?);
        let mut params = Vec::new();
        self.append_joins(&mut sql)?;
        self.append_where(&mut sql, &mut params)?;
        self.append_order(&mut sql)?;
        self.append_limit_offset(&mut sql);
        Ok((sql, params))
    }

    /// Build a COUNT query over the same filter, ignoring order and paging.
    ///
    /// Aliased queries count distinct root ids so joined rows are not
    /// counted twice.
    pub fn build_count(&self) -> Result<(String, Vec<Value>), QueryError> {
        let target = match &self.alias {
            Some(alias) => {
                let id = self.format_identifier(&format!("{alias}.{}", self.id_column), false, "column")?;
                format!("COUNT(DISTINCT {id})")
            }
            None => "COUNT(*)".to_string(),
        };
        let mut sql = format!("SELECT {target} FROM {}", self.from_clause()?);
        let mut params = Vec::new();
        self.append_joins(&mut sql)?;
        self.append_where(&mut sql, &mut params)?;
        Ok((sql, params))
    }

    /// Describe the selected column aliases so result rows can be folded
    /// back into entity-shaped objects.
    pub fn projection(&self) -> Result<Projection, QueryError> {
        let alias = self.alias.clone().ok_or(QueryError::MissingAlias)?;
        let mut joins = Vec::with_capacity(self.joins.len());
        for join in &self.joins {
            joins.push((join.alias.clone(), self.relation(&join.field)?));
        }
        Ok(Projection {
            alias,
            columns: self.columns.clone(),
            id_column: self.id_column.clone(),
            relations: self.relations,
            joins,
        })
    }

    fn relation(&self, field: &str) -> Result<&'static Relation, QueryError> {
        self.relations
            .iter()
            .find(|r| r.field == field)
            .ok_or_else(|| QueryError::UnknownRelation(field.to_string()))
    }

    fn from_clause(&self) -> Result<String, QueryError> {
        let table = self.format_identifier(&self.table, false, "table")?;
        match &self.alias {
            Some(alias) => {
                let alias = self.format_identifier(alias, false, "alias")?;
                Ok(format!("{table} AS {alias}"))
            }
            None => Ok(table),
        }
    }

    fn select_list(&self) -> Result<String, QueryError> {
        let Some(alias) = &self.alias else {
            if self.columns.is_empty() {
                return Ok("*".to_string());
            }
            let mut out = Vec::with_capacity(self.columns.len());
            for col in &self.columns {
                out.push(self.format_identifier(col, true, "column")?);
            }
            return Ok(out.join(", "));
        };

        let mut out = Vec::new();
        if self.columns.is_empty() {
            out.push(self.format_identifier(&format!("{alias}.*"), true, "column")?);
        } else {
            for col in &self.columns {
                out.push(self.aliased_column(alias, col)?);
            }
        }
        for join in &self.joins {
            let relation = self.relation(&join.field)?;
            for col in relation.target_columns {
                out.push(self.aliased_column(&join.alias, col)?);
            }
        }
        Ok(out.join(", "))
    }

    fn aliased_column(&self, alias: &str, column: &str) -> Result<String, QueryError> {
        let source = self.format_identifier(&format!("{alias}.{column}"), false, "column")?;
        let label = self.format_identifier(&format!("{alias}{ALIAS_SEPARATOR}{column}"), false, "column")?;
        Ok(format!("{source} AS {label}"))
    }

    fn append_joins(&self, sql: &mut String) -> Result<(), QueryError> {
        if self.joins.is_empty() {
            return Ok(());
        }
        let root = self.alias.as_deref().ok_or(QueryError::MissingAlias)?;
        for join in &self.joins {
            let relation = self.relation(&join.field)?;
            let target = self.format_identifier(relation.target_table, false, "table")?;
            let alias = self.format_identifier(&join.alias, false, "alias")?;
            let target_id = self.format_identifier(&format!("{}.{REFERENCE_ID}", join.alias), false, "column")?;
            match relation.kind {
                RelationKind::ManyToOne { column } => {
                    let fk = self.format_identifier(&format!("{root}.{column}"), false, "column")?;
                    sql.push_str(&format!(" LEFT JOIN {target} AS {alias} ON {target_id} = {fk}"));
                }
                RelationKind::ManyToMany {
                    join_table,
                    source_column,
                    target_column,
                } => {
                    let link_name = format!("{}{ALIAS_SEPARATOR}link", join.alias);
                    let link_table = self.format_identifier(join_table, false, "table")?;
                    let link = self.format_identifier(&link_name, false, "alias")?;
                    let link_source = self.format_identifier(&format!("{link_name}.{source_column}"), false, "column")?;
                    let link_target = self.format_identifier(&format!("{link_name}.{target_column}"), false, "column")?;
                    let root_id = self.format_identifier(&format!("{root}.{}", self.id_column), false, "column")?;
                    sql.push_str(&format!(
                        " LEFT JOIN {link_table} AS {link} ON {link_source} = {root_id}"
                    ));
                    sql.push_str(&format!(
                        " LEFT JOIN {target} AS {alias} ON {target_id} = {link_target}"
                    ));
                }
            }
        }
        Ok(())
    }

    fn append_where(&self, sql: &mut String, params: &mut Vec<Value>) -> Result<(), QueryError> {
        let mut clauses = Vec::new();
        for cond in &self.conditions {
            clauses.push(self.render_condition(cond, params)?);
        }
        if !self.any_of.is_empty() {
            let mut alternatives = Vec::with_capacity(self.any_of.len());
            for cond in &self.any_of {
                alternatives.push(self.render_condition(cond, params)?);
            }
            clauses.push(format!("({})", alternatives.join(" OR ")));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        Ok(())
    }

    fn render_condition(&self, cond: &Condition, params: &mut Vec<Value>) -> Result<String, QueryError> {
        let rendered = match cond {
            Condition::Eq(col, val) => {
                let col = self.format_identifier(col, false, "column")?;
                format!("{col} = {}", self.bind(params, val.clone()))
            }
            Condition::Like(col, pat) => {
                let col = self.format_identifier(col, false, "column")?;
                let like = self.dialect.like_operator();
                format!("{col} {like} {}", self.bind(params, Value::String(pat.clone())))
            }
            Condition::TextLike(col, pat) => {
                let col = self.format_identifier(col, false, "column")?;
                let col = self.dialect.cast_to_text(&col);
                let like = self.dialect.like_operator();
                format!("{col} {like} {}", self.bind(params, Value::String(pat.clone())))
            }
        };
        Ok(rendered)
    }

    fn bind(&self, params: &mut Vec<Value>, value: Value) -> String {
        params.push(value);
        self.dialect.placeholder(params.len())
    }

    fn append_order(&self, sql: &mut String) -> Result<(), QueryError> {
        if self.order.is_empty() {
            return Ok(());
        }
        sql.push_str(" ORDER BY ");
        let mut clauses = Vec::with_capacity(self.order.len());
        for (col, asc) in &self.order {
            let col = self.format_identifier(col, false, "column")?;
            if *asc {
                clauses.push(format!("{col} ASC"));
            } else {
                clauses.push(format!("{col} DESC"));
            }
        }
        sql.push_str(&clauses.join(", "));
        Ok(())
    }

    fn append_limit_offset(&self, sql: &mut String) {
        if let Some(limit) = self.limit_val {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset_val {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
    }

    fn format_identifier(
        &self,
        ident: &str,
        allow_star: bool,
        kind: &'static str,
    ) -> Result<String, QueryError> {
        if !is_valid_identifier(ident, allow_star) {
            return Err(QueryError::InvalidIdentifier {
                kind,
                ident: ident.to_string(),
            });
        }
        match self.identifier_policy {
            IdentifierPolicy::Quote => Ok(quote_identifier(ident, self.dialect, allow_star)),
            IdentifierPolicy::Validate => Ok(ident.to_string()),
        }
    }
}

/// Folds flat result rows (`alias__column` keys) into entity-shaped objects.
#[derive(Debug, Clone)]
pub struct Projection {
    alias: String,
    columns: Vec<String>,
    id_column: String,
    relations: &'static [Relation],
    joins: Vec<(String, &'static Relation)>,
}

impl Projection {
    /// Group rows by root id (first-seen order) and nest joined rows.
    ///
    /// Foreign-key columns become `{id}` references; a joined many-to-one
    /// relation replaces its reference with the full related object (or
    /// null), a joined many-to-many relation collects distinct related
    /// objects into a list.
    pub fn hydrate(&self, rows: Vec<Map<String, Value>>) -> Vec<Map<String, Value>> {
        let mut records: Vec<Map<String, Value>> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for mut flat in rows {
            let root = take_prefixed(&mut flat, &self.alias, &self.columns);
            let key = root
                .get(&self.id_column)
                .map(Value::to_string)
                .unwrap_or_default();
            let index = *positions.entry(key).or_insert_with(|| {
                records.push(row::row_to_entity(root, self.relations));
                records.len() - 1
            });
            let record = &mut records[index];

            for (alias, relation) in &self.joins {
                let related = take_prefixed(&mut flat, alias, relation.target_columns);
                let present = related
                    .get(REFERENCE_ID)
                    .map_or(false, |id| !id.is_null());
                if relation.is_collection() {
                    let entry = record
                        .entry(relation.field.to_string())
                        .or_insert_with(|| Value::Array(Vec::new()));
                    if !entry.is_array() {
                        *entry = Value::Array(Vec::new());
                    }
                    if let (true, Value::Array(items)) = (present, entry) {
                        let id = related.get(REFERENCE_ID);
                        if !items.iter().any(|item| item.get(REFERENCE_ID) == id) {
                            items.push(Value::Object(related));
                        }
                    }
                } else {
                    let value = if present { Value::Object(related) } else { Value::Null };
                    record.insert(relation.field.to_string(), value);
                }
            }
        }
        records
    }
}

fn take_prefixed(flat: &mut Map<String, Value>, alias: &str, columns: &[impl AsRef<str>]) -> Map<String, Value> {
    let mut out = Map::new();
    for column in columns {
        let column = column.as_ref();
        let key = format!("{alias}{ALIAS_SEPARATOR}{column}");
        let value = flat.remove(&key).unwrap_or(Value::Null);
        out.insert(column.to_string(), value);
    }
    out
}

#[derive(Debug, Clone)]
pub enum QueryError {
    InvalidIdentifier { kind: &'static str, ident: String },
    UnknownRelation(String),
    /// Joins and projections need the root table to be aliased.
    MissingAlias,
    InvalidPage { page_number: u64, page_size: u64 },
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::InvalidIdentifier { kind, ident } => {
                write!(f, "Invalid {kind} identifier: {ident}")
            }
            QueryError::UnknownRelation(field) => write!(f, "Unknown relation: {field}"),
            QueryError::MissingAlias => write!(f, "Query has no root alias"),
            QueryError::InvalidPage {
                page_number,
                page_size,
            } => write!(f, "Invalid page {page_number} of size {page_size}"),
        }
    }
}

impl std::error::Error for QueryError {}

fn is_valid_identifier(ident: &str, allow_star: bool) -> bool {
    if ident.is_empty() {
        return false;
    }
    let parts: Vec<&str> = ident.split('.').collect();
    for (idx, part) in parts.iter().enumerate() {
        if allow_star && *part == "*" {
            return idx + 1 == parts.len();
        }
        if !is_valid_segment(part) {
            return false;
        }
    }
    true
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    for c in chars {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            return false;
        }
    }
    true
}

/// Quote each dot-separated part of an already validated identifier.
pub fn quote_identifier(ident: &str, dialect: Dialect, allow_star: bool) -> String {
    let quote = dialect.quote_char();
    let parts: Vec<&str> = ident.split('.').collect();
    let last_idx = parts.len().saturating_sub(1);
    parts
        .into_iter()
        .enumerate()
        .map(|(idx, part)| {
            if allow_star && part == "*" && idx == last_idx {
                part.to_string()
            } else {
                format!("{quote}{part}{quote}")
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}
