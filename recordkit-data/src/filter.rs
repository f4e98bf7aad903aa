use crate::page::PageRequest;
use serde::{Deserialize, Serialize};

/// A filtered, sorted, paginated listing request.
///
/// ```json
/// {
///   "filter": {
///     "page": { "pageNumber": 2, "pageSize": 10 },
///     "searchTerm": "foo",
///     "orderByField": "name",
///     "orderBy": "ASC",
///     "conditions": [{ "columnName": "age", "columnType": "number" }]
///   },
///   "children": ["team"]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilterRequest {
    pub filter: QueryFilter,
    /// Associations to eagerly join into each row.
    #[serde(default)]
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilter {
    #[serde(default)]
    pub page: PageRequest,
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub order_by_field: Option<String>,
    #[serde(default)]
    pub order_by: SortDirection,
    /// Columns the search term is matched against.
    #[serde(default)]
    pub conditions: Vec<QueryCondition>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortDirection {
    pub fn is_ascending(self) -> bool {
        self == SortDirection::Asc
    }
}

/// A searchable column and its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryCondition {
    pub column_name: String,
    #[serde(default)]
    pub column_type: ColumnType,
}

impl QueryCondition {
    pub fn new(column_name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            column_name: column_name.into(),
            column_type,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    #[default]
    #[serde(other)]
    Text,
}

impl ColumnType {
    /// Numeric columns are cast to text before substring matching.
    pub fn is_numeric(self) -> bool {
        self == ColumnType::Number
    }
}

impl QueryFilterRequest {
    pub fn new(filter: QueryFilter) -> Self {
        Self {
            filter,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: impl Into<String>) -> Self {
        self.children.push(child.into());
        self
    }
}

impl QueryFilter {
    pub fn page(mut self, page_number: u64, page_size: u64) -> Self {
        self.page = PageRequest::new(page_number, page_size);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by_field = Some(field.into());
        self.order_by = direction;
        self
    }

    pub fn condition(mut self, column_name: impl Into<String>, column_type: ColumnType) -> Self {
        self.conditions.push(QueryCondition::new(column_name, column_type));
        self
    }

    /// The `LIKE` pattern matching the search term anywhere in a value.
    pub fn search_pattern(&self) -> String {
        format!("%{}%", self.search_term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_request() {
        let json = r#"{
            "filter": {
                "page": { "pageNumber": 2, "pageSize": 10 },
                "searchTerm": "foo",
                "orderByField": "name",
                "orderBy": "DESC",
                "conditions": [
                    { "columnName": "age", "columnType": "number" },
                    { "columnName": "name", "columnType": "string" }
                ]
            },
            "children": ["team"]
        }"#;
        let req: QueryFilterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.filter.page, PageRequest::new(2, 10));
        assert_eq!(req.filter.search_term, "foo");
        assert_eq!(req.filter.order_by_field.as_deref(), Some("name"));
        assert_eq!(req.filter.order_by, SortDirection::Desc);
        assert!(req.filter.conditions[0].column_type.is_numeric());
        assert_eq!(req.filter.conditions[1].column_type, ColumnType::Text);
        assert_eq!(req.children, vec!["team"]);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let req: QueryFilterRequest =
            serde_json::from_str(r#"{"filter":{"page":{"pageNumber":1,"pageSize":5}}}"#).unwrap();
        assert!(req.filter.conditions.is_empty());
        assert!(req.children.is_empty());
        assert!(req.filter.order_by.is_ascending());
        assert_eq!(req.filter.search_pattern(), "%%");
    }
}
