use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which a related row's identifier is stored in reference objects.
pub const REFERENCE_ID: &str = "id";

/// Trait describing how an entity is laid out in its table.
///
/// Entities are serde types: the JSON object model is the plain-data
/// representation used when rows are decoded, merged, and written back.
///
/// # Example
///
/// ```ignore
/// impl Entity for Person {
///     type Id = i64;
///     fn table_name() -> &'static str { "people" }
///     fn columns() -> &'static [&'static str] { &["id", "name", "age", "team_id"] }
///     fn relations() -> &'static [Relation] { PERSON_RELATIONS }
///     fn id(&self) -> &i64 { &self.id }
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    type Id: Serialize + DeserializeOwned + Send + Sync + ToString + 'static;

    fn table_name() -> &'static str;

    fn id_column() -> &'static str {
        REFERENCE_ID
    }

    /// Physical columns of the table, foreign-key columns included.
    fn columns() -> &'static [&'static str];

    fn relations() -> &'static [Relation] {
        &[]
    }

    /// Whether the database assigns the id on insert.
    fn generated_id() -> bool {
        true
    }

    fn id(&self) -> &Self::Id;

    /// Look up a declared relation by its entity field name.
    fn relation(field: &str) -> Option<&'static Relation> {
        Self::relations().iter().find(|r| r.field == field)
    }
}

/// An association between an entity field and another table.
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    /// Field on the entity holding the reference(s).
    pub field: &'static str,
    pub target_table: &'static str,
    /// Columns selected from the target table when the relation is joined.
    pub target_columns: &'static [&'static str],
    pub kind: RelationKind,
}

#[derive(Debug, Clone, Copy)]
pub enum RelationKind {
    /// Foreign-key column on the owning table.
    ManyToOne { column: &'static str },
    /// Join table linking owner ids (`source_column`) to target ids (`target_column`).
    ManyToMany {
        join_table: &'static str,
        source_column: &'static str,
        target_column: &'static str,
    },
}

impl Relation {
    pub const fn many_to_one(
        field: &'static str,
        column: &'static str,
        target_table: &'static str,
        target_columns: &'static [&'static str],
    ) -> Self {
        Self {
            field,
            target_table,
            target_columns,
            kind: RelationKind::ManyToOne { column },
        }
    }

    pub const fn many_to_many(
        field: &'static str,
        join_table: &'static str,
        source_column: &'static str,
        target_column: &'static str,
        target_table: &'static str,
        target_columns: &'static [&'static str],
    ) -> Self {
        Self {
            field,
            target_table,
            target_columns,
            kind: RelationKind::ManyToMany {
                join_table,
                source_column,
                target_column,
            },
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, RelationKind::ManyToMany { .. })
    }
}

/// A pointer to a related row: `{ "id": ... }`.
///
/// When the relation was eagerly loaded, the remaining columns of the
/// related row are kept in `attributes` and serialized alongside the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference<Id> {
    pub id: Id,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl<Id> Reference<Id> {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            attributes: Map::new(),
        }
    }

    /// Whether the related row was loaded beyond its id.
    pub fn is_loaded(&self) -> bool {
        !self.attributes.is_empty()
    }
}

/// A relational DTO field: the bare id, or the related row when it was
/// eagerly loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Related<Id> {
    Id(Id),
    Loaded(Reference<Id>),
}

impl<Id> Related<Id> {
    pub fn id(&self) -> &Id {
        match self {
            Related::Id(id) => id,
            Related::Loaded(reference) => &reference.id,
        }
    }
}

impl<Id> From<Id> for Related<Id> {
    fn from(id: Id) -> Self {
        Related::Id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reference_serializes_as_id_object() {
        let value = serde_json::to_value(Reference::new(5i64)).unwrap();
        assert_eq!(value, json!({ "id": 5 }));
    }

    #[test]
    fn loaded_reference_keeps_attributes() {
        let r: Reference<i64> =
            serde_json::from_value(json!({ "id": 2, "name": "core" })).unwrap();
        assert_eq!(r.id, 2);
        assert!(r.is_loaded());
        assert_eq!(serde_json::to_value(&r).unwrap(), json!({ "id": 2, "name": "core" }));
    }

    #[test]
    fn many_to_many_is_collection() {
        let rel = Relation::many_to_many("tags", "people_tags", "person_id", "tag_id", "tags", &["id"]);
        assert!(rel.is_collection());
        let rel = Relation::many_to_one("team", "team_id", "teams", &["id"]);
        assert!(!rel.is_collection());
    }

    #[test]
    fn related_accepts_id_or_loaded_row() {
        let bare: Related<i64> = serde_json::from_value(json!(3)).unwrap();
        assert_eq!(bare, Related::Id(3));
        let loaded: Related<i64> =
            serde_json::from_value(json!({ "id": 3, "name": "core" })).unwrap();
        assert_eq!(loaded.id(), &3);
        assert!(matches!(loaded, Related::Loaded(ref r) if r.is_loaded()));
    }
}
