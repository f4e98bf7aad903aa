//! Conversions between entity-shaped objects and table rows.
//!
//! A row holds physical columns (`team_id`); the entity shape holds the
//! relation field instead (`team: { "id": 1 }`).

use crate::entity::{Entity, Relation, RelationKind, REFERENCE_ID};
use serde_json::{Map, Value};

/// Turn a decoded row into the entity shape by replacing foreign-key
/// columns with `{id}` references (or null).
pub fn row_to_entity(mut row: Map<String, Value>, relations: &[Relation]) -> Map<String, Value> {
    for relation in relations {
        if let RelationKind::ManyToOne { column } = relation.kind {
            let Some(fk) = row.remove(column) else {
                continue;
            };
            let reference = if fk.is_null() {
                Value::Null
            } else {
                let mut object = Map::new();
                object.insert(REFERENCE_ID.to_string(), fk);
                Value::Object(object)
            };
            row.insert(relation.field.to_string(), reference);
        }
    }
    row
}

/// Column values to write for an entity-shaped object.
///
/// Columns whose value is absent from `plain` are skipped so they are left
/// untouched (update) or take their default (insert).
pub fn entity_to_row<E: Entity>(plain: &Map<String, Value>) -> Vec<(&'static str, Value)> {
    let mut values = Vec::new();
    for column in E::columns() {
        let foreign_key = E::relations().iter().find_map(|r| match r.kind {
            RelationKind::ManyToOne { column: fk } if fk == *column => Some(r.field),
            _ => None,
        });
        let value = match foreign_key {
            Some(field) => plain.get(field).map(reference_id),
            None => plain.get(*column).cloned(),
        };
        if let Some(value) = value {
            values.push((*column, value));
        }
    }
    values
}

/// Ids listed in a many-to-many field, or `None` when the field is absent
/// or null (not loaded) and the links must be left alone.
pub fn linked_ids(plain: &Map<String, Value>, relation: &Relation) -> Option<Vec<Value>> {
    match plain.get(relation.field)? {
        Value::Array(items) => Some(
            items
                .iter()
                .map(reference_id)
                .filter(|id| !id.is_null())
                .collect(),
        ),
        Value::Null => None,
        other => Some(vec![reference_id(other)]),
    }
}

fn reference_id(value: &Value) -> Value {
    match value {
        Value::Object(object) => object.get(REFERENCE_ID).cloned().unwrap_or(Value::Null),
        other => other.clone(),
    }
}
