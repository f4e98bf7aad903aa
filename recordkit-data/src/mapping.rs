use crate::entity::REFERENCE_ID;
use crate::error::DataError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::marker::PhantomData;

/// Converts between plain data (JSON objects), entities, and DTOs.
///
/// Implement it by hand for entities whose DTO is not a serde projection
/// of the entity; [`JsonMapper`] covers the common case.
pub trait ObjectMapper<E, D>: Send + Sync {
    fn dto_to_plain(&self, dto: &D) -> Result<Map<String, Value>, DataError>;

    fn entity_to_plain(&self, entity: &E) -> Result<Map<String, Value>, DataError>;

    fn plain_to_entity(&self, plain: Map<String, Value>) -> Result<E, DataError>;

    fn entity_to_dto(&self, entity: &E) -> Result<D, DataError>;

    fn entities_to_dtos(&self, entities: &[E]) -> Result<Vec<D>, DataError> {
        entities.iter().map(|e| self.entity_to_dto(e)).collect()
    }
}

/// Serde-driven mapper: every conversion goes through `serde_json`.
///
/// Entity to DTO is a flat projection: pure `{id}` references in the
/// relational fields collapse back to the bare id, while eagerly loaded
/// related objects stay nested.
pub struct JsonMapper<E, D> {
    relational_fields: Vec<String>,
    _marker: PhantomData<fn() -> (E, D)>,
}

impl<E, D> JsonMapper<E, D> {
    pub fn new<S: Into<String>>(relational_fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            relational_fields: relational_fields.into_iter().map(Into::into).collect(),
            _marker: PhantomData,
        }
    }

    pub fn relational_fields(&self) -> &[String] {
        &self.relational_fields
    }
}

impl<E, D> Clone for JsonMapper<E, D> {
    fn clone(&self) -> Self {
        Self {
            relational_fields: self.relational_fields.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E, D> ObjectMapper<E, D> for JsonMapper<E, D>
where
    E: Serialize + DeserializeOwned,
    D: Serialize + DeserializeOwned,
{
    fn dto_to_plain(&self, dto: &D) -> Result<Map<String, Value>, DataError> {
        to_object(dto)
    }

    fn entity_to_plain(&self, entity: &E) -> Result<Map<String, Value>, DataError> {
        to_object(entity)
    }

    fn plain_to_entity(&self, plain: Map<String, Value>) -> Result<E, DataError> {
        Ok(serde_json::from_value(Value::Object(plain))?)
    }

    fn entity_to_dto(&self, entity: &E) -> Result<D, DataError> {
        let mut plain = to_object(entity)?;
        flatten_references(&mut plain, &self.relational_fields);
        Ok(serde_json::from_value(Value::Object(plain))?)
    }
}

/// Serialize a value that must come out as a JSON object.
pub fn to_object<T: Serialize + ?Sized>(value: &T) -> Result<Map<String, Value>, DataError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(DataError::Mapping(format!(
            "expected an object, got {}",
            kind_name(&other)
        ))),
    }
}

/// Wrap identifier values of relational fields into reference objects.
///
/// `5` becomes `{ "id": 5 }`, `[1, 2]` becomes `[{ "id": 1 }, { "id": 2 }]`.
/// Absent and null fields are left alone, as are values that already are
/// objects.
pub fn wrap_references(plain: &mut Map<String, Value>, fields: &[String]) {
    for field in fields {
        let Some(value) = plain.get_mut(field) else {
            continue;
        };
        match value {
            Value::Null | Value::Object(_) => {}
            Value::Array(items) => {
                for item in items.iter_mut() {
                    if !item.is_object() {
                        *item = reference(item.take());
                    }
                }
            }
            scalar => *scalar = reference(scalar.take()),
        }
    }
}

/// Collapse `{ "id": x }` references of relational fields back to `x`.
///
/// Objects carrying more than the id (eagerly loaded rows) are kept.
pub fn flatten_references(plain: &mut Map<String, Value>, fields: &[String]) {
    for field in fields {
        let Some(value) = plain.get_mut(field) else {
            continue;
        };
        match value {
            Value::Array(items) => {
                for item in items.iter_mut() {
                    collapse(item);
                }
            }
            other => collapse(other),
        }
    }
}

fn reference(id: Value) -> Value {
    let mut object = Map::new();
    object.insert(REFERENCE_ID.to_string(), id);
    Value::Object(object)
}

fn collapse(value: &mut Value) {
    if let Value::Object(object) = value {
        if object.len() == 1 {
            if let Some(id) = object.remove(REFERENCE_ID) {
                *value = id;
            }
        }
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
