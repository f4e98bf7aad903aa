#![allow(dead_code)]

use recordkit_data::{Entity, Reference, Related, Relation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
    pub team: Option<Reference<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Reference<i64>>>,
}

pub static PERSON_RELATIONS: &[Relation] = &[
    Relation::many_to_one("team", "team_id", "teams", &["id", "name"]),
    Relation::many_to_many("tags", "people_tags", "person_id", "tag_id", "tags", &["id", "label"]),
];

impl Entity for Person {
    type Id = i64;
    fn table_name() -> &'static str {
        "people"
    }
    fn columns() -> &'static [&'static str] {
        &["id", "name", "age", "team_id"]
    }
    fn relations() -> &'static [Relation] {
        PERSON_RELATIONS
    }
    fn id(&self) -> &i64 {
        &self.id
    }
}

/// Absent fields are left out so an update only overrides what it carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Related<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Related<i64>>>,
}

impl PersonDto {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }
}

pub const RELATIONAL_FIELDS: [&str; 2] = ["team", "tags"];

pub fn person(id: i64, name: &str, age: Option<i64>, team: Option<i64>) -> Person {
    Person {
        id,
        name: name.to_string(),
        age,
        team: team.map(Reference::new),
        tags: None,
    }
}
