use recordkit::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub id: i64,
    pub name: String,
}

impl Entity for Team {
    type Id = i64;
    fn table_name() -> &'static str {
        "teams"
    }
    fn columns() -> &'static [&'static str] {
        &["id", "name"]
    }
    fn id(&self) -> &i64 {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
    pub team: Option<Reference<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Reference<i64>>>,
}

static PERSON_RELATIONS: &[Relation] = &[
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

/// Fields left out of a request are not touched by an update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Related<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Related<i64>>>,
}

pub const PERSON_RELATIONAL_FIELDS: [&str; 2] = ["team", "tags"];
