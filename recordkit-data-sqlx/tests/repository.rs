use recordkit_data_sqlx::prelude::*;
use recordkit_data::DataError;
use serde::{Deserialize, Serialize};
use sqlx::AnyPool;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Team {
    #[serde(default)]
    id: i64,
    name: String,
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

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Person {
    #[serde(default)]
    id: i64,
    name: String,
    age: Option<i64>,
    team: Option<Reference<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<Reference<i64>>>,
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

const SCHEMA: &[&str] = &[
    "CREATE TABLE teams (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL)",
    "CREATE TABLE tags (id INTEGER PRIMARY KEY AUTOINCREMENT, label TEXT NOT NULL)",
    "CREATE TABLE people (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, age INTEGER, team_id INTEGER REFERENCES teams(id))",
    "CREATE TABLE people_tags (person_id INTEGER NOT NULL, tag_id INTEGER NOT NULL)",
    "INSERT INTO tags (label) VALUES ('rust'), ('sql'), ('ops')",
];

async fn setup() -> AnyPool {
    let pool = connect(&DataSourceConfig::new("sqlite::memory:")).await.unwrap();
    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }
    pool
}

fn person(name: &str, age: Option<i64>, team: Option<i64>, tags: Option<&[i64]>) -> Person {
    Person {
        id: 0,
        name: name.to_string(),
        age,
        team: team.map(Reference::new),
        tags: tags.map(|ids| ids.iter().copied().map(Reference::new).collect()),
    }
}

async fn seed(pool: &AnyPool) -> (SqlxRepository<Team>, SqlxRepository<Person>) {
    let teams = SqlxRepository::<Team>::new(pool.clone(), Dialect::Sqlite);
    let people = SqlxRepository::<Person>::new(pool.clone(), Dialect::Sqlite);
    let core = teams
        .insert(&Team { id: 0, name: "core".into() })
        .await
        .unwrap();
    people.insert(&person("Ada", Some(36), Some(core.id), Some(&[1, 2]))).await.unwrap();
    people.insert(&person("Brendan", Some(52), None, Some(&[3]))).await.unwrap();
    people.insert(&person("Cai", None, Some(core.id), None)).await.unwrap();
    (teams, people)
}

#[tokio::test]
async fn insert_assigns_id_and_returns_stored_row() {
    let pool = setup().await;
    let teams = SqlxRepository::<Team>::new(pool.clone(), Dialect::Sqlite);
    let people = SqlxRepository::<Person>::new(pool, Dialect::Sqlite);

    let team = teams.insert(&Team { id: 0, name: "core".into() }).await.unwrap();
    assert_eq!(team.id, 1);

    let ada = people
        .insert(&person("Ada", Some(36), Some(team.id), Some(&[1, 2])))
        .await
        .unwrap();
    assert_eq!(ada.id, 1);
    assert_eq!(ada.age, Some(36));
    assert_eq!(ada.team, Some(Reference::new(1)));
    // Collections are not loaded by a plain find.
    assert!(ada.tags.is_none());

    let query = people
        .query(ROOT_ALIAS)
        .left_join_and_select("tags", "tags")
        .order_by("tags.id", true);
    let loaded = people.get_many(&query).await.unwrap();
    assert_eq!(loaded.len(), 1);
    let tags = loaded[0].tags.as_ref().unwrap();
    assert_eq!(tags.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(tags[0].attributes.get("label"), Some(&serde_json::json!("rust")));
}

#[tokio::test]
async fn find_by_id_and_missing_rows() {
    let pool = setup().await;
    let (_, people) = seed(&pool).await;

    let cai = people.find_by_id(&3).await.unwrap().unwrap();
    assert_eq!(cai.name, "Cai");
    assert_eq!(cai.age, None);

    assert!(people.find_by_id(&99).await.unwrap().is_none());
    let err = people.find_by_id_or_fail(&99).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(people.find_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn save_updates_columns_and_replaces_links() {
    let pool = setup().await;
    let (_, people) = seed(&pool).await;

    let mut ada = people.find_by_id_or_fail(&1).await.unwrap();
    ada.name = "Ada L.".into();
    ada.team = None;
    ada.tags = Some(vec![Reference::new(3)]);
    let saved = people.save(&ada).await.unwrap();
    assert_eq!(saved.name, "Ada L.");
    assert_eq!(saved.team, None);

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM people_tags WHERE person_id = 1")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(links, 1);

    // Unloaded collections leave the join table alone.
    let mut brendan = people.find_by_id_or_fail(&2).await.unwrap();
    brendan.age = Some(53);
    people.save(&brendan).await.unwrap();
    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM people_tags WHERE person_id = 2")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(links, 1);

    let mut ghost = person("Ghost", None, None, None);
    ghost.id = 42;
    assert!(matches!(people.save(&ghost).await, Err(DataError::NotFound(_))));
}

#[tokio::test]
async fn remove_deletes_row_and_links() {
    let pool = setup().await;
    let (_, people) = seed(&pool).await;

    let ada = people.find_by_id_or_fail(&1).await.unwrap();
    let removed = people.remove(ada.clone()).await.unwrap();
    assert_eq!(removed.name, "Ada");
    assert!(people.find_by_id(&1).await.unwrap().is_none());

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM people_tags WHERE person_id = 1")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(links, 0);

    assert!(people.remove(ada).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn search_counts_distinct_roots_and_pages() {
    let pool = setup().await;
    let (_, people) = seed(&pool).await;

    let query = people
        .query(ROOT_ALIAS)
        .left_join_and_select("team", "team")
        .left_join_and_select("tags", "tags")
        .or_where_like("object.name", "%a%", false)
        .or_where_like("object.age", "%5%", true)
        .order_by("object.name", true);

    assert_eq!(people.get_count(&query).await.unwrap(), 3);

    let all = people.get_many(&query).await.unwrap();
    let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Ada", "Brendan", "Cai"]);
    let team = all[0].team.as_ref().unwrap();
    assert_eq!(team.attributes.get("name"), Some(&serde_json::json!("core")));
    assert_eq!(all[1].team, None);
    assert_eq!(all[2].tags.as_deref().map(<[_]>::len), Some(0));

    let numeric = people
        .query(ROOT_ALIAS)
        .or_where_like("object.age", "%5%", true);
    let found = people.get_many(&numeric).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Brendan");
}
