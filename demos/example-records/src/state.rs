use crate::models::{Person, PersonDto, Team, TeamDto, PERSON_RELATIONAL_FIELDS};
use recordkit::prelude::*;
use sqlx::AnyPool;
use std::sync::Arc;

const SCHEMA: &str = include_str!("../schema.sql");

pub type RecordService<E, D> = Arc<GenericRecordService<E, D, SqlxRepository<E>>>;

#[derive(Clone)]
pub struct AppState {
    pub people: RecordService<Person, PersonDto>,
    pub teams: RecordService<Team, TeamDto>,
}

impl AppState {
    pub fn new(pool: AnyPool, dialect: Dialect) -> Self {
        Self {
            people: Arc::new(GenericRecordService::new(
                SqlxRepository::new(pool.clone(), dialect),
                PERSON_RELATIONAL_FIELDS,
                "Person",
            )),
            teams: Arc::new(GenericRecordService::new(
                SqlxRepository::new(pool, dialect),
                Vec::<String>::new(),
                "Team",
            )),
        }
    }
}

/// Create the demo tables and seed tags.
pub async fn apply_schema(pool: &AnyPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("schema applied");
    Ok(())
}
