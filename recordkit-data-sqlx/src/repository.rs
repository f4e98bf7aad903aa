use crate::codec;
use crate::error::SqlxErrorExt;
use crate::statement;
use recordkit_data::mapping::to_object;
use recordkit_data::row::{entity_to_row, linked_ids};
use recordkit_data::{
    DataError, Dialect, Entity, QueryBuilder, RelationKind, Repository, ROOT_ALIAS,
};
use serde_json::{Map, Value};
use sqlx::{Any, AnyPool, Row, Transaction};
use std::marker::PhantomData;

/// A generic SQL repository over the runtime-selected `Any` driver.
///
/// Reads go through [`QueryBuilder`] and its projection; writes run in one
/// transaction per call (row plus many-to-many links).
///
/// # Example
///
/// ```ignore
/// let pool = recordkit_data_sqlx::connect(&datasource).await?;
/// let repo = SqlxRepository::<Person>::new(pool, Dialect::from_url(&datasource.url));
/// let people = repo.find_all().await?;
/// ```
pub struct SqlxRepository<T> {
    pool: AnyPool,
    dialect: Dialect,
    _marker: PhantomData<T>,
}

impl<T> SqlxRepository<T> {
    pub fn new(pool: AnyPool, dialect: Dialect) -> Self {
        Self {
            pool,
            dialect,
            _marker: PhantomData,
        }
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

impl<T> Clone for SqlxRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            dialect: self.dialect,
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> SqlxRepository<T> {
    async fn fetch_rows(&self, sql: &str, params: &[Value]) -> Result<Vec<Map<String, Value>>, DataError> {
        tracing::debug!(table = T::table_name(), sql, "select");
        let rows = codec::bind_all(sqlx::query(sql), params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.into_data_error())?;
        rows.iter()
            .map(codec::decode_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.into_data_error())
    }

    /// Replace the join rows of every many-to-many field present in `plain`.
    async fn write_links(
        &self,
        tx: &mut Transaction<'static, Any>,
        plain: &Map<String, Value>,
        id: &Value,
    ) -> Result<(), DataError> {
        for relation in T::relations() {
            let RelationKind::ManyToMany {
                join_table,
                source_column,
                target_column,
            } = relation.kind
            else {
                continue;
            };
            let Some(targets) = linked_ids(plain, relation) else {
                continue;
            };
            statement::delete(self.dialect, join_table, source_column, id.clone())
                .query()
                .execute(&mut **tx)
                .await
                .map_err(|e| e.into_data_error())?;
            for target in targets {
                let values = [(source_column, id.clone()), (target_column, target)];
                statement::insert(self.dialect, join_table, &values, None)
                    .query()
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| e.into_data_error())?;
            }
        }
        Ok(())
    }

    async fn insert_row(
        &self,
        tx: &mut Transaction<'static, Any>,
        plain: &Map<String, Value>,
    ) -> Result<Value, DataError> {
        let mut values = entity_to_row::<T>(plain);
        if !T::generated_id() {
            let stmt = statement::insert(self.dialect, T::table_name(), &values, None);
            stmt.query()
                .execute(&mut **tx)
                .await
                .map_err(|e| e.into_data_error())?;
            return Ok(plain.get(T::id_column()).cloned().unwrap_or(Value::Null));
        }

        values.retain(|(column, _)| *column != T::id_column());
        if self.dialect.supports_returning() {
            let stmt = statement::insert(self.dialect, T::table_name(), &values, Some(T::id_column()));
            let row = stmt
                .query()
                .fetch_one(&mut **tx)
                .await
                .map_err(|e| e.into_data_error())?;
            codec::decode_column(&row, 0).map_err(|e| e.into_data_error())
        } else {
            let stmt = statement::insert(self.dialect, T::table_name(), &values, None);
            let result = stmt
                .query()
                .execute(&mut **tx)
                .await
                .map_err(|e| e.into_data_error())?;
            result
                .last_insert_id()
                .map(Value::from)
                .ok_or_else(|| DataError::Other("database did not report the inserted id".into()))
        }
    }
}

impl<T: Entity> Repository<T> for SqlxRepository<T> {
    async fn find_all(&self) -> Result<Vec<T>, DataError> {
        let query = self.query(ROOT_ALIAS);
        self.get_many(&query).await
    }

    async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>, DataError> {
        let id = serde_json::to_value(id)?;
        let query = self
            .query(ROOT_ALIAS)
            .where_eq(&format!("{ROOT_ALIAS}.{}", T::id_column()), id);
        Ok(self.get_many(&query).await?.into_iter().next())
    }

    async fn insert(&self, entity: &T) -> Result<T, DataError> {
        let plain = to_object(entity)?;
        let mut tx = self.pool.begin().await.map_err(|e| e.into_data_error())?;
        let id = self.insert_row(&mut tx, &plain).await?;
        self.write_links(&mut tx, &plain, &id).await?;
        tx.commit().await.map_err(|e| e.into_data_error())?;

        tracing::debug!(table = T::table_name(), id = %id, "inserted row");
        let id: T::Id = serde_json::from_value(id)?;
        self.find_by_id_or_fail(&id).await
    }

    async fn save(&self, entity: &T) -> Result<T, DataError> {
        let plain = to_object(entity)?;
        let id = serde_json::to_value(entity.id())?;
        let values: Vec<_> = entity_to_row::<T>(&plain)
            .into_iter()
            .filter(|(column, _)| *column != T::id_column())
            .collect();

        let mut tx = self.pool.begin().await.map_err(|e| e.into_data_error())?;
        let existing = statement::exists(self.dialect, T::table_name(), T::id_column(), id.clone())
            .query()
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| e.into_data_error())?;
        if existing.is_none() {
            return Err(DataError::NotFound(format!(
                "no row in {} with {} = {id}",
                T::table_name(),
                T::id_column()
            )));
        }
        if !values.is_empty() {
            statement::update(self.dialect, T::table_name(), &values, T::id_column(), id.clone())
                .query()
                .execute(&mut *tx)
                .await
                .map_err(|e| e.into_data_error())?;
        }
        self.write_links(&mut tx, &plain, &id).await?;
        tx.commit().await.map_err(|e| e.into_data_error())?;

        tracing::debug!(table = T::table_name(), id = %id, "updated row");
        self.find_by_id_or_fail(entity.id()).await
    }

    async fn remove(&self, entity: T) -> Result<T, DataError> {
        let id = serde_json::to_value(entity.id())?;
        let mut tx = self.pool.begin().await.map_err(|e| e.into_data_error())?;
        for relation in T::relations() {
            if let RelationKind::ManyToMany {
                join_table,
                source_column,
                ..
            } = relation.kind
            {
                statement::delete(self.dialect, join_table, source_column, id.clone())
                    .query()
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| e.into_data_error())?;
            }
        }
        let result = statement::delete(self.dialect, T::table_name(), T::id_column(), id.clone())
            .query()
            .execute(&mut *tx)
            .await
            .map_err(|e| e.into_data_error())?;
        if result.rows_affected() == 0 {
            return Err(DataError::NotFound(format!(
                "no row in {} with {} = {id}",
                T::table_name(),
                T::id_column()
            )));
        }
        tx.commit().await.map_err(|e| e.into_data_error())?;

        tracing::debug!(table = T::table_name(), id = %id, "removed row");
        Ok(entity)
    }

    fn query(&self, alias: &str) -> QueryBuilder {
        QueryBuilder::for_entity::<T>(alias).dialect(self.dialect)
    }

    async fn get_count(&self, query: &QueryBuilder) -> Result<u64, DataError> {
        let (sql, params) = query.build_count()?;
        tracing::debug!(table = T::table_name(), sql = %sql, "count");
        let row = codec::bind_all(sqlx::query(&sql), &params)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.into_data_error())?;
        let count: i64 = row.try_get(0).map_err(|e| e.into_data_error())?;
        Ok(count.max(0) as u64)
    }

    async fn get_many(&self, query: &QueryBuilder) -> Result<Vec<T>, DataError> {
        let (sql, params) = query.build_select()?;
        let projection = query.projection()?;
        let rows = self.fetch_rows(&sql, &params).await?;
        projection
            .hydrate(rows)
            .into_iter()
            .map(|plain| Ok(serde_json::from_value(Value::Object(plain))?))
            .collect()
    }
}
