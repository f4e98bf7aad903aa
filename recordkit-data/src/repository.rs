use crate::entity::Entity;
use crate::error::DataError;
use crate::query::QueryBuilder;
use std::future::Future;

/// Generic async repository for one entity type.
///
/// Uses RPITIT (return-position `impl Trait` in traits), no `async-trait` needed.
pub trait Repository<T: Entity>: Send + Sync {
    fn find_all(&self) -> impl Future<Output = Result<Vec<T>, DataError>> + Send;

    fn find_by_id(&self, id: &T::Id) -> impl Future<Output = Result<Option<T>, DataError>> + Send;

    /// Like [`find_by_id`](Repository::find_by_id) but a missing row is a
    /// `DataError::NotFound`.
    fn find_by_id_or_fail(&self, id: &T::Id) -> impl Future<Output = Result<T, DataError>> + Send {
        async move {
            self.find_by_id(id).await?.ok_or_else(|| {
                DataError::NotFound(format!(
                    "no row in {} with {} = {}",
                    T::table_name(),
                    T::id_column(),
                    id.to_string()
                ))
            })
        }
    }

    /// Persist a new row and return it as stored.
    fn insert(&self, entity: &T) -> impl Future<Output = Result<T, DataError>> + Send;

    /// Persist changes to an existing row and return it as stored.
    fn save(&self, entity: &T) -> impl Future<Output = Result<T, DataError>> + Send;

    /// Delete the row and hand back the detached entity.
    fn remove(&self, entity: T) -> impl Future<Output = Result<T, DataError>> + Send;

    /// A query builder over this repository's table, aliased as `alias`.
    fn query(&self, alias: &str) -> QueryBuilder {
        QueryBuilder::for_entity::<T>(alias)
    }

    /// Number of root rows matching the query's conditions.
    fn get_count(&self, query: &QueryBuilder) -> impl Future<Output = Result<u64, DataError>> + Send;

    fn get_many(&self, query: &QueryBuilder) -> impl Future<Output = Result<Vec<T>, DataError>> + Send;
}
