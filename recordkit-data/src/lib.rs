pub mod entity;
pub mod error;
pub mod filter;
pub mod mapping;
pub mod page;
pub mod query;
pub mod repository;
pub mod row;

pub use entity::{Entity, Reference, Related, Relation, RelationKind};
pub use error::DataError;
pub use filter::{ColumnType, QueryCondition, QueryFilter, QueryFilterRequest, SortDirection};
pub use mapping::{JsonMapper, ObjectMapper};
pub use page::{PageRequest, QueryResult};
pub use query::{Dialect, IdentifierPolicy, Projection, QueryBuilder, QueryError, ROOT_ALIAS};
pub use repository::Repository;

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        ColumnType, Entity, JsonMapper, ObjectMapper, PageRequest, QueryBuilder, QueryCondition,
        QueryFilter, QueryFilterRequest, QueryResult, Reference, Related, Relation, Repository,
        SortDirection,
    };
}
