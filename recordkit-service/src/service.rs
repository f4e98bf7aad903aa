use crate::envelope::{RequestEnvelope, ResponseEnvelope, Verb, FAILURE_MESSAGE, SUCCESS_MESSAGE};
use http::StatusCode;
use recordkit_data::mapping::wrap_references;
use recordkit_data::{
    DataError, Entity, JsonMapper, ObjectMapper, QueryError, QueryFilterRequest, QueryResult,
    Repository, ROOT_ALIAS,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;

/// Payload key carrying the identifier of the record to update.
const ID_FIELD: &str = "id";

/// CRUD and filtered listing for one entity, answering with envelopes.
///
/// Every public operation resolves to a [`ResponseEnvelope`]; storage and
/// mapping errors become `500` envelopes whose message is the failure prefix
/// followed by the error text. A missing row is reported the same way.
///
/// ```ignore
/// let people = GenericRecordService::<Person, PersonDto, _>::new(
///     SqlxRepository::new(pool, dialect),
///     ["team", "tags"],
///     "Person",
/// );
/// let envelope = people.get_by_id(&1).await;
/// ```
pub struct GenericRecordService<E, D, R, M = JsonMapper<E, D>> {
    repository: R,
    mapper: M,
    relational_fields: Vec<String>,
    entity_name: String,
    _marker: PhantomData<fn() -> (E, D)>,
}

impl<E, D, R> GenericRecordService<E, D, R>
where
    E: Entity,
    D: Serialize + DeserializeOwned,
{
    /// Build a service mapping through [`JsonMapper`].
    ///
    /// `relational_fields` names the DTO fields holding identifiers of
    /// related records; `entity_name` is used in messages.
    pub fn new<S: Into<String>>(
        repository: R,
        relational_fields: impl IntoIterator<Item = S>,
        entity_name: impl Into<String>,
    ) -> Self {
        let relational_fields: Vec<String> = relational_fields.into_iter().map(Into::into).collect();
        Self {
            repository,
            mapper: JsonMapper::new(relational_fields.clone()),
            relational_fields,
            entity_name: entity_name.into(),
            _marker: PhantomData,
        }
    }
}

impl<E, D, R, M> GenericRecordService<E, D, R, M> {
    /// Replace the object mapper.
    pub fn with_mapper<M2>(self, mapper: M2) -> GenericRecordService<E, D, R, M2> {
        GenericRecordService {
            repository: self.repository,
            mapper,
            relational_fields: self.relational_fields,
            entity_name: self.entity_name,
            _marker: PhantomData,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    pub fn relational_fields(&self) -> &[String] {
        &self.relational_fields
    }
}

impl<E, D, R: Clone, M: Clone> Clone for GenericRecordService<E, D, R, M> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            mapper: self.mapper.clone(),
            relational_fields: self.relational_fields.clone(),
            entity_name: self.entity_name.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E, D, R, M> GenericRecordService<E, D, R, M>
where
    E: Entity,
    D: Send + Sync,
    R: Repository<E>,
    M: ObjectMapper<E, D>,
{
    pub async fn get_all(&self) -> ResponseEnvelope<Vec<D>> {
        match self.try_get_all().await {
            Ok(list) => {
                tracing::debug!(entity = %self.entity_name, rows = list.len(), "fetched all");
                ResponseEnvelope::success(StatusCode::OK, Verb::Get, SUCCESS_MESSAGE, list)
            }
            Err(err) => self.failed(Verb::Get, &err),
        }
    }

    pub async fn get_by_id(&self, id: &E::Id) -> ResponseEnvelope<D> {
        match self.try_get_by_id(id).await {
            Ok(dto) => ResponseEnvelope::success(StatusCode::OK, Verb::Get, SUCCESS_MESSAGE, dto),
            Err(err) => self.failed(Verb::Get, &err),
        }
    }

    pub async fn create(&self, request: RequestEnvelope<D>) -> ResponseEnvelope<D> {
        match self.try_create(&request.data).await {
            Ok(dto) => {
                let message = format!("{SUCCESS_MESSAGE}Created {} successfully", self.entity_name);
                ResponseEnvelope::success(StatusCode::CREATED, Verb::Post, message, dto)
            }
            Err(err) => {
                tracing::error!(entity = %self.entity_name, error = %err, "create failed");
                self.failed(Verb::Post, &err)
            }
        }
    }

    /// Merge the payload over the stored record and save it.
    ///
    /// A payload whose `id` is absent, null or `""` is rejected with `400`
    /// before any storage call. Any other id, `0` included, is looked up.
    pub async fn update(&self, request: RequestEnvelope<D>) -> ResponseEnvelope<D> {
        let mut plain = match self.mapper.dto_to_plain(&request.data) {
            Ok(plain) => plain,
            Err(err) => return self.failed(Verb::Put, &err),
        };
        let id = plain.get(ID_FIELD).cloned().unwrap_or(Value::Null);
        if is_missing(&id) {
            let message = format!(
                "{FAILURE_MESSAGE}Unable to find {} with id: {}.",
                self.entity_name,
                display_id(&id)
            );
            return ResponseEnvelope::failure(StatusCode::BAD_REQUEST, Verb::Put, message);
        }

        wrap_references(&mut plain, &self.relational_fields);
        match self.try_update(&id, plain).await {
            Ok(dto) => {
                let message = format!(
                    "{SUCCESS_MESSAGE}Updated {} with id: {} successfully",
                    self.entity_name,
                    display_id(&id)
                );
                ResponseEnvelope::success(StatusCode::OK, Verb::Put, message, dto)
            }
            Err(err) => self.failed(Verb::Put, &err),
        }
    }

    pub async fn delete(&self, id: &E::Id) -> ResponseEnvelope<D> {
        match self.try_delete(id).await {
            Ok(dto) => {
                let message = format!("Deleted {} with id: {}", self.entity_name, id.to_string());
                ResponseEnvelope::success(StatusCode::OK, Verb::Delete, message, dto)
            }
            Err(err) => self.failed(Verb::Delete, &err),
        }
    }

    /// Search, sort and page the records.
    ///
    /// The search term is matched with `LIKE '%term%'` against every listed
    /// column, any match qualifying a row. `count` is the number of matching
    /// records before paging; requested children are joined into each row.
    ///
    /// Offset and limit apply to the joined rows. A root with several
    /// many-to-many children spans several rows, so it can be split across
    /// pages and a page may carry a shortened child list and fewer than
    /// `pageSize` records. Join only many-to-one children when exact pages
    /// matter.
    pub async fn query_filter(&self, request: QueryFilterRequest) -> ResponseEnvelope<QueryResult<D>> {
        match self.try_query_filter(&request).await {
            Ok(result) => {
                tracing::debug!(
                    entity = %self.entity_name,
                    count = result.count,
                    rows = result.list.len(),
                    "query filter"
                );
                ResponseEnvelope::success(StatusCode::OK, Verb::Get, SUCCESS_MESSAGE, result)
            }
            Err(err) => {
                tracing::error!(entity = %self.entity_name, error = %err, "query filter failed");
                self.failed(Verb::Get, &err)
            }
        }
    }

    async fn try_get_all(&self) -> Result<Vec<D>, DataError> {
        let entities = self.repository.find_all().await?;
        self.mapper.entities_to_dtos(&entities)
    }

    async fn try_get_by_id(&self, id: &E::Id) -> Result<D, DataError> {
        let entity = self.repository.find_by_id_or_fail(id).await?;
        self.mapper.entity_to_dto(&entity)
    }

    async fn try_create(&self, dto: &D) -> Result<D, DataError> {
        let mut plain = self.mapper.dto_to_plain(dto)?;
        wrap_references(&mut plain, &self.relational_fields);
        let entity = self.mapper.plain_to_entity(plain)?;
        let created = self.repository.insert(&entity).await?;
        tracing::debug!(entity = %self.entity_name, id = %created.id().to_string(), "created");
        self.mapper.entity_to_dto(&created)
    }

    async fn try_update(&self, id: &Value, incoming: serde_json::Map<String, Value>) -> Result<D, DataError> {
        let id: E::Id = serde_json::from_value(id.clone())?;
        let existing = self.repository.find_by_id_or_fail(&id).await?;
        let mut merged = self.mapper.entity_to_plain(&existing)?;
        merged.extend(incoming);
        let entity = self.mapper.plain_to_entity(merged)?;
        let updated = self.repository.save(&entity).await?;
        tracing::debug!(entity = %self.entity_name, id = %id.to_string(), "updated");
        self.mapper.entity_to_dto(&updated)
    }

    async fn try_delete(&self, id: &E::Id) -> Result<D, DataError> {
        let existing = self.repository.find_by_id_or_fail(id).await?;
        let removed = self.repository.remove(existing).await?;
        tracing::debug!(entity = %self.entity_name, id = %id.to_string(), "deleted");
        self.mapper.entity_to_dto(&removed)
    }

    async fn try_query_filter(&self, request: &QueryFilterRequest) -> Result<QueryResult<D>, DataError> {
        let filter = &request.filter;
        let page = filter.page;
        let offset = page.offset().ok_or(QueryError::InvalidPage {
            page_number: page.page_number,
            page_size: page.page_size,
        })?;

        let pattern = filter.search_pattern();
        let mut query = self.repository.query(ROOT_ALIAS);
        for condition in &filter.conditions {
            query = query.or_where_like(
                &format!("{ROOT_ALIAS}.{}", condition.column_name),
                &pattern,
                condition.column_type.is_numeric(),
            );
        }
        if let Some(field) = &filter.order_by_field {
            query = query.order_by(&format!("{ROOT_ALIAS}.{field}"), filter.order_by.is_ascending());
        }

        let count = self.repository.get_count(&query).await?;

        query = query.offset(offset).limit(page.page_size);
        for child in &request.children {
            query = query.left_join_and_select(child, child);
        }
        let entities = self.repository.get_many(&query).await?;
        Ok(QueryResult::new(count, self.mapper.entities_to_dtos(&entities)?))
    }

    fn failed<T>(&self, method: Verb, err: &DataError) -> ResponseEnvelope<T> {
        tracing::debug!(entity = %self.entity_name, ?method, error = %err, "operation failed");
        ResponseEnvelope::failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            method,
            format!("{FAILURE_MESSAGE}{err}"),
        )
    }
}

/// Absent, null and empty-string identifiers cannot address a record.
/// `0` and `false` are real values and go to storage.
fn is_missing(id: &Value) -> bool {
    match id {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn display_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
