use crate::state::{AppState, RecordService};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use recordkit::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// `/people` and `/teams`, each with the full record surface.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/people", records(state.people))
        .nest("/teams", records(state.teams))
}

/// `GET /`, `POST /`, `PUT /`, `POST /query`, `GET /{id}`, `DELETE /{id}`.
fn records<E, D>(service: RecordService<E, D>) -> Router
where
    E: Entity,
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(get_all::<E, D>).post(create::<E, D>).put(update::<E, D>))
        .route("/query", post(query_filter::<E, D>))
        .route("/{id}", get(get_by_id::<E, D>).delete(delete::<E, D>))
        .with_state(service)
}

async fn get_all<E, D>(State(service): State<RecordService<E, D>>) -> ResponseEnvelope<Vec<D>>
where
    E: Entity,
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    service.get_all().await
}

async fn get_by_id<E, D>(
    State(service): State<RecordService<E, D>>,
    Path(id): Path<E::Id>,
) -> ResponseEnvelope<D>
where
    E: Entity,
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    service.get_by_id(&id).await
}

async fn create<E, D>(
    State(service): State<RecordService<E, D>>,
    Json(request): Json<RequestEnvelope<D>>,
) -> ResponseEnvelope<D>
where
    E: Entity,
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    service.create(request).await
}

async fn update<E, D>(
    State(service): State<RecordService<E, D>>,
    Json(request): Json<RequestEnvelope<D>>,
) -> ResponseEnvelope<D>
where
    E: Entity,
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    service.update(request).await
}

async fn delete<E, D>(
    State(service): State<RecordService<E, D>>,
    Path(id): Path<E::Id>,
) -> ResponseEnvelope<D>
where
    E: Entity,
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    service.delete(&id).await
}

async fn query_filter<E, D>(
    State(service): State<RecordService<E, D>>,
    Json(request): Json<QueryFilterRequest>,
) -> ResponseEnvelope<QueryResult<D>>
where
    E: Entity,
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    service.query_filter(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::apply_schema;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> Router {
        let pool = connect(&DataSourceConfig::new("sqlite::memory:")).await.unwrap();
        apply_schema(&pool).await.unwrap();
        router(AppState::new(pool, Dialect::Sqlite))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn create_fetch_and_search_people() {
        let app = app().await;

        let (status, body) = call(&app, Method::POST, "/teams", Some(json!({ "data": { "name": "core" } }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Successfully processed the request. Created Team successfully");

        let person = json!({ "data": { "name": "Ada", "age": 36, "team": 1, "tags": [1, 3] } });
        let (status, body) = call(&app, Method::POST, "/people", Some(person)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"], json!({ "id": 1, "name": "Ada", "age": 36, "team": 1 }));

        let (status, body) = call(&app, Method::GET, "/people/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["team"], 1);

        let query = json!({
            "filter": {
                "page": { "pageNumber": 1, "pageSize": 10 },
                "searchTerm": "3",
                "orderByField": "name",
                "orderBy": "ASC",
                "conditions": [{ "columnName": "age", "columnType": "number" }]
            },
            "children": ["team"]
        });
        let (status, body) = call(&app, Method::POST, "/people/query", Some(query)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 1);
        assert_eq!(body["data"]["list"][0]["team"], json!({ "id": 1, "name": "core" }));
    }

    #[tokio::test]
    async fn failures_keep_envelope_shape() {
        let app = app().await;

        let (status, body) = call(&app, Method::GET, "/people/5", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "FAILED");
        assert!(body["data"].is_null());

        let (status, body) = call(&app, Method::PUT, "/teams", Some(json!({ "data": { "name": "x" } }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Error occurred while interacting with database. Unable to find Team with id: null."
        );
    }
}
