//! # recordkit-service
//!
//! [`GenericRecordService`] puts a uniform CRUD and query-filter surface on
//! top of any [`Repository`](recordkit_data::Repository). Every operation
//! answers with a [`ResponseEnvelope`] and never returns an error: failures
//! become `FAILED` envelopes with a `500` status (or `400` for an update
//! without an id).
//!
//! | Operation | Verb | Success status |
//! |-----------|------|----------------|
//! | `get_all` | `GET` | 200 |
//! | `get_by_id` | `GET` | 200 |
//! | `create` | `POST` | 201 |
//! | `update` | `PUT` | 200 |
//! | `delete` | `DELETE` | 200 |
//! | `query_filter` | `GET` | 200 |
//!
//! With the `axum` feature (on by default), envelopes implement `IntoResponse`.

pub mod envelope;
pub mod service;

pub use envelope::{
    Outcome, RequestEnvelope, ResponseEnvelope, Verb, FAILURE_MESSAGE, SUCCESS_MESSAGE,
};
pub use service::GenericRecordService;
