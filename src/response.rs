//! Structured JSON success bodies and extractors that reject with [Error].
//!
//! Every response body has a `success` flag. Successful responses carry the
//! payload under a named field, failures are produced by [Error]'s
//! `IntoResponse` implementation.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::Error;

/// A JSON request body that rejects with a structured failure.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// Path parameters that reject with a structured failure.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(Error))]
pub struct PathParam<T>(pub T);

/// A query string that rejects with a structured failure.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(Error))]
pub struct QueryParams<T>(pub T);

/// Render `{"success": true, "<field>": value}` with `status_code`.
pub fn success(status_code: StatusCode, field: &str, value: &impl Serialize) -> Response {
    let value = match serde_json::to_value(value) {
        Ok(value) => value,
        Err(error) => return Error::JSONSerializationError(error.to_string()).into_response(),
    };

    let mut body = Map::new();
    body.insert("success".to_owned(), Value::Bool(true));
    body.insert(field.to_owned(), value);

    (status_code, Json(Value::Object(body))).into_response()
}
