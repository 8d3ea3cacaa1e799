use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use navien_core::response::{self, ApiResponse};
use navien_core::{
    bind_parameters, id, normalize_flag_param, normalize_parsed, schema, to_record,
    to_record_from_body, ApiError, ParsedBody, RecordMapping, Row, ValidationError, DEMO_SCHEMA,
};
use serde_json::{json, Value};

use crate::reply::{Failure, Reply};
use crate::storage::Storage;
use crate::SharedState;

type Params = HashMap<String, String>;

pub const GENERIC_GREETING: &str = "This HTTP triggered function executed successfully. \
    Pass a name in the query string or in the request body for a personalized response.";

pub async fn demo01(Query(params): Query<Params>) -> Reply {
    tracing::info!("demo01 greeting requested");
    let body = match params.get("name").filter(|name| !name.is_empty()) {
        Some(name) => format!("[VERSION_1.0.0] Hello, {name}."),
        None => GENERIC_GREETING.to_string(),
    };
    Reply(response::text(body, 200))
}

/// `POST /navien`: insert a `name`/`url` pair taken from the query string or
/// the JSON body.
pub async fn insert_named<S: Storage>(
    State(state): State<SharedState<S>>,
    Query(params): Query<Params>,
    body: Bytes,
) -> Result<Reply, Failure> {
    tracing::info!("named insert requested");
    let parsed = ParsedBody::from_bytes(Some(&body[..]));
    if let ParsedBody::Malformed(reason) = &parsed {
        if state.reject_malformed_body {
            return Err(ApiError::JsonParse(reason.clone()).into());
        }
        tracing::warn!(%reason, "ignoring malformed request body");
    }

    let request = normalize_parsed(&params, &parsed);
    let name = request
        .name
        .filter(|name| !name.is_empty())
        .ok_or(ApiError::MissingRequiredField("name"))?;
    let record = to_record(&name, request.url.as_deref(), id::generate())?;
    tracing::debug!(id = %record.id, "inserting named record");
    state.storage.insert(&RecordMapping::Named(record)).await?;

    Ok(Reply(response::text(format!("Hello {name}!"), 200)))
}

/// `POST /navien-2`: store the JSON object as-is with a fresh `id`, and echo
/// the row as read back from storage.
pub async fn insert_passthrough<S: Storage>(
    State(state): State<SharedState<S>>,
    body: Bytes,
) -> Result<Reply, Failure> {
    tracing::info!("passthrough insert requested");
    let fields = match require_json(&body)? {
        Value::Object(fields) => fields,
        other => return Err(ValidationError::not_an_object(schema::JsonType::of(&other)).into()),
    };

    let id = id::generate();
    let mapping = RecordMapping::Passthrough(to_record_from_body(fields, id.clone()));
    tracing::debug!(id = ?mapping.id(), "inserting passthrough record");
    state.storage.insert(&mapping).await?;

    // Column affinity may have coerced values, so echo what was stored.
    let params = Params::from([("id".to_string(), id)]);
    let bound = bind_parameters(&state.queries.by_id, &params)?;
    let stored = state.storage.select(&bound).await?.into_iter().next();
    let row = stored.unwrap_or_else(|| mapping.into_row());

    Ok(Reply(response::build(&Value::Object(row), 201)))
}

/// `POST /validate`: check the body against the demo schema.
pub async fn validate(body: Bytes) -> Result<Reply, Failure> {
    tracing::info!("payload validation requested");
    let payload = require_json(&body)?;
    if let Err(err) = schema::validate(&payload, &DEMO_SCHEMA) {
        tracing::warn!(error = %err, "payload failed validation");
        return Err(err.into());
    }

    let data = json!({
        "message": "This is a custom JSON response",
        "status": "success",
    });
    Ok(Reply(response::build(&data, 200)))
}

/// `GET /navien-test/{id}`
pub async fn select_by_id<S: Storage>(
    State(state): State<SharedState<S>>,
    Path(params): Path<Params>,
) -> Result<Reply, Failure> {
    tracing::info!("select by id requested");
    let bound = bind_parameters(&state.queries.by_id, &params)?;
    Ok(Reply(rows_response(state.storage.select(&bound).await?)))
}

/// `GET /navien-test/{val1}/{val2}`: rows by title and completed flag.
pub async fn select_by_filter<S: Storage>(
    State(state): State<SharedState<S>>,
    Path(mut params): Path<Params>,
) -> Result<Reply, Failure> {
    tracing::info!("select by title and completed requested");
    normalize_flag_param(&mut params, "val2")?;
    let bound = bind_parameters(&state.queries.by_title_and_completed, &params)?;
    Ok(Reply(rows_response(state.storage.select(&bound).await?)))
}

fn require_json(body: &[u8]) -> Result<Value, ApiError> {
    match ParsedBody::from_bytes(Some(body)) {
        ParsedBody::Parsed(value) => Ok(value),
        ParsedBody::NoBody => Err(ApiError::JsonParse("request body is empty".to_string())),
        ParsedBody::Malformed(reason) => Err(ApiError::JsonParse(reason)),
    }
}

fn rows_response(rows: Vec<Row>) -> ApiResponse {
    tracing::debug!(count = rows.len(), "rows selected");
    let rows = rows.into_iter().map(Value::Object).collect();
    response::build(&Value::Array(rows), 200)
}
