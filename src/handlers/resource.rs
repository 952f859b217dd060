//! Resource CRUD handlers: list (with equality filters), create, read, update, replace, delete.

use crate::config::{Operation, ResolvedResource};
use crate::error::AppError;
use crate::extractors::Payload;
use crate::service::{CrudService, RequestValidator, WriteMode};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

/// Resolve the resource behind a path segment and check the operation is enabled.
fn resource<'a>(state: &'a AppState, path_segment: &str, op: Operation) -> Result<&'a ResolvedResource, AppError> {
    let resource = state
        .model
        .resource_by_path(path_segment)
        .ok_or_else(|| AppError::NotFound(path_segment.to_string()))?;
    if !resource.allows(op) {
        return Err(AppError::MethodNotAllowed(format!("{} on {}", op.as_str(), path_segment)));
    }
    Ok(resource)
}

/// Ids are integers; anything else cannot name a row.
fn parse_id(path_segment: &str, id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::NotFound(format!("{}/{}", path_segment, id_str)))
}

pub async fn list(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resource(&state, &path_segment, Operation::List)?;
    let filters = RequestValidator::parse_filters(resource, &params)?;
    let rows = CrudService::list(&state.pool, &resource.entity, &filters).await?;
    Ok(Json(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    payload: Payload,
) -> Result<impl IntoResponse, AppError> {
    let resource = resource(&state, &path_segment, Operation::Create)?;
    let data = RequestValidator::validate(&resource.entity, &payload.body, WriteMode::Create, payload.format)?;
    let row = CrudService::create(&state.pool, &resource.entity, &data).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn read(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resource(&state, &path_segment, Operation::Read)?;
    let id = parse_id(&path_segment, &id_str)?;
    let row = CrudService::read(&state.pool, &resource.entity, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{}/{}", path_segment, id_str)))?;
    Ok(Json(row))
}

async fn write(
    state: AppState,
    path_segment: String,
    id_str: String,
    payload: Payload,
    mode: WriteMode,
) -> Result<Json<serde_json::Value>, AppError> {
    let resource = resource(&state, &path_segment, Operation::Update)?;
    let id = parse_id(&path_segment, &id_str)?;
    let data = RequestValidator::validate(&resource.entity, &payload.body, mode, payload.format)?;
    let row = CrudService::update(&state.pool, &resource.entity, id, &data)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{}/{}", path_segment, id_str)))?;
    Ok(Json(row))
}

/// PATCH: only supplied fields change.
pub async fn update(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
    payload: Payload,
) -> Result<impl IntoResponse, AppError> {
    write(state, path_segment, id_str, payload, WriteMode::Partial).await
}

/// PUT: required fields must be present.
pub async fn replace(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
    payload: Payload,
) -> Result<impl IntoResponse, AppError> {
    write(state, path_segment, id_str, payload, WriteMode::Replace).await
}

pub async fn delete(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resource(&state, &path_segment, Operation::Delete)?;
    let id = parse_id(&path_segment, &id_str)?;
    CrudService::delete(&state.pool, &resource.entity, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{}/{}", path_segment, id_str)))?;
    Ok(StatusCode::NO_CONTENT)
}
