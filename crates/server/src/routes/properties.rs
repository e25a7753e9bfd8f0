use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use models::Property;
use serde_json::Value;
use tracing::info;

use crate::errors::JsonApiError;
use crate::routes::ServerState;

fn body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, JsonApiError> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, "Invalid JSON", Some(e.body_text())))
}

/// List every property in insertion order.
#[utoipa::path(get, path = "/properties", tag = "properties",
    responses((status = 200, description = "All properties", body = [crate::openapi::PropertyDoc]), (status = 500, description = "Store failure")))]
pub async fn list_properties(State(state): State<ServerState>) -> Result<Json<Vec<Property>>, JsonApiError> {
    let list = state.properties.list().await?;
    info!(count = list.len(), "list properties");
    Ok(Json(list))
}

#[utoipa::path(get, path = "/properties/{id}", tag = "properties",
    params(("id" = String, Path, description = "property id")),
    responses((status = 200, description = "OK", body = crate::openapi::PropertyDoc), (status = 404, description = "Not Found")))]
pub async fn get_property(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Property>, JsonApiError> {
    Ok(Json(state.properties.get(&id).await?))
}

#[utoipa::path(post, path = "/properties", tag = "properties",
    request_body = crate::openapi::PropertyInputDoc,
    responses((status = 201, description = "Created", body = crate::openapi::PropertyDoc), (status = 400, description = "Validation Error")))]
pub async fn create_property(
    State(state): State<ServerState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Property>), JsonApiError> {
    let created = state.properties.create(body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Fields omitted from the body keep their stored value.
#[utoipa::path(put, path = "/properties/{id}", tag = "properties",
    params(("id" = String, Path, description = "property id")),
    request_body = crate::openapi::PropertyInputDoc,
    responses((status = 200, description = "Updated", body = crate::openapi::PropertyDoc), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found")))]
pub async fn update_property(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Property>, JsonApiError> {
    let updated = state.properties.update(&id, body(payload)?).await?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/properties/{id}", tag = "properties",
    params(("id" = String, Path, description = "property id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete_property(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    state.properties.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
