//! Request handlers. Each one extracts its inputs, calls the matching command and converts the
//! result into JSON.

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::commands::{self, Created, Out, SchemaInfo};
use crate::model::{NewTransaction, Record};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

type ApiResult<T> = Result<Json<T>, ApiError>;

pub(super) async fn create_transaction(
    State(state): State<AppState>,
    payload: Result<Json<NewTransaction>, JsonRejection>,
) -> ApiResult<Out<Created>> {
    let Json(transaction) = payload?;
    let out = commands::insert(&state.config, transaction).await?;
    Ok(Json(out))
}

/// Returns the bare list of records, not an `Out`.
pub(super) async fn list_transactions(
    State(state): State<AppState>,
    category: Result<Path<String>, PathRejection>,
) -> ApiResult<Vec<Record>> {
    let Path(category) = category?;
    let out = commands::list(&state.config, &category).await?;
    Ok(Json(out.into_structure().unwrap_or_default()))
}

pub(super) async fn update_transaction(
    State(state): State<AppState>,
    path: Result<Path<(String, usize)>, PathRejection>,
    partial: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Out<Record>> {
    let Path((category, index)) = path?;
    let Json(partial) = partial?;
    let out = commands::update(&state.config, &category, index, partial).await?;
    Ok(Json(out))
}

pub(super) async fn delete_transaction(
    State(state): State<AppState>,
    path: Result<Path<(String, usize)>, PathRejection>,
) -> ApiResult<Out<Record>> {
    let Path((category, index)) = path?;
    let out = commands::delete(&state.config, &category, index).await?;
    Ok(Json(out))
}

pub(super) async fn schema() -> Json<Out<Vec<SchemaInfo>>> {
    Json(commands::schema())
}
