//! Account and task API handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use taskd_core::domain::{
    Credentials, ListQuery, NewTask, Registration, Task, TaskId, TaskPage, TaskStatus, TaskdError,
    User,
};

use super::AppState;
use crate::auth::AuthCaller;
use crate::error::ApiError;

/// Raw listing parameters. Values that do not parse fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        Self {
            page: params.page.and_then(|p| p.trim().parse().ok()),
            limit: params.limit.and_then(|l| l.trim().parse().ok()),
            status: params.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

fn parse_task_id(raw: &str) -> Result<TaskId, ApiError> {
    raw.parse().map_err(|_| ApiError::bad_request("invalid task ID"))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|_| ApiError::bad_request("invalid request body"))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.users.register(json_body(body)?).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state.users.login(json_body(body)?).await?;
    let token = state
        .keys
        .issue(&user.caller(), Utc::now())
        .map_err(|e| TaskdError::Internal(format!("failed to sign token: {e}")))?;
    Ok(Json(LoginResponse { token, user }))
}

pub async fn create_task(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    body: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let new = json_body(body)?;
    let task = state.service.create_task(&caller, new).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<TaskPage>, ApiError> {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    let page = state.service.list_tasks(&caller, params.into()).await?;
    Ok(Json(page))
}

pub async fn get_task(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_task_id(&id)?;
    let task = state.service.get_task(&caller, id).await?;
    Ok(Json(task))
}

pub async fn update_task_status(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_task_id(&id)?;
    let status: TaskStatus = json_body(body)?.status.parse()?;
    let task = state.service.update_task_status(&caller, id, status).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_task_id(&id)?;
    state.service.delete_task(&caller, id).await?;
    Ok(Json(json!({ "message": "task deleted successfully" })))
}
