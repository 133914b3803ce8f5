pub mod auth;
pub mod docs;

use std::any::Any;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query};
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::patch;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::error::{AppError, ErrorResponse};
use crate::models::*;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let tareas = Router::new()
        .route("/tareas", get(list_tasks).post(create_task))
        .route("/tareas/{id}/status", patch(update_task_status))
        .route_layer(from_fn_with_state(state.clone(), auth::require_api_key));

    let app = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .merge(tareas);

    with_common_layers(app).with_state(state)
}

/// Request tracing, and a generic 500 for any handler that panics.
fn with_common_layers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(handle_panic)),
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("handler panicked: {}", detail);
    AppError::InternalServerError.into_response()
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/tareas",
    tag = "tareas",
    params(TaskQueryParams),
    responses(
        (status = 200, description = "Tasks, newest first", body = [Task]),
        (status = 401, description = "Invalid or missing API key", body = ErrorResponse)
    ),
    security(("x-api-key" = []))
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskQueryParams>,
) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = state.tasks.list_tasks(params.into_filter()).await?;
    Ok(Json(tasks))
}

#[utoipa::path(
    post,
    path = "/tareas",
    tag = "tareas",
    request_body = NewTaskRequest,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Invalid or missing API key", body = ErrorResponse)
    ),
    security(("x-api-key" = []))
)]
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<NewTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let Json(req) = payload?;
    let task = state.tasks.create_task(req.validate()?).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    patch,
    path = "/tareas/{id}/status",
    tag = "tareas",
    params(("id" = String, Path, description = "Task id")),
    request_body = UpdateTaskStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Task),
        (status = 400, description = "Invalid or unchanged status", body = ErrorResponse),
        (status = 401, description = "Invalid or missing API key", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    security(("x-api-key" = []))
)]
pub async fn update_task_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskStatusRequest>, JsonRejection>,
) -> Result<Json<Task>, AppError> {
    let Json(req) = payload?;
    let task = state.tasks.update_task_status(&id, req.status).await?;
    Ok(Json(task))
}
