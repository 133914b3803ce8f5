use axum::Json;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::auth::API_KEY_HEADER;
use crate::error::ErrorResponse;
use crate::models::{NewTaskRequest, Task, TaskStatus, UpdateTaskStatusRequest};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tareas API",
        description = "API para la gestión de tareas",
        version = "1.0"
    ),
    paths(crate::api::list_tasks, crate::api::create_task, crate::api::update_task_status),
    components(schemas(Task, TaskStatus, NewTaskRequest, UpdateTaskStatusRequest, ErrorResponse)),
    modifiers(&ApiKeySecurity),
    tags((name = "tareas", description = "Gestión de tareas"))
)]
pub struct ApiDoc;

struct ApiKeySecurity;

impl Modify for ApiKeySecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            API_KEY_HEADER,
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
