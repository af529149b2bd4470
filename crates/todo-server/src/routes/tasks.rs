use axum::{
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use todo_core::attachment::{AttachmentLink, AttachmentUpload};
use todo_core::response::{ApiResponse, ResponseStatus};
use todo_core::task::{TaskFilter, TaskRequest, TaskView};
use todo_service::{extension_of, ServiceError};

use super::{to_error, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/todo/v2/task", get(list_tasks).post(create_task))
        .route("/todo/v2/task/{id}", get(get_task).put(update_task))
        .route("/todo/v2/task/attachment/{bucket}", post(upload_attachment))
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn bad_request(message: impl Into<String>) -> ApiError {
    to_error(ServiceError::BadRequest(message.into()))
}

fn task_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(e) => Err(bad_request(e.body_text())),
    }
}

fn task_body(body: Result<Json<TaskRequest>, JsonRejection>) -> Result<TaskRequest, ApiError> {
    match body {
        Ok(Json(req)) => Ok(req),
        Err(e) => Err(to_error(ServiceError::InvalidPayload(e.body_text()))),
    }
}

async fn list_tasks(
    State(state): State<AppState>,
    query: Result<Query<TaskFilter>, QueryRejection>,
) -> ApiResult<Vec<TaskView>> {
    let Query(mut filter) = query.map_err(|e| bad_request(e.body_text()))?;
    // `?name=` with no value means no filter.
    filter.name = filter.name.filter(|n| !n.is_empty());
    state
        .tasks
        .list_tasks(&filter)
        .await
        .map(|t| Json(ApiResponse::ok(t)))
        .map_err(to_error)
}

async fn get_task(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<TaskView> {
    let id = task_id(path)?;
    state
        .tasks
        .get_task(id)
        .await
        .map(|t| Json(ApiResponse::ok(t)))
        .map_err(to_error)
}

async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<TaskRequest>, JsonRejection>,
) -> ApiResult<TaskView> {
    let req = task_body(body)?;
    state
        .tasks
        .create_task(req)
        .await
        .map(|t| Json(ApiResponse::ok(t)))
        .map_err(to_error)
}

async fn update_task(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<TaskRequest>, JsonRejection>,
) -> ApiResult<TaskView> {
    let id = task_id(path)?;
    let req = task_body(body)?;
    state
        .tasks
        .update_task(id, req)
        .await
        .map(|t| Json(ApiResponse::ok(t)))
        .map_err(to_error)
}

/// Multipart failures keep their own status (413 for an oversized body).
fn multipart_error(e: MultipartError) -> ApiError {
    let status = e.status();
    (
        status,
        Json(ApiResponse::error(
            ResponseStatus::InvalidPayload,
            status.as_u16(),
            e.body_text(),
        )),
    )
}

async fn upload_attachment(
    State(state): State<AppState>,
    Path(folder): Path<String>,
    multipart: Result<Multipart, axum::extract::multipart::MultipartRejection>,
) -> ApiResult<AttachmentLink> {
    // Reject unknown folders before touching the body.
    state.tasks.policy().check_folder(&folder).map_err(to_error)?;
    let mut multipart = multipart.map_err(|e| bad_request(e.body_text()))?;

    let mut name_param = String::new();
    let mut file: Option<(String, bytes::Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("filename") => {
                name_param = field.text().await.map_err(multipart_error)?;
            }
            Some("attachment") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((file_name, data));
            }
            _ => {}
        }
    }

    let Some((file_name, data)) = file else {
        return Err(bad_request("missing 'attachment' file"));
    };

    let upload = AttachmentUpload {
        extension: extension_of(&file_name).to_string(),
        size: data.len() as u64,
        data,
        file_name,
        name_param,
    };

    state
        .tasks
        .upload_attachment(&folder, upload)
        .await
        .map(|link| Json(ApiResponse::ok(link)))
        .map_err(to_error)
}
