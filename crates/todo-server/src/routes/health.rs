use axum::{routing::get, Json, Router};
use todo_core::response::ApiResponse;

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/todo", get(index))
}

async fn index() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message_only("Application is running properly"))
}
