use axum::{extract::State, routing::get, Json, Router};
use todo_core::response::ApiResponse;
use todo_core::user::UserView;

use super::{to_error, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/user", get(list_users))
}

async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserView>>>, ApiError> {
    state
        .users
        .list_users()
        .await
        .map(|u| Json(ApiResponse::ok(u)))
        .map_err(to_error)
}
