pub mod health;
pub mod tasks;
pub mod users;

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    Json, Router,
};
use todo_core::response::{ApiResponse, ResponseStatus};
use todo_service::{ServiceError, TaskService, UserService};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{auth_middleware, BasicAuth};

/// Upper bound on any request body, multipart uploads included.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub struct InnerAppState {
    pub tasks: TaskService,
    pub users: UserService,
    pub auth: Option<Arc<BasicAuth>>,
    /// Empty means any origin is echoed back.
    pub allowed_origins: Vec<String>,
}

pub type AppState = Arc<InnerAppState>;

/// Error half of every handler's result.
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub fn build_router(state: AppState) -> Router {
    let public = Router::new().merge(health::routes());

    let protected = Router::new()
        .merge(tasks::routes())
        .merge(users::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let cors = cors_layer(&state.allowed_origins);
    with_layers(public.merge(protected).with_state(state), cors)
}

/// Body limit, panic recovery, CORS and request tracing, innermost first.
fn with_layers(router: Router, cors: CorsLayer) -> Router {
    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error(
            ResponseStatus::UnexpectedError,
            500,
            "internal server error",
        )),
    )
        .into_response()
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        let list: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(origin = %o, "ignoring unparsable CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(list)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::POST, Method::GET, Method::PUT, Method::DELETE])
        .allow_headers([
            header::ORIGIN,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-requested-with"),
            header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

pub(crate) fn to_error(e: ServiceError) -> ApiError {
    let status =
        StatusCode::from_u16(e.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiResponse::error(e.code(), e.status(), e.message())),
    )
}
