use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

use todo_core::response::{ApiResponse, ResponseStatus};

use crate::routes::AppState;

/// HTTP basic-auth credentials. Only digests are kept.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    username_hash: String,
    password_hash: String,
}

impl BasicAuth {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username_hash: sha256_hex(username),
            password_hash: sha256_hex(password),
        }
    }

    /// Check an `Authorization` header value.
    pub fn verify(&self, header_value: &str) -> bool {
        let Some((user, pass)) = decode_basic(header_value) else {
            return false;
        };
        // Evaluate both so a wrong username costs the same as a wrong password.
        let user_ok = constant_time_eq(&sha256_hex(&user), &self.username_hash);
        let pass_ok = constant_time_eq(&sha256_hex(&pass), &self.password_hash);
        user_ok & pass_ok
    }
}

/// SHA-256 hash a string, returning the hex-encoded digest.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn decode_basic(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (user, pass) = text.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Axum middleware that enforces basic auth.
///
/// If `auth` is `None` in the AppState, all requests pass through.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let auth = match &state.auth {
        Some(auth) => auth,
        None => return next.run(request).await,
    };

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| auth.verify(v));

    if authorized {
        return next.run(request).await;
    }

    tracing::debug!(path = %request.uri().path(), "rejected unauthenticated request");
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"todo\"")],
        Json(ApiResponse::<()>::error(
            ResponseStatus::Unauthorized,
            401,
            "missing or invalid credentials",
        )),
    )
        .into_response()
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
