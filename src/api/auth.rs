use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects the request with 401 unless `x-api-key` matches the configured key.
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let rejection = match req.headers().get(API_KEY_HEADER) {
        None => Some("missing"),
        Some(value)
            if value
                .to_str()
                .is_ok_and(|key| constant_time_eq(key, &state.api_key)) =>
        {
            None
        }
        Some(_) => Some("invalid"),
    };

    if let Some(reason) = rejection {
        warn!("rejected request to {}: {} api key", req.uri().path(), reason);
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}
