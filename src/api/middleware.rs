//! API Middleware
//!
//! Session authentication and request logging.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::json;

use crate::domain::UserProfile;
use crate::handlers::SessionHandler;
use crate::session::SESSION_COOKIE;

use super::AppState;

/// The authenticated user, inserted by the session middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserProfile);

/// The raw session secret for the request, inserted by the session
/// middleware. Logout needs it to close the remote session.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

// =========================================================================
// Session Authentication Middleware
// =========================================================================

/// Read the session cookie once, resolve the user behind it, and make both
/// available to handlers as extensions. Requests without a resolvable
/// session are rejected here.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = match jar.get(SESSION_COOKIE) {
        Some(cookie) if !cookie.value().is_empty() => cookie.value().to_string(),
        _ => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Not signed in",
                    "error_code": "unauthorized"
                })),
            )
                .into_response());
        }
    };

    let sessions = SessionHandler::new(state.identity.clone(), state.documents());
    let profile = match sessions.current_user(&token).await {
        Some(profile) => profile,
        None => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Session is invalid or expired",
                    "error_code": "unauthorized"
                })),
            )
                .into_response());
        }
    };

    request.extensions_mut().insert(SessionToken(token));
    request.extensions_mut().insert(CurrentUser(profile));

    Ok(next.run(request).await)
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "x-horizon-key",
    "x-horizon-session",
    "idempotency-key",
];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();

    // Mask sensitive headers
    let headers = mask_headers_for_logging(request.headers());

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        version = ?version,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    response
}
