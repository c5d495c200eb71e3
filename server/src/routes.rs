//! HTTP routes
//!
//! `/api/health` and `/static` are served directly; every other path goes
//! through the mounted application shell.

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use ratt_core::Navigation;
use serde_json::{json, Value};
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Header set by the client on in-app navigation requests
const HX_REQUEST: &str = "hx-request";
/// Tells the client which URL to show after a redirected in-app navigation
const HX_REPLACE_URL: &str = "hx-replace-url";

/// Create main router with all routes
pub fn app_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .fallback(page)
        .with_state(state)
}

/// Health check with a summary of the mounted application
async fn health(State(state): State<AppState>) -> Json<Value> {
    let routes: Vec<_> = state.app.table().iter().collect();

    Json(json!({
        "status": "ok",
        "project_id": state.services.config().project_id,
        "root_behavior": state.config.root_behavior,
        "mount_target": state.app.mount_target(),
        "routes": routes,
    }))
}

/// Render whatever the router resolves the request path to
async fn page(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if method != Method::GET && method != Method::HEAD {
        return Ok(StatusCode::METHOD_NOT_ALLOWED.into_response());
    }

    let partial = headers
        .get(HX_REQUEST)
        .is_some_and(|v| v.as_bytes() == b"true");

    let navigation = state.app.navigate(uri.path());

    // Query parameters survive the redirect
    let redirect_location = |path: &str| match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };

    match &navigation {
        Navigation::Redirected { from, active } if !partial => {
            tracing::debug!(from = %from, to = %active.path, "Redirecting");
            return Ok(Redirect::to(&redirect_location(&active.path)).into_response());
        }
        Navigation::Unmatched { path } => {
            tracing::warn!("No route for {}", path);
        }
        _ => {}
    }

    let body = state.app.render(&navigation, partial)?;
    let status = match navigation {
        Navigation::Unmatched { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::OK,
    };

    let mut response = (status, Html(body)).into_response();
    if let Navigation::Redirected { active, .. } = &navigation {
        if partial {
            let location = HeaderValue::from_str(&redirect_location(&active.path))
                .map_err(|e| AppError::InternalError(e.to_string()))?;
            response.headers_mut().insert(HX_REPLACE_URL, location);
        }
    }

    Ok(response)
}

// ============================================================================
// Error Handling
// ============================================================================

/// Custom error type for page routes
#[derive(Debug)]
pub enum AppError {
    TemplateError(String),
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::TemplateError(msg) => {
                tracing::error!("Template error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Template error: {}", msg))
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Internal error: {}", msg))
            }
        };

        (status, message).into_response()
    }
}

impl From<ratt_core::Error> for AppError {
    fn from(err: ratt_core::Error) -> Self {
        match err {
            ratt_core::Error::TemplateError(msg) => AppError::TemplateError(msg),
            other => AppError::InternalError(other.to_string()),
        }
    }
}
