use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use shared::error::{ApiError, ErrorCode};
use storage::{classify_failure, Storage};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod app_state;
mod config;
mod controller;
mod view;

use app_state::AppState;
use config::load_settings;
use controller::{events::ActionForm, session::SessionId};
use view::render_page;

const SESSION_COOKIE: &str = "inventory_session";
const MAX_FORM_BYTES: usize = 16 * 1024;

type PageError = (StatusCode, String);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    let database_url = settings.database_url();
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    storage.health_check().await?;

    let state = AppState::new(Arc::new(storage), settings.page_title.clone());
    let app = build_router(Arc::new(state));

    let addr = settings.bind_addr()?;
    info!(%addr, %database_url, "inventory page listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(show_page).post(submit_action))
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(MAX_FORM_BYTES))
        .with_state(state)
}

/// Renders the page. Only a post opens a UI session, so a bare visit stores nothing.
async fn show_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Html<String>, PageError> {
    let view = {
        let mut controller = state.controller.lock().await;
        let session = controller.resume_session(session_from_headers(&headers));
        controller.reload(session).await.map_err(storage_failure)?
    };

    Ok(Html(render_page(&state.page_title, &view)))
}

async fn submit_action(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<ActionForm>,
) -> Result<Response, PageError> {
    let requested = session_from_headers(&headers);
    let actions = form.into_actions().map_err(bad_request)?;

    let session = {
        let mut controller = state.controller.lock().await;
        let session = controller.open_session(requested);
        for action in actions {
            controller
                .dispatch(session, action)
                .await
                .map_err(storage_failure)?;
        }
        session
    };

    // The redirected GET performs the full reload.
    Ok(with_session_cookie(
        Redirect::to("/").into_response(),
        requested,
        session,
    ))
}

async fn not_found() -> PageError {
    (
        StatusCode::NOT_FOUND,
        ApiError::new(ErrorCode::NotFound, "only the inventory page is served").to_string(),
    )
}

fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
        .map(SessionId)
}

fn with_session_cookie(
    mut response: Response,
    requested: Option<SessionId>,
    session: SessionId,
) -> Response {
    if requested != Some(session) {
        let cookie = format!("{SESSION_COOKIE}={session}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

fn storage_failure(error: anyhow::Error) -> PageError {
    let classified = classify_failure(&error);
    error!(error = %classified, "product store failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ApiError::from(classified).to_string(),
    )
}

fn bad_request(error: ApiError) -> PageError {
    warn!(%error, "rejecting malformed action");
    (StatusCode::BAD_REQUEST, error.to_string())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
