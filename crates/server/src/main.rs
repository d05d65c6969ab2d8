use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use server_api::ApiContext;
use shared::{
    domain::FormId,
    error::{ApiError, ErrorCode},
    protocol::{forms_route, FormDocument, FormSummary},
};
use storage::Storage;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, prepare_database_url};

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings()?;
    let database_url = prepare_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify the path is writable"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state), settings.body_limit_bytes);

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, body_limit = settings.body_limit_bytes, "form server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(forms_route(), get(http_list_forms).post(http_save_form))
        .route("/forms/:form_id", get(http_get_form))
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state
        .api
        .storage
        .health_check()
        .await
        .map_err(|e| into_response_error(ApiError::internal(e.to_string())))?;
    Ok("ok")
}

async fn http_save_form(
    State(state): State<Arc<AppState>>,
    Json(document): Json<FormDocument>,
) -> ApiResult<Json<FormDocument>> {
    let stored = server_api::save_form(&state.api, document)
        .await
        .map_err(into_response_error)?;
    Ok(Json(stored))
}

async fn http_list_forms(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<FormSummary>>> {
    let forms = server_api::list_forms(&state.api)
        .await
        .map_err(into_response_error)?;
    Ok(Json(forms))
}

async fn http_get_form(
    State(state): State<Arc<AppState>>,
    Path(form_id): Path<String>,
) -> ApiResult<Json<FormDocument>> {
    let document = server_api::get_form(&state.api, &FormId(form_id))
        .await
        .map_err(into_response_error)?;
    Ok(Json(document))
}

fn into_response_error(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
