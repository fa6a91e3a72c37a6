//! HTTP API consumed by the installer front end

use crate::core::models::DaemonConfig;
use crate::daemon::error::{message, ApiError, ApiResult};
use crate::daemon::files::{clean_filename, is_installable, list_files};
use crate::daemon::forms::{DownloadQuery, SendForm, UploadQuery};
use crate::daemon::sender::{download_url, push_to_console};
use axum::{
    body::Body,
    extract::{FromRequest, Query, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use futures::TryStreamExt;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tower::ServiceExt;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeFile, trace::TraceLayer};
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct DaemonState {
    pub config: Arc<DaemonConfig>,
}

/// Run the daemon until Ctrl+C
pub async fn run_daemon(config: DaemonConfig) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    info!("FBI installer daemon listening on {}", config.listen);
    info!("Serving titles from {}", config.data_dir.display());

    axum::serve(listener, create_router(config))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

pub fn create_router(config: DaemonConfig) -> Router {
    let state = DaemonState {
        config: Arc::new(config),
    };

    Router::new()
        .route("/ping", get(ping))
        .route("/api/upload", post(upload))
        .route("/api/list", get(list))
        .route("/api/send", post(send))
        .route("/api/download", get(download))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
}

async fn ping() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "pong")
}

/// Stream the request body into the data directory
async fn upload(
    State(state): State<DaemonState>,
    Query(query): Query<UploadQuery>,
    body: Body,
) -> ApiResult<Response> {
    if !is_installable(&query.filename) {
        return Err(ApiError::BadRequest(
            "filename must end with .cia, .3dsx, .cetk or .tik".to_string(),
        ));
    }

    let target = clean_filename(&state.config.data_dir, &query.filename)
        .ok_or_else(|| ApiError::BadRequest("wrong filepath".to_string()))?;

    let mut file = tokio::fs::File::create(&target)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to open file {}: {}", target.display(), e)))?;

    let mut stream = body.into_data_stream();
    let write_failed = |e: String| ApiError::Internal(format!("failed to write file {}: {}", target.display(), e));
    while let Some(chunk) = stream.try_next().await.map_err(|e| write_failed(e.to_string()))? {
        file.write_all(&chunk).await.map_err(|e| write_failed(e.to_string()))?;
    }
    file.flush().await.map_err(|e| write_failed(e.to_string()))?;

    info!("uploaded {}", target.display());
    Ok(message(StatusCode::OK, format!("uploaded {}", query.filename)))
}

async fn list(State(state): State<DaemonState>) -> ApiResult<Json<Vec<String>>> {
    list_files(&state.config.data_dir).await.map(Json).map_err(|e| {
        ApiError::Internal(format!(
            "failed to list directory {}: {}",
            state.config.data_dir.display(),
            e
        ))
    })
}

async fn download(
    State(state): State<DaemonState>,
    Query(query): Query<DownloadQuery>,
    request: Request,
) -> ApiResult<Response> {
    let target = clean_filename(&state.config.data_dir, &query.name).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "file must be inside {}",
            state.config.data_dir.display()
        ))
    })?;

    match ServeFile::new(target).oneshot(request).await {
        Ok(response) => Ok(response.into_response()),
        Err(never) => match never {},
    }
}

/// Accepts JSON or urlencoded forms, like the original web client sends
async fn send(State(state): State<DaemonState>, request: Request) -> ApiResult<StatusCode> {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    let form = if is_json {
        Json::<SendForm>::from_request(request, &())
            .await
            .map(|Json(form)| form)
            .map_err(|_| ApiError::InvalidRequest)?
    } else {
        Form::<SendForm>::from_request(request, &())
            .await
            .map(|Form(form)| form)
            .map_err(|_| ApiError::InvalidRequest)?
    };

    if !form.is_complete() {
        return Err(ApiError::InvalidRequest);
    }

    let Some(hostname) = state.config.base_url.clone().or(host) else {
        warn!("no base url configured and request has no Host header");
        return Err(ApiError::InvalidRequest);
    };

    let url = download_url(&hostname, &form.name);
    tokio::spawn(async move {
        if let Err(e) = push_to_console(&form.address, &url).await {
            error!("failed to send {} to {}: {}", url, form.address, e);
        }
    });

    Ok(StatusCode::OK)
}
