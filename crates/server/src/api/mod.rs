use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use shared::{
    error::ErrorBody,
    protocol::{ResultSet, API_PREFIX, COMBINE_ROUTE, IMAGE1_PART, IMAGE2_PART, OUTPUT_ROUTE},
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    app_state::AppState,
    combine::{combine_into, sweep_request_dirs, CombineOp},
};

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (status, Json(ErrorBody::new(message)))
}

pub fn combine_route() -> String {
    format!("{API_PREFIX}{COMBINE_ROUTE}")
}

pub fn output_route() -> String {
    format!("{OUTPUT_ROUTE}/:request_id/:file_name")
}

pub(crate) fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(&combine_route(), post(combine))
        .route(&output_route(), get(serve_output))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn combine(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<ResultSet>> {
    let mut image1 = None;
    let mut image2 = None;

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        api_error(StatusCode::BAD_REQUEST, format!("invalid multipart body: {err}"))
    })? {
        let name = field.name().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|err| {
            api_error(StatusCode::BAD_REQUEST, format!("failed to read upload: {err}"))
        })?;
        info!(part = ?name, file_name = ?file_name, bytes = bytes.len(), "received upload part");
        match name.as_deref() {
            Some(IMAGE1_PART) => image1 = Some(bytes),
            Some(IMAGE2_PART) => image2 = Some(bytes),
            _ => debug!(part = ?name, "ignoring unexpected multipart field"),
        }
    }

    let (Some(image1), Some(image2)) = (
        image1.filter(|bytes| !bytes.is_empty()),
        image2.filter(|bytes| !bytes.is_empty()),
    ) else {
        warn!("combine request is missing an image");
        return Err(api_error(StatusCode::BAD_REQUEST, "Both images are required"));
    };

    let request_id = Uuid::new_v4();
    let output_dir = state.output_dir.join(request_id.to_string());
    let root = state.output_dir.clone();
    let retained = state.retained_requests;
    let written = tokio::task::spawn_blocking(move || {
        let written = combine_into(&image1, &image2, &output_dir)?;
        match sweep_request_dirs(&root, &output_dir, retained) {
            Ok(0) => {}
            Ok(removed) => info!(%request_id, removed, "swept old request outputs"),
            Err(err) => warn!(%request_id, error = %format!("{err:#}"), "output sweep failed"),
        }
        Ok::<_, anyhow::Error>(written)
    })
    .await
    .map_err(|err| {
        error!(%request_id, %err, "combine task panicked");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "combine task failed")
    })?
    .map_err(|err| {
        error!(%request_id, error = %format!("{err:#}"), "image combination failed");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error processing images: {err:#}"),
        )
    })?;

    let results: ResultSet = written
        .iter()
        .map(|(op, _)| {
            (
                op.result_key(),
                format!(
                    "{}{OUTPUT_ROUTE}/{request_id}/{}",
                    state.public_url,
                    op.file_name()
                ),
            )
        })
        .collect();
    info!(%request_id, results = results.len(), "combine request completed");
    Ok(Json(results))
}

async fn serve_output(
    State(state): State<Arc<AppState>>,
    Path((request_id, file_name)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let not_found = || api_error(StatusCode::NOT_FOUND, "File not found");
    let request_id = Uuid::parse_str(&request_id).map_err(|_| not_found())?;
    let op = CombineOp::from_file_name(&file_name).ok_or_else(not_found)?;

    let path = state
        .output_dir
        .join(request_id.to_string())
        .join(op.file_name());
    let bytes = tokio::fs::read(&path).await.map_err(|err| {
        debug!(path = %path.display(), %err, "output file unavailable");
        not_found()
    })?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
