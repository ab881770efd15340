//! Axum route handler for archive generation.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::cover::generation_timestamp;
use crate::generation::generator::generate_archive;
use crate::generation::package::ARCHIVE_NAME;
use crate::state::AppState;

pub const JOB_COUNT_HEADER: &str = "x-job-count";

/// POST /api/v1/sessions/:id/generate
///
/// Renders every buffered and uploaded job into a ZIP of covers plus the
/// summary workbook. Fails with 422 when the session holds no jobs.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = state.sessions.snapshot(id).await?;
    let renderer = Arc::clone(&state.renderer);

    let archive = tokio::task::spawn_blocking(move || {
        let generated_at = generation_timestamp();
        generate_archive(&renderer, &session, &generated_at)
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))??;

    info!("Session {id}: generated archive with {} job(s)", archive.job_count);

    let disposition = format!("attachment; filename=\"{ARCHIVE_NAME}\"");
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/zip")),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_str(&disposition).map_err(|e| AppError::Internal(e.into()))?,
            ),
            (
                HeaderName::from_static(JOB_COUNT_HEADER),
                HeaderValue::from(archive.job_count),
            ),
        ],
        archive.bytes,
    )
        .into_response())
}
