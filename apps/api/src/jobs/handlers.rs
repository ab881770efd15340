use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::ingest::{dataset_from_forms, jobs_from_dataset};
use crate::jobs::models::{JobForm, JobRecord, TabularDataset};
use crate::jobs::normalize::normalize_scalar;
use crate::jobs::session::UploadedSheet;
use crate::jobs::spreadsheet::{example_input_workbook, read_jobs_sheet, XLSX_CONTENT_TYPE};
use crate::state::AppState;

/// Multipart field carrying the workbook.
const UPLOAD_FIELD: &str = "file";
const PREVIEW_ROWS: usize = 20;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UploadSummary {
    pub file_name: String,
    pub row_count: usize,
    pub job_count: usize,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    /// Buffered form entries after normalization.
    pub jobs: Vec<JobRecord>,
    pub upload: Option<UploadSummary>,
}

#[derive(Debug, Serialize)]
pub struct AppendJobResponse {
    pub job_name: String,
    pub buffered: usize,
}

#[derive(Debug, Serialize)]
pub struct UploadPreviewResponse {
    pub file_name: String,
    pub columns: Vec<String>,
    pub row_count: usize,
    /// Rows that will become jobs; rows without a jobname are not counted.
    pub job_count: usize,
    pub preview: Vec<BTreeMap<String, String>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/template
///
/// Example input workbook with one illustrative row per recognized column.
pub async fn handle_example_template() -> Result<Response, AppError> {
    let bytes = example_input_workbook().map_err(|e| AppError::Internal(e.into()))?;
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"example_input.xlsx\"",
            ),
        ],
        bytes,
    )
        .into_response())
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = state.sessions.create().await;
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.snapshot(id).await?;
    let jobs = jobs_from_dataset(&dataset_from_forms(&session.forms));
    let upload = session.upload.map(|upload| UploadSummary {
        row_count: upload.dataset.len(),
        job_count: jobs_from_dataset(&upload.dataset).len(),
        file_name: upload.file_name,
    });
    Ok(Json(SessionResponse {
        session_id: id,
        jobs,
        upload,
    }))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/jobs
///
/// Buffers one form entry. Only `jobname` is validated.
pub async fn handle_append_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<JobForm>,
) -> Result<(StatusCode, Json<AppendJobResponse>), AppError> {
    let job_name = form.jobname.trim().to_string();
    let buffered = state.sessions.append(id, form).await?;
    info!("Session {id}: buffered job '{job_name}' ({buffered} total)");
    Ok((
        StatusCode::CREATED,
        Json(AppendJobResponse { job_name, buffered }),
    ))
}

/// POST /api/v1/sessions/:id/upload
///
/// Parses the workbook in the `file` field and keeps it for generation.
/// A workbook that cannot be read is reported and drops any previous upload,
/// so the next generation proceeds without uploaded rows.
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<UploadPreviewResponse>, AppError> {
    if !state.sessions.exists(id).await {
        return Err(AppError::NotFound(format!("Session {id} not found")));
    }

    let (file_name, bytes) = read_upload_field(multipart).await?;

    let parsed = tokio::task::spawn_blocking(move || read_jobs_sheet(&bytes))
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    let dataset = match parsed {
        Ok(dataset) => dataset,
        Err(e) => {
            warn!("Session {id}: rejected upload '{file_name}': {e}");
            state.sessions.clear_upload(id).await?;
            return Err(AppError::MalformedSpreadsheet(e.to_string()));
        }
    };

    if dataset.is_empty() {
        warn!("Session {id}: upload '{file_name}' has no data rows");
    }

    let response = UploadPreviewResponse {
        file_name: file_name.clone(),
        columns: dataset.columns().to_vec(),
        row_count: dataset.len(),
        job_count: jobs_from_dataset(&dataset).len(),
        preview: preview_rows(&dataset, PREVIEW_ROWS),
    };
    info!(
        "Session {id}: accepted upload '{file_name}' ({} rows, {} jobs)",
        response.row_count, response.job_count
    );

    state
        .sessions
        .set_upload(id, UploadedSheet { file_name, dataset })
        .await?;
    Ok(Json(response))
}

/// DELETE /api/v1/sessions/:id/upload
pub async fn handle_discard_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.clear_upload(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn read_upload_field(mut multipart: Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.xlsx").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        return Ok((file_name, bytes));
    }
    Err(AppError::Validation(format!(
        "Multipart field '{UPLOAD_FIELD}' is required"
    )))
}

fn preview_rows(dataset: &TabularDataset, limit: usize) -> Vec<BTreeMap<String, String>> {
    (0..dataset.len().min(limit))
        .map(|row| {
            dataset
                .columns()
                .iter()
                .enumerate()
                .map(|(col, name)| (name.clone(), normalize_scalar(dataset.cell(row, col))))
                .collect()
        })
        .collect()
}
