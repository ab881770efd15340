//! Generation pipeline for one session.
//!
//! Flow: form buffer + uploaded sheet → jobs_from_dataset → dedup_by_key →
//!       {render covers, build summary} → build_archive.
//!
//! Form entries are ingested before the upload, so a job entered by hand wins
//! over a row with the same jobname in the sheet.

use tracing::{debug, info};

use crate::errors::AppError;
use crate::generation::cover::CoverRenderer;
use crate::generation::package::build_archive;
use crate::generation::summary::{build_summary, SummaryTable};
use crate::generation::GenerationError;
use crate::jobs::dedup::dedup_by_key;
use crate::jobs::ingest::{dataset_from_forms, jobs_from_dataset};
use crate::jobs::models::JobRecord;
use crate::jobs::session::JobSession;

/// A rendered cover, still keyed by the job it belongs to.
#[derive(Debug, Clone)]
pub struct GeneratedCover {
    pub job_name: String,
    pub text: String,
}

/// Both outputs of a generation pass, before packaging.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub covers: Vec<GeneratedCover>,
    pub summary: SummaryTable,
}

/// The packaged deliverable.
#[derive(Debug, Clone)]
pub struct GeneratedArchive {
    pub bytes: Vec<u8>,
    pub job_count: usize,
}

/// Ingests both sources in priority order and removes duplicate jobnames.
pub fn collect_jobs(session: &JobSession) -> Vec<JobRecord> {
    let mut jobs = jobs_from_dataset(&dataset_from_forms(&session.forms));
    let manual = jobs.len();

    if let Some(upload) = &session.upload {
        jobs.extend(jobs_from_dataset(&upload.dataset));
    }
    debug!(
        "Collected {manual} manual and {} uploaded job(s)",
        jobs.len() - manual
    );

    dedup_by_key(jobs)
}

/// Renders one cover per job and the summary table.
///
/// Fails with `NoJobs` before touching the template when there is nothing to
/// render. A render failure aborts the whole pass.
pub fn generate(
    renderer: &CoverRenderer,
    jobs: &[JobRecord],
    generated_at: &str,
) -> Result<GenerationOutput, AppError> {
    if jobs.is_empty() {
        return Err(AppError::NoJobs);
    }

    let covers = jobs
        .iter()
        .map(|job| {
            Ok(GeneratedCover {
                job_name: job.jobname.clone(),
                text: renderer.render(job, generated_at)?,
            })
        })
        .collect::<Result<Vec<_>, GenerationError>>()?;

    Ok(GenerationOutput {
        covers,
        summary: build_summary(jobs),
    })
}

/// Full pipeline for a session snapshot: collect, render, package.
pub fn generate_archive(
    renderer: &CoverRenderer,
    session: &JobSession,
    generated_at: &str,
) -> Result<GeneratedArchive, AppError> {
    let jobs = collect_jobs(session);
    let output = generate(renderer, &jobs, generated_at)?;

    let summary_xlsx = output.summary.to_xlsx().map_err(GenerationError::from)?;
    let bytes = build_archive(&output.covers, &summary_xlsx)?;

    info!(
        "Generated {} cover(s) and a {}-row summary ({} bytes)",
        output.covers.len(),
        output.summary.len(),
        bytes.len()
    );
    Ok(GeneratedArchive {
        bytes,
        job_count: jobs.len(),
    })
}
