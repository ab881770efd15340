//! Cover rendering: one plain-text document per job.
//!
//! The layout lives in a MiniJinja template bundled with the binary
//! (`templates/job_cover.txt.j2`). Operators can swap it at startup via
//! `COVER_TEMPLATE_PATH`; a template that does not parse stops the service
//! from starting rather than failing per request.
//!
//! Template context:
//! - `job.*`: every `JobRecord` field (lists as sequences)
//! - `job.parameters_list`: non-blank parameter lines
//! - `job.parameters_text`, `job.predecessors_text`, `job.successors_text`: joined forms
//! - `generated_at`: `YYYY-MM-DD HH:MM:SS`, local time

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use minijinja::Environment;
use serde::Serialize;
use tracing::info;

use crate::generation::GenerationError;
use crate::jobs::models::JobRecord;

pub const COVER_TEMPLATE_NAME: &str = "job_cover.txt";

const BUNDLED_COVER_TEMPLATE: &str = include_str!("../../templates/job_cover.txt.j2");

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time in the format covers print.
pub fn generation_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Serialize)]
struct CoverContext<'a> {
    job: CoverJob<'a>,
    generated_at: &'a str,
}

#[derive(Serialize)]
struct CoverJob<'a> {
    #[serde(flatten)]
    record: &'a JobRecord,
    parameters_list: Vec<&'a str>,
    parameters_text: String,
    predecessors_text: String,
    successors_text: String,
}

impl<'a> CoverJob<'a> {
    fn new(record: &'a JobRecord) -> Self {
        Self {
            record,
            parameters_list: record.parameters_list(),
            parameters_text: record.parameters_text(),
            predecessors_text: record.predecessors_text(),
            successors_text: record.successors_text(),
        }
    }
}

/// Holds the compiled cover template. Built once at startup and shared.
#[derive(Debug)]
pub struct CoverRenderer {
    env: Environment<'static>,
}

impl CoverRenderer {
    /// Renderer for the bundled template.
    pub fn bundled() -> Result<Self, GenerationError> {
        Self::from_source(BUNDLED_COVER_TEMPLATE.to_string())
    }

    pub fn from_source(source: String) -> Result<Self, GenerationError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_keep_trailing_newline(true);
        env.add_template_owned(COVER_TEMPLATE_NAME, source)?;
        Ok(Self { env })
    }

    /// Bundled template, or the override file when one is configured.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        match override_path {
            Some(path) => {
                let source = std::fs::read_to_string(path).with_context(|| {
                    format!("Failed to read cover template '{}'", path.display())
                })?;
                let renderer = Self::from_source(source).with_context(|| {
                    format!("Cover template '{}' is invalid", path.display())
                })?;
                info!("Cover template loaded from {}", path.display());
                Ok(renderer)
            }
            None => Ok(Self::bundled()?),
        }
    }

    pub fn render(&self, job: &JobRecord, generated_at: &str) -> Result<String, GenerationError> {
        let template = self.env.get_template(COVER_TEMPLATE_NAME)?;
        let text = template.render(CoverContext {
            job: CoverJob::new(job),
            generated_at,
        })?;
        Ok(text)
    }
}
