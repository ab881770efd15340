// Document generation: cover rendering, summary workbook, ZIP packaging.
// Rendering and packaging are synchronous; handlers run them inside spawn_blocking.

pub mod cover;
pub mod generator;
pub mod handlers;
pub mod package;
pub mod summary;

use thiserror::Error;

use crate::jobs::spreadsheet::SpreadsheetError;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("summary workbook error: {0}")]
    Summary(#[from] SpreadsheetError),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
