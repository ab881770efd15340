//! `.xlsx` decoding for uploads and encoding for the summary and example workbooks.
//!
//! Every workbook this service reads or writes keeps its data on a sheet named
//! `jobs`, header in the first row.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, DataType, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};
use thiserror::Error;
use tracing::debug;

use crate::jobs::models::{CellValue, TabularDataset, JOB_COLUMNS};
use crate::jobs::normalize::normalize_scalar;

pub const SHEET_NAME: &str = "jobs";

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Illustrative values for every recognized column, in `JOB_COLUMNS` order.
const EXAMPLE_ROW: [&str; 13] = [
    "JOB_EXEMPLO",
    "WF_EXEMPLO",
    "APLICACAO_X",
    "GRUPO_A",
    "DATA=20250101\nAMBIENTE=HML",
    "JOB_A, JOB_B",
    "JOB_C",
    "/logs/JOB_EXEMPLO.log",
    "/data/in",
    "/data/out",
    "BI_JOB_EXEMPLO_YYYYMMDD",
    "Processa dados de exemplo",
    "Gera outputs de teste",
];

#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("could not open workbook: {0}")]
    Open(#[from] calamine::XlsxError),

    #[error("workbook has no '{0}' sheet")]
    MissingSheet(String),

    #[error("could not write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
}

// ────────────────────────────────────────────────────────────────────────────
// Reading
// ────────────────────────────────────────────────────────────────────────────

/// Decodes the `jobs` sheet of an `.xlsx` workbook.
///
/// An empty sheet yields an empty dataset. Header cells are normalized to
/// strings; data cells keep their native type for the normalizer.
pub fn read_jobs_sheet(bytes: &[u8]) -> Result<TabularDataset, SpreadsheetError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;

    if !workbook.sheet_names().iter().any(|name| name == SHEET_NAME) {
        return Err(SpreadsheetError::MissingSheet(SHEET_NAME.to_string()));
    }
    let range = workbook.worksheet_range(SHEET_NAME)?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(TabularDataset::default());
    };

    let mut dataset = TabularDataset::new(
        header
            .iter()
            .map(|cell| normalize_scalar(&cell_value(cell))),
    );
    for row in rows {
        dataset.push_row(row.iter().map(cell_value).collect());
    }

    debug!(
        "Read {} row(s) x {} column(s) from sheet '{SHEET_NAME}'",
        dataset.len(),
        dataset.columns().len()
    );
    Ok(dataset)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| CellValue::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()))
            .unwrap_or(CellValue::Empty),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Writing
// ────────────────────────────────────────────────────────────────────────────

/// Encodes a header plus string rows as a single-sheet workbook named `jobs`.
/// Empty strings are left as blank cells.
pub fn write_jobs_sheet<S: AsRef<str>>(
    columns: &[S],
    rows: &[Vec<String>],
) -> Result<Vec<u8>, SpreadsheetError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let wrapped = Format::new().set_text_wrap();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name.as_ref(), &bold)?;
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let (row_num, col_num) = ((r + 1) as u32, c as u16);
            if value.contains('\n') {
                worksheet.write_string_with_format(row_num, col_num, value, &wrapped)?;
            } else {
                worksheet.write_string(row_num, col_num, value)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// The downloadable model workbook: every recognized column, one example row.
pub fn example_input_workbook() -> Result<Vec<u8>, SpreadsheetError> {
    let row: Vec<String> = EXAMPLE_ROW.iter().map(|v| v.to_string()).collect();
    write_jobs_sheet(&JOB_COLUMNS, &[row])
}
