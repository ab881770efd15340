//! Turns raw cells into canonical scalar and list fields. Never fails: anything
//! absent or unusable becomes an empty string or an empty list.

use crate::jobs::models::CellValue;

/// Trimmed string form of a cell. `Empty` becomes `""`; a native list renders
/// its non-empty items joined with `", "`.
pub fn normalize_scalar(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Number(n) => format_number(*n),
        CellValue::Text(s) => s.trim().to_string(),
        CellValue::List(_) => normalize_list(value).join(", "),
    }
}

/// Ordered, trimmed, non-empty entries of a cell.
///
/// Text is split on commas; native lists keep their element boundaries.
pub fn normalize_list(value: &CellValue) -> Vec<String> {
    match value {
        CellValue::Empty => Vec::new(),
        CellValue::Text(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(String::from)
            .collect(),
        CellValue::List(items) => items
            .iter()
            .map(normalize_scalar)
            .filter(|item| !item.is_empty())
            .collect(),
        scalar => {
            let s = normalize_scalar(scalar);
            if s.is_empty() {
                Vec::new()
            } else {
                vec![s]
            }
        }
    }
}

/// Spreadsheets hand integers back as floats; `20250101.0` reads `20250101`.
/// NaN is how blank numeric cells tend to arrive, so it reads as empty.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return String::new();
    }
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    n.to_string()
}
