use serde::{Deserialize, Serialize};

/// Column that identifies a job. Rows without it are never turned into records.
pub const KEY_COLUMN: &str = "jobname";

/// Recognized columns, in the order the summary workbook lays them out.
pub const JOB_COLUMNS: [&str; 13] = [
    "jobname",
    "workflow_name",
    "application",
    "group",
    "parameters",
    "predecessors",
    "successors",
    "log_path",
    "input_path",
    "output_path",
    "naming",
    "process_description",
    "functionality_description",
];

// ────────────────────────────────────────────────────────────────────────────
// Raw tabular input
// ────────────────────────────────────────────────────────────────────────────

/// A raw value as it arrives from a form submission or a spreadsheet cell.
///
/// JSON `null` decodes to `Empty`, arrays to `List`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<CellValue>),
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Named columns plus rows of raw cells. Column order is whatever the source had.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularDataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl TabularDataset {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `(row, column)`. Short rows read as `Empty` past their end.
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// One manual submission. Every field except `jobname` may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobForm {
    pub jobname: String,
    pub workflow_name: String,
    pub application: String,
    pub group: String,
    pub parameters: String,
    /// Comma-separated string or JSON array.
    pub predecessors: CellValue,
    pub successors: CellValue,
    pub log_path: String,
    pub input_path: String,
    pub output_path: String,
    pub naming: String,
    pub process_description: String,
    pub functionality_description: String,
}

impl JobForm {
    /// Cells in `JOB_COLUMNS` order.
    pub fn cells(&self) -> Vec<CellValue> {
        vec![
            self.jobname.as_str().into(),
            self.workflow_name.as_str().into(),
            self.application.as_str().into(),
            self.group.as_str().into(),
            self.parameters.as_str().into(),
            self.predecessors.clone(),
            self.successors.clone(),
            self.log_path.as_str().into(),
            self.input_path.as_str().into(),
            self.output_path.as_str().into(),
            self.naming.as_str().into(),
            self.process_description.as_str().into(),
            self.functionality_description.as_str().into(),
        ]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Canonical record
// ────────────────────────────────────────────────────────────────────────────

/// Documentation metadata for one batch job, after normalization.
///
/// Built once by the ingestor and only read afterwards. `jobname` is never
/// empty for a record that came out of ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    pub jobname: String,
    pub workflow_name: String,
    pub application: String,
    pub group: String,
    /// Raw multi-line block; one `KEY=VALUE` entry per non-blank line.
    pub parameters: String,
    pub predecessors: Vec<String>,
    pub successors: Vec<String>,
    pub log_path: String,
    pub input_path: String,
    pub output_path: String,
    pub naming: String,
    pub process_description: String,
    pub functionality_description: String,
}

impl JobRecord {
    /// Non-blank lines of `parameters`, trimmed.
    pub fn parameters_list(&self) -> Vec<&str> {
        self.parameters
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn parameters_text(&self) -> String {
        self.parameters_list().join("\n")
    }

    pub fn predecessors_text(&self) -> String {
        self.predecessors.join(", ")
    }

    pub fn successors_text(&self) -> String {
        self.successors.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_list_drops_blank_lines() {
        let job = JobRecord {
            jobname: "JOB".to_string(),
            parameters: "DATA=20250101\n\nAMBIENTE=HML\n  ".to_string(),
            ..Default::default()
        };
        assert_eq!(job.parameters_list(), vec!["DATA=20250101", "AMBIENTE=HML"]);
        assert_eq!(job.parameters_text(), "DATA=20250101\nAMBIENTE=HML");
    }

    #[test]
    fn test_parameters_list_handles_crlf() {
        let job = JobRecord {
            parameters: "A=1\r\n  B=2  \r\n".to_string(),
            ..Default::default()
        };
        assert_eq!(job.parameters_list(), vec!["A=1", "B=2"]);
    }

    #[test]
    fn test_empty_lists_join_to_empty_string() {
        let job = JobRecord::default();
        assert_eq!(job.predecessors_text(), "");
        assert_eq!(job.successors_text(), "");
        assert!(job.parameters_list().is_empty());
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let mut dataset = TabularDataset::new(["jobname", "group"]);
        dataset.push_row(vec!["JOB".into()]);
        assert_eq!(dataset.cell(0, 0), &CellValue::from("JOB"));
        assert_eq!(dataset.cell(0, 1), &CellValue::Empty);
        assert_eq!(dataset.cell(5, 0), &CellValue::Empty);
    }

    #[test]
    fn test_form_accepts_string_or_array_lists() {
        let form: JobForm = serde_json::from_str(
            r#"{"jobname": "JOB", "predecessors": "A, B", "successors": ["C", null, 7]}"#,
        )
        .unwrap();
        assert_eq!(form.predecessors, CellValue::from("A, B"));
        assert_eq!(
            form.successors,
            CellValue::List(vec![
                CellValue::from("C"),
                CellValue::Empty,
                CellValue::Number(7.0)
            ])
        );
        assert_eq!(form.group, "");
    }

    #[test]
    fn test_form_cells_follow_column_order() {
        let form = JobForm {
            jobname: "JOB".to_string(),
            naming: "BI_JOB".to_string(),
            ..Default::default()
        };
        let cells = form.cells();
        assert_eq!(cells.len(), JOB_COLUMNS.len());
        let naming = JOB_COLUMNS.iter().position(|c| *c == "naming").unwrap();
        assert_eq!(cells[naming], CellValue::from("BI_JOB"));
        assert_eq!(cells[0], CellValue::from("JOB"));
    }
}
