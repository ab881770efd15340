use crate::jobs::models::{JobRecord, JOB_COLUMNS};
use crate::jobs::spreadsheet::{write_jobs_sheet, SpreadsheetError};

/// One row per job, list fields flattened to display strings.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl SummaryTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Encodes the table as the `jobs` sheet of an `.xlsx` workbook.
    pub fn to_xlsx(&self) -> Result<Vec<u8>, SpreadsheetError> {
        write_jobs_sheet(&self.columns, &self.rows)
    }
}

/// Builds the summary in record order. `parameters` is rebuilt from
/// `parameters_list`, so blank lines never reach the sheet.
pub fn build_summary(jobs: &[JobRecord]) -> SummaryTable {
    SummaryTable {
        columns: JOB_COLUMNS.to_vec(),
        rows: jobs.iter().map(summary_row).collect(),
    }
}

// Must stay in JOB_COLUMNS order.
fn summary_row(job: &JobRecord) -> Vec<String> {
    vec![
        job.jobname.clone(),
        job.workflow_name.clone(),
        job.application.clone(),
        job.group.clone(),
        job.parameters_text(),
        job.predecessors_text(),
        job.successors_text(),
        job.log_path.clone(),
        job.input_path.clone(),
        job.output_path.clone(),
        job.naming.clone(),
        job.process_description.clone(),
        job.functionality_description.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::ingest::jobs_from_dataset;
    use crate::jobs::models::CellValue;
    use crate::jobs::normalize::normalize_scalar;
    use crate::jobs::spreadsheet::read_jobs_sheet;

    fn jobs() -> Vec<JobRecord> {
        vec![
            JobRecord {
                jobname: "JOB_A".to_string(),
                group: "G1".to_string(),
                parameters: "X=1\n\n  Y=2  ".to_string(),
                predecessors: vec!["P1".to_string(), "P2".to_string()],
                successors: vec!["S1".to_string()],
                ..Default::default()
            },
            JobRecord {
                jobname: "JOB_B".to_string(),
                naming: "BI_JOB_B".to_string(),
                ..Default::default()
            },
        ]
    }

    fn column(name: &str) -> usize {
        JOB_COLUMNS.iter().position(|c| *c == name).unwrap()
    }

    #[test]
    fn test_one_row_per_job_in_order() {
        let table = build_summary(&jobs());
        assert_eq!(table.columns, JOB_COLUMNS.to_vec());
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], "JOB_A");
        assert_eq!(table.rows[1][0], "JOB_B");
        assert_eq!(table.rows[1][column("naming")], "BI_JOB_B");
    }

    #[test]
    fn test_list_fields_are_flattened() {
        let table = build_summary(&jobs());
        let row = &table.rows[0];
        assert_eq!(row[column("parameters")], "X=1\nY=2");
        assert_eq!(row[column("predecessors")], "P1, P2");
        assert_eq!(row[column("successors")], "S1");
        assert_eq!(row[column("group")], "G1");
        assert_eq!(table.rows[1][column("predecessors")], "");
    }

    #[test]
    fn test_workbook_round_trip_preserves_flattened_fields() {
        let original = jobs();
        let bytes = build_summary(&original).to_xlsx().unwrap();
        let dataset = read_jobs_sheet(&bytes).unwrap();

        assert_eq!(dataset.len(), original.len());
        assert_eq!(dataset.columns(), JOB_COLUMNS);
        for (row, job) in original.iter().enumerate() {
            let cell = |name: &str| normalize_scalar(dataset.cell(row, column(name)));
            assert_eq!(cell("jobname"), job.jobname);
            assert_eq!(cell("parameters"), job.parameters_text());
            assert_eq!(cell("predecessors"), job.predecessors_text());
            assert_eq!(cell("successors"), job.successors_text());
        }

        // Re-ingesting splits the joined lists back apart.
        assert_eq!(jobs_from_dataset(&dataset)[0].predecessors, original[0].predecessors);
        assert_eq!(dataset.cell(1, column("group")), &CellValue::Empty);
    }

    #[test]
    fn test_empty_summary_still_has_header() {
        let table = build_summary(&[]);
        assert!(table.rows.is_empty());
        let dataset = read_jobs_sheet(&table.to_xlsx().unwrap()).unwrap();
        assert_eq!(dataset.columns(), JOB_COLUMNS);
        assert!(dataset.is_empty());
    }
}
