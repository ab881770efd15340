use std::collections::HashMap;

use tracing::debug;

use crate::jobs::models::{
    CellValue, JobForm, JobRecord, TabularDataset, JOB_COLUMNS, KEY_COLUMN,
};
use crate::jobs::normalize::{normalize_list, normalize_scalar};

/// Case-insensitive view over a dataset's header.
///
/// Keys are the trimmed, lowercased column names. When two columns collapse to
/// the same key the rightmost one wins.
struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn new(columns: &[String]) -> Self {
        let positions = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_lowercase(), i))
            .collect();
        Self { positions }
    }

    fn cell<'a>(
        &self,
        dataset: &'a TabularDataset,
        row: usize,
        field: &str,
    ) -> Option<&'a CellValue> {
        self.positions
            .get(field)
            .map(|&column| dataset.cell(row, column))
    }

    fn scalar(&self, dataset: &TabularDataset, row: usize, field: &str) -> String {
        self.cell(dataset, row, field)
            .map(normalize_scalar)
            .unwrap_or_default()
    }

    fn list(&self, dataset: &TabularDataset, row: usize, field: &str) -> Vec<String> {
        self.cell(dataset, row, field)
            .map(normalize_list)
            .unwrap_or_default()
    }
}

/// Maps every row with a non-empty `jobname` to a `JobRecord`, in row order.
///
/// Missing columns read as empty and unknown columns are ignored. Rows without
/// a key are skipped silently. Duplicate keys are kept; see `dedup_by_key`.
pub fn jobs_from_dataset(dataset: &TabularDataset) -> Vec<JobRecord> {
    let index = ColumnIndex::new(dataset.columns());

    let jobs: Vec<JobRecord> = (0..dataset.len())
        .filter_map(|row| {
            let jobname = index.scalar(dataset, row, KEY_COLUMN);
            if jobname.is_empty() {
                return None;
            }
            Some(JobRecord {
                jobname,
                workflow_name: index.scalar(dataset, row, "workflow_name"),
                application: index.scalar(dataset, row, "application"),
                group: index.scalar(dataset, row, "group"),
                parameters: index.scalar(dataset, row, "parameters"),
                predecessors: index.list(dataset, row, "predecessors"),
                successors: index.list(dataset, row, "successors"),
                log_path: index.scalar(dataset, row, "log_path"),
                input_path: index.scalar(dataset, row, "input_path"),
                output_path: index.scalar(dataset, row, "output_path"),
                naming: index.scalar(dataset, row, "naming"),
                process_description: index.scalar(dataset, row, "process_description"),
                functionality_description: index.scalar(
                    dataset,
                    row,
                    "functionality_description",
                ),
            })
        })
        .collect();

    let skipped = dataset.len() - jobs.len();
    if skipped > 0 {
        debug!("Skipped {skipped} row(s) without {KEY_COLUMN}");
    }
    jobs
}

/// Lays buffered form submissions out as a dataset with the canonical columns,
/// so they go through the same ingestion path as an uploaded sheet.
pub fn dataset_from_forms(forms: &[JobForm]) -> TabularDataset {
    let mut dataset = TabularDataset::new(JOB_COLUMNS);
    for form in forms {
        dataset.push_row(form.cells());
    }
    dataset
}
