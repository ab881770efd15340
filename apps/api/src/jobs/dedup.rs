use std::collections::HashSet;

use tracing::debug;

use crate::jobs::models::JobRecord;

/// Keeps the first record for each `jobname`, in input order.
///
/// Callers concatenate sources in priority order (form entries before the
/// uploaded sheet), so the earlier source wins on conflict.
pub fn dedup_by_key<I>(records: I) -> Vec<JobRecord>
where
    I: IntoIterator<Item = JobRecord>,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| {
            let first = seen.insert(record.jobname.clone());
            if !first {
                debug!("Dropping duplicate job '{}'", record.jobname);
            }
            first
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(name: &str, workflow: &str) -> JobRecord {
        JobRecord {
            jobname: name.to_string(),
            workflow_name: workflow.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_occurrence_wins() {
        let records = vec![
            job("A", "first"),
            job("B", "b"),
            job("A", "second"),
            job("C", "c"),
        ];
        let unique = dedup_by_key(records);
        let names: Vec<_> = unique.iter().map(|j| j.jobname.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(unique[0].workflow_name, "first");
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let unique = dedup_by_key(vec![job("job", ""), job("JOB", "")]);
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedup_by_key(Vec::new()).is_empty());
    }
}
