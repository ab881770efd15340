use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::generation::generator::GeneratedCover;
use crate::generation::GenerationError;

pub const ARCHIVE_NAME: &str = "jobs_output.zip";
pub const SUMMARY_ENTRY: &str = "jobs_summary.xlsx";
const COVERS_DIR: &str = "covers";

/// Archive path of a job's cover. Path separators in the job name are replaced
/// so the entry always stays under `covers/`.
pub fn cover_entry_name(job_name: &str) -> String {
    format!("{COVERS_DIR}/{}.txt", file_stem(job_name))
}

fn file_stem(job_name: &str) -> String {
    job_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

/// Like `cover_entry_name`, but distinct keys that sanitize to the same name
/// (`A/B` and `A_B`) get `~2`, `~3`, ... appended in the order they arrive.
fn unique_entry_name(job_name: &str, taken: &mut HashSet<String>) -> String {
    let mut name = cover_entry_name(job_name);
    let mut n = 2;
    while !taken.insert(name.clone()) {
        name = format!("{COVERS_DIR}/{}~{n}.txt", file_stem(job_name));
        n += 1;
    }
    name
}

/// Writes every cover under `covers/` and the summary workbook at the root.
pub fn build_archive(
    covers: &[GeneratedCover],
    summary_xlsx: &[u8],
) -> Result<Vec<u8>, GenerationError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut taken = HashSet::with_capacity(covers.len());
    for cover in covers {
        zip.start_file(unique_entry_name(&cover.job_name, &mut taken), options)?;
        zip.write_all(cover.text.as_bytes())?;
    }
    zip.start_file(SUMMARY_ENTRY, options)?;
    zip.write_all(summary_xlsx)?;

    Ok(zip.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use zip::ZipArchive;

    use super::*;

    #[test]
    fn test_cover_entry_name() {
        assert_eq!(cover_entry_name("JOB_A"), "covers/JOB_A.txt");
        assert_eq!(cover_entry_name("../etc/passwd"), "covers/.._etc_passwd.txt");
        assert_eq!(cover_entry_name("a\\b"), "covers/a_b.txt");
    }

    #[test]
    fn test_archive_layout() {
        let covers = vec![
            GeneratedCover {
                job_name: "JOB1".to_string(),
                text: "cover one".to_string(),
            },
            GeneratedCover {
                job_name: "JOB2".to_string(),
                text: "cover two".to_string(),
            },
        ];
        let bytes = build_archive(&covers, b"xlsx-bytes").unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<_> = archive.file_names().map(String::from).collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"covers/JOB1.txt".to_string()));
        assert!(names.contains(&"covers/JOB2.txt".to_string()));
        assert!(names.contains(&SUMMARY_ENTRY.to_string()));

        let mut text = String::new();
        archive
            .by_name("covers/JOB2.txt")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "cover two");

        let mut summary = Vec::new();
        archive
            .by_name(SUMMARY_ENTRY)
            .unwrap()
            .read_to_end(&mut summary)
            .unwrap();
        assert_eq!(summary, b"xlsx-bytes");
    }

    #[test]
    fn test_colliding_entry_names_get_suffixes() {
        let covers: Vec<_> = ["A/B", "A_B", "A\\B"]
            .iter()
            .map(|name| GeneratedCover {
                job_name: name.to_string(),
                text: format!("cover {name}"),
            })
            .collect();
        let bytes = build_archive(&covers, b"xlsx-bytes").unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 4);

        let mut text = String::new();
        archive
            .by_name("covers/A_B~2.txt")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "cover A_B");
        assert!(archive.by_name("covers/A_B.txt").is_ok());
        assert!(archive.by_name("covers/A_B~3.txt").is_ok());
    }
}
