use std::collections::HashSet;
use std::io::{Cursor, Write};

use anyhow::{Context, Result};
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::types::{numbered_path, split_extension, FileRecord};

pub const PROJECT_ARCHIVE_NAME: &str = "forge-project.zip";
pub const WORKSPACE_ARCHIVE_NAME: &str = "workspace.zip";

/// `src/a.ts` at `1.0.1` becomes `src/a-v1.0.1.ts`.
pub fn versioned_file_name(record: &FileRecord) -> String {
    match split_extension(&record.file_name) {
        (stem, Some(ext)) => format!("{}-v{}.{}", stem, record.version, ext),
        (stem, None) => format!("{}-v{}", stem, record.version),
    }
}

/// Archive path of a record: `project/<versioned name>`.
pub fn archive_path(record: &FileRecord) -> String {
    format!("{}/{}", record.project_name, versioned_file_name(record))
}

/// Zip every record under its project folder.
pub fn project_zip<'a, I>(records: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a FileRecord>,
{
    write_zip(records.into_iter().map(|r| (archive_path(r), r.content.as_str())))
}

/// Zip arbitrary `(path, content)` pairs, e.g. the workspace tree. A path
/// that is already taken gets a `-N` suffix before its extension.
pub fn write_zip<'a, I>(entries: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (String, &'a str)>,
{
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut used: HashSet<String> = HashSet::new();
    for (path, content) in entries {
        let path = free_entry_name(path, &used);
        zip.start_file(path.as_str(), options)
            .with_context(|| format!("Failed to start zip entry {}", path))?;
        zip.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write zip entry {}", path))?;
        used.insert(path);
    }

    let bytes = zip.finish().context("Failed to finish zip archive")?.into_inner();
    debug!(entries = used.len(), size = bytes.len(), "zip archive built");
    Ok(bytes)
}

fn free_entry_name(path: String, used: &HashSet<String>) -> String {
    if !used.contains(&path) {
        return path;
    }
    let mut n = 1;
    loop {
        let candidate = numbered_path(&path, n);
        if !used.contains(&candidate) {
            warn!(entry = %path, renamed = %candidate, "duplicate zip entry renamed");
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    fn record(project: &str, file: &str, version: &str, content: &str) -> FileRecord {
        FileRecord {
            id: format!("{}-{}-{}-0", project, file, version),
            project_name: project.into(),
            file_name: file.into(),
            version: version.into(),
            content: content.into(),
        }
    }

    #[test]
    fn test_versioned_file_name() {
        assert_eq!(versioned_file_name(&record("p", "a.ts", "1.0.0", "")), "a-v1.0.0.ts");
        assert_eq!(
            versioned_file_name(&record("p", "src/a/b.test.ts", "2", "")),
            "src/a/b.test-v2.ts"
        );
        assert_eq!(versioned_file_name(&record("p", "Makefile", "1.1", "")), "Makefile-v1.1");
    }

    #[test]
    fn test_project_zip_layout() {
        let records = vec![
            record("demo", "a.ts", "1.0.0", "const a = 1;"),
            record("demo", "a.ts", "1.0.1", "const a = 2;"),
            record("other", "src/b.rs", "0.1.0", "fn main() {}"),
        ];
        let bytes = project_zip(&records).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 3);

        let mut content = String::new();
        archive
            .by_name("demo/a-v1.0.1.ts")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "const a = 2;");

        assert!(archive.by_name("other/src/b-v0.1.0.rs").is_ok());
    }

    fn read_entry(archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut content = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
    }

    #[test]
    fn test_colliding_archive_paths_are_numbered() {
        let records = vec![
            record("demo", "x/a.ts", "1", "nested file"),
            record("demo/x", "a.ts", "1", "nested project"),
            record("demo", "a.ts", "1", "plain"),
            record("demo", "a", "1.ts", "version with dot"),
        ];
        let bytes = project_zip(&records).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 4);
        assert_eq!(read_entry(&mut archive, "demo/x/a-v1.ts"), "nested file");
        assert_eq!(read_entry(&mut archive, "demo/x/a-v1-1.ts"), "nested project");
        assert_eq!(read_entry(&mut archive, "demo/a-v1.ts"), "plain");
        assert_eq!(read_entry(&mut archive, "demo/a-v1-1.ts"), "version with dot");
    }

    #[test]
    fn test_empty_zip_is_valid() {
        let bytes = project_zip(&Vec::new()).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
