pub mod export;
pub mod parser;
pub mod types;
pub mod version;

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use types::{CandidateFile, FileKey, FileRecord};

/// `project -> file -> records`, newest version first.
pub type GroupedFiles<'a> = BTreeMap<&'a str, BTreeMap<&'a str, Vec<&'a FileRecord>>>;

/// Session-scoped collection of generated files, unique by
/// `(project, file, version)`.
#[derive(Debug, Default)]
pub struct GeneratedFileStore {
    records: Vec<FileRecord>,
    keys: HashSet<FileKey>,
}

impl GeneratedFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a candidate. Returns the stored record, or `None` when a record
    /// with the same key already exists (the existing one is kept).
    pub fn insert(&mut self, candidate: CandidateFile, now_millis: i64) -> Option<&FileRecord> {
        let key = candidate.key();
        if self.keys.contains(&key) {
            debug!(
                project = %key.project_name,
                file = %key.file_name,
                version = %key.version,
                "duplicate generated file ignored"
            );
            return None;
        }
        self.keys.insert(key);
        self.records
            .push(FileRecord::from_candidate(candidate, now_millis));
        self.records.last()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn get(&self, project: &str, file: &str, version: &str) -> Option<&FileRecord> {
        self.records
            .iter()
            .find(|r| r.project_name == project && r.file_name == file && r.version == version)
    }

    /// Highest version of a file, by numeric-aware comparison.
    pub fn latest(&self, project: &str, file: &str) -> Option<&FileRecord> {
        self.records
            .iter()
            .filter(|r| r.project_name == project && r.file_name == file)
            .max_by(|a, b| version::compare_versions(&a.version, &b.version))
    }

    /// Look up a record by `project/file@version`, or `project/file` for the
    /// latest version. The project is everything before the first `/`.
    pub fn resolve(&self, query: &str) -> Option<&FileRecord> {
        let (path, version) = match query.rsplit_once('@') {
            Some((path, version)) => (path, Some(version.trim())),
            None => (query, None),
        };
        let (project, file) = path.trim().split_once('/')?;
        match version {
            Some(v) => self.get(project, file, v),
            None => self.latest(project, file),
        }
    }

    /// Group by project then file, versions descending.
    pub fn grouped(&self) -> GroupedFiles<'_> {
        let mut groups: GroupedFiles<'_> = BTreeMap::new();
        for record in &self.records {
            groups
                .entry(record.project_name.as_str())
                .or_default()
                .entry(record.file_name.as_str())
                .or_default()
                .push(record);
        }
        for files in groups.values_mut() {
            for versions in files.values_mut() {
                versions.sort_by(|a, b| version::compare_versions(&b.version, &a.version));
            }
        }
        groups
    }
}
