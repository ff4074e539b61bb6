use serde::{Deserialize, Serialize};

/// A file extracted from an AI reply, before the store assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub project_name: String,
    pub file_name: String,
    pub version: String,
    pub content: String,
}

impl CandidateFile {
    pub fn key(&self) -> FileKey {
        FileKey {
            project_name: self.project_name.clone(),
            file_name: self.file_name.clone(),
            version: self.version.clone(),
        }
    }
}

/// The `(project, file, version)` triple that decides uniqueness in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileKey {
    pub project_name: String,
    pub file_name: String,
    pub version: String,
}

/// A stored, immutable generated file. Serializes with the same field names a
/// caller would key external persistence on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// `{project}-{file}-{version}-{millis}`; display/iteration only.
    pub id: String,
    pub project_name: String,
    pub file_name: String,
    pub version: String,
    pub content: String,
}

impl FileRecord {
    pub fn from_candidate(candidate: CandidateFile, now_millis: i64) -> Self {
        let id = format!(
            "{}-{}-{}-{}",
            candidate.project_name, candidate.file_name, candidate.version, now_millis
        );
        Self {
            id,
            project_name: candidate.project_name,
            file_name: candidate.file_name,
            version: candidate.version,
            content: candidate.content,
        }
    }
}

/// Split a path-like name into `(everything before the last dot of the final
/// segment, extension)`. Dots in directory names are ignored.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    let segment_start = name.rfind('/').map(|i| i + 1).unwrap_or(0);
    match name[segment_start..].rfind('.') {
        Some(dot) => {
            let dot = segment_start + dot;
            (&name[..dot], Some(&name[dot + 1..]))
        }
        None => (name, None),
    }
}

/// `a.ts` numbered `2` becomes `a-2.ts`; names without an extension get a
/// plain `-2`.
pub fn numbered_path(path: &str, n: usize) -> String {
    match split_extension(path) {
        (stem, Some(ext)) => format!("{}-{}.{}", stem, n, ext),
        (stem, None) => format!("{}-{}", stem, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_is_composite() {
        let candidate = CandidateFile {
            project_name: "demo".into(),
            file_name: "src/a.ts".into(),
            version: "1.0.0".into(),
            content: "x".into(),
        };
        let key = candidate.key();
        let record = FileRecord::from_candidate(candidate, 42);
        assert_eq!(record.id, "demo-src/a.ts-1.0.0-42");
        assert_eq!(
            (record.project_name, record.file_name, record.version),
            (key.project_name, key.file_name, key.version)
        );
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a.ts"), ("a", Some("ts")));
        assert_eq!(split_extension("src/a/b.test.ts"), ("src/a/b.test", Some("ts")));
        assert_eq!(split_extension("Makefile"), ("Makefile", None));
        assert_eq!(split_extension("v1.2/README"), ("v1.2/README", None));
    }

    #[test]
    fn test_numbered_path() {
        assert_eq!(numbered_path("demo/a-v1.ts", 1), "demo/a-v1-1.ts");
        assert_eq!(numbered_path("v1.2/README", 3), "v1.2/README-3");
    }

    #[test]
    fn test_record_serializes_with_key_fields() {
        let record = FileRecord::from_candidate(
            CandidateFile {
                project_name: "demo".into(),
                file_name: "a.ts".into(),
                version: "1.0.0".into(),
                content: "x".into(),
            },
            7,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["project_name"], "demo");
        assert_eq!(json["file_name"], "a.ts");
        assert_eq!(json["version"], "1.0.0");
        let back: FileRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
