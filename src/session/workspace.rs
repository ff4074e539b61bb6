use serde_json::json;
use tracing::debug;

use crate::clock::Clock;
use crate::files::types::{numbered_path, split_extension, FileRecord};

const IMPORT_DIR: &str = "downloads";
const KEPT_RESPONSE_DIR: &str = "from-ai";
pub const DOCUMENTS_DIR: &str = "documents/";
const NEW_DOCUMENT: &str = "# New Document\n\nStart writing here.";
const CODE_HINTS: &[&str] = &["const", "function", "import", "class", "<div", "SELECT", "FROM"];

const WELCOME: &str = "// Welcome to your project!\n\
// Generated files land in `/forge files`; use `/forge import` to copy one here.\n";

/// A file in the user's virtual project tree.
#[derive(Debug, Clone)]
pub struct WorkspaceFile {
    pub id: String,
    pub path: String,
    pub language: String,
    pub content: String,
}

/// Virtual file tree, unique by path.
#[derive(Debug)]
pub struct Workspace {
    files: Vec<WorkspaceFile>,
    next_id: u64,
}

impl Default for Workspace {
    fn default() -> Self {
        let mut ws = Self {
            files: Vec::new(),
            next_id: 1,
        };
        ws.create_file("src/welcome.js", WELCOME);
        ws
    }
}

impl Workspace {
    pub fn files(&self) -> &[WorkspaceFile] {
        &self.files
    }

    pub fn get(&self, path: &str) -> Option<&WorkspaceFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Markdown documents under `documents/`, sorted by path.
    pub fn documents(&self) -> Vec<&WorkspaceFile> {
        let mut docs: Vec<_> = self
            .files
            .iter()
            .filter(|f| f.path.starts_with(DOCUMENTS_DIR))
            .collect();
        docs.sort_by(|a, b| a.path.cmp(&b.path));
        docs
    }

    /// Create a file, suffixing `-1`, `-2`, … before the extension until the
    /// path is free. An empty `.json` file starts from a BEJson template.
    /// Returns the stored file.
    pub fn create_file(&mut self, path: &str, content: &str) -> &WorkspaceFile {
        let path = self.unique_path(path);
        let language = language_for_path(&path);
        let content = if content.is_empty() && language == "json" {
            bejson_template(&path)
        } else {
            content.to_string()
        };
        let file = WorkspaceFile {
            id: self.next_id.to_string(),
            language: language.to_string(),
            path,
            content,
        };
        self.next_id += 1;
        debug!(path = %file.path, language = %file.language, "workspace file created");
        self.files.push(file);
        &self.files[self.files.len() - 1]
    }

    /// Start a new `documents/new-document-N.md`.
    pub fn create_document(&mut self) -> &WorkspaceFile {
        let n = self
            .documents()
            .iter()
            .filter(|d| d.path.contains("new-document"))
            .count();
        let path = format!("{}new-document-{}.md", DOCUMENTS_DIR, n + 1);
        self.create_file(&path, NEW_DOCUMENT)
    }

    /// Replace a file's content. `None` when no file has that path.
    pub fn update_content(&mut self, path: &str, content: &str) -> Option<&WorkspaceFile> {
        let file = self.files.iter_mut().find(|f| f.path == path)?;
        file.content = content.to_string();
        debug!(path = %file.path, size = content.len(), "workspace file updated");
        Some(&*file)
    }

    /// Copy a generated file into `downloads/<name>-v<version>.<ext>`.
    pub fn import_record(&mut self, record: &FileRecord) -> &WorkspaceFile {
        let base = record.file_name.rsplit('/').next().unwrap_or(&record.file_name);
        let (name, ext) = split_extension(base);
        let path = format!(
            "{}/{}-v{}.{}",
            IMPORT_DIR,
            name,
            record.version,
            ext.unwrap_or("txt")
        );
        self.create_file(&path, &record.content)
    }

    /// Keep a raw AI reply as a file, `.ts` when it looks like code.
    pub fn keep_response(&mut self, content: &str, clock: &dyn Clock) -> &WorkspaceFile {
        let ext = if CODE_HINTS.iter().any(|kw| content.contains(kw)) {
            "ts"
        } else {
            "md"
        };
        let path = format!("{}/response-{}.{}", KEPT_RESPONSE_DIR, clock.now_millis(), ext);
        self.create_file(&path, content)
    }

    fn unique_path(&self, path: &str) -> String {
        let taken = |p: &str| self.files.iter().any(|f| f.path == p);
        if !taken(path) {
            return path.to_string();
        }
        (1..)
            .map(|n| numbered_path(path, n))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| path.to_string())
    }
}

/// Starter BEJson document; `Parent_Hierarchy` is the file's folder.
fn bejson_template(path: &str) -> String {
    let hierarchy = match path.rfind('/') {
        Some(idx) => format!("/{}", &path[..idx]),
        None => "/".to_string(),
    };
    let template = json!({
        "Format": "BEJson",
        "Format_Version": "1-0-4",
        "Format_Creator": "Elton Boehnen",
        "Parent_Hierarchy": hierarchy,
        "Records_Type": ["NewRecord"],
        "Fields": [
            { "name": "id", "type": "integer" },
            { "name": "name", "type": "string" }
        ],
        "Values": [[1, "Example Record"]]
    });
    serde_json::to_string_pretty(&template).unwrap_or_else(|_| template.to_string())
}

/// Editor language id from a file extension.
pub fn language_for_path(path: &str) -> &'static str {
    let ext = split_extension(path).1.map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("js" | "jsx") => "javascript",
        Some("ts" | "tsx") => "typescript",
        Some("json") => "json",
        Some("css") => "css",
        Some("html") => "html",
        Some("md") => "markdown",
        Some("rs") => "rust",
        Some("py") => "python",
        _ => "plaintext",
    }
}
