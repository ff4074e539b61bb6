use crate::files::types::{split_extension, FileRecord};

use super::workspace::WorkspaceFile;

/// Persistent text prepended to every prompt.
#[derive(Debug, Default)]
pub struct StagingContext {
    text: String,
}

impl StagingContext {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Append an uploaded file's text between start/end markers.
    pub fn attach_upload(&mut self, name: &str, content: &str) {
        self.text.push_str(&format!(
            "\n\n// --- START OF UPLOADED FILE: {name} ---\n{content}\n// --- END OF UPLOADED FILE: {name} ---",
            name = name,
            content = content
        ));
    }

    /// Put a generated file in front of the context, in block syntax, with a
    /// request to bump its version.
    pub fn stage_record(&mut self, record: &FileRecord) {
        let lang = split_extension(&record.file_name).1.unwrap_or_default();
        let block = format!(
            "\n// --- START OF FILE TO UPDATE ---\n\
             projectName: {project}\n\
             filename: {file}\n\
             version: {version}\n\
             ```{lang}\n\
             {content}\n\
             ```\n\
             end of file: {file}\n\
             // --- END OF FILE TO UPDATE ---\n\
             \n\
             // Instructions: Please update the file above as requested in the prompt. \
             Remember to increment the version number.\n",
            project = record.project_name,
            file = record.file_name,
            version = record.version,
            lang = lang,
            content = record.content,
        );
        self.text = format!("{}\n\n{}", block, self.text);
    }

    /// Append a workspace file between start/end markers.
    pub fn attach_file(&mut self, file: &WorkspaceFile) {
        self.text.push_str(&format!(
            "\n\n// --- START OF FILE: {path} ---\n{content}\n// --- END OF FILE: {path} ---",
            path = file.path,
            content = file.content
        ));
    }

    /// The text sent to the model: context, separator, then the prompt.
    pub fn compose(&self, prompt: &str) -> String {
        format!("{}\n\n---\n\nPROMPT:\n{}", self.text, prompt)
    }
}
