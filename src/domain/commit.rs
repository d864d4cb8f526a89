/// A file touched by a commit or pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    pub filename: String,
    /// Unified diff; absent for binary or rename-only changes.
    pub patch: Option<String>,
}

impl ChangedFile {
    pub fn new(filename: impl Into<String>, patch: Option<String>) -> Self {
        Self {
            filename: filename.into(),
            patch,
        }
    }

    fn patch_text(&self) -> &str {
        self.patch.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: String,
    pub parents: Vec<String>,
    pub files: Vec<ChangedFile>,
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Concatenates every file that carries a patch, skipping patchless entries.
    pub fn diff(&self) -> String {
        self.files
            .iter()
            .filter(|file| !file.patch_text().is_empty())
            .map(|file| format!("File: {}\n{}\n", file.filename, file.patch_text()))
            .collect()
    }
}

/// Summarises every file of a pull request, including those without a patch.
pub fn pull_request_diff(files: &[ChangedFile]) -> String {
    files
        .iter()
        .map(|file| format!("File: {}\nChanges: {}\n\n", file.filename, file.patch_text()))
        .collect()
}
