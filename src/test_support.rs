//! In-memory collaborators shared by workflow tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::domain::comment::IssueComment;
use crate::domain::commit::{ChangedFile, Commit};
use crate::domain::pull_request::PullRequestRef;
use crate::domain::table::{GenerationRequest, TableDefinition, TableSetup};
use crate::error::{AppError, AppResult};
use crate::services::{CodeHostService, GenerationService, ResponseStream};

/// Formats one `data:` line carrying `parts` for `column`.
pub fn sse_chunk(column: &str, parts: &[&str]) -> String {
    let choices: Vec<_> = parts
        .iter()
        .map(|part| json!({ "message": { "content": part } }))
        .collect();
    let chunk = json!({ "output_column_name": column, "choices": choices });
    format!("data: {chunk}\n")
}

/// A complete stream answering `column` with `text` split into two fragments.
pub fn sse_answer(column: &str, text: &str) -> String {
    let split = text
        .char_indices()
        .nth(text.chars().count() / 2)
        .map_or(text.len(), |(index, _)| index);
    let (head, tail) = text.split_at(split);
    [
        sse_chunk("Unrelated", &["noise"]),
        sse_chunk(column, &[head]),
        sse_chunk(column, &[tail]),
        "data: [DONE]\n".to_string(),
    ]
    .concat()
}

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "PRWARDEN_GITHUB_TOKEN" => Some("ghp_test".to_string()),
        "PRWARDEN_BOT_NAME" => Some("prwarden".to_string()),
        _ => None,
    })
    .expect("test configuration should load")
}

pub fn commit(sha: &str, parents: &[&str], files: &[(&str, Option<&str>)]) -> Commit {
    Commit {
        sha: sha.to_string(),
        parents: parents.iter().map(|parent| parent.to_string()).collect(),
        files: files
            .iter()
            .map(|(name, patch)| ChangedFile::new(*name, patch.map(str::to_string)))
            .collect(),
    }
}

#[derive(Default)]
pub struct FakeCodeHost {
    pub files: Vec<ChangedFile>,
    pub commits: Vec<Commit>,
    pub commit_details: HashMap<String, Commit>,
    pub comments: Vec<IssueComment>,
    pub fail_listing: bool,
    pub fail_posting: bool,
    pub undeletable: Vec<u64>,
    pub posted: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<u64>>,
}

impl FakeCodeHost {
    /// Lists `commits` and serves each one's details from the same values.
    pub fn with_commits(commits: Vec<Commit>) -> Self {
        let commit_details = commits
            .iter()
            .map(|commit| (commit.sha.clone(), commit.clone()))
            .collect();
        Self {
            commits,
            commit_details,
            ..Self::default()
        }
    }

    pub fn posted(&self) -> Vec<String> {
        self.posted.lock().expect("posted mutex should be available").clone()
    }

    pub fn deleted(&self) -> Vec<u64> {
        self.deleted.lock().expect("deleted mutex should be available").clone()
    }

    fn listing_error(&self) -> AppResult<()> {
        if self.fail_listing {
            Err(AppError::CodeHost("listing unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CodeHostService for FakeCodeHost {
    async fn list_pull_request_files(&self, _pr: &PullRequestRef) -> AppResult<Vec<ChangedFile>> {
        self.listing_error()?;
        Ok(self.files.clone())
    }

    async fn list_pull_request_commits(&self, _pr: &PullRequestRef) -> AppResult<Vec<Commit>> {
        self.listing_error()?;
        Ok(self
            .commits
            .iter()
            .map(|commit| Commit {
                files: Vec::new(),
                ..commit.clone()
            })
            .collect())
    }

    async fn get_commit(&self, _pr: &PullRequestRef, sha: &str) -> AppResult<Commit> {
        self.commit_details
            .get(sha)
            .cloned()
            .ok_or_else(|| AppError::CodeHost(format!("commit {sha} not found")))
    }

    async fn list_comments(&self, _pr: &PullRequestRef) -> AppResult<Vec<IssueComment>> {
        self.listing_error()?;
        Ok(self.comments.clone())
    }

    async fn create_comment(&self, _pr: &PullRequestRef, body: &str) -> AppResult<()> {
        if self.fail_posting {
            return Err(AppError::CodeHost("comment rejected".to_string()));
        }
        self.posted
            .lock()
            .expect("posted mutex should be available")
            .push(body.to_string());
        Ok(())
    }

    async fn delete_comment(&self, _pr: &PullRequestRef, comment_id: u64) -> AppResult<()> {
        if self.undeletable.contains(&comment_id) {
            return Err(AppError::CodeHost(format!("cannot delete {comment_id}")));
        }
        self.deleted
            .lock()
            .expect("deleted mutex should be available")
            .push(comment_id);
        Ok(())
    }
}

type Responder = Box<dyn Fn(&GenerationRequest) -> AppResult<String> + Send + Sync>;

/// Answers every generation request through a scripted responder and keeps
/// a log of the requests it saw.
pub struct FakeGeneration {
    responder: Responder,
    table_outcome: TableSetup,
    pub requests: Mutex<Vec<GenerationRequest>>,
    pub tables: Mutex<Vec<TableDefinition>>,
}

impl FakeGeneration {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&GenerationRequest) -> AppResult<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            table_outcome: TableSetup::Created,
            requests: Mutex::new(Vec::new()),
            tables: Mutex::new(Vec::new()),
        }
    }

    pub fn with_table_outcome(mut self, outcome: TableSetup) -> Self {
        self.table_outcome = outcome;
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().expect("requests mutex should be available").clone()
    }

    pub fn tables(&self) -> Vec<TableDefinition> {
        self.tables.lock().expect("tables mutex should be available").clone()
    }
}

#[async_trait]
impl GenerationService for FakeGeneration {
    async fn add_row(&self, request: &GenerationRequest) -> AppResult<ResponseStream> {
        self.requests
            .lock()
            .expect("requests mutex should be available")
            .push(request.clone());
        let body = (self.responder)(request)?;
        Ok(Box::new(std::io::Cursor::new(body.into_bytes())))
    }

    async fn create_table(&self, table: &TableDefinition) -> AppResult<TableSetup> {
        self.tables
            .lock()
            .expect("tables mutex should be available")
            .push(table.clone());
        Ok(self.table_outcome)
    }
}

/// The single text value of a request's only row.
pub fn prompt_of(request: &GenerationRequest) -> &str {
    request
        .data
        .first()
        .and_then(|row| row.values().next())
        .map(String::as_str)
        .unwrap_or_default()
}

pub fn context_with(code_host: Arc<FakeCodeHost>, generation: Arc<FakeGeneration>) -> AppContext {
    AppContext::new(test_config(), code_host, generation)
}

pub fn pull_request() -> PullRequestRef {
    PullRequestRef::new("octo", "widgets", 42)
}
