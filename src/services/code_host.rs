use async_trait::async_trait;

use crate::domain::comment::IssueComment;
use crate::domain::commit::{ChangedFile, Commit};
use crate::domain::pull_request::PullRequestRef;
use crate::error::AppResult;

#[async_trait]
pub trait CodeHostService: Send + Sync {
    async fn list_pull_request_files(&self, pr: &PullRequestRef) -> AppResult<Vec<ChangedFile>>;
    /// Commits in listing order; file lists are not populated.
    async fn list_pull_request_commits(&self, pr: &PullRequestRef) -> AppResult<Vec<Commit>>;
    async fn get_commit(&self, pr: &PullRequestRef, sha: &str) -> AppResult<Commit>;
    async fn list_comments(&self, pr: &PullRequestRef) -> AppResult<Vec<IssueComment>>;
    async fn create_comment(&self, pr: &PullRequestRef, body: &str) -> AppResult<()>;
    async fn delete_comment(&self, pr: &PullRequestRef, comment_id: u64) -> AppResult<()>;
}
