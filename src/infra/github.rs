use async_trait::async_trait;
use http::Uri;
use octocrab::models::CommentId;
use octocrab::{Octocrab, Page};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::comment::IssueComment;
use crate::domain::commit::{ChangedFile, Commit};
use crate::domain::pull_request::PullRequestRef;
use crate::error::{AppError, AppResult};
use crate::services::CodeHostService;

pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    pub fn new(token: &str, api_base: &str) -> AppResult<Self> {
        let base_uri: Uri = api_base
            .parse::<Uri>()
            .map_err(|err| AppError::Configuration(format!("invalid GitHub API URL: {err}")))?;

        let client = Octocrab::builder()
            .personal_token(token)
            .base_uri(base_uri)
            .map_err(|err| AppError::Configuration(format!("invalid GitHub API URL: {err}")))?
            .build()
            .map_err(|err| map_octocrab_error("build client", &err))?;

        Ok(Self { client })
    }

    async fn get_all<T: DeserializeOwned>(&self, operation: &str, route: String) -> AppResult<Vec<T>> {
        let page: Page<T> = self
            .client
            .get(route, None::<&()>)
            .await
            .map_err(|err| map_octocrab_error(operation, &err))?;

        self.client
            .all_pages(page)
            .await
            .map_err(|err| map_octocrab_error(operation, &err))
    }

    fn repo_path(pr: &PullRequestRef) -> String {
        format!("/repos/{}/{}", pr.owner, pr.repo)
    }
}

#[async_trait]
impl CodeHostService for GitHubClient {
    async fn list_pull_request_files(&self, pr: &PullRequestRef) -> AppResult<Vec<ChangedFile>> {
        let route = format!("{}/pulls/{}/files", Self::repo_path(pr), pr.number);
        let files: Vec<ApiFile> = self.get_all("list pull request files", route).await?;
        Ok(files.into_iter().map(ApiFile::into).collect())
    }

    async fn list_pull_request_commits(&self, pr: &PullRequestRef) -> AppResult<Vec<Commit>> {
        let route = format!("{}/pulls/{}/commits", Self::repo_path(pr), pr.number);
        let commits: Vec<ApiCommit> = self.get_all("list pull request commits", route).await?;
        Ok(commits.into_iter().map(ApiCommit::into).collect())
    }

    async fn get_commit(&self, pr: &PullRequestRef, sha: &str) -> AppResult<Commit> {
        let route = format!("{}/commits/{}", Self::repo_path(pr), sha);
        let commit: ApiCommit = self
            .client
            .get(route, None::<&()>)
            .await
            .map_err(|err| map_octocrab_error("get commit", &err))?;
        Ok(commit.into())
    }

    async fn list_comments(&self, pr: &PullRequestRef) -> AppResult<Vec<IssueComment>> {
        let route = format!("{}/issues/{}/comments", Self::repo_path(pr), pr.number);
        let comments: Vec<ApiComment> = self.get_all("list comments", route).await?;
        Ok(comments.into_iter().map(ApiComment::into).collect())
    }

    async fn create_comment(&self, pr: &PullRequestRef, body: &str) -> AppResult<()> {
        let route = format!("{}/issues/{}/comments", Self::repo_path(pr), pr.number);
        let _created: ApiComment = self
            .client
            .post(route, Some(&NewComment { body }))
            .await
            .map_err(|err| map_octocrab_error("create comment", &err))?;
        Ok(())
    }

    async fn delete_comment(&self, pr: &PullRequestRef, comment_id: u64) -> AppResult<()> {
        self.client
            .issues(&pr.owner, &pr.repo)
            .delete_comment(CommentId(comment_id))
            .await
            .map_err(|err| map_octocrab_error("delete comment", &err))
    }
}

fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> AppError {
    if let octocrab::Error::GitHub { source, .. } = error {
        return AppError::CodeHost(format!(
            "{operation} failed with status {status}: {message}",
            status = source.status_code,
            message = source.message
        ));
    }
    AppError::CodeHost(format!("{operation} failed: {error}"))
}

#[derive(serde::Serialize)]
struct NewComment<'a> {
    body: &'a str,
}

#[derive(Deserialize)]
struct ApiFile {
    filename: String,
    patch: Option<String>,
}

impl From<ApiFile> for ChangedFile {
    fn from(file: ApiFile) -> Self {
        ChangedFile::new(file.filename, file.patch)
    }
}

#[derive(Deserialize)]
struct ApiCommit {
    sha: String,
    #[serde(default)]
    parents: Vec<ApiParent>,
    #[serde(default)]
    files: Vec<ApiFile>,
}

#[derive(Deserialize)]
struct ApiParent {
    sha: String,
}

impl From<ApiCommit> for Commit {
    fn from(commit: ApiCommit) -> Self {
        Commit {
            sha: commit.sha,
            parents: commit.parents.into_iter().map(|parent| parent.sha).collect(),
            files: commit.files.into_iter().map(ApiFile::into).collect(),
        }
    }
}

#[derive(Deserialize)]
struct ApiComment {
    id: u64,
    body: Option<String>,
    user: Option<ApiUser>,
}

#[derive(Deserialize)]
struct ApiUser {
    login: String,
}

impl From<ApiComment> for IssueComment {
    fn from(comment: ApiComment) -> Self {
        IssueComment {
            id: comment.id,
            author: comment.user.map(|user| user.login),
            body: comment.body,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn fixture() -> (MockServer, GitHubClient, PullRequestRef) {
        let server = MockServer::start().await;
        let client = GitHubClient::new("ghp_test", &server.uri()).expect("client should build");
        (server, client, PullRequestRef::new("octo", "widgets", 42))
    }

    #[tokio::test]
    async fn lists_commits_with_parents() {
        let (server, client, pr) = fixture().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/pulls/42/commits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "sha": "aaa111", "parents": [{ "sha": "p0" }] },
                { "sha": "bbb222", "parents": [{ "sha": "aaa111" }, { "sha": "x9" }] }
            ])))
            .mount(&server)
            .await;

        let commits = client
            .list_pull_request_commits(&pr)
            .await
            .expect("listing should succeed");

        assert_eq!(commits.len(), 2);
        assert!(!commits[0].is_merge());
        assert!(commits[1].is_merge());
        assert_eq!(commits[1].parents, vec!["aaa111".to_string(), "x9".to_string()]);
    }

    #[tokio::test]
    async fn fetches_commit_files_with_optional_patch() {
        let (server, client, pr) = fixture().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/commits/aaa111"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sha": "aaa111",
                "parents": [{ "sha": "p0" }],
                "files": [
                    { "filename": "src/lib.rs", "patch": "+pub fn f() {}" },
                    { "filename": "logo.png" }
                ]
            })))
            .mount(&server)
            .await;

        let commit = client.get_commit(&pr, "aaa111").await.expect("commit should load");

        assert_eq!(commit.files.len(), 2);
        assert_eq!(commit.files[1].patch, None);
        assert_eq!(commit.diff(), "File: src/lib.rs\n+pub fn f() {}\n");
    }

    #[tokio::test]
    async fn lists_comments_with_authors() {
        let (server, client, pr) = fixture().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/issues/42/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 7, "body": "old review", "user": { "login": "prwarden[bot]" } },
                { "id": 8, "body": "thanks", "user": null }
            ])))
            .mount(&server)
            .await;

        let comments = client.list_comments(&pr).await.expect("listing should succeed");

        assert_eq!(comments[0].author.as_deref(), Some("prwarden[bot]"));
        assert_eq!(comments[1].author, None);
    }

    #[tokio::test]
    async fn posts_comment_body() {
        let (server, client, pr) = fixture().await;
        Mock::given(method("POST"))
            .and(path("/repos/octo/widgets/issues/42/comments"))
            .and(body_json(json!({ "body": "Commit abc123:\nX" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 99, "body": "Commit abc123:\nX", "user": { "login": "prwarden[bot]" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        client
            .create_comment(&pr, "Commit abc123:\nX")
            .await
            .expect("comment should be created");
    }

    #[tokio::test]
    async fn api_errors_map_to_code_host_errors() {
        let (server, client, pr) = fixture().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/commits/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(&server)
            .await;

        let error = client
            .get_commit(&pr, "missing")
            .await
            .expect_err("missing commit should fail");

        match error {
            AppError::CodeHost(message) => assert!(message.contains("get commit"), "{message}"),
            other => panic!("expected code host error, got {other:?}"),
        }
    }
}
