use std::collections::HashSet;

use futures_util::{StreamExt, stream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::analysis::{ResponseShape, exceeds_context_window, generate_column_text, parse_response};
use crate::context::AppContext;
use crate::domain::commit::Commit;
use crate::domain::pull_request::PullRequestRef;
use crate::domain::table::{GenerationRequest, SECRETS_BODY_COLUMN, SECRETS_RESPONSE_COLUMN, TableType};
use crate::domain::verdict::AnalysisVerdict;
use crate::error::{AppError, AppResult};
use crate::workflow::post_comment;

/// Terminal state of one commit's scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    SkippedMerge,
    Clean,
    LeakReported { attributed_to: String },
    ContentTooLarge,
    Failed { reason: String },
    Cancelled,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub commits: Vec<(String, CommitOutcome)>,
}

impl ScanReport {
    pub fn count(&self, predicate: impl Fn(&CommitOutcome) -> bool) -> usize {
        self.commits.iter().filter(|(_, outcome)| predicate(outcome)).count()
    }

    pub fn analysed(&self) -> usize {
        self.count(|outcome| !matches!(outcome, CommitOutcome::SkippedMerge))
    }
}

/// Scans every non-merge commit of a pull request for leaked secrets and
/// comments on the pull request for each leak or failed analysis.
///
/// Only failing to list the commits is an error; anything that goes wrong
/// for one commit is recorded in the report and the scan moves on.
pub async fn scan_pull_request(
    ctx: &AppContext,
    pr: &PullRequestRef,
    cancel: &CancellationToken,
) -> AppResult<ScanReport> {
    let commits = ctx.code_host.list_pull_request_commits(pr).await?;
    let table_id = pr.table_id(&ctx.config.bot_version);

    let mut seen = HashSet::new();
    let unique: Vec<Commit> = commits
        .into_iter()
        .filter(|commit| seen.insert(commit.sha.clone()))
        .collect();
    info!(pr = %pr, commits = unique.len(), "scanning commits for secret leaks");

    let table_id = table_id.as_str();
    let commits: Vec<(String, CommitOutcome)> = stream::iter(unique)
        .map(|commit| async move {
            let outcome = scan_commit(ctx, pr, table_id, &commit, cancel).await;
            (commit.sha, outcome)
        })
        .buffered(ctx.config.scan_concurrency.max(1))
        .collect()
        .await;

    Ok(ScanReport { commits })
}

async fn scan_commit(
    ctx: &AppContext,
    pr: &PullRequestRef,
    table_id: &str,
    commit: &Commit,
    cancel: &CancellationToken,
) -> CommitOutcome {
    let sha = commit.sha.as_str();
    if commit.is_merge() {
        debug!(sha, "skipping merge commit");
        return CommitOutcome::SkippedMerge;
    }
    if cancel.is_cancelled() {
        return CommitOutcome::Cancelled;
    }

    // A missing diff still leaves the commit id for the model to reason about.
    let diff = match ctx.code_host.get_commit(pr, sha).await {
        Ok(details) => details.diff(),
        Err(err) => {
            warn!(sha, error = %err, "failed to fetch commit diff, scanning without it");
            String::new()
        }
    };
    debug!(sha, diff_bytes = diff.len(), "requesting secret analysis");

    let request = GenerationRequest::single_field(
        TableType::Action,
        table_id,
        SECRETS_BODY_COLUMN,
        secrets_prompt(sha, &diff),
    );
    let raw = match generate_column_text(
        ctx.generation.as_ref(),
        &request,
        SECRETS_RESPONSE_COLUMN,
        cancel,
    )
    .await
    {
        Ok(raw) => raw,
        Err(AppError::Cancelled) => {
            info!(sha, "secret scan cancelled");
            return CommitOutcome::Cancelled;
        }
        Err(err) => {
            error!(sha, error = %err, "secret analysis request failed");
            let raw = match &err {
                AppError::UnexpectedStatus { body, .. } => body.as_str(),
                _ => "",
            };
            return report_failure(ctx, pr, sha, &err.to_string(), raw).await;
        }
    };

    match parse_response(&raw, ResponseShape::SecretLeak) {
        AnalysisVerdict::SecretLeak(verdict) if verdict.leak => {
            let attributed_to = verdict.attributed_commit(sha).to_string();
            warn!(sha, attributed_to = %attributed_to, "secret leak reported");
            post_comment(ctx, pr, &leak_comment(&attributed_to, &verdict.response)).await;
            CommitOutcome::LeakReported { attributed_to }
        }
        AnalysisVerdict::SecretLeak(_) => {
            debug!(sha, "no leak found");
            CommitOutcome::Clean
        }
        AnalysisVerdict::Unparseable { raw, reason } => {
            warn!(sha, reason = %reason, "secret verdict did not parse");
            report_failure(ctx, pr, sha, &reason, &raw).await
        }
        other => CommitOutcome::Failed {
            reason: format!("unexpected verdict {other:?}"),
        },
    }
}

/// Posts the failure comment matching the raw output and returns the outcome.
/// Oversize detection is a substring heuristic; everything else is generic.
async fn report_failure(
    ctx: &AppContext,
    pr: &PullRequestRef,
    sha: &str,
    reason: &str,
    raw: &str,
) -> CommitOutcome {
    if exceeds_context_window(raw) {
        post_comment(ctx, pr, &too_large_comment(sha)).await;
        CommitOutcome::ContentTooLarge
    } else {
        post_comment(ctx, pr, &failure_comment(sha, reason, raw)).await;
        CommitOutcome::Failed {
            reason: reason.to_string(),
        }
    }
}

fn secrets_prompt(sha: &str, diff: &str) -> String {
    format!("Commit: {sha}\nDiff:\n {diff}")
}

fn leak_comment(sha: &str, response: &str) -> String {
    format!("Commit {sha}:\n{response}")
}

fn too_large_comment(sha: &str) -> String {
    format!(
        "Commit {sha} was too large to scan for secret leaks. Please keep commits smaller so each one can be checked."
    )
}

fn failure_comment(sha: &str, reason: &str, raw: &str) -> String {
    format!(
        "I could not check commit {sha} for secret leaks. Please contact the maintainers of this bot.\nError: {reason}\nResponse: {raw}"
    )
}
