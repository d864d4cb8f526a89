use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::context::AppContext;
use crate::domain::pull_request::PullRequestRef;
use crate::workflow::changelog::{ChangelogOutcome, check_changelog};
use crate::workflow::cleanup::delete_previous_comments;
use crate::workflow::secret_scan::{CommitOutcome, ScanReport, scan_pull_request};

#[derive(Debug, Clone)]
pub struct ReviewCommandArgs {
    pub pr: PullRequestRef,
    pub skip_changelog: bool,
    pub skip_secrets: bool,
    pub keep_comments: bool,
}

#[derive(Debug, Default)]
pub struct ReviewSummary {
    pub deleted_comments: usize,
    pub changelog: Option<ChangelogOutcome>,
    pub scan: Option<ScanReport>,
    pub errors: Vec<String>,
}

/// Runs every enabled check against one pull request. A failing check is
/// logged and recorded; the remaining checks still run.
pub async fn run(ctx: &AppContext, args: ReviewCommandArgs, cancel: &CancellationToken) -> ReviewSummary {
    let pr = &args.pr;
    let mut summary = ReviewSummary::default();

    if !args.keep_comments {
        summary.deleted_comments = delete_previous_comments(ctx, pr).await;
    }

    if !args.skip_changelog {
        match check_changelog(ctx, pr, cancel).await {
            Ok(outcome) => summary.changelog = Some(outcome),
            Err(err) => {
                error!(pr = %pr, error = %err, "changelog check failed");
                summary.errors.push(format!("changelog check: {err}"));
            }
        }
    }

    if !args.skip_secrets {
        match scan_pull_request(ctx, pr, cancel).await {
            Ok(report) => {
                info!(
                    pr = %pr,
                    analysed = report.analysed(),
                    leaks = report.count(|outcome| matches!(outcome, CommitOutcome::LeakReported { .. })),
                    failures = report.count(|outcome| matches!(
                        outcome,
                        CommitOutcome::Failed { .. } | CommitOutcome::ContentTooLarge
                    )),
                    "secret scan finished"
                );
                summary.scan = Some(report);
            }
            Err(err) => {
                error!(pr = %pr, error = %err, "secret scan failed");
                summary.errors.push(format!("secret scan: {err}"));
            }
        }
    }

    summary
}
