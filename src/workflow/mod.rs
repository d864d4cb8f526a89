pub mod changelog;
pub mod cleanup;
pub mod secret_scan;
pub mod setup;

use tracing::warn;

use crate::context::AppContext;
use crate::domain::pull_request::PullRequestRef;

/// Posts a comment, logging instead of failing when the code host refuses it.
pub(crate) async fn post_comment(ctx: &AppContext, pr: &PullRequestRef, body: &str) -> bool {
    match ctx.code_host.create_comment(pr, body).await {
        Ok(()) => true,
        Err(err) => {
            warn!(pr = %pr, error = %err, "failed to post comment");
            false
        }
    }
}
