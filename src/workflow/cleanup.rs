use tracing::{info, warn};

use crate::context::AppContext;
use crate::domain::pull_request::PullRequestRef;

/// Removes comments left on the pull request by earlier runs of the bot.
/// Failures are logged; the number of deleted comments is returned.
pub async fn delete_previous_comments(ctx: &AppContext, pr: &PullRequestRef) -> usize {
    let bot_name = ctx.config.bot_name.as_str();
    let comments = match ctx.code_host.list_comments(pr).await {
        Ok(comments) => comments,
        Err(err) => {
            warn!(pr = %pr, error = %err, "failed to list comments");
            return 0;
        }
    };

    let mut deleted = 0;
    for comment in comments.iter().filter(|comment| comment.is_authored_by(bot_name)) {
        match ctx.code_host.delete_comment(pr, comment.id).await {
            Ok(()) => {
                info!(pr = %pr, comment_id = comment.id, "deleted previous bot comment");
                deleted += 1;
            }
            Err(err) => {
                warn!(pr = %pr, comment_id = comment.id, error = %err, "failed to delete comment");
            }
        }
    }
    deleted
}
