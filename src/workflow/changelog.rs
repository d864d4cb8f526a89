use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::analysis::{ResponseShape, generate_column_text, parse_response};
use crate::context::AppContext;
use crate::domain::commit::{ChangedFile, pull_request_diff};
use crate::domain::pull_request::PullRequestRef;
use crate::domain::table::{
    GenerationRequest, PULL_REQUEST_BODY_COLUMN, PULL_REQUEST_RESPONSE_COLUMN, TableType,
};
use crate::domain::verdict::AnalysisVerdict;
use crate::error::{AppError, AppResult};

pub const CHANGELOG_FILE: &str = "CHANGELOG.md";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogOutcome {
    pub changelog_updated: bool,
    pub suggestion: String,
}

/// Asks the model for changelog suggestions covering the whole pull request
/// and posts them verbatim. Any failure ends the check.
pub async fn check_changelog(
    ctx: &AppContext,
    pr: &PullRequestRef,
    cancel: &CancellationToken,
) -> AppResult<ChangelogOutcome> {
    let files = ctx.code_host.list_pull_request_files(pr).await?;
    let changelog_updated = files.iter().any(|file| file.filename == CHANGELOG_FILE);
    info!(pr = %pr, files = files.len(), changelog_updated, "requesting changelog suggestions");

    let request = GenerationRequest::single_field(
        TableType::Action,
        pr.table_id(&ctx.config.bot_version),
        PULL_REQUEST_BODY_COLUMN,
        changelog_prompt(&files),
    );
    let raw = generate_column_text(
        ctx.generation.as_ref(),
        &request,
        PULL_REQUEST_RESPONSE_COLUMN,
        cancel,
    )
    .await?;

    let suggestion = match parse_response(&raw, ResponseShape::ChangelogSuggestion) {
        AnalysisVerdict::ChangelogSuggestion { text } => text,
        other => {
            return Err(AppError::LanguageModel(format!(
                "unexpected changelog verdict {other:?}"
            )));
        }
    };
    // The code host rejects empty comment bodies, so nothing is posted.
    if suggestion.trim().is_empty() {
        warn!(pr = %pr, "changelog suggestion is empty, skipping comment (empty bodies are rejected)");
        return Err(AppError::LanguageModel(
            "changelog suggestion is empty; not posted because comment bodies must be non-empty"
                .to_string(),
        ));
    }

    ctx.code_host.create_comment(pr, &suggestion).await?;

    Ok(ChangelogOutcome {
        changelog_updated,
        suggestion,
    })
}

// Whether the changelog was touched is left for the model to notice in the
// file list; the prompt does not change.
fn changelog_prompt(files: &[ChangedFile]) -> String {
    format!(
        "Remind the user to update their {CHANGELOG_FILE} file. Please provide suggestions for the changelog based on the following changes:\n\n{}",
        pull_request_diff(files)
    )
}
