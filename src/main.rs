mod analysis;
mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
#[cfg(test)]
mod test_support;
mod workflow;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::review::{self, ReviewCommandArgs, ReviewSummary};
use crate::cmd::setup::{self, SetupCommandArgs};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::domain::pull_request::PullRequestRef;
use crate::domain::table::TableSetup;
use crate::error::{AppError, AppResult};
use crate::infra::github::GitHubClient;
use crate::infra::jamai::JamaiClient;
use crate::workflow::secret_scan::CommitOutcome;

#[derive(Parser)]
#[command(name = "prwarden", author, version, about = "Pull request review bot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest changelog entries and scan commits for leaked secrets.
    Review(ReviewArgs),
    /// Create the generation tables a repository needs.
    Setup(SetupArgs),
    /// Inspect the resolved configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct ReviewArgs {
    /// Repository as owner/name.
    #[arg(long)]
    repo: String,
    /// Pull request number.
    #[arg(long)]
    pr: u64,
    /// Leave earlier bot comments in place.
    #[arg(long)]
    keep_comments: bool,
    #[arg(long)]
    skip_changelog: bool,
    #[arg(long)]
    skip_secrets: bool,
}

#[derive(Args)]
struct SetupArgs {
    /// Repository as owner/name.
    #[arg(long)]
    repo: String,
    /// Also create the knowledge table.
    #[arg(long)]
    knowledge: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}

/// Returns whether the command finished without recorded failures.
async fn run() -> AppResult<bool> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => {
            config_cmd::run(args.command)?;
            Ok(true)
        }
        Commands::Setup(args) => run_setup(args).await,
        Commands::Review(args) => run_review(args).await,
    }
}

fn generation_client(config: &AppConfig) -> AppResult<JamaiClient> {
    if config.jamai_api_key.is_none() {
        warn!("generation API key not configured; requests will be unauthenticated");
    }
    JamaiClient::new(
        &config.jamai_base_url,
        config.jamai_api_key.as_deref(),
        config.jamai_project_id.as_deref(),
        config.request_timeout,
    )
}

async fn run_setup(args: SetupArgs) -> AppResult<bool> {
    let config = AppConfig::load()?;
    let generation = generation_client(&config)?;

    let tables = setup::run(
        &generation,
        &config,
        SetupCommandArgs {
            repo: args.repo,
            knowledge: args.knowledge,
        },
    )
    .await?;

    for (table, outcome) in tables {
        let state = match outcome {
            TableSetup::Created => "created",
            TableSetup::AlreadyExists => "already exists",
        };
        println!("{} table {}: {state}", table.table_type.as_str(), table.id);
    }
    Ok(true)
}

async fn run_review(args: ReviewArgs) -> AppResult<bool> {
    let config = AppConfig::load()?;
    let pr = PullRequestRef::parse(&args.repo, args.pr)?;

    let code_host = Arc::new(GitHubClient::new(
        config.require_github_token()?,
        &config.github_api_url,
    )?);
    let generation = Arc::new(generation_client(&config)?);
    let context = AppContext::new(config, code_host, generation);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling review");
            on_signal.cancel();
        }
    });

    let summary = review::run(
        &context,
        ReviewCommandArgs {
            pr,
            skip_changelog: args.skip_changelog,
            skip_secrets: args.skip_secrets,
            keep_comments: args.keep_comments,
        },
        &cancel,
    )
    .await;

    if cancel.is_cancelled() {
        return Err(AppError::Cancelled);
    }
    Ok(report(&summary))
}

fn report(summary: &ReviewSummary) -> bool {
    if summary.deleted_comments > 0 {
        println!("Removed {} earlier bot comment(s).", summary.deleted_comments);
    }
    if let Some(changelog) = &summary.changelog {
        let state = if changelog.changelog_updated { "updated" } else { "not updated" };
        println!("Changelog suggestions posted (changelog {state}).");
    }
    let mut failures = summary.errors.len();
    if let Some(scan) = &summary.scan {
        let leaks = scan.count(|outcome| matches!(outcome, CommitOutcome::LeakReported { .. }));
        let failed = scan.count(|outcome| {
            matches!(outcome, CommitOutcome::Failed { .. } | CommitOutcome::ContentTooLarge)
        });
        println!(
            "Scanned {} commit(s): {leaks} leak(s) reported, {failed} could not be checked.",
            scan.analysed()
        );
        failures += failed;
    }
    for error in &summary.errors {
        eprintln!("Warning: {error}");
    }
    info!(failures, "review finished");
    failures == 0
}
