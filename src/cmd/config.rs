use clap::{Args, Subcommand};

use crate::config::AppConfig;
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Show the resolved configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Show => run_show(),
    }
}

fn run_show() -> AppResult<()> {
    let cfg = AppConfig::load()?;
    for line in describe(&cfg) {
        println!("{line}");
    }
    Ok(())
}

fn describe(cfg: &AppConfig) -> Vec<String> {
    vec![
        format!("GitHub API URL: {}", cfg.github_api_url),
        format!("GitHub token: {}", mask_secret(&cfg.github_token)),
        format!("Generation service URL: {}", cfg.jamai_base_url),
        format!("Generation API key: {}", mask_secret(&cfg.jamai_api_key)),
        format!("Generation project: {}", display_value(&cfg.jamai_project_id)),
        format!("Bot name: {}", cfg.bot_name),
        format!("Bot version: {}", cfg.bot_version),
        format!("Request timeout: {}s", cfg.request_timeout.as_secs()),
        format!("Scan concurrency: {}", cfg.scan_concurrency),
        format!("Model: {}", cfg.generation.model),
        format!(
            "Sampling: temperature {} / top-p {} / max tokens {}",
            cfg.generation.temperature, cfg.generation.top_p, cfg.generation.max_tokens
        ),
        format!(
            "Retrieval: embedding {} / reranker {} / k {}",
            cfg.generation.embedding_model, cfg.generation.rag.reranking_model, cfg.generation.rag.k
        ),
    ]
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let prefix: String = token.chars().take(3).collect();
            let suffix: String = token.chars().skip(token.chars().count() - 3).collect();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}
