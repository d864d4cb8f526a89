use crate::config::AppConfig;
use crate::domain::pull_request::parse_repository;
use crate::domain::table::{TableDefinition, TableSetup};
use crate::error::AppResult;
use crate::services::GenerationService;
use crate::workflow::setup::ensure_tables;

#[derive(Debug, Clone)]
pub struct SetupCommandArgs {
    pub repo: String,
    pub knowledge: bool,
}

pub async fn run(
    generation: &dyn GenerationService,
    config: &AppConfig,
    args: SetupCommandArgs,
) -> AppResult<Vec<(TableDefinition, TableSetup)>> {
    let (owner, repo) = parse_repository(&args.repo)?;
    ensure_tables(generation, config, &owner, &repo, args.knowledge).await
}
