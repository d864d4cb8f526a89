use tracing::info;

use crate::config::{AppConfig, GenerationConfig};
use crate::domain::table::{
    ColumnSpec, PULL_REQUEST_BODY_COLUMN, PULL_REQUEST_RESPONSE_COLUMN, PromptMessage,
    SECRETS_BODY_COLUMN, SECRETS_RESPONSE_COLUMN, TableDefinition, TableSetup, TableType, table_id,
};
use crate::error::AppResult;
use crate::services::GenerationService;

const CHANGELOG_INSTRUCTIONS: &str = "You review pull requests. Given the files and patches of a pull request, remind the author to keep CHANGELOG.md up to date and propose concise changelog entries grouped under Added, Changed and Fixed.";

const SECRETS_INSTRUCTIONS: &str = concat!(
    "You audit commits for leaked credentials such as API keys, access tokens, passwords and private keys. ",
    "Reply with one JSON object and nothing else: ",
    "{\"leak\": boolean, \"commit\": string, \"response\": string}. ",
    "Set commit to the SHA of the commit that introduces the leak and explain the finding in response, naming the file."
);

/// Creates the generation tables a repository needs. Existing tables are
/// left untouched.
pub async fn ensure_tables(
    generation: &dyn GenerationService,
    config: &AppConfig,
    owner: &str,
    repo: &str,
    with_knowledge: bool,
) -> AppResult<Vec<(TableDefinition, TableSetup)>> {
    let id = table_id(owner, repo, &config.bot_version);
    let mut tables = vec![review_table(&id, &config.generation)];
    if with_knowledge {
        tables.push(TableDefinition::knowledge(&id, &config.generation));
    }

    let mut outcomes = Vec::with_capacity(tables.len());
    for table in tables {
        let outcome = generation.create_table(&table).await?;
        match outcome {
            TableSetup::Created => info!(table_id = %table.id, kind = table.table_type.as_str(), "table created"),
            TableSetup::AlreadyExists => info!(table_id = %table.id, kind = table.table_type.as_str(), "table already exists"),
        }
        outcomes.push((table, outcome));
    }
    Ok(outcomes)
}

fn review_table(id: &str, generation: &GenerationConfig) -> TableDefinition {
    TableDefinition::with_columns(
        TableType::Action,
        id,
        vec![
            ColumnSpec::input(PULL_REQUEST_BODY_COLUMN),
            ColumnSpec::input(SECRETS_BODY_COLUMN),
            ColumnSpec::generated(
                PULL_REQUEST_RESPONSE_COLUMN,
                generation,
                vec![
                    PromptMessage::system(CHANGELOG_INSTRUCTIONS),
                    PromptMessage::user(format!("${{{PULL_REQUEST_BODY_COLUMN}}}")),
                ],
            ),
            ColumnSpec::generated(
                SECRETS_RESPONSE_COLUMN,
                generation,
                vec![
                    PromptMessage::system(SECRETS_INSTRUCTIONS),
                    PromptMessage::user(format!("${{{SECRETS_BODY_COLUMN}}}")),
                ],
            ),
        ],
    )
}
