use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::GenerationConfig;

/// Input column receiving the whole pull request diff.
pub const PULL_REQUEST_BODY_COLUMN: &str = "PullReqBody";
/// Output column holding changelog suggestions.
pub const PULL_REQUEST_RESPONSE_COLUMN: &str = "PullReqResponse";
/// Input column receiving one commit's diff.
pub const SECRETS_BODY_COLUMN: &str = "PullReqSecretsBody";
/// Output column holding the JSON leak verdict.
pub const SECRETS_RESPONSE_COLUMN: &str = "SecretsJSONResponse";

/// Name of the generation table dedicated to one repository and bot version.
pub fn table_id(owner: &str, repo: &str, bot_version: &str) -> String {
    format!("{owner}_{repo}_{bot_version}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableType {
    Action,
    Knowledge,
}

impl TableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableType::Action => "action",
            TableType::Knowledge => "knowledge",
        }
    }
}

/// One row appended to a generation table; the service answers with a stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    #[serde(skip)]
    pub table_type: TableType,
    pub table_id: String,
    pub data: Vec<BTreeMap<String, String>>,
    pub stream: bool,
}

impl GenerationRequest {
    pub fn single_field(
        table_type: TableType,
        table_id: impl Into<String>,
        field: &str,
        value: impl Into<String>,
    ) -> Self {
        let mut row = BTreeMap::new();
        row.insert(field.to_string(), value.into());
        Self {
            table_type,
            table_id: table_id.into(),
            data: vec![row],
            stream: true,
        }
    }
}

/// Outcome of an idempotent table creation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSetup {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDefinition {
    #[serde(skip)]
    pub table_type: TableType,
    pub id: String,
    pub cols: Vec<ColumnSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
}

impl TableDefinition {
    pub fn knowledge(id: impl Into<String>, generation: &GenerationConfig) -> Self {
        Self {
            table_type: TableType::Knowledge,
            id: id.into(),
            cols: Vec::new(),
            embedding_model: Some(generation.embedding_model.clone()),
        }
    }

    pub fn with_columns(table_type: TableType, id: impl Into<String>, cols: Vec<ColumnSpec>) -> Self {
        Self {
            table_type,
            id: id.into(),
            cols,
            embedding_model: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSpec {
    pub id: String,
    pub dtype: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gen_config: Option<ColumnGenConfig>,
}

impl ColumnSpec {
    pub fn input(id: &str) -> Self {
        Self {
            id: id.to_string(),
            dtype: "str",
            gen_config: None,
        }
    }

    pub fn generated(id: &str, generation: &GenerationConfig, messages: Vec<PromptMessage>) -> Self {
        Self {
            id: id.to_string(),
            dtype: "str",
            gen_config: Some(ColumnGenConfig {
                model: generation.model.clone(),
                messages,
                temperature: generation.temperature,
                max_tokens: generation.max_tokens,
                top_p: generation.top_p,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnGenConfig {
    pub model: String,
    pub messages: Vec<PromptMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptMessage {
    pub role: &'static str,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}
