use async_trait::async_trait;
use tokio::io::AsyncBufRead;

use crate::domain::table::{GenerationRequest, TableDefinition, TableSetup};
use crate::error::AppResult;

/// Streamed response body; dropping it releases the underlying connection.
pub type ResponseStream = Box<dyn AsyncBufRead + Send + Unpin>;

#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn add_row(&self, request: &GenerationRequest) -> AppResult<ResponseStream>;
    async fn create_table(&self, table: &TableDefinition) -> AppResult<TableSetup>;
}
