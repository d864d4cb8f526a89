pub mod collector;
pub mod parser;

use tokio_util::sync::CancellationToken;

use crate::domain::table::GenerationRequest;
use crate::error::{AppError, AppResult};
use crate::services::GenerationService;

pub use collector::collect_column;
pub use parser::{ResponseShape, exceeds_context_window, parse_response};

/// Issues one generation request and aggregates the text streamed for `column`.
pub async fn generate_column_text(
    service: &dyn GenerationService,
    request: &GenerationRequest,
    column: &str,
    cancel: &CancellationToken,
) -> AppResult<String> {
    let stream = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(AppError::Cancelled),
        stream = service.add_row(request) => stream?,
    };
    collect_column(stream, column, cancel).await
}
