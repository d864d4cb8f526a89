use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";
const MAX_ECHOED_CHARS: usize = 200;

/// One `data:` record of the generation stream. Only the top level must be
/// an object; the fields are probed, so chunks for other columns, or chunks
/// whose choices carry an unexpected shape, never fail.
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    output_column_name: Value,
    #[serde(default)]
    choices: Value,
}

impl StreamChunk {
    fn append_matching(&self, column: &str, out: &mut String) {
        if self.output_column_name.as_str() != Some(column) {
            return;
        }
        let fragments = self
            .choices
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|choice| choice.get("message"))
            .filter_map(|message| message.get("content"))
            .filter_map(Value::as_str);
        for fragment in fragments {
            out.push_str(fragment);
        }
    }
}

/// Reads a server-push stream until `[DONE]` or EOF and returns the text
/// streamed for `column`, in arrival order.
///
/// A `data:` line that is not a JSON object aborts the whole call: nothing
/// gathered before it is returned. The reader is consumed, so the
/// underlying connection is released on every exit path.
pub async fn collect_column<R>(
    mut reader: R,
    column: &str,
    cancel: &CancellationToken,
) -> AppResult<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut collected = String::new();
    let mut line = String::new();

    loop {
        line.clear();
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AppError::Cancelled),
            read = reader.read_line(&mut line) => read.map_err(|err| {
                AppError::Transport(format!("failed to read response stream: {err}"))
            })?,
        };
        if read == 0 {
            break;
        }

        let Some(payload) = line.trim_end_matches(['\r', '\n']).strip_prefix(DATA_PREFIX) else {
            continue;
        };
        if payload == DONE_SENTINEL {
            break;
        }

        let chunk: StreamChunk = serde_json::from_str(payload).map_err(|err| {
            AppError::StreamDecode(format!("{err} in line '{}'", echo(payload)))
        })?;
        chunk.append_matching(column, &mut collected);
    }

    Ok(collected)
}

fn echo(payload: &str) -> String {
    let mut chars = payload.chars();
    let head: String = chars.by_ref().take(MAX_ECHOED_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
