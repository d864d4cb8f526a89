use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use serde::Serialize;
use tokio_util::io::StreamReader;

use crate::domain::table::{GenerationRequest, TableDefinition, TableSetup};
use crate::error::{AppError, AppResult};
use crate::services::{GenerationService, ResponseStream};

const PROJECT_HEADER: &str = "x-project-id";

/// Client for the generation tables API. Credentials are attached to every
/// request as default headers.
///
/// `timeout` bounds connecting and each read, not the whole call, so a
/// long streamed generation keeps going while chunks keep arriving.
pub struct JamaiClient {
    http: Client,
    base_url: String,
}

impl JamaiClient {
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        project_id: Option<&str>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http = Client::builder()
            .default_headers(Self::auth_headers(api_key, project_id)?)
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|err| {
                AppError::Configuration(format!("failed to configure generation client: {err}"))
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn auth_headers(api_key: Option<&str>, project_id: Option<&str>) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let mut value = Self::header_value(&format!("Bearer {key}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        if let Some(project) = project_id {
            headers.insert(HeaderName::from_static(PROJECT_HEADER), Self::header_value(project)?);
        }
        Ok(headers)
    }

    fn header_value(value: &str) -> AppResult<HeaderValue> {
        HeaderValue::from_str(value).map_err(|err| {
            AppError::Configuration(format!("invalid generation service credential: {err}"))
        })
    }

    fn tables_endpoint(&self, suffix: &str) -> String {
        format!("{}/gen_tables/{}", self.base_url, suffix)
    }

    /// Posts `body`; 200 and 409 are both accepted, anything else is an error.
    async fn post<T: Serialize + ?Sized>(&self, url: String, body: &T) -> AppResult<Response> {
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| AppError::Transport(format!("failed to call generation service: {err}")))?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CONFLICT {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl GenerationService for JamaiClient {
    async fn add_row(&self, request: &GenerationRequest) -> AppResult<ResponseStream> {
        let url = self.tables_endpoint(&format!("{}/rows/add", request.table_type.as_str()));
        let response = self.post(url, request).await?;

        let body = response.bytes_stream().map_err(std::io::Error::other);
        Ok(Box::new(StreamReader::new(Box::pin(body))))
    }

    async fn create_table(&self, table: &TableDefinition) -> AppResult<TableSetup> {
        let url = self.tables_endpoint(table.table_type.as_str());
        let response = self.post(url, table).await?;

        if response.status() == StatusCode::CONFLICT {
            Ok(TableSetup::AlreadyExists)
        } else {
            Ok(TableSetup::Created)
        }
    }
}
