use crate::session::CredentialSource;
use crate::traits::ResultsBackend;
use crate::{DocumentUpload, ResultDetail, ResultSet, ResultSummary, ReviewError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api/v1";

pub struct HttpBackend<C> {
    client: Arc<Client>,
    endpoint: String,
    credentials: C,
}

impl<C: CredentialSource> HttpBackend<C> {
    pub fn new(endpoint: impl Into<String>, credentials: C) -> Result<Self, ReviewError> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let parsed = Url::parse(&endpoint)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ReviewError::InvalidArgument(format!(
                "api base must be http(s): {endpoint}"
            )));
        }

        Ok(Self {
            client: Arc::new(Client::new()),
            endpoint,
            credentials,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ReviewError> {
        let token = self
            .credentials
            .bearer_token()
            .ok_or(ReviewError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }
}

async fn ensure_success(response: Response, fallback: &str) -> Result<Response, ReviewError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ReviewError::remote(
        Some(status.as_u16()),
        error_detail(&body).unwrap_or_else(|| fallback.to_string()),
    ))
}

/// The `detail` string of an error body, when the body carries one.
fn error_detail(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    parsed
        .get("detail")
        .and_then(Value::as_str)
        .filter(|detail| !detail.is_empty())
        .map(str::to_string)
}

fn not_found_as(result_id: u64, error: ReviewError) -> ReviewError {
    match error {
        ReviewError::RemoteFailure {
            status: Some(code), ..
        } if code == StatusCode::NOT_FOUND.as_u16() => ReviewError::NotFound(result_id),
        other => other,
    }
}

#[async_trait]
impl<C: CredentialSource> ResultsBackend for HttpBackend<C> {
    async fn parse_document(
        &self,
        upload: DocumentUpload,
        save: bool,
    ) -> Result<ResultSet, ReviewError> {
        let request = self.authorized(self.client.post(self.url("parse")))?;
        let request = if save {
            request.query(&[("save", "true")])
        } else {
            request
        };

        let size = upload.bytes.len();
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name.clone())
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        info!(file = %upload.file_name, bytes = size, save, "uploading document for parsing");
        let response = request.multipart(form).send().await?;
        let response = ensure_success(response, "Failed to parse document").await?;
        Ok(response.json::<ResultSet>().await?)
    }

    async fn list_results(&self) -> Result<Vec<ResultSummary>, ReviewError> {
        let response = self
            .authorized(self.client.get(self.url("results")))?
            .send()
            .await?;
        let response = ensure_success(response, "Failed to fetch results").await?;
        Ok(response.json::<Vec<ResultSummary>>().await?)
    }

    async fn fetch_result(&self, result_id: u64) -> Result<ResultSet, ReviewError> {
        let response = self
            .authorized(self.client.get(self.url(&format!("results/{result_id}"))))?
            .send()
            .await?;
        let response = ensure_success(response, "Failed to fetch result")
            .await
            .map_err(|error| not_found_as(result_id, error))?;

        let detail: ResultDetail = response.json().await?;
        debug!(result_id, records = detail.results.len(), "fetched result");
        Ok(detail.into())
    }

    async fn delete_result(&self, result_id: u64) -> Result<(), ReviewError> {
        let response = self
            .authorized(self.client.delete(self.url(&format!("results/{result_id}"))))?
            .send()
            .await?;
        ensure_success(response, "Failed to delete result")
            .await
            .map_err(|error| not_found_as(result_id, error))?;
        Ok(())
    }
}
