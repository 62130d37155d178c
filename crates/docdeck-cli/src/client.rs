//! HTTP adapter for the document service, error types, and shared context.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use docdeck_api_models::{
    DeleteDocumentsRequest, DocumentChunk, DocumentChunksResponse, DocumentRecord,
    DocumentUpload, DocumentsOverviewResponse, UploadTarget,
};
use docdeck_ui::core::endpoint::{DocumentsEndpoint, EndpointError};
use docdeck_ui::core::view::{ChunksError, MutationError};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use url::Url;

pub(crate) const PATH_OVERVIEW: &str = "/v1/documents_overview";
pub(crate) const PATH_INGEST: &str = "/v1/ingest_files";
pub(crate) const PATH_UPDATE: &str = "/v1/update_files";
pub(crate) const PATH_DELETE: &str = "/v1/delete";
pub(crate) const PATH_CHUNKS: &str = "/v1/document_chunks";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<MutationError> for CliError {
    fn from(err: MutationError) -> Self {
        match err {
            MutationError::NothingSelected => Self::validation(err.to_string()),
            MutationError::Endpoint(EndpointError::Status { status, .. })
                if (400..500).contains(&status) =>
            {
                Self::validation(err.to_string())
            }
            other => Self::failure(other),
        }
    }
}

impl From<ChunksError> for CliError {
    fn from(err: ChunksError) -> Self {
        match err {
            ChunksError::UnknownDocument { .. } => Self::validation(err.to_string()),
            ChunksError::Endpoint(EndpointError::Status { status, .. })
                if (400..500).contains(&status) =>
            {
                Self::validation(err.to_string())
            }
            other => Self::failure(other),
        }
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
}

impl AppContext {
    /// Build an HTTP client with the configured timeout.
    pub(crate) fn new(base_url: Url, timeout: Duration) -> CliResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;
        Ok(Self { client, base_url })
    }

    pub(crate) fn endpoint(&self) -> ReqwestEndpoint {
        ReqwestEndpoint {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

/// [`DocumentsEndpoint`] over reqwest.
#[derive(Clone, Debug)]
pub(crate) struct ReqwestEndpoint {
    client: Client,
    base_url: Url,
}

impl ReqwestEndpoint {
    fn url(&self, path: &str) -> Result<Url, EndpointError> {
        self.base_url
            .join(path)
            .map_err(|err| EndpointError::Transport(format!("invalid URL for {path}: {err}")))
    }

    fn chunks_url(&self, document_id: &str) -> Result<Url, EndpointError> {
        let mut url = self.url(PATH_CHUNKS)?;
        url.path_segments_mut()
            .map_err(|()| EndpointError::Transport(format!("{PATH_CHUNKS} cannot take an id")))?
            .pop_if_empty()
            .push(document_id);
        Ok(url)
    }
}

#[async_trait(?Send)]
impl DocumentsEndpoint for ReqwestEndpoint {
    async fn documents_overview(&self) -> Result<Vec<DocumentRecord>, EndpointError> {
        let response = self
            .client
            .get(self.url(PATH_OVERVIEW)?)
            .send()
            .await
            .map_err(transport)?;
        let body: DocumentsOverviewResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|err| EndpointError::Decode(err.to_string()))?;
        Ok(body.results)
    }

    async fn upload(&self, upload: DocumentUpload) -> Result<(), EndpointError> {
        let DocumentUpload {
            file_name,
            content,
            target,
        } = upload;
        let form = Form::new().part("files", Part::bytes(content).file_name(file_name));
        let (path, form) = match target {
            UploadTarget::New => (PATH_INGEST, form),
            UploadTarget::Replace { document_id } => {
                let ids = serde_json::to_string(&[document_id])
                    .map_err(|err| EndpointError::Decode(err.to_string()))?;
                (PATH_UPDATE, form.text("document_ids", ids))
            }
        };

        let response = self
            .client
            .post(self.url(path)?)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        ensure_success(response).await.map(drop)
    }

    async fn delete(&self, document_ids: Vec<String>) -> Result<(), EndpointError> {
        let response = self
            .client
            .delete(self.url(PATH_DELETE)?)
            .json(&DeleteDocumentsRequest { document_ids })
            .send()
            .await
            .map_err(transport)?;
        ensure_success(response).await.map(drop)
    }

    async fn document_chunks(
        &self,
        document_id: &str,
    ) -> Result<Vec<DocumentChunk>, EndpointError> {
        let response = self
            .client
            .get(self.chunks_url(document_id)?)
            .send()
            .await
            .map_err(transport)?;
        let body: DocumentChunksResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|err| EndpointError::Decode(err.to_string()))?;
        Ok(body.results)
    }
}

/// Map a non-success response to [`EndpointError::Status`].
async fn ensure_success(response: Response) -> Result<Response, EndpointError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(EndpointError::Status {
        status: status.as_u16(),
        body: body.trim().to_string(),
    })
}

fn transport(err: reqwest::Error) -> EndpointError {
    EndpointError::Transport(err.to_string())
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}
