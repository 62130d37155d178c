//! Remote document service seam.

use async_trait::async_trait;
use docdeck_api_models::{DocumentChunk, DocumentRecord, DocumentUpload};
use thiserror::Error;

/// Failures reported by a [`DocumentsEndpoint`] implementation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("service returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, trimmed.
        body: String,
    },
    /// The response could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Operations the dashboard invokes on the document service.
#[async_trait(?Send)]
pub trait DocumentsEndpoint {
    /// Fetch the full collection overview.
    async fn documents_overview(&self) -> Result<Vec<DocumentRecord>, EndpointError>;

    /// Ingest or replace a document.
    async fn upload(&self, upload: DocumentUpload) -> Result<(), EndpointError>;

    /// Delete the given documents.
    async fn delete(&self, document_ids: Vec<String>) -> Result<(), EndpointError>;

    /// List the stored chunks of one document.
    async fn document_chunks(
        &self,
        document_id: &str,
    ) -> Result<Vec<DocumentChunk>, EndpointError>;
}
