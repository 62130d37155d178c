#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]
//! Shared HTTP DTOs for the Docdeck document service.
//!
//! These types are re-used by the web UI and the CLI so both surfaces decode the
//! collection overview and encode query requests the same way.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Opaque key/value metadata attached to a document.
pub type DocumentMetadata = Map<String, Value>;

/// Single document as reported by the collection overview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentRecord {
    /// Stable document identifier.
    #[serde(rename = "document_id")]
    pub id: String,
    /// Identifier of the uploading user, absent for anonymous uploads.
    #[serde(rename = "user_id", default)]
    pub owner_id: Option<String>,
    /// Display title; may be empty.
    #[serde(default)]
    pub title: String,
    /// Service-assigned version label.
    #[serde(default)]
    pub version: String,
    /// Last update timestamp.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Stored size in bytes.
    #[serde(rename = "size_in_bytes", default)]
    pub size_bytes: u64,
    /// Free-form metadata; only presence matters to the dashboard.
    #[serde(default, deserialize_with = "deserialize_metadata")]
    pub metadata: DocumentMetadata,
}

impl DocumentRecord {
    /// Whether the service attached any metadata to the document.
    #[must_use]
    pub fn has_metadata(&self) -> bool {
        !self.metadata.is_empty()
    }
}

/// Payload returned by the collection-overview endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DocumentsOverviewResponse {
    /// Documents in service order.
    #[serde(default)]
    pub results: Vec<DocumentRecord>,
}

/// One stored fragment of a document, as returned by the chunk listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentChunk {
    /// Fragment identifier.
    pub fragment_id: String,
    /// Extraction the fragment was produced by.
    #[serde(default)]
    pub extraction_id: Option<String>,
    /// Owning document.
    pub document_id: String,
    /// Uploading user, absent for anonymous uploads.
    #[serde(rename = "user_id", default)]
    pub owner_id: Option<String>,
    /// Extracted text.
    #[serde(default)]
    pub text: String,
    /// Free-form chunk metadata.
    #[serde(default, deserialize_with = "deserialize_metadata")]
    pub metadata: DocumentMetadata,
}

/// Payload returned by the document-chunks endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DocumentChunksResponse {
    /// Chunks in service order.
    #[serde(default)]
    pub results: Vec<DocumentChunk>,
}

/// Body of a bulk delete request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteDocumentsRequest {
    /// Identifiers to remove.
    pub document_ids: Vec<String>,
}

/// Where an uploaded file should land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// Ingest as a new document; the service assigns the id.
    New,
    /// Replace the contents of an existing document.
    Replace {
        /// Document being replaced.
        document_id: String,
    },
}

/// File payload handed to the upload operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    /// Original file name, forwarded to the service.
    pub file_name: String,
    /// Raw file contents.
    pub content: Vec<u8>,
    /// Target of the upload.
    pub target: UploadTarget,
}

impl DocumentUpload {
    /// Build an upload that ingests a new document.
    #[must_use]
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
            target: UploadTarget::New,
        }
    }

    /// Build an upload that replaces `document_id`.
    #[must_use]
    pub fn replacing(
        document_id: impl Into<String>,
        file_name: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content,
            target: UploadTarget::Replace {
                document_id: document_id.into(),
            },
        }
    }
}

/// Default number of search hits requested alongside a query.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Search strategy switches sent with a query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchSettings {
    /// Use dense vector search.
    pub vector_search_enabled: bool,
    /// Combine vector and keyword search.
    pub hybrid_search_enabled: bool,
    /// Maximum number of hits to retrieve.
    pub search_limit: u32,
}

/// Generation parameters for the answer model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Optional model override; the service default applies when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Sampling temperature in `[0, 2]`.
    pub temperature: f32,
    /// Nucleus sampling mass in `[0, 1]`.
    pub top_p: f32,
    /// Top-k sampling cutoff; must be positive.
    pub top_k: u32,
    /// Token budget for the answer; must be positive.
    pub max_tokens_to_sample: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.1,
            top_p: 1.0,
            top_k: 100,
            max_tokens_to_sample: 1024,
        }
    }
}

/// Generation parameter outside its accepted range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationConfigError {
    /// A numeric field fell outside its bounds.
    #[error("'{field}' must be {expected} (got {value})")]
    OutOfRange {
        /// Offending field name.
        field: &'static str,
        /// Rendered offending value.
        value: String,
        /// Human-readable bound description.
        expected: &'static str,
    },
}

impl GenerationConfig {
    /// Check every parameter against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationConfigError::OutOfRange`] for the first field that fails.
    pub fn validate(&self) -> Result<(), GenerationConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(out_of_range(
                "temperature",
                self.temperature,
                "between 0 and 2",
            ));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(out_of_range("top_p", self.top_p, "between 0 and 1"));
        }
        if self.top_k == 0 {
            return Err(out_of_range("top_k", self.top_k, "greater than 0"));
        }
        if self.max_tokens_to_sample == 0 {
            return Err(out_of_range(
                "max_tokens_to_sample",
                self.max_tokens_to_sample,
                "greater than 0",
            ));
        }
        Ok(())
    }
}

fn out_of_range(
    field: &'static str,
    value: impl ToString,
    expected: &'static str,
) -> GenerationConfigError {
    GenerationConfigError::OutOfRange {
        field,
        value: value.to_string(),
        expected,
    }
}

/// Outgoing retrieval-augmented query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryRequest {
    /// User query text.
    pub query: String,
    /// Search strategy switches.
    pub search_settings: SearchSettings,
    /// Generation parameters.
    pub generation_config: GenerationConfig,
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        return Ok(None);
    };
    parse_timestamp(&raw)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
}

/// Parse an RFC 3339 timestamp, accepting naive ISO-8601 values as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn deserialize_metadata<'de, D>(deserializer: D) -> Result<DocumentMetadata, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<DocumentMetadata>::deserialize(deserializer)?.unwrap_or_default())
}
