//! Document fixtures with deterministic identifiers and timestamps.

use chrono::{TimeZone, Utc};
use docdeck_api_models::{DocumentMetadata, DocumentRecord};
use uuid::Uuid;

/// Owner shared by every fixture document.
pub const OWNER_ID: &str = "00000000-0000-0000-0000-0000000a11ce";

/// Deterministic document id for index `n`.
#[must_use]
pub fn document_id(n: u128) -> String {
    Uuid::from_u128(n + 1).to_string()
}

/// Build a single document whose id is [`document_id`]`(n)`.
#[must_use]
pub fn document(n: u128) -> DocumentRecord {
    let minutes = i64::try_from(n % 1_440).unwrap_or_default();
    DocumentRecord {
        id: document_id(n),
        owner_id: Some(OWNER_ID.to_string()),
        title: format!("document-{n}.pdf"),
        version: "v0".to_string(),
        updated_at: Utc
            .with_ymd_and_hms(2024, 6, 5, 0, 0, 0)
            .single()
            .map(|base| base + chrono::Duration::minutes(minutes)),
        size_bytes: 1_000_000,
        metadata: DocumentMetadata::new(),
    }
}

/// Build `count` documents with ids `0..count`.
#[must_use]
pub fn documents(count: usize) -> Vec<DocumentRecord> {
    (0..).take(count).map(document).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn documents_have_unique_ids() {
        let docs = documents(25);
        let ids: HashSet<_> = docs.iter().map(|doc| doc.id.clone()).collect();
        assert_eq!(ids.len(), 25);
    }

    #[test]
    fn document_id_matches_builder() {
        assert_eq!(document(3).id, document_id(3));
        assert!(document(3).updated_at.is_some());
        assert_eq!(document(3).owner_id.as_deref(), Some(OWNER_ID));
    }
}
