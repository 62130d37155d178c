//! Pure presentation helpers for the documents table, testable without a DOM.

use crate::core::fetch::{FetchPhase, FetchState};
use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Display;
use docdeck_api_models::DocumentRecord;

/// Placeholder for absent values.
pub const NOT_AVAILABLE: &str = "N/A";
/// Shown while the first fetch is outstanding.
pub const LOADING_MESSAGE: &str = "Loading documents...";
/// Shown when the collection is empty.
pub const EMPTY_MESSAGE: &str = "No documents available. Upload a document to get started.";

/// Abbreviate an identifier to `abcd...wxyz`. Identifiers of eight characters
/// or fewer are returned unchanged.
#[must_use]
pub fn short_id(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() <= 8 {
        return id.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Abbreviated owner id, or `N/A` for anonymous uploads.
#[must_use]
pub fn owner_label(owner_id: Option<&str>) -> String {
    match owner_id {
        Some(owner) if !owner.is_empty() => short_id(owner),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Title, or `N/A` when blank.
#[must_use]
pub fn title_label(title: &str) -> &str {
    if title.trim().is_empty() {
        NOT_AVAILABLE
    } else {
        title
    }
}

/// Format a timestamp in the viewer's local time zone as `Jun 5, 2024 16:26`.
#[must_use]
pub fn format_updated_at(updated_at: Option<&DateTime<Utc>>) -> String {
    format_updated_in(updated_at, &Local)
}

/// Format a timestamp as `Jun 5, 2024 16:26`, shifted into `zone`.
#[must_use]
pub fn format_updated_in<Tz>(updated_at: Option<&DateTime<Utc>>, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    updated_at.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |ts| ts.with_timezone(zone).format("%b %-d, %Y %H:%M").to_string(),
    )
}

/// Size in megabytes (decimal) with two fractional digits.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn size_megabytes(size_bytes: u64) -> String {
    format!("{:.2}", size_bytes as f64 / 1e6)
}

/// One table row, already formatted for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentRow {
    /// Full document id (selection and copy actions use this).
    pub id: String,
    /// Abbreviated document id.
    pub short_id: String,
    /// Full owner id, when present.
    pub owner_id: Option<String>,
    /// Abbreviated owner id or `N/A`.
    pub owner: String,
    /// Title or `N/A`.
    pub title: String,
    /// Version label.
    pub version: String,
    /// Formatted update time or `N/A`.
    pub updated: String,
    /// Size in MB.
    pub size_mb: String,
    /// Whether the metadata popover has anything to show.
    pub has_metadata: bool,
}

impl From<&DocumentRecord> for DocumentRow {
    fn from(doc: &DocumentRecord) -> Self {
        Self {
            id: doc.id.clone(),
            short_id: short_id(&doc.id),
            owner_id: doc.owner_id.clone(),
            owner: owner_label(doc.owner_id.as_deref()),
            title: title_label(&doc.title).to_string(),
            version: doc.version.clone(),
            updated: format_updated_at(doc.updated_at.as_ref()),
            size_mb: size_megabytes(doc.size_bytes),
            has_metadata: doc.has_metadata(),
        }
    }
}

/// What the table body shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableBody {
    /// Spinner with [`LOADING_MESSAGE`].
    Loading,
    /// Exhausted-retries message.
    Failed(String),
    /// [`EMPTY_MESSAGE`].
    Empty,
    /// Rows of the current page; `fading` while data is transitioning in.
    Rows {
        /// Formatted rows.
        rows: Vec<DocumentRow>,
        /// Whether the fade-in is still running.
        fading: bool,
    },
}

/// Decide the table body from fetch status and the rows of the current page.
///
/// The spinner only replaces the table until the first collection lands; later
/// refreshes keep showing the previous rows.
#[must_use]
pub fn table_body(state: &FetchState, loaded: bool, page_rows: &[DocumentRecord]) -> TableBody {
    match state.phase {
        FetchPhase::Failed => TableBody::Failed(state.error.clone().unwrap_or_default()),
        FetchPhase::Idle | FetchPhase::Loading if !loaded => TableBody::Loading,
        _ if page_rows.is_empty() => TableBody::Empty,
        phase => TableBody::Rows {
            rows: page_rows.iter().map(DocumentRow::from).collect(),
            fading: phase == FetchPhase::TransitioningIn,
        },
    }
}

/// Pagination controls are hidden while loading, on failure, and for an empty
/// collection.
#[must_use]
pub fn show_pagination(state: &FetchState, loaded: bool, collection_len: usize) -> bool {
    loaded && state.phase != FetchPhase::Failed && collection_len > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use docdeck_test_support::{document, documents};

    fn state(phase: FetchPhase) -> FetchState {
        FetchState {
            phase,
            ..FetchState::default()
        }
    }

    #[test]
    fn short_id_keeps_ends() {
        assert_eq!(short_id("9fbe403b-c11c-5aae-8ade-ef22980c3ad1"), "9fbe...3ad1");
        assert_eq!(short_id("abcdefgh"), "abcdefgh");
        assert_eq!(short_id("abcdefghi"), "abcd...fghi");
        assert_eq!(short_id(""), "");
    }

    #[test]
    fn missing_fields_render_placeholder() {
        assert_eq!(owner_label(None), "N/A");
        assert_eq!(owner_label(Some("")), "N/A");
        assert_eq!(owner_label(Some("2acb499e-8428-543b-bd85-0d9098718220")), "2acb...8220");
        assert_eq!(title_label("  "), "N/A");
        assert_eq!(format_updated_at(None), "N/A");
    }

    #[test]
    fn timestamps_and_sizes_format_like_the_table() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 5, 16, 26, 0).single();
        assert_eq!(format_updated_in(ts.as_ref(), &Utc), "Jun 5, 2024 16:26");
        let east = FixedOffset::east_opt(9 * 3_600).expect("valid offset");
        assert_eq!(format_updated_in(ts.as_ref(), &east), "Jun 6, 2024 01:26");
        let west = FixedOffset::west_opt(5 * 3_600).expect("valid offset");
        assert_eq!(format_updated_in(ts.as_ref(), &west), "Jun 5, 2024 11:26");
        assert_eq!(
            format_updated_at(ts.as_ref()),
            format_updated_in(ts.as_ref(), &Local)
        );
        assert_eq!(size_megabytes(1_234_567), "1.23");
        assert_eq!(size_megabytes(0), "0.00");
    }

    #[test]
    fn table_body_follows_fetch_phase() {
        let rows = documents(2);

        assert_eq!(table_body(&state(FetchPhase::Loading), false, &[]), TableBody::Loading);
        assert_eq!(table_body(&state(FetchPhase::Idle), false, &[]), TableBody::Loading);

        let failed = FetchState {
            phase: FetchPhase::Failed,
            error: Some("boom".into()),
            ..FetchState::default()
        };
        assert_eq!(table_body(&failed, true, &rows), TableBody::Failed("boom".into()));

        assert_eq!(table_body(&state(FetchPhase::Ready), true, &[]), TableBody::Empty);

        match table_body(&state(FetchPhase::TransitioningIn), true, &rows) {
            TableBody::Rows { rows, fading } => {
                assert!(fading);
                assert_eq!(rows.len(), 2);
            }
            other => panic!("expected rows, got {other:?}"),
        }

        // A refresh keeps the previous rows visible.
        match table_body(&state(FetchPhase::Loading), true, &rows) {
            TableBody::Rows { fading, .. } => assert!(!fading),
            other => panic!("expected rows, got {other:?}"),
        }
    }

    #[test]
    fn row_conversion_uses_helpers() {
        let doc = document(0);
        let row = DocumentRow::from(&doc);
        assert_eq!(row.id, doc.id);
        assert_eq!(row.short_id, short_id(&doc.id));
        assert_eq!(row.owner, owner_label(doc.owner_id.as_deref()));
        assert_ne!(row.owner, "N/A");
        assert_eq!(row.size_mb, "1.00");
        assert!(!row.has_metadata);
    }

    #[test]
    fn pagination_visibility() {
        assert!(!show_pagination(&state(FetchPhase::Loading), false, 0));
        assert!(!show_pagination(&state(FetchPhase::Ready), true, 0));
        assert!(!show_pagination(&state(FetchPhase::Failed), true, 5));
        assert!(show_pagination(&state(FetchPhase::Ready), true, 5));
    }
}
