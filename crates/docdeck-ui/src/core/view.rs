//! Documents screen controller.
//!
//! # Design
//! - Owns the backing collection, pagination, selection and toggle registry and
//!   keeps them consistent: every applied collection prunes stale selection ids
//!   and clamps the current page before anything reads them.
//! - Fetched data is applied once per generation, when the fetcher enters
//!   [`FetchPhase::TransitioningIn`].
//! - The endpoint and notification sink are injected; without an endpoint the
//!   controller stays idle and mutations fail with [`MutationError::Disconnected`].

use crate::core::config::ViewConfig;
use crate::core::endpoint::{DocumentsEndpoint, EndpointError};
use crate::core::fetch::{FetchPhase, FetchSnapshot, FetchState, RetryingFetcher};
use crate::core::logic::{TableBody, show_pagination, table_body};
use crate::core::notify::{Notification, NotificationSink};
use crate::core::pagination::{PageWindow, Pagination};
use crate::core::request::{RequestError, build_query_request};
use crate::core::selection::SelectionSet;
use crate::core::timer::Scheduler;
use crate::core::toggles::{ToggleDescriptor, ToggleError, ToggleRegistry, register_search_toggles};
use docdeck_api_models::{
    DEFAULT_SEARCH_LIMIT, DocumentChunk, DocumentRecord, DocumentUpload, GenerationConfig,
    QueryRequest,
};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Failed upload or delete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// No endpoint has been connected.
    #[error("document service is not connected")]
    Disconnected,
    /// Bulk delete requested with an empty selection.
    #[error("no documents selected")]
    NothingSelected,
    /// The service rejected the request.
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

/// Failed chunk listing for one document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunksError {
    /// No endpoint has been connected.
    #[error("document service is not connected")]
    Disconnected,
    /// The id is not part of the loaded collection.
    #[error("unknown document: {id}")]
    UnknownDocument {
        /// Requested document id.
        id: String,
    },
    /// The service rejected the request.
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

/// Identifier copied by a row action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyTarget {
    /// The document id.
    DocumentId,
    /// The owning user's id.
    OwnerId,
}

impl CopyTarget {
    const fn description(self) -> &'static str {
        match self {
            Self::DocumentId => "Document ID copied to clipboard",
            Self::OwnerId => "User ID copied to clipboard",
        }
    }
}

/// The current page of the collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageView {
    /// Page bounds.
    pub window: PageWindow,
    /// Records on the page, in collection order.
    pub rows: Vec<DocumentRecord>,
}

struct ViewState {
    documents: Rc<Vec<DocumentRecord>>,
    loaded: bool,
    pagination: Pagination,
    selection: SelectionSet,
    toggles: ToggleRegistry,
}

type ChangeListener = Rc<dyn Fn()>;

struct Inner {
    config: ViewConfig,
    notifier: Rc<dyn NotificationSink>,
    fetcher: RetryingFetcher<Vec<DocumentRecord>>,
    endpoint: RefCell<Option<Rc<dyn DocumentsEndpoint>>>,
    state: RefCell<ViewState>,
    listeners: RefCell<Vec<ChangeListener>>,
}

/// Documents screen state: collection, pagination, selection and search toggles.
#[derive(Clone)]
pub struct ViewController {
    inner: Rc<Inner>,
}

impl ViewController {
    /// Build a controller with the screen's search toggles registered and no
    /// endpoint connected.
    #[must_use]
    pub fn new(
        config: ViewConfig,
        scheduler: Rc<dyn Scheduler>,
        notifier: Rc<dyn NotificationSink>,
    ) -> Self {
        let mut toggles = ToggleRegistry::default();
        register_search_toggles(&mut toggles);
        let fetcher = RetryingFetcher::new(scheduler, config.failure_message.as_str());
        let inner = Rc::new(Inner {
            state: RefCell::new(ViewState {
                documents: Rc::default(),
                loaded: false,
                pagination: Pagination::new(config.page_size),
                selection: SelectionSet::default(),
                toggles,
            }),
            config,
            notifier,
            fetcher,
            endpoint: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        });

        let weak: Weak<Inner> = Rc::downgrade(&inner);
        inner.fetcher.subscribe(move |snapshot| {
            if let Some(inner) = weak.upgrade() {
                inner.on_fetch(snapshot);
            }
        });
        Self { inner }
    }

    /// Attach the document service and fetch the collection.
    pub fn connect(&self, endpoint: Rc<dyn DocumentsEndpoint>) {
        *self.inner.endpoint.borrow_mut() = Some(endpoint);
        self.refresh();
    }

    /// Detach the document service and abandon any fetch in flight.
    pub fn disconnect(&self) {
        self.inner.endpoint.borrow_mut().take();
        self.inner.fetcher.cancel();
    }

    /// Tear down the screen: disconnect and drop change listeners.
    pub fn unmount(&self) {
        self.disconnect();
        self.inner.listeners.borrow_mut().clear();
    }

    /// Start a new fetch chain, superseding any in flight. Returns the chain's
    /// generation, or `None` when no endpoint is connected.
    pub fn refresh(&self) -> Option<u64> {
        let Some(endpoint) = self.endpoint() else {
            debug!("refresh skipped; no endpoint connected");
            return None;
        };
        let generation = self.inner.fetcher.fetch(
            move || {
                let endpoint = Rc::clone(&endpoint);
                async move { endpoint.documents_overview().await }
            },
            self.inner.config.retry,
        );
        Some(generation)
    }

    /// Register a callback invoked after any observable change.
    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.inner.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Upload or replace a document, then re-fetch.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::Disconnected`] without an endpoint and
    /// [`MutationError::Endpoint`] when the service rejects the upload. Either
    /// way the user is notified and the collection is left untouched.
    pub async fn upload(&self, upload: DocumentUpload) -> Result<(), MutationError> {
        let endpoint = self.require_endpoint("Upload Failed")?;
        let file_name = upload.file_name.clone();
        match endpoint.upload(upload).await {
            Ok(()) => {
                info!(file = %file_name, "document uploaded");
                self.inner.notify(Notification::new(
                    "Upload Successful",
                    format!("{file_name} has been uploaded successfully."),
                ));
                self.refresh();
                Ok(())
            }
            Err(err) => {
                error!(file = %file_name, error = %err, "document upload failed");
                Err(self.fail("Upload Failed", err.into()))
            }
        }
    }

    /// Delete every selected document, clear the selection and re-fetch.
    /// Returns the number of documents deleted.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::NothingSelected`] for an empty selection,
    /// [`MutationError::Disconnected`] without an endpoint and
    /// [`MutationError::Endpoint`] when the service rejects the request. The
    /// selection survives a failed delete.
    pub async fn delete_selected(&self) -> Result<usize, MutationError> {
        let endpoint = self.require_endpoint("Delete Failed")?;
        let ids = self.inner.state.borrow().selection.ids();
        if ids.is_empty() {
            return Err(self.fail("Delete Failed", MutationError::NothingSelected));
        }

        let count = ids.len();
        match endpoint.delete(ids).await {
            Ok(()) => {
                info!(count, "documents deleted");
                self.inner.state.borrow_mut().selection.clear();
                self.inner.notify(Notification::new(
                    "Documents Deleted",
                    format!("{count} document(s) deleted successfully."),
                ));
                self.inner.changed();
                self.refresh();
                Ok(count)
            }
            Err(err) => {
                error!(count, error = %err, "document delete failed");
                Err(self.fail("Delete Failed", err.into()))
            }
        }
    }

    /// Chunks of one document in the loaded collection.
    ///
    /// # Errors
    ///
    /// Returns [`ChunksError::UnknownDocument`] for ids outside the collection,
    /// [`ChunksError::Disconnected`] without an endpoint and
    /// [`ChunksError::Endpoint`] when the service fails. The user is notified
    /// of every failure.
    pub async fn document_chunks(
        &self,
        document_id: &str,
    ) -> Result<Vec<DocumentChunk>, ChunksError> {
        let known = self
            .inner
            .state
            .borrow()
            .documents
            .iter()
            .any(|doc| doc.id == document_id);
        if !known {
            return Err(self.fail_chunks(ChunksError::UnknownDocument {
                id: document_id.to_string(),
            }));
        }
        let Some(endpoint) = self.endpoint() else {
            return Err(self.fail_chunks(ChunksError::Disconnected));
        };

        match endpoint.document_chunks(document_id).await {
            Ok(chunks) => {
                debug!(document_id, count = chunks.len(), "document chunks loaded");
                Ok(chunks)
            }
            Err(err) => {
                error!(document_id, error = %err, "document chunks request failed");
                Err(self.fail_chunks(err.into()))
            }
        }
    }

    /// Jump to `page`, bounded to the valid range. Returns the page shown.
    pub fn set_page(&self, page: usize) -> usize {
        let shown = {
            let mut state = self.inner.state.borrow_mut();
            let len = state.documents.len();
            state.pagination.set_page(page, len)
        };
        self.inner.changed();
        shown
    }

    /// Advance one page when possible.
    pub fn next_page(&self) -> usize {
        let shown = {
            let mut state = self.inner.state.borrow_mut();
            let len = state.documents.len();
            state.pagination.next(len)
        };
        self.inner.changed();
        shown
    }

    /// Go back one page when possible.
    pub fn previous_page(&self) -> usize {
        let shown = {
            let mut state = self.inner.state.borrow_mut();
            let len = state.documents.len();
            state.pagination.previous(len)
        };
        self.inner.changed();
        shown
    }

    /// Bounds and records of the current page.
    #[must_use]
    pub fn page_view(&self) -> PageView {
        let state = self.inner.state.borrow();
        let window = state.pagination.window(state.documents.len());
        let rows = state.documents[window.slice()].to_vec();
        PageView { window, rows }
    }

    /// The full backing collection.
    #[must_use]
    pub fn documents(&self) -> Rc<Vec<DocumentRecord>> {
        Rc::clone(&self.inner.state.borrow().documents)
    }

    /// Select or deselect a document. Ids absent from the collection are
    /// ignored. Returns whether the selection changed.
    pub fn toggle_selection(&self, id: &str, should_select: bool) -> bool {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            if !state.documents.iter().any(|doc| doc.id == id) {
                debug!(id, "ignoring selection of unknown document");
                return false;
            }
            state.selection.toggle(id, should_select)
        };
        if changed {
            self.inner.changed();
        }
        changed
    }

    /// Select every document on the current page, or clear the selection when
    /// all of them are already selected.
    pub fn select_page_or_clear(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            let window = state.pagination.window(state.documents.len());
            let documents = Rc::clone(&state.documents);
            state
                .selection
                .select_all_or_clear(documents[window.slice()].iter().map(|doc| doc.id.as_str()));
        }
        self.inner.changed();
    }

    /// Current selection.
    #[must_use]
    pub fn selection(&self) -> SelectionSet {
        self.inner.state.borrow().selection.clone()
    }

    /// Flip a search toggle and notify the user with its new state.
    ///
    /// # Errors
    ///
    /// Returns [`ToggleError::Unknown`] for an unregistered id; nothing is
    /// changed and no notification is sent.
    pub fn set_toggle(&self, id: &str, checked: bool) -> Result<ToggleDescriptor, ToggleError> {
        let updated = self.inner.state.borrow_mut().toggles.update(id, checked);
        let descriptor = match updated {
            Ok(descriptor) => descriptor,
            Err(err) => {
                warn!(id, "rejected update of unknown toggle");
                return Err(err);
            }
        };

        let mut payload = Map::new();
        payload.insert(descriptor.id.clone(), Value::Bool(descriptor.checked));
        let description = serde_json::to_string_pretty(&payload).unwrap_or_default();
        self.inner.notify(Notification::new(
            format!("{} status changed", descriptor.label),
            description,
        ));
        self.inner.changed();
        Ok(descriptor)
    }

    /// Registered toggles, in registration order.
    #[must_use]
    pub fn toggles(&self) -> Vec<ToggleDescriptor> {
        self.inner.state.borrow().toggles.descriptors().cloned().collect()
    }

    /// Tell the user an identifier was copied. Clipboard access is the
    /// caller's concern.
    pub fn notify_copied(&self, target: CopyTarget) {
        self.inner
            .notify(Notification::new("Copied!", target.description()));
    }

    /// Build an outgoing query from the current toggles.
    ///
    /// # Errors
    ///
    /// See [`build_query_request`].
    pub fn query_request(
        &self,
        query: &str,
        generation: &GenerationConfig,
    ) -> Result<QueryRequest, RequestError> {
        let state = self.inner.state.borrow();
        build_query_request(query, &state.toggles, generation, DEFAULT_SEARCH_LIMIT)
    }

    /// Current fetch status.
    #[must_use]
    pub fn fetch_state(&self) -> FetchState {
        self.inner.fetcher.state()
    }

    /// What the table body shows right now.
    #[must_use]
    pub fn table_body(&self) -> TableBody {
        let fetch = self.inner.fetcher.state();
        let state = self.inner.state.borrow();
        let window = state.pagination.window(state.documents.len());
        table_body(&fetch, state.loaded, &state.documents[window.slice()])
    }

    /// Whether pagination controls are shown.
    #[must_use]
    pub fn shows_pagination(&self) -> bool {
        let fetch = self.inner.fetcher.state();
        let state = self.inner.state.borrow();
        show_pagination(&fetch, state.loaded, state.documents.len())
    }

    fn endpoint(&self) -> Option<Rc<dyn DocumentsEndpoint>> {
        self.inner.endpoint.borrow().clone()
    }

    fn require_endpoint(&self, title: &str) -> Result<Rc<dyn DocumentsEndpoint>, MutationError> {
        self.endpoint()
            .ok_or_else(|| self.fail(title, MutationError::Disconnected))
    }

    fn fail(&self, title: &str, err: MutationError) -> MutationError {
        self.inner.notify(Notification::new(title, err.to_string()));
        err
    }

    fn fail_chunks(&self, err: ChunksError) -> ChunksError {
        self.inner
            .notify(Notification::new("Failed to Load Chunks", err.to_string()));
        err
    }
}

impl Inner {
    fn on_fetch(&self, snapshot: &FetchSnapshot<Vec<DocumentRecord>>) {
        if snapshot.state.phase == FetchPhase::TransitioningIn {
            if let Some(data) = &snapshot.data {
                self.apply_collection(Rc::clone(data));
            }
        }
        self.changed();
    }

    fn apply_collection(&self, documents: Rc<Vec<DocumentRecord>>) {
        let mut state = self.state.borrow_mut();
        let known: HashSet<&str> = documents.iter().map(|doc| doc.id.as_str()).collect();
        let pruned = state.selection.retain_known(|id| known.contains(id));
        let clamped = state.pagination.clamp(documents.len());
        debug!(
            count = documents.len(),
            pruned,
            clamped,
            page = state.pagination.current_page(),
            "collection applied"
        );
        drop(known);
        state.documents = documents;
        state.loaded = true;
    }

    fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    fn changed(&self) {
        let listeners = self.listeners.borrow().clone();
        for listener in &listeners {
            listener();
        }
    }
}
