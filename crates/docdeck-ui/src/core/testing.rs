//! In-memory doubles for the notification sink and the document endpoint.
#![allow(clippy::redundant_pub_crate)]

use crate::core::endpoint::{DocumentsEndpoint, EndpointError};
use crate::core::notify::{Notification, NotificationSink};
use async_trait::async_trait;
use docdeck_api_models::{DocumentChunk, DocumentRecord, DocumentUpload};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

#[derive(Clone, Default)]
pub(crate) struct RecordingNotifier {
    sent: Rc<RefCell<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub(crate) fn sent(&self) -> Vec<Notification> {
        self.sent.borrow().clone()
    }

    pub(crate) fn titles(&self) -> Vec<String> {
        self.sent.borrow().iter().map(|n| n.title.clone()).collect()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.borrow_mut().push(notification);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    Overview,
    Upload(String),
    Delete(Vec<String>),
    Chunks(String),
}

/// Endpoint that serves queued overview responses and records every call.
/// Once the queue is drained the last collection is served again.
#[derive(Default)]
pub(crate) struct ScriptedEndpoint {
    overviews: RefCell<VecDeque<Result<Vec<DocumentRecord>, EndpointError>>>,
    fallback: RefCell<Vec<DocumentRecord>>,
    mutation_error: RefCell<Option<EndpointError>>,
    chunks: RefCell<HashMap<String, Result<Vec<DocumentChunk>, EndpointError>>>,
    latency: RefCell<Duration>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedEndpoint {
    pub(crate) fn serving(documents: Vec<DocumentRecord>) -> Rc<Self> {
        let endpoint = Self::default();
        *endpoint.fallback.borrow_mut() = documents;
        Rc::new(endpoint)
    }

    pub(crate) fn push_overview(&self, response: Result<Vec<DocumentRecord>, EndpointError>) {
        self.overviews.borrow_mut().push_back(response);
    }

    pub(crate) fn fail_mutations(&self, error: EndpointError) {
        *self.mutation_error.borrow_mut() = Some(error);
    }

    pub(crate) fn serve_chunks(
        &self,
        document_id: &str,
        response: Result<Vec<DocumentChunk>, EndpointError>,
    ) {
        self.chunks
            .borrow_mut()
            .insert(document_id.to_string(), response);
    }

    pub(crate) fn set_latency(&self, latency: Duration) {
        *self.latency.borrow_mut() = latency;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn overview_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, Call::Overview))
            .count()
    }

    pub(crate) fn uploaded_files(&self) -> Vec<String> {
        self.pick(|call| match call {
            Call::Upload(file_name) => Some(file_name.clone()),
            _ => None,
        })
    }

    pub(crate) fn deleted_batches(&self) -> Vec<Vec<String>> {
        self.pick(|call| match call {
            Call::Delete(ids) => Some(ids.clone()),
            _ => None,
        })
    }

    pub(crate) fn chunk_requests(&self) -> Vec<String> {
        self.pick(|call| match call {
            Call::Chunks(id) => Some(id.clone()),
            _ => None,
        })
    }

    fn pick<T>(&self, select: impl Fn(&Call) -> Option<T>) -> Vec<T> {
        self.calls.borrow().iter().filter_map(select).collect()
    }

    fn mutation_result(&self) -> Result<(), EndpointError> {
        self.mutation_error.borrow().clone().map_or(Ok(()), Err)
    }
}

#[async_trait(?Send)]
impl DocumentsEndpoint for ScriptedEndpoint {
    async fn documents_overview(&self) -> Result<Vec<DocumentRecord>, EndpointError> {
        self.calls.borrow_mut().push(Call::Overview);
        let latency = *self.latency.borrow();
        let next = self.overviews.borrow_mut().pop_front();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        match next {
            Some(Ok(documents)) => {
                self.fallback.borrow_mut().clone_from(&documents);
                Ok(documents)
            }
            Some(Err(err)) => Err(err),
            None => Ok(self.fallback.borrow().clone()),
        }
    }

    async fn upload(&self, upload: DocumentUpload) -> Result<(), EndpointError> {
        self.calls.borrow_mut().push(Call::Upload(upload.file_name));
        self.mutation_result()
    }

    async fn delete(&self, document_ids: Vec<String>) -> Result<(), EndpointError> {
        self.calls.borrow_mut().push(Call::Delete(document_ids.clone()));
        self.mutation_result()?;
        self.fallback
            .borrow_mut()
            .retain(|doc| !document_ids.contains(&doc.id));
        Ok(())
    }

    async fn document_chunks(
        &self,
        document_id: &str,
    ) -> Result<Vec<DocumentChunk>, EndpointError> {
        self.calls
            .borrow_mut()
            .push(Call::Chunks(document_id.to_string()));
        self.chunks
            .borrow()
            .get(document_id)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
