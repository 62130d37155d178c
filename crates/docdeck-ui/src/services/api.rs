//! Document service client over `fetch`.

use crate::core::endpoint::{DocumentsEndpoint, EndpointError};
use async_trait::async_trait;
use docdeck_api_models::{
    DeleteDocumentsRequest, DocumentChunk, DocumentChunksResponse, DocumentRecord,
    DocumentUpload, DocumentsOverviewResponse, UploadTarget,
};
use gloo_net::http::{Request, Response};
use js_sys::{Array, Uint8Array};
use web_sys::{Blob, FormData};

/// [`DocumentsEndpoint`] speaking the service's REST contract.
#[derive(Clone, Debug)]
pub struct HttpEndpoint {
    base_url: String,
}

impl HttpEndpoint {
    /// Client rooted at `base_url` (no trailing `/v1`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait(?Send)]
impl DocumentsEndpoint for HttpEndpoint {
    async fn documents_overview(&self) -> Result<Vec<DocumentRecord>, EndpointError> {
        let response = Request::get(&self.url("/v1/documents_overview"))
            .send()
            .await
            .map_err(transport)?;
        let response = ensure_success(response).await?;
        let body: DocumentsOverviewResponse = response
            .json()
            .await
            .map_err(|err| EndpointError::Decode(err.to_string()))?;
        Ok(body.results)
    }

    async fn upload(&self, upload: DocumentUpload) -> Result<(), EndpointError> {
        let form = FormData::new().map_err(|err| js_error("form-data", &err))?;
        let bytes = Uint8Array::from(upload.content.as_slice());
        let blob = Blob::new_with_u8_array_sequence(&Array::of1(&bytes))
            .map_err(|err| js_error("blob", &err))?;
        form.append_with_blob_and_filename("files", &blob, &upload.file_name)
            .map_err(|err| js_error("attach file", &err))?;

        let path = match &upload.target {
            UploadTarget::New => "/v1/ingest_files",
            UploadTarget::Replace { document_id } => {
                let ids = serde_json::to_string(&[document_id])
                    .map_err(|err| EndpointError::Decode(err.to_string()))?;
                form.append_with_str("document_ids", &ids)
                    .map_err(|err| js_error("attach ids", &err))?;
                "/v1/update_files"
            }
        };

        let response = Request::post(&self.url(path))
            .body(form)
            .send()
            .await
            .map_err(transport)?;
        ensure_success(response).await.map(drop)
    }

    async fn delete(&self, document_ids: Vec<String>) -> Result<(), EndpointError> {
        let response = Request::delete(&self.url("/v1/delete"))
            .json(&DeleteDocumentsRequest { document_ids })
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        ensure_success(response).await.map(drop)
    }

    async fn document_chunks(
        &self,
        document_id: &str,
    ) -> Result<Vec<DocumentChunk>, EndpointError> {
        let encoded = String::from(js_sys::encode_uri_component(document_id));
        let response = Request::get(&self.url(&format!("/v1/document_chunks/{encoded}")))
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

async fn ensure_success(response: Response) -> Result<Response, EndpointError> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(EndpointError::Status {
        status,
        body: body.trim().to_string(),
    })
}

fn transport(err: gloo_net::Error) -> EndpointError {
    EndpointError::Transport(err.to_string())
}

fn js_error(context: &str, err: &wasm_bindgen::JsValue) -> EndpointError {
    EndpointError::Transport(format!("{context}: {err:?}"))
}
