use crate::config::RemoteConfig;
use crate::uploads::UploadRecord;
use anyhow::{anyhow, Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

const PROJECT_HEADER: &str = "X-Appwrite-Project";

/// Thin client over the hosted backend's REST API: object storage for
/// the raw image bytes and a document collection for the metadata
/// records. Cheap to clone (the underlying HTTP client is shared).
#[derive(Clone)]
pub struct RemoteClient {
    http: Client,
    config: RemoteConfig,
}

/// The only field we need back from a storage upload.
#[derive(Deserialize)]
pub struct StoredFile {
    #[serde(rename = "$id")]
    pub id: String,
}

#[derive(Deserialize)]
struct DocumentList {
    documents: Vec<UploadRecord>,
}

// Error body shape the backend uses for non-2xx responses.
#[derive(Deserialize)]
struct ErrorEnvelope {
    message: String,
}

impl RemoteClient {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn storage_url(&self, rest: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files{}",
            self.config.endpoint, self.config.bucket_id, rest
        )
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.config.endpoint, self.config.database_id, self.config.collection_id
        )
    }

    /// Stores raw file bytes in the bucket under `file_id`.
    pub async fn create_file(
        &self,
        file_id: &str,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredFile> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .context("Invalid MIME type for upload")?;
        let form = Form::new()
            .text("fileId", file_id.to_string())
            .part("file", part);

        let response = self
            .http
            .post(self.storage_url(""))
            .header(PROJECT_HEADER, &self.config.project_id)
            .multipart(form)
            .send()
            .await
            .context("Failed to reach object storage")?;

        let response = Self::check(response).await?;
        response
            .json::<StoredFile>()
            .await
            .context("Unexpected object storage response")
    }

    /// Public retrieval URL for a stored object. No network call; the
    /// backend serves the bytes at a predictable path.
    pub fn file_view_url(&self, file_id: &str) -> String {
        format!(
            "{}/view?project={}",
            self.storage_url(&format!("/{}", file_id)),
            self.config.project_id
        )
    }

    /// Removes a stored object. Used only to clean up after a failed
    /// metadata write.
    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.storage_url(&format!("/{}", file_id)))
            .header(PROJECT_HEADER, &self.config.project_id)
            .send()
            .await
            .context("Failed to reach object storage")?;
        Self::check(response).await?;
        Ok(())
    }

    /// Fetches every upload record in the collection, in whatever
    /// order the server returns them. No pagination, no filtering.
    pub async fn list_documents(&self) -> Result<Vec<UploadRecord>> {
        let response = self
            .http
            .get(self.documents_url())
            .header(PROJECT_HEADER, &self.config.project_id)
            .send()
            .await
            .context("Failed to reach document store")?;

        let response = Self::check(response).await?;
        let list: DocumentList = response
            .json()
            .await
            .context("Unexpected document list response")?;
        Ok(list.documents)
    }

    /// Writes one metadata record and returns it as stored (the server
    /// echoes the fields back together with the assigned `$id`).
    pub async fn create_document(&self, document_id: &str, data: Value) -> Result<UploadRecord> {
        let body = serde_json::json!({
            "documentId": document_id,
            "data": data,
        });

        let response = self
            .http
            .post(self.documents_url())
            .header(PROJECT_HEADER, &self.config.project_id)
            .json(&body)
            .send()
            .await
            .context("Failed to reach document store")?;

        let response = Self::check(response).await?;
        response
            .json::<UploadRecord>()
            .await
            .context("Unexpected document response")
    }

    /// Turns non-2xx responses into errors, preferring the backend's
    /// own message over a bare status code.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(anyhow!(error_message(status, &body)))
    }
}

/// Picks the user-visible message for a failed call: the backend's
/// `message` field when the body is its error envelope, a status-based
/// fallback when it isn't (or the message is blank).
pub fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.message.is_empty() => envelope.message,
        _ => format!("Remote service returned {}", status),
    }
}

// Production implementation of the upload sequence's backend seam.
impl crate::uploads::UploadBackend for RemoteClient {
    async fn create_file(
        &self,
        file_id: &str,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredFile> {
        RemoteClient::create_file(self, file_id, file_name, mime, bytes).await
    }

    fn file_view_url(&self, file_id: &str) -> String {
        RemoteClient::file_view_url(self, file_id)
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        RemoteClient::delete_file(self, file_id).await
    }

    async fn create_document(&self, document_id: &str, data: Value) -> Result<UploadRecord> {
        RemoteClient::create_document(self, document_id, data).await
    }
}
