use crate::remote::StoredFile;
use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

/// Declared types the dashboard accepts. Enforced client-side only.
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

/// Message shown when a non-image (or unsupported image) is picked.
pub const INVALID_TYPE_MESSAGE: &str = "Please upload only JPG or PNG images";

/// One stored image, as it appears both in the document store and in
/// the frontend. Field names follow the wire format (`$id` is the
/// server-assigned document id). Immutable once created.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UploadRecord {
    #[serde(rename = "$id")]
    pub id: String,

    #[serde(rename = "imageUrl")]
    pub image_url: String,

    #[serde(rename = "fileName")]
    pub file_name: String,

    #[serde(rename = "uploadedAt")]
    pub uploaded_at: String,

    pub username: String,
}

/// Client-side dashboard state: a cache of upload records (newest of
/// this client's own uploads first), the current selection, and a flag
/// marking an upload in flight.
///
/// The document store is the source of truth. The cache is updated
/// eagerly on every successful upload but never reconciled against
/// concurrent writes from other clients.
#[derive(Default)]
pub struct Dashboard {
    uploads: Vec<UploadRecord>,
    selected_id: Option<String>,
    is_uploading: bool,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cache with a freshly fetched list. The selection is
    /// kept; if the selected record is gone it simply resolves to none.
    pub fn set_uploads(&mut self, uploads: Vec<UploadRecord>) {
        self.uploads = uploads;
    }

    pub fn uploads(&self) -> &[UploadRecord] {
        &self.uploads
    }

    /// Prepends a just-created record and makes it the selection.
    pub fn record_upload(&mut self, record: UploadRecord) {
        self.selected_id = Some(record.id.clone());
        self.uploads.insert(0, record);
    }

    /// Switches the selection to an existing record. Pure cache
    /// operation; returns the record so the caller can display it
    /// without another fetch.
    pub fn select(&mut self, id: &str) -> Option<UploadRecord> {
        let found = self.uploads.iter().find(|u| u.id == id).cloned();
        if let Some(record) = &found {
            self.selected_id = Some(record.id.clone());
        }
        found
    }

    pub fn clear_selection(&mut self) {
        self.selected_id = None;
    }

    pub fn selected(&self) -> Option<&UploadRecord> {
        let id = self.selected_id.as_deref()?;
        self.uploads.iter().find(|u| u.id == id)
    }

    /// Marks an upload in flight. Returns false if one already is, so
    /// only a single upload sequence runs at a time.
    pub fn begin_upload(&mut self) -> bool {
        if self.is_uploading {
            return false;
        }
        self.is_uploading = true;
        true
    }

    pub fn finish_upload(&mut self) {
        self.is_uploading = false;
    }

    pub fn is_uploading(&self) -> bool {
        self.is_uploading
    }
}

/// Marks an upload in flight for the lifetime of one upload sequence
/// and clears the flag on drop, so the flag cannot stay stuck when the
/// sequence errors out or its future is dropped mid-flight.
pub struct UploadTicket<'a> {
    dashboard: &'a Mutex<Dashboard>,
}

impl<'a> UploadTicket<'a> {
    /// Claims the in-flight slot. Returns `None` when an upload is
    /// already running.
    pub fn acquire(dashboard: &'a Mutex<Dashboard>) -> Option<Self> {
        let mut guard = dashboard.lock().unwrap();
        if !guard.begin_upload() {
            return None;
        }
        Some(Self { dashboard })
    }
}

impl Drop for UploadTicket<'_> {
    fn drop(&mut self) {
        self.dashboard.lock().unwrap().finish_upload();
    }
}

/// Determines the MIME type of a picked file: content sniffing first,
/// file extension as a fallback for files too small or plain to sniff.
pub fn detect_mime(bytes: &[u8], file_name: &str) -> Option<String> {
    if let Some(kind) = infer::get(bytes) {
        return Some(kind.mime_type().to_string());
    }
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())?
        .to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg".to_string()),
        "png" => Some("image/png".to_string()),
        _ => None,
    }
}

pub fn is_accepted_image(mime: &str) -> bool {
    ACCEPTED_IMAGE_TYPES.contains(&mime)
}

/// The slice of the remote surface the upload sequence touches.
/// `RemoteClient` is the production implementation; tests script these
/// calls to reach the failure paths without a network.
pub trait UploadBackend {
    async fn create_file(
        &self,
        file_id: &str,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredFile>;
    fn file_view_url(&self, file_id: &str) -> String;
    async fn delete_file(&self, file_id: &str) -> Result<()>;
    async fn create_document(&self, document_id: &str, data: Value) -> Result<UploadRecord>;
}

/// The full upload sequence: store the bytes, derive the public URL,
/// write the metadata record. Single attempt, no retry.
///
/// If the metadata write fails after the object was stored, the object
/// is deleted best-effort so the bucket doesn't accumulate orphans;
/// the original error is surfaced either way.
pub async fn perform_upload<B: UploadBackend>(
    client: &B,
    username: &str,
    file_name: &str,
    mime: &str,
    bytes: Vec<u8>,
) -> Result<UploadRecord> {
    let file_id = Uuid::new_v4().to_string();
    let stored = client.create_file(&file_id, file_name, mime, bytes).await?;

    let image_url = client.file_view_url(&stored.id);
    let uploaded_at = Utc::now().to_rfc3339();

    let data = serde_json::json!({
        "imageUrl": image_url,
        "fileName": file_name,
        "uploadedAt": uploaded_at,
        "username": username,
        "fileId": stored.id,
    });

    let document_id = Uuid::new_v4().to_string();
    match client.create_document(&document_id, data).await {
        Ok(record) => Ok(record),
        Err(e) => {
            if let Err(cleanup) = client.delete_file(&stored.id).await {
                eprintln!("Failed to clean up stored object {}: {}", stored.id, cleanup);
            }
            Err(e)
        }
    }
}
