use crate::error::CoreError;
use async_trait::async_trait;
use huddle_api::types::Dimensions;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Auto,
}

impl UploadKind {
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            UploadKind::Image
        } else {
            UploadKind::Auto
        }
    }

    fn folder(self) -> &'static str {
        match self {
            UploadKind::Image => "images",
            UploadKind::Auto => "files",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBlob {
    pub url: String,
    pub storage_id: String,
    pub size: u64,
    pub dimensions: Option<Dimensions>,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        kind: UploadKind,
        filename: &str,
    ) -> Result<StoredBlob, CoreError>;
}

#[derive(Clone, Default)]
pub struct InMemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upload_count(&self) -> usize {
        self.blobs.lock().await.len()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        kind: UploadKind,
        filename: &str,
    ) -> Result<StoredBlob, CoreError> {
        if bytes.is_empty() {
            return Err(CoreError::Upload("empty payload".to_string()));
        }
        let storage_id = format!("{}/{}", kind.folder(), Uuid::new_v4());
        let url = format!("mem://{}/{}", storage_id, filename);
        let dimensions = match kind {
            UploadKind::Image => png_dimensions(&bytes),
            UploadKind::Auto => None,
        };
        let size = bytes.len() as u64;
        self.blobs.lock().await.insert(storage_id.clone(), bytes);
        Ok(StoredBlob {
            url,
            storage_id,
            size,
            dimensions,
        })
    }
}

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

fn png_dimensions(bytes: &[u8]) -> Option<Dimensions> {
    if bytes.len() < 24 || bytes[..8] != PNG_SIGNATURE || &bytes[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    Some(Dimensions { width, height })
}
