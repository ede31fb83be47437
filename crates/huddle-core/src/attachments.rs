use crate::blob::{BlobStore, UploadKind};
use crate::error::CoreError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use huddle_api::types::{AttachmentKind, AttachmentRef, SendMessageRequest};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum AttachmentPayload {
    PreUploaded(AttachmentRef),
    Base64(String),
    RawBytes(Vec<u8>),
    Unsupported,
}

pub fn classify(request: &SendMessageRequest) -> Option<AttachmentPayload> {
    if let Some(value) = request.attachment.as_ref() {
        return Some(classify_value(value));
    }
    let base64_data = request.base64_data.as_deref()?;
    Some(AttachmentPayload::Base64(base64_data.to_string()))
}

fn classify_value(value: &Value) -> AttachmentPayload {
    match value {
        Value::Object(map) => {
            if map.contains_key("url") && map.contains_key("publicId") {
                if let Ok(reference) = serde_json::from_value::<AttachmentRef>(value.clone()) {
                    return AttachmentPayload::PreUploaded(reference);
                }
            }
            // Serialized Node-style byte buffer: {"type":"Buffer","data":[..]}
            if map.get("type").and_then(Value::as_str) == Some("Buffer") {
                if let Some(bytes) = map
                    .get("data")
                    .and_then(Value::as_array)
                    .and_then(bytes_from_array)
                {
                    return AttachmentPayload::RawBytes(bytes);
                }
            }
            AttachmentPayload::Unsupported
        }
        Value::String(data) => AttachmentPayload::Base64(data.clone()),
        Value::Array(items) => match bytes_from_array(items) {
            Some(bytes) => AttachmentPayload::RawBytes(bytes),
            None => AttachmentPayload::Unsupported,
        },
        _ => AttachmentPayload::Unsupported,
    }
}

fn bytes_from_array(items: &Vec<Value>) -> Option<Vec<u8>> {
    items
        .iter()
        .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect()
}

pub async fn normalize(
    payload: AttachmentPayload,
    declared_mime_type: Option<&str>,
    declared_filename: Option<&str>,
    blobs: &dyn BlobStore,
) -> Result<AttachmentRef, CoreError> {
    match payload {
        AttachmentPayload::PreUploaded(reference) => Ok(reference),
        AttachmentPayload::Base64(data) => {
            let bytes = STANDARD
                .decode(strip_data_uri(&data).trim())
                .map_err(|e| CoreError::Upload(format!("base64 decode: {}", e)))?;
            upload_bytes(bytes, declared_mime_type, declared_filename, blobs).await
        }
        AttachmentPayload::RawBytes(bytes) => {
            upload_bytes(bytes, declared_mime_type, declared_filename, blobs).await
        }
        AttachmentPayload::Unsupported => Err(CoreError::Upload(
            "unsupported attachment encoding".to_string(),
        )),
    }
}

fn strip_data_uri(data: &str) -> &str {
    if data.starts_with("data:") {
        data.split_once(',').map(|(_, rest)| rest).unwrap_or(data)
    } else {
        data
    }
}

async fn upload_bytes(
    bytes: Vec<u8>,
    declared_mime_type: Option<&str>,
    declared_filename: Option<&str>,
    blobs: &dyn BlobStore,
) -> Result<AttachmentRef, CoreError> {
    let mime_type = declared_mime_type.unwrap_or("application/octet-stream");
    let filename = declared_filename.unwrap_or("attachment");
    let kind = UploadKind::from_mime(mime_type);
    let blob = blobs.upload(bytes, kind, filename).await?;
    Ok(AttachmentRef {
        kind: match kind {
            UploadKind::Image => AttachmentKind::Image,
            UploadKind::Auto => AttachmentKind::File,
        },
        url: blob.url,
        filename: filename.to_string(),
        size: blob.size,
        public_id: blob.storage_id,
        mime_type: mime_type.to_string(),
        dimensions: blob.dimensions,
    })
}
