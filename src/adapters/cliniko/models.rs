//! Cliniko API and storage wire models

use crate::domain::ClinikoError;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response of `GET /v1/patients/{id}/attachment_presigned_post`
///
/// `url` is the storage endpoint the file is POSTed to; `fields` are opaque
/// form fields (policy, signature, key template...) that must be echoed back
/// unchanged and in the order the server sent them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresignedUploadTarget {
    /// Storage endpoint for the multipart POST
    pub url: String,

    /// Server-issued form fields, in server order
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl PresignedUploadTarget {
    /// Form fields as multipart text values, in server order
    ///
    /// Strings are sent as-is, `null` as an empty value and any other JSON
    /// value in its compact JSON form.
    pub fn form_fields(&self) -> impl Iterator<Item = (&str, String)> {
        self.fields.iter().map(|(name, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (name.as_str(), text)
        })
    }

    /// URL registered with Cliniko once storage has assigned `key`
    pub fn upload_url(&self, key: &str) -> String {
        format!("{}/{}", self.url, key)
    }
}

/// Body of `POST /v1/patient_attachments`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentRegistration {
    /// Patient the upload belongs to
    pub patient_id: serde_json::Value,

    /// Presigned URL joined with the storage key
    pub upload_url: String,
}

/// Extracts the text of the first `PostResponse/Key` element
///
/// Storage answers a successful presigned POST with a document such as:
///
/// ```xml
/// <PostResponse>
///   <Location>https://bucket.s3.amazonaws.com/abc123</Location>
///   <Bucket>bucket</Bucket>
///   <Key>abc123</Key>
///   <ETag>"d41d8cd98f00b204e9800998ecf8427e"</ETag>
/// </PostResponse>
/// ```
///
/// # Errors
///
/// `ClinikoError::MalformedUploadResponse` if the body is not XML or has no
/// non-empty `Key` directly under a `PostResponse` element.
pub fn parse_upload_key(body: &str) -> Result<String, ClinikoError> {
    let mut reader = Reader::from_str(body);
    reader.trim_text(true);

    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut key: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => path.push(e.local_name().as_ref().to_vec()),
            Ok(Event::End(_)) => {
                if is_key_path(&path) && key.as_deref().is_some_and(|k| !k.is_empty()) {
                    break;
                }
                path.pop();
            }
            Ok(Event::Text(t)) if is_key_path(&path) => {
                let text = t.unescape().map_err(|e| {
                    ClinikoError::MalformedUploadResponse(format!("invalid Key text: {e}"))
                })?;
                key.get_or_insert_with(String::new).push_str(&text);
            }
            Ok(Event::CData(c)) if is_key_path(&path) => {
                let inner = c.into_inner();
                key.get_or_insert_with(String::new)
                    .push_str(&String::from_utf8_lossy(&inner));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ClinikoError::MalformedUploadResponse(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    match key {
        Some(k) if !k.is_empty() => Ok(k),
        _ => Err(ClinikoError::MalformedUploadResponse(truncate(body, 200))),
    }
}

fn is_key_path(path: &[Vec<u8>]) -> bool {
    let n = path.len();
    n >= 2 && path[n - 1] == b"Key" && path[n - 2] == b"PostResponse"
}

fn truncate(body: &str, max: usize) -> String {
    if body.chars().count() <= max {
        return body.to_string();
    }
    let mut out: String = body.chars().take(max).collect();
    out.push_str("...");
    out
}
