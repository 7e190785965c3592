use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::CaptureError;
use super::view::{CropRect, FrameSize, ViewKind};

/// Whether a pair holds two stills or two recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    Video,
    Photo,
}

impl CaptureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Photo => "photo",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "video" => Some(Self::Video),
            "photo" => Some(Self::Photo),
            _ => None,
        }
    }
}

/// One finished output: encoded bytes plus what is needed to store them.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub view: ViewKind,
    pub data: Vec<u8>,
    pub content_type: String,
    pub size: FrameSize,
    /// Crop applied to the source for a still. `None` for recordings, whose
    /// crop follows the zoom over time.
    pub crop: Option<CropRect>,
    pub checksum: String,
}

impl Artifact {
    pub fn new(
        view: ViewKind,
        data: Vec<u8>,
        content_type: impl Into<String>,
        size: FrameSize,
        crop: Option<CropRect>,
    ) -> Self {
        let checksum = sha256_hex(&data);
        Self {
            view,
            data,
            content_type: content_type.into(),
            size,
            crop,
            checksum,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// File extension for downloads, derived from the content type.
    pub fn extension(&self) -> &'static str {
        extension_for(&self.content_type)
    }
}

/// Map a MIME type (parameters allowed) to a file extension.
pub fn extension_for(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "video/webm" | "audio/webm" => "webm",
        "video/x-matroska" => "mkv",
        "video/mp4" => "mp4",
        "image/png" => "png",
        "image/jpeg" => "jpg",
        _ => "bin",
    }
}

/// Landscape + portrait artifacts produced by a single capture action.
///
/// Constructed only once both sides are finalized.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPair {
    pub id: String,
    pub kind: CaptureKind,
    pub landscape: Artifact,
    pub portrait: Artifact,
    pub created_at: DateTime<Utc>,
    pub duration: Option<Duration>,
}

impl CapturedPair {
    pub fn new(
        kind: CaptureKind,
        landscape: Artifact,
        portrait: Artifact,
        duration: Option<Duration>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            landscape,
            portrait,
            created_at: Utc::now(),
            duration,
        }
    }

    pub fn artifact(&self, view: ViewKind) -> &Artifact {
        match view {
            ViewKind::Landscape => &self.landscape,
            ViewKind::Portrait => &self.portrait,
        }
    }
}

/// Whatever could be recovered from recordings interrupted by device loss.
///
/// Never treated as a complete pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SalvagedRecording {
    pub landscape: Option<Artifact>,
    pub portrait: Option<Artifact>,
    pub duration: Duration,
}

/// A persisted capture as exposed by the store and the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRecord {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: CaptureKind,
    pub landscape_url: String,
    pub portrait_url: String,
    pub created_at: DateTime<Utc>,
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCapture {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: CaptureKind,
    pub landscape_url: String,
    pub portrait_url: String,
}

impl NewCapture {
    const STRING_FIELDS: [&'static str; 4] = ["title", "type", "landscapeUrl", "portraitUrl"];

    /// Validate an untyped JSON body, reporting the first offending field in
    /// declaration order.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, CaptureError> {
        let Some(object) = value.as_object() else {
            return Err(CaptureError::Validation {
                message: format!("Expected object, received {}", json_kind(value)),
                field: None,
            });
        };

        let mut strings = Vec::with_capacity(Self::STRING_FIELDS.len());
        for field in Self::STRING_FIELDS {
            match object.get(field) {
                None => {
                    return Err(CaptureError::validation("Required", field));
                }
                Some(serde_json::Value::String(s)) => {
                    if field == "type" && CaptureKind::parse(s).is_none() {
                        return Err(CaptureError::validation(
                            format!("Invalid enum value. Expected 'video' | 'photo', received '{}'", s),
                            field,
                        ));
                    }
                    strings.push(s.clone());
                }
                Some(other) => {
                    return Err(CaptureError::validation(
                        format!("Expected string, received {}", json_kind(other)),
                        field,
                    ));
                }
            }
        }

        let kind = CaptureKind::parse(&strings[1])
            .ok_or_else(|| CaptureError::validation("Required", "type"))?;
        Ok(Self {
            title: strings[0].clone(),
            kind,
            landscape_url: strings[2].clone(),
            portrait_url: strings[3].clone(),
        })
    }

    /// Check a typed record before sending it: title and both URLs must
    /// be non-blank. Stricter than the wire schema, which accepts empty
    /// strings.
    pub fn validate(&self) -> Result<(), CaptureError> {
        let fields = [
            ("title", &self.title),
            ("landscapeUrl", &self.landscape_url),
            ("portraitUrl", &self.portrait_url),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(CaptureError::validation("Must not be empty", field));
            }
        }
        Ok(())
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

pub(crate) fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data).iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_body_parses() {
        let body = json!({"title": "t", "type": "video", "landscapeUrl": "a", "portraitUrl": "b"});
        let capture = NewCapture::from_json(&body).unwrap();
        assert_eq!(capture.kind, CaptureKind::Video);
        assert_eq!(capture.landscape_url, "a");
    }

    #[test]
    fn missing_type_names_field() {
        let body = json!({"title": "t", "landscapeUrl": "a", "portraitUrl": "b"});
        let err = NewCapture::from_json(&body).unwrap_err();
        assert_eq!(
            err,
            CaptureError::Validation { message: "Required".into(), field: Some("type".into()) }
        );
    }

    #[test]
    fn first_failing_field_wins() {
        let body = json!({"type": 3});
        match NewCapture::from_json(&body).unwrap_err() {
            CaptureError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("title")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_rejected() {
        let body = json!({"title": "t", "type": "gif", "landscapeUrl": "a", "portraitUrl": "b"});
        match NewCapture::from_json(&body).unwrap_err() {
            CaptureError::Validation { message, field } => {
                assert_eq!(field.as_deref(), Some("type"));
                assert!(message.contains("'gif'"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn explicit_null_is_not_missing() {
        let body = json!({"title": null, "type": "video", "landscapeUrl": "a", "portraitUrl": "b"});
        assert_eq!(
            NewCapture::from_json(&body).unwrap_err(),
            CaptureError::validation("Expected string, received null", "title")
        );
    }

    #[test]
    fn typed_record_rejects_blank_fields() {
        let mut capture = NewCapture {
            title: "Take".into(),
            kind: CaptureKind::Video,
            landscape_url: "file:///l.mkv".into(),
            portrait_url: "file:///p.mkv".into(),
        };
        assert!(capture.validate().is_ok());

        capture.portrait_url = "  ".into();
        assert_eq!(
            capture.validate().unwrap_err(),
            CaptureError::validation("Must not be empty", "portraitUrl")
        );

        capture.title.clear();
        match capture.validate().unwrap_err() {
            CaptureError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("title")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_object_has_no_field() {
        match NewCapture::from_json(&json!([1, 2])).unwrap_err() {
            CaptureError::Validation { field, message } => {
                assert!(field.is_none());
                assert_eq!(message, "Expected object, received array");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = CaptureRecord {
            id: 7,
            title: "t".into(),
            kind: CaptureKind::Photo,
            landscape_url: "a".into(),
            portrait_url: "b".into(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "photo");
        assert_eq!(value["landscapeUrl"], "a");
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn extensions_from_content_type() {
        assert_eq!(extension_for("video/webm;codecs=vp9,opus"), "webm");
        assert_eq!(extension_for("video/x-matroska;codecs=mjpeg,pcm"), "mkv");
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("application/octet-stream"), "bin");
    }

    #[test]
    fn artifact_checksum_is_sha256() {
        let artifact = Artifact::new(ViewKind::Landscape, b"abc".to_vec(), "image/png", FrameSize::new(1, 1), None);
        assert_eq!(
            artifact.checksum,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
