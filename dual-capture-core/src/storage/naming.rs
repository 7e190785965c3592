use chrono::{DateTime, Utc};

use crate::models::capture::extension_for;
use crate::models::view::ViewKind;

/// Download file name: `{product}_{Landscape|Portrait}_{timestamp}.{ext}`.
///
/// `timestamp_ms` is milliseconds since the Unix epoch. Characters in the
/// product name that are unsafe in file names become `-`.
pub fn download_name(product: &str, view: ViewKind, timestamp_ms: i64, content_type: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        sanitize(product),
        view.label(),
        timestamp_ms,
        extension_for(content_type)
    )
}

pub fn timestamp_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    if cleaned.is_empty() {
        "capture".into()
    } else {
        cleaned
    }
}
