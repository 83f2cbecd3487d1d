//! Gallery decoding for persisted project rows.
//!
//! Rows written by an older admin build stored each gallery entry as a
//! JSON-encoded string (`"{\"url\":...}"`) instead of an object, and the
//! seed data stored bare URL strings. Both coexist with current rows, so
//! every shape is funnelled through [`normalize_gallery`] before anything
//! else sees it.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::GalleryImage;

/// One gallery element as found in storage, before normalization.
#[derive(Debug)]
enum RawGalleryEntry<'a> {
    /// A bare URL or a JSON-encoded legacy entry.
    Text(&'a str),
    /// An object that should already be `{url, featured}`.
    Structured(&'a Map<String, Value>),
    /// Numbers, booleans, nulls and nested arrays.
    Unknown(&'a Value),
}

impl<'a> From<&'a Value> for RawGalleryEntry<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Object(map) => Self::Structured(map),
            other => Self::Unknown(other),
        }
    }
}

impl RawGalleryEntry<'_> {
    fn decode(self) -> Option<GalleryImage> {
        let image = match self {
            Self::Text(text) => decode_text(text),
            Self::Structured(map) => decode_structured(map),
            Self::Unknown(value) => {
                tracing::debug!("dropping gallery entry of unsupported shape: {value}");
                return None;
            },
        };
        match image {
            Some(image) if !image.url.trim().is_empty() => Some(image),
            _ => {
                tracing::debug!("dropping gallery entry without url");
                None
            },
        }
    }
}

fn decode_text(text: &str) -> Option<GalleryImage> {
    if text.trim_start().starts_with('{') {
        match serde_json::from_str::<Value>(text.trim()) {
            Ok(Value::Object(map)) => return decode_structured(&map),
            Ok(_) => {},
            Err(err) => {
                // Degraded path: keep the raw string as the URL.
                tracing::debug!("gallery entry looked like JSON but failed to parse: {err}");
            },
        }
    }
    Some(GalleryImage::new(text, false))
}

fn decode_structured(map: &Map<String, Value>) -> Option<GalleryImage> {
    let url = map.get("url").and_then(Value::as_str)?;
    let featured = map
        .get("featured")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    Some(GalleryImage::new(url, featured))
}

/// Converts a raw gallery field into canonical entries, preserving order.
///
/// Never fails: a non-array field yields an empty list, an unparseable
/// JSON-looking string becomes a bare URL, and entries that end up without a
/// non-empty `url` are dropped.
pub fn normalize_gallery(raw: &Value) -> Vec<GalleryImage> {
    let Some(entries) = raw.as_array() else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| RawGalleryEntry::from(entry).decode())
        .collect()
}

/// Serde adapter so decoded [`crate::Project`]s never carry raw shapes.
pub fn deserialize_gallery<'de, D>(deserializer: D) -> Result<Vec<GalleryImage>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(normalize_gallery(&raw))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::normalize_gallery;
    use crate::GalleryImage;

    #[test]
    fn bare_urls_become_unfeatured_entries_in_order() {
        let raw = json!(["https://a/1.jpg", "https://a/2.jpg", "https://a/3.jpg"]);
        let gallery = normalize_gallery(&raw);
        assert_eq!(gallery, vec![
            GalleryImage::new("https://a/1.jpg", false),
            GalleryImage::new("https://a/2.jpg", false),
            GalleryImage::new("https://a/3.jpg", false),
        ]);
    }

    #[test]
    fn json_encoded_entry_is_adopted() {
        let raw = json!(["plain.jpg", r#"{"url":"https://x","featured":true}"#]);
        let gallery = normalize_gallery(&raw);
        assert_eq!(gallery[1], GalleryImage::new("https://x", true));
    }

    #[test]
    fn json_encoded_entry_with_surrounding_whitespace_is_adopted() {
        let raw = json!(["  {\"url\":\"https://y\"}  "]);
        assert_eq!(normalize_gallery(&raw), vec![GalleryImage::new("https://y", false)]);
    }

    #[test]
    fn malformed_json_string_falls_back_to_bare_url() {
        let raw = json!(["{not json"]);
        assert_eq!(normalize_gallery(&raw), vec![GalleryImage::new("{not json", false)]);
    }

    #[test]
    fn non_array_field_is_empty() {
        assert!(normalize_gallery(&json!(null)).is_empty());
        assert!(normalize_gallery(&json!("https://a/1.jpg")).is_empty());
        assert!(normalize_gallery(&json!({ "url": "https://a/1.jpg" })).is_empty());
    }

    #[test]
    fn normalizing_normalized_output_is_identity() {
        let raw = json!([
            { "url": "https://a/1.jpg", "featured": false },
            { "url": "https://a/2.jpg", "featured": true }
        ]);
        let once = normalize_gallery(&raw);
        let twice = normalize_gallery(&serde_json::to_value(&once).expect("serialize gallery"));
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn entries_without_url_are_dropped() {
        let raw = json!([
            r#"{"featured":true}"#,
            { "featured": true },
            { "url": 7 },
            "",
            42,
            "https://a/kept.jpg"
        ]);
        assert_eq!(normalize_gallery(&raw), vec![GalleryImage::new("https://a/kept.jpg", false)]);
    }

    #[test]
    fn non_boolean_featured_reads_as_false() {
        let raw = json!([{ "url": "https://a/1.jpg", "featured": "yes" }]);
        assert_eq!(normalize_gallery(&raw), vec![GalleryImage::new("https://a/1.jpg", false)]);
    }
}
