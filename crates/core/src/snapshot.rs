//! JSON snapshot export and import.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::slide::{self, Slide};

/// Snapshot format version written by this crate.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Saved presentation: the ordered slide list plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(deserialize_with = "slide::deserialize_unique")]
    pub slides: Vec<Slide>,
    pub version: String,
    pub saved_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(slides: Vec<Slide>) -> Self {
        Self::at(slides, Utc::now())
    }

    pub fn at(slides: Vec<Slide>, saved_at: DateTime<Utc>) -> Self {
        Self {
            slides,
            version: SNAPSHOT_VERSION.to_string(),
            saved_at,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a snapshot. Slide content is restricted to each slide's layout
    /// while deserializing, and repeated slide ids are re-issued.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::Snapshot(format!(
                "unsupported snapshot version '{}'",
                snapshot.version
            )));
        }
        log::debug!(
            "Loaded snapshot with {} slides saved at {}",
            snapshot.slides.len(),
            snapshot.saved_at
        );
        Ok(snapshot)
    }

    /// Suggested file name for saving, e.g. `presentation-20240102-030405.json`.
    pub fn file_name(&self) -> String {
        self.file_name_with_prefix("presentation")
    }

    /// Like [`Snapshot::file_name`], with `prefix` in place of `presentation`.
    pub fn file_name_with_prefix(&self, prefix: &str) -> String {
        format!("{}-{}.json", prefix, self.saved_at.format("%Y%m%d-%H%M%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;
    use crate::slide::FieldValue;
    use chrono::TimeZone;

    fn slides() -> Vec<Slide> {
        let mut first = Slide::new(Layout::TitleSubtitle);
        first
            .set_field(FieldValue::Title("Hello".to_string()))
            .unwrap();
        first
            .set_field(FieldValue::Subtitle("World".to_string()))
            .unwrap();
        vec![first, Slide::new(Layout::TwoColumn)]
    }

    #[test]
    fn test_snapshot_shape() {
        let saved_at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let snapshot = Snapshot::at(slides(), saved_at);
        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["savedAt"], "2024-01-02T03:04:05Z");
        assert_eq!(value["slides"][0]["content"]["subtitle"], "World");
        assert_eq!(snapshot.file_name(), "presentation-20240102-030405.json");
        assert_eq!(snapshot.file_name_with_prefix("talk"), "talk-20240102-030405.json");
    }

    #[test]
    fn test_snapshot_reload() {
        let snapshot = Snapshot::new(slides());
        let loaded = Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_rejects_other_versions() {
        let json = r#"{"slides": [], "version": "2.0", "savedAt": "2024-01-02T03:04:05Z"}"#;
        assert!(matches!(Snapshot::from_json(json), Err(Error::Snapshot(_))));
        assert!(matches!(Snapshot::from_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_legacy_snapshot_is_restricted() {
        let json = r#"{
            "slides": [{"id": "x", "layout": "TITLE", "content": {"title": "T", "body": "gone"}}],
            "version": "1.0",
            "savedAt": "2024-01-02T03:04:05Z"
        }"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        let slide = &snapshot.slides[0];
        assert_eq!(slide.layout(), Layout::TitleOnly);
        assert!(slide.content().body.is_none());
        assert!(slide.content().conforms_to(Layout::TitleOnly));
    }

    #[test]
    fn test_duplicate_ids_reissued_on_load() {
        let json = r#"{
            "slides": [
                {"id": "x", "layout": "title-only", "content": {"title": "A"}},
                {"id": "x", "layout": "title-only", "content": {"title": "B"}}
            ],
            "version": "1.0",
            "savedAt": "2024-01-02T03:04:05Z"
        }"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        assert_eq!(snapshot.slides[0].id().as_str(), "x");
        assert_ne!(snapshot.slides[1].id().as_str(), "x");
        assert_eq!(snapshot.slides[1].content().title.as_deref(), Some("B"));
    }
}
