//! WASM bindings for the slide model.
//!
//! Exposes layout lookups, bullet normalization, migration, outline
//! projection, reordering, and the edit dispatcher to the editor UI.

use deck_core::layout::{self, LayoutDescriptor};
use deck_core::{
    bullets, migrate, project_outline, reorder, BulletInput, EditAction,
    EditorConfig, InstructionalLevel, Layout, OutlineTopic, Presentation, Slide, SlideContent,
    Snapshot,
};
use deck_pptx::PptxWriter;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Result of applying one edit.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    /// Whether the action was applied.
    pub applied: bool,
    /// The presentation after the edit (unchanged if not applied).
    pub presentation: Presentation,
    /// Why the action was rejected.
    pub error: Option<String>,
}

fn from_js<T: for<'de> Deserialize<'de>>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Optional config argument; `undefined` or `null` means defaults.
fn config_from_js(config: JsValue) -> Result<EditorConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        Ok(EditorConfig::default())
    } else {
        from_js(config, "config")
    }
}

/// Capabilities of a layout id. Unknown ids report `title-only`.
#[wasm_bindgen]
pub fn layout_capabilities(layout_id: &str) -> Result<JsValue, JsValue> {
    to_js(&layout::get_capabilities(layout_id))
}

/// Every layout with its capabilities, in display order.
#[wasm_bindgen]
pub fn layout_catalog() -> Result<JsValue, JsValue> {
    to_js(&layout_catalog_impl())
}

fn layout_catalog_impl() -> Vec<LayoutDescriptor> {
    layout::catalog()
}

#[wasm_bindgen]
pub fn legacy_to_current(legacy_id: &str) -> String {
    layout::legacy_to_current(legacy_id).id().to_string()
}

#[wasm_bindgen]
pub fn current_to_legacy(layout_id: &str) -> String {
    layout::current_to_legacy(layout_id).to_string()
}

/// Normalize any accepted bullet shape (string array, object array, or
/// serialized markup) into `{ text }` records.
#[wasm_bindgen]
pub fn normalize_bullets(input: JsValue) -> Result<JsValue, JsValue> {
    let input: BulletInput = from_js(input, "bullets")?;
    to_js(&bullets::to_list(&input))
}

/// Serialize bullets to rich-text list markup.
#[wasm_bindgen]
pub fn serialize_bullets(input: JsValue) -> Result<String, JsValue> {
    let input: BulletInput = from_js(input, "bullets")?;
    Ok(serialize_bullets_impl(&input))
}

fn serialize_bullets_impl(input: &BulletInput) -> String {
    bullets::to_serialized(&bullets::to_list(input))
}

/// Carry content over to another layout, dropping unsupported fields.
#[wasm_bindgen]
pub fn migrate_content(content: JsValue, from: &str, to: &str) -> Result<JsValue, JsValue> {
    let content: SlideContent = from_js(content, "content")?;
    to_js(&migrate_content_impl(&content, from, to))
}

fn migrate_content_impl(content: &SlideContent, from: &str, to: &str) -> SlideContent {
    migrate(content, Layout::from_id(from), Layout::from_id(to))
}

/// Project an outline into the initial slide list.
#[wasm_bindgen]
pub fn outline_to_slides(topics: JsValue, level: JsValue, config: JsValue) -> Result<JsValue, JsValue> {
    let topics: Vec<OutlineTopic> = from_js(topics, "outline")?;
    let level: InstructionalLevel = if level.is_undefined() || level.is_null() {
        InstructionalLevel::default()
    } else {
        from_js(level, "instructional level")?
    };
    let config = config_from_js(config)?;
    to_js(&outline_to_slides_impl(&topics, level, &config))
}

fn outline_to_slides_impl(
    topics: &[OutlineTopic],
    level: InstructionalLevel,
    config: &EditorConfig,
) -> Vec<Slide> {
    project_outline(topics, level, &config.projection_options())
}

/// Move the slide at `source` to `dest`.
#[wasm_bindgen]
pub fn reorder_slides(slides: JsValue, source: usize, dest: usize) -> Result<JsValue, JsValue> {
    let slides: Vec<Slide> = from_js(slides, "slides")?;
    let reordered = reorder(&slides, source, dest).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_js(&reordered)
}

/// Apply one edit action to a presentation.
///
/// Rejected actions leave the presentation unchanged and report why, so the
/// UI can keep its current state.
#[wasm_bindgen]
pub fn dispatch(presentation: JsValue, action: JsValue, config: JsValue) -> Result<JsValue, JsValue> {
    let presentation: Presentation = from_js(presentation, "presentation")?;
    let action: EditAction = from_js(action, "action")?;
    let config = config_from_js(config)?;
    to_js(&dispatch_impl(presentation, action, config))
}

fn dispatch_impl(presentation: Presentation, action: EditAction, config: EditorConfig) -> DispatchResult {
    let current = presentation.with_config(config);

    match current.reduce(action) {
        Ok(next) => DispatchResult {
            applied: true,
            presentation: next,
            error: None,
        },
        Err(e) => DispatchResult {
            applied: false,
            presentation: current,
            error: Some(e.to_string()),
        },
    }
}

/// Save slides as a JSON snapshot string.
#[wasm_bindgen]
pub fn export_snapshot(slides: JsValue) -> Result<String, JsValue> {
    let slides: Vec<Slide> = from_js(slides, "slides")?;
    export_snapshot_impl(slides).map_err(|e| JsValue::from_str(&e))
}

fn export_snapshot_impl(slides: Vec<Slide>) -> Result<String, String> {
    Snapshot::new(slides)
        .to_json()
        .map_err(|e| format!("Snapshot export error: {}", e))
}

/// Load a JSON snapshot, restricting every slide to its layout.
#[wasm_bindgen]
pub fn import_snapshot(json: &str) -> Result<JsValue, JsValue> {
    let snapshot = Snapshot::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_js(&snapshot.slides)
}

/// Export slides as PPTX bytes. Images are drawn as placeholders.
#[wasm_bindgen]
pub fn export_pptx(slides: JsValue, title: Option<String>) -> Result<Vec<u8>, JsValue> {
    let slides: Vec<Slide> = from_js(slides, "slides")?;
    export_pptx_impl(&slides, title.as_deref()).map_err(|e| JsValue::from_str(&e))
}

fn export_pptx_impl(slides: &[Slide], title: Option<&str>) -> Result<Vec<u8>, String> {
    let mut writer = PptxWriter::new();
    if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
        writer = writer.with_title(title);
    }
    writer.to_bytes(slides).map_err(|e| format!("PPTX export error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::{BulletPoint, Field, FieldValue, SlideId};

    fn slides() -> Vec<Slide> {
        ["A", "B", "C"]
            .into_iter()
            .map(|title| {
                let mut slide = Slide::new(Layout::TitleOnly);
                slide.set_field(FieldValue::Title(title.to_string())).unwrap();
                slide
            })
            .collect()
    }

    #[test]
    fn test_layout_translation() {
        assert_eq!(legacy_to_current("TITLE_BULLETS"), "title-bullets");
        assert_eq!(legacy_to_current("NOPE"), "title-only");
        assert_eq!(current_to_legacy("image-only"), "IMAGE_ONLY");
        assert!(!layout::get_capabilities("image-only").supports_title);
        assert_eq!(layout_catalog_impl().len(), Layout::all().len());
    }

    #[test]
    fn test_serialize_bullets() {
        let input = BulletInput::List(vec![BulletPoint::from("a < b"), BulletPoint::from("  ")]);
        assert_eq!(serialize_bullets_impl(&input), "<ul><li><p>a &lt; b</p></li></ul>");
    }

    #[test]
    fn test_migrate_content() {
        let content = SlideContent {
            title: Some("T".to_string()),
            body: Some("Body".to_string()),
            ..SlideContent::default()
        };
        let migrated = migrate_content_impl(&content, "title-body", "title-bullets");
        assert_eq!(migrated.title.as_deref(), Some("T"));
        assert!(migrated.body.is_none());
        assert!(migrated.bullets.is_none());
    }

    #[test]
    fn test_outline_to_slides() {
        let mut topic = OutlineTopic::new("1", "Intro");
        topic.key_points = vec!["Hello".into()];
        let slides = outline_to_slides_impl(&[topic], InstructionalLevel::Introduction, &EditorConfig::default());
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].content().bullets.as_ref().unwrap()[0].text, "Hello");
    }

    #[test]
    fn test_dispatch_applies_and_rejects() {
        let deck = slides();
        let first = deck[0].id().clone();
        let presentation = Presentation::default().with_slides(deck);

        let result = dispatch_impl(
            presentation.clone(),
            EditAction::ClearField {
                slide_id: first.clone(),
                field: Field::Title,
            },
            EditorConfig::default(),
        );
        assert!(result.applied);
        assert!(result.presentation.slides()[0].content().title.is_none());

        let result = dispatch_impl(
            presentation,
            EditAction::DeleteSlide {
                slide_id: SlideId::from("missing"),
            },
            EditorConfig::default(),
        );
        assert!(!result.applied);
        assert!(result.error.is_some());
        assert_eq!(result.presentation.slides().len(), 3);
    }

    #[test]
    fn test_exports() {
        let json = export_snapshot_impl(slides()).unwrap();
        assert_eq!(Snapshot::from_json(&json).unwrap().slides.len(), 3);

        let bytes = export_pptx_impl(&slides(), Some("Deck")).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
