//! Presentation aggregate and edit dispatcher.
//!
//! A [`Presentation`] owns the outline and the slide list. Every edit is an
//! [`EditAction`]; [`Presentation::reduce`] applies one without touching the
//! current value, and [`Presentation::dispatch`] commits it or leaves the
//! presentation as it was.

use serde::{Deserialize, Serialize};

use crate::bullets::BulletInput;
use crate::config::EditorConfig;
use crate::error::{Error, Result};
use crate::layout::{Field, Layout};
use crate::outline::{self, OutlineTopic};
use crate::remote::{GeneratedSlide, ImageResult, InstructionalLevel};
use crate::reorder;
use crate::slide::{self, FieldValue, Slide, SlideId, SlideImage};

/// Actions accepted by [`Presentation::reduce`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditAction {
    /// Replace the outline with a freshly generated one.
    SetOutline { topics: Vec<OutlineTopic> },
    AddPoint { topic_id: String, text: String },
    EditPoint { topic_id: String, index: usize, text: String },
    DeletePoint { topic_id: String, index: usize },
    EditTopicTitle { topic_id: String, title: String },
    RemoveTopic { topic_id: String },
    /// Build the slide list from the current outline.
    ProjectOutline { level: InstructionalLevel },
    /// Replace the slide list with the output of slide generation.
    ApplyGeneratedSlides { slides: Vec<GeneratedSlide> },
    /// Insert an empty slide after `after`, or at the end.
    AddSlide { layout: Layout, after: Option<SlideId> },
    DuplicateSlide { slide_id: SlideId },
    DeleteSlide { slide_id: SlideId },
    ChangeLayout { slide_id: SlideId, layout: Layout },
    SetField { slide_id: SlideId, value: FieldValue },
    ClearField { slide_id: SlideId, field: Field },
    /// Bullets edited in the rich-text editor.
    EditBullets { slide_id: SlideId, bullets: BulletInput },
    SetImage { slide_id: SlideId, image: ImageResult },
    SetStyle {
        slide_id: SlideId,
        background_color: Option<String>,
        font_color: Option<String>,
    },
    Reorder { source: usize, dest: usize },
    ApplyOrder { order: Vec<SlideId> },
    Clear,
}

/// Outline plus slide list for one editing session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    #[serde(default)]
    pub outline: Vec<OutlineTopic>,
    #[serde(default, deserialize_with = "slide::deserialize_unique")]
    slides: Vec<Slide>,
    #[serde(default)]
    pub instructional_level: InstructionalLevel,
    #[serde(skip)]
    config: EditorConfig,
}

impl Presentation {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Replace the configuration, e.g. after deserializing a saved session.
    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the slide list. Repeated ids are re-issued.
    pub fn with_slides(mut self, mut slides: Vec<Slide>) -> Self {
        slide::reissue_duplicate_ids(&mut slides);
        self.slides = slides;
        self
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn into_slides(self) -> Vec<Slide> {
        self.slides
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn slide(&self, id: &SlideId) -> Option<&Slide> {
        self.slides.iter().find(|s| s.id() == id)
    }

    fn position(&self, id: &SlideId) -> Result<usize> {
        self.slides
            .iter()
            .position(|s| s.id() == id)
            .ok_or_else(|| Error::UnknownSlide(id.to_string()))
    }

    fn edit_slide<F>(&mut self, id: &SlideId, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Slide) -> Result<()>,
    {
        let index = self.position(id)?;
        edit(&mut self.slides[index])
    }

    /// Apply an action to a copy of this presentation.
    pub fn reduce(&self, action: EditAction) -> Result<Presentation> {
        let mut next = self.clone();
        next.apply(action)?;
        Ok(next)
    }

    /// Apply an action in place. On failure the presentation is unchanged,
    /// the error is logged, and `false` is returned.
    pub fn dispatch(&mut self, action: EditAction) -> bool {
        match self.reduce(action) {
            Ok(next) => {
                *self = next;
                true
            }
            Err(e) => {
                log::warn!("Ignoring edit: {}", e);
                false
            }
        }
    }

    fn apply(&mut self, action: EditAction) -> Result<()> {
        match action {
            EditAction::SetOutline { topics } => {
                self.outline = topics;
            }
            EditAction::AddPoint { topic_id, text } => {
                outline::edit_topic(&mut self.outline, &topic_id, |t| {
                    t.add_point(&text);
                    Ok(())
                })?;
            }
            EditAction::EditPoint {
                topic_id,
                index,
                text,
            } => {
                outline::edit_topic(&mut self.outline, &topic_id, |t| t.edit_point(index, &text))?;
            }
            EditAction::DeletePoint { topic_id, index } => {
                outline::edit_topic(&mut self.outline, &topic_id, |t| t.delete_point(index))?;
            }
            EditAction::EditTopicTitle { topic_id, title } => {
                outline::edit_topic(&mut self.outline, &topic_id, |t| {
                    t.title = title;
                    Ok(())
                })?;
            }
            EditAction::RemoveTopic { topic_id } => {
                outline::remove_topic(&mut self.outline, &topic_id)?;
            }
            EditAction::ProjectOutline { level } => {
                self.instructional_level = level;
                self.slides = outline::project_outline(
                    &self.outline,
                    level,
                    &self.config.projection_options(),
                );
            }
            EditAction::ApplyGeneratedSlides { slides } => {
                let layout = self.config.default_layout;
                self.slides = slides.into_iter().map(|s| s.into_slide(layout)).collect();
            }
            EditAction::AddSlide { layout, after } => {
                let index = match after {
                    Some(id) => self.position(&id)? + 1,
                    None => self.slides.len(),
                };
                self.slides.insert(index, Slide::new(layout));
            }
            EditAction::DuplicateSlide { slide_id } => {
                let index = self.position(&slide_id)?;
                let copy = self.slides[index].duplicate();
                self.slides.insert(index + 1, copy);
            }
            EditAction::DeleteSlide { slide_id } => {
                let index = self.position(&slide_id)?;
                self.slides.remove(index);
            }
            EditAction::ChangeLayout { slide_id, layout } => {
                self.edit_slide(&slide_id, |s| {
                    s.change_layout(layout);
                    Ok(())
                })?;
            }
            EditAction::SetField { slide_id, value } => {
                self.edit_slide(&slide_id, |s| s.set_field(value))?;
            }
            EditAction::ClearField { slide_id, field } => {
                self.edit_slide(&slide_id, |s| {
                    s.clear_field(field);
                    Ok(())
                })?;
            }
            EditAction::EditBullets { slide_id, bullets } => {
                self.edit_slide(&slide_id, |s| s.set_field(FieldValue::Bullets(bullets)))?;
            }
            EditAction::SetImage { slide_id, image } => {
                self.edit_slide(&slide_id, |s| {
                    s.set_field(FieldValue::Image(SlideImage::from(image)))
                })?;
            }
            EditAction::SetStyle {
                slide_id,
                background_color,
                font_color,
            } => {
                self.edit_slide(&slide_id, |s| {
                    s.set_style(background_color.as_deref(), font_color.as_deref())
                })?;
            }
            EditAction::Reorder { source, dest } => {
                self.slides = reorder::reorder(&self.slides, source, dest)?;
            }
            EditAction::ApplyOrder { order } => {
                self.slides = reorder::apply_order(&self.slides, &order)?;
            }
            EditAction::Clear => {
                self.outline.clear();
                self.slides.clear();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bullets::Bullet;
    use crate::slide::ImageService;

    fn outline() -> Vec<OutlineTopic> {
        let mut first = OutlineTopic::new("1", "Rivers");
        first.key_points = vec!["Source".into(), "Mouth".into()];
        first.image_prompt = Some("a river delta".to_string());
        let second = OutlineTopic::new("2", "Lakes");
        vec![first, second]
    }

    fn projected() -> Presentation {
        let mut presentation = Presentation::new(EditorConfig::default());
        assert!(presentation.dispatch(EditAction::SetOutline { topics: outline() }));
        assert!(presentation.dispatch(EditAction::ProjectOutline {
            level: InstructionalLevel::Advanced
        }));
        presentation
    }

    #[test]
    fn test_project_from_outline() {
        let presentation = projected();
        assert_eq!(presentation.slides().len(), 2);
        assert_eq!(presentation.instructional_level, InstructionalLevel::Advanced);
        assert_eq!(presentation.slides()[0].layout(), Layout::TitleBullets);
    }

    #[test]
    fn test_outline_edits_then_project() {
        let mut presentation = Presentation::new(EditorConfig::default());
        presentation.dispatch(EditAction::SetOutline { topics: outline() });
        assert!(presentation.dispatch(EditAction::AddPoint {
            topic_id: "2".to_string(),
            text: "Freshwater".to_string(),
        }));
        assert!(presentation.dispatch(EditAction::EditPoint {
            topic_id: "1".to_string(),
            index: 1,
            text: "Estuary".to_string(),
        }));
        assert!(presentation.dispatch(EditAction::DeletePoint {
            topic_id: "1".to_string(),
            index: 0,
        }));
        presentation.dispatch(EditAction::ProjectOutline {
            level: InstructionalLevel::Introduction,
        });
        assert_eq!(
            presentation.slides()[0].content().bullets,
            Some(vec![Bullet::new("Estuary")])
        );
        assert_eq!(
            presentation.slides()[1].content().bullets,
            Some(vec![Bullet::new("Freshwater")])
        );
    }

    #[test]
    fn test_reduce_is_pure() {
        let presentation = projected();
        let next = presentation
            .reduce(EditAction::Reorder { source: 0, dest: 1 })
            .unwrap();
        assert_eq!(next.slides()[1].id(), presentation.slides()[0].id());
        assert_ne!(next.slides()[0].id(), presentation.slides()[0].id());
    }

    #[test]
    fn test_failed_dispatch_is_a_no_op() {
        let mut presentation = projected();
        let before = presentation.clone();
        assert!(!presentation.dispatch(EditAction::Reorder { source: 5, dest: 0 }));
        assert!(!presentation.dispatch(EditAction::DeleteSlide {
            slide_id: SlideId::from("missing"),
        }));
        let id = presentation.slides()[0].id().clone();
        assert!(!presentation.dispatch(EditAction::SetField {
            slide_id: id,
            value: FieldValue::Body("not shown".to_string()),
        }));
        assert_eq!(presentation, before);
    }

    #[test]
    fn test_change_layout_and_set_image() {
        let mut presentation = projected();
        let id = presentation.slides()[0].id().clone();
        presentation.dispatch(EditAction::ChangeLayout {
            slide_id: id.clone(),
            layout: Layout::TitleBulletsImage,
        });
        assert!(presentation.dispatch(EditAction::SetImage {
            slide_id: id.clone(),
            image: ImageResult {
                url: "https://img/delta.png".to_string(),
                alt: "delta".to_string(),
                prompt: Some("a river delta".to_string()),
                service: ImageService::Openai,
            },
        }));
        presentation.dispatch(EditAction::ChangeLayout {
            slide_id: id.clone(),
            layout: Layout::TitleImage,
        });
        let slide = presentation.slide(&id).unwrap();
        assert!(slide.content().bullets.is_none());
        assert_eq!(
            slide.content().image.as_ref().unwrap().url,
            "https://img/delta.png"
        );
    }

    #[test]
    fn test_edit_bullets_from_markup() {
        let mut presentation = projected();
        let id = presentation.slides()[0].id().clone();
        assert!(presentation.dispatch(EditAction::EditBullets {
            slide_id: id.clone(),
            bullets: BulletInput::from("<ul><li><p>Headwaters</p></li></ul>"),
        }));
        assert_eq!(
            presentation.slide(&id).unwrap().content().bullets,
            Some(vec![Bullet::new("Headwaters")])
        );
    }

    #[test]
    fn test_add_duplicate_delete() {
        let mut presentation = projected();
        let first = presentation.slides()[0].id().clone();
        presentation.dispatch(EditAction::AddSlide {
            layout: Layout::TwoColumn,
            after: Some(first.clone()),
        });
        assert_eq!(presentation.slides()[1].layout(), Layout::TwoColumn);

        presentation.dispatch(EditAction::DuplicateSlide {
            slide_id: first.clone(),
        });
        assert_eq!(presentation.slides().len(), 4);
        assert_eq!(
            presentation.slides()[1].content(),
            presentation.slides()[0].content()
        );

        presentation.dispatch(EditAction::DeleteSlide { slide_id: first });
        assert_eq!(presentation.slides().len(), 3);
    }

    #[test]
    fn test_style_and_clear() {
        let mut presentation = projected();
        let id = presentation.slides()[1].id().clone();
        assert!(presentation.dispatch(EditAction::SetStyle {
            slide_id: id.clone(),
            background_color: Some("#123456".to_string()),
            font_color: None,
        }));
        assert_eq!(
            presentation.slide(&id).unwrap().background_color(),
            Some("#123456")
        );
        presentation.dispatch(EditAction::Clear);
        assert!(presentation.slides().is_empty());
        assert!(presentation.outline.is_empty());
    }

    #[test]
    fn test_apply_order_action() {
        let mut presentation = projected();
        let order: Vec<SlideId> = presentation
            .slides()
            .iter()
            .rev()
            .map(|s| s.id().clone())
            .collect();
        assert!(presentation.dispatch(EditAction::ApplyOrder {
            order: order.clone()
        }));
        let ids: Vec<SlideId> = presentation.slides().iter().map(|s| s.id().clone()).collect();
        assert_eq!(ids, order);
    }

    #[test]
    fn test_action_json() {
        let action: EditAction = serde_json::from_str(
            r#"{"type": "changeLayout", "slideId": "abc", "layout": "TITLE_IMAGE"}"#,
        )
        .unwrap();
        assert_eq!(
            action,
            EditAction::ChangeLayout {
                slide_id: SlideId::from("abc"),
                layout: Layout::TitleImage,
            }
        );
    }

    #[test]
    fn test_loaded_duplicate_ids_stay_addressable() {
        let json = r#"{"slides": [
            {"id": "x", "layout": "title-only", "content": {"title": "First"}},
            {"id": "x", "layout": "title-only", "content": {"title": "Second"}}
        ]}"#;
        let mut presentation: Presentation = serde_json::from_str(json).unwrap();
        let first = presentation.slides()[0].id().clone();
        let second = presentation.slides()[1].id().clone();
        assert_eq!(first, SlideId::from("x"));
        assert_ne!(first, second);

        assert!(presentation.dispatch(EditAction::ApplyOrder {
            order: vec![second.clone(), first]
        }));
        assert!(presentation.dispatch(EditAction::DeleteSlide { slide_id: second }));
        assert_eq!(presentation.slides()[0].content().title.as_deref(), Some("First"));

        let repeated = Slide::new(Layout::TitleOnly);
        let presentation = Presentation::default().with_slides(vec![repeated.clone(), repeated]);
        assert_ne!(presentation.slides()[0].id(), presentation.slides()[1].id());
    }
}
