//! Slide entity model.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use crate::bullets::{self, Bullet, BulletInput};
use crate::error::{Error, Result};
use crate::layout::{Field, Layout};
use crate::migrate;
use crate::outline::OutlineTopic;

/// Regex for `#RGB` and `#RRGGBB` colors, with or without the leading `#`.
static COLOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());

/// Opaque, stable slide identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideId(String);

impl SlideId {
    /// A fresh identifier that has never been handed out before.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SlideId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SlideId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Image providers a slide image can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageService {
    Openai,
    Stability,
    Unsplash,
    Upload,
}

/// Image attached to a slide.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideImage {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ImageService>,
}

impl SlideImage {
    /// Image waiting to be generated from a prompt.
    pub fn placeholder(prompt: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            url: String::new(),
            alt: alt.into(),
            prompt: Some(prompt.into()),
            service: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.url.is_empty()
    }
}

/// Structured slide content. Only the fields supported by the slide's
/// layout are ever present.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_bullets",
        deserialize_with = "deserialize_bullets"
    )]
    pub bullets: Option<Vec<Bullet>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<SlideImage>,
}

impl SlideContent {
    /// Whether a value is present for the field.
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::Title => self.title.is_some(),
            Field::Subtitle => self.subtitle.is_some(),
            Field::Body => self.body.is_some(),
            Field::Bullets => self.bullets.is_some(),
            Field::TwoColumn => self.left_column.is_some() || self.right_column.is_some(),
            Field::Image => self.image.is_some(),
        }
    }

    /// Fields with a value present.
    pub fn present_fields(&self) -> Vec<Field> {
        Field::ALL.iter().copied().filter(|f| self.has(*f)).collect()
    }

    /// Present fields the layout does not support.
    pub fn violations(&self, layout: Layout) -> Vec<Field> {
        let caps = layout.capabilities();
        self.present_fields()
            .into_iter()
            .filter(|f| !caps.supports(*f))
            .collect()
    }

    pub fn conforms_to(&self, layout: Layout) -> bool {
        self.violations(layout).is_empty()
    }

    /// Remove the field's value.
    pub fn clear(&mut self, field: Field) {
        match field {
            Field::Title => self.title = None,
            Field::Subtitle => self.subtitle = None,
            Field::Body => self.body = None,
            Field::Bullets => self.bullets = None,
            Field::TwoColumn => {
                self.left_column = None;
                self.right_column = None;
            }
            Field::Image => self.image = None,
        }
    }

    /// Bullets serialized as list markup for the rich-text editor. An absent
    /// field gives `None`, an empty list gives `<ul></ul>`.
    pub fn bullets_markup(&self) -> Option<String> {
        self.bullets.as_deref().map(bullets::to_serialized)
    }
}

fn serialize_bullets<S>(
    value: &Option<Vec<Bullet>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let texts: Option<Vec<&str>> = value
        .as_ref()
        .map(|list| list.iter().map(|b| b.text.as_str()).collect());
    texts.serialize(serializer)
}

fn deserialize_bullets<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<Bullet>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let input = Option::<BulletInput>::deserialize(deserializer)?;
    Ok(input.map(|i| i.to_list()))
}

/// A single-field edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FieldValue {
    Title(String),
    Subtitle(String),
    Body(String),
    Bullets(BulletInput),
    TwoColumn { left: String, right: String },
    Image(SlideImage),
}

impl FieldValue {
    pub fn field(&self) -> Field {
        match self {
            FieldValue::Title(_) => Field::Title,
            FieldValue::Subtitle(_) => Field::Subtitle,
            FieldValue::Body(_) => Field::Body,
            FieldValue::Bullets(_) => Field::Bullets,
            FieldValue::TwoColumn { .. } => Field::TwoColumn,
            FieldValue::Image(_) => Field::Image,
        }
    }
}

/// One presentation page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SlideRecord")]
pub struct Slide {
    id: SlideId,
    layout: Layout,
    content: SlideContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    font_color: Option<String>,
}

/// Deserialization shape for [`Slide`]: content from outside is restricted
/// to the layout before it becomes a slide.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlideRecord {
    #[serde(default = "SlideId::generate")]
    id: SlideId,
    #[serde(default)]
    layout: Layout,
    #[serde(default)]
    content: SlideContent,
    #[serde(default)]
    background_color: Option<String>,
    #[serde(default)]
    font_color: Option<String>,
}

impl From<SlideRecord> for Slide {
    fn from(record: SlideRecord) -> Self {
        let mut slide = Slide::with_content(record.layout, record.content);
        slide.id = record.id;
        slide.background_color = record.background_color.and_then(|c| normalize_color(&c).ok());
        slide.font_color = record.font_color.and_then(|c| normalize_color(&c).ok());
        slide
    }
}

impl Slide {
    /// An empty slide with a fresh id.
    pub fn new(layout: Layout) -> Self {
        Self {
            id: SlideId::generate(),
            layout,
            content: SlideContent::default(),
            background_color: None,
            font_color: None,
        }
    }

    /// A slide with the given content, restricted to what the layout shows.
    pub fn with_content(layout: Layout, content: SlideContent) -> Self {
        let mut slide = Self::new(layout);
        slide.content = migrate::restrict(&content, layout);
        slide
    }

    /// Build a slide from an outline topic.
    ///
    /// `title` maps to the title, `key_points` to bullets, `image_prompt` to
    /// an image placeholder, and `description` to the body (or subtitle).
    /// Fields the layout cannot show are left out.
    pub fn from_outline_topic(topic: &OutlineTopic, layout: Layout) -> Self {
        let description = Some(topic.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        let content = SlideContent {
            title: Some(topic.title.clone()),
            subtitle: description.clone().filter(|_| !layout.supports(Field::Body)),
            body: description,
            bullets: Some(bullets::from_points(&topic.key_points)),
            image: topic
                .image_prompt
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .map(|p| SlideImage::placeholder(p, topic.title.clone())),
            ..SlideContent::default()
        };
        Self::with_content(layout, content)
    }

    /// Deep copy with a fresh id.
    pub fn duplicate(&self) -> Self {
        Self {
            id: SlideId::generate(),
            ..self.clone()
        }
    }

    pub fn id(&self) -> &SlideId {
        &self.id
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn content(&self) -> &SlideContent {
        &self.content
    }

    pub fn background_color(&self) -> Option<&str> {
        self.background_color.as_deref()
    }

    pub fn font_color(&self) -> Option<&str> {
        self.font_color.as_deref()
    }

    /// Switch layout, dropping content the new layout cannot show.
    pub fn change_layout(&mut self, layout: Layout) {
        self.content = migrate::migrate(&self.content, self.layout, layout);
        self.layout = layout;
    }

    /// Write one content field. Fails if the layout does not display it.
    pub fn set_field(&mut self, value: FieldValue) -> Result<()> {
        let field = value.field();
        if !self.layout.supports(field) {
            return Err(Error::UnsupportedField {
                field: field.to_string(),
                layout: self.layout.to_string(),
            });
        }
        match value {
            FieldValue::Title(text) => self.content.title = Some(text),
            FieldValue::Subtitle(text) => self.content.subtitle = Some(text),
            FieldValue::Body(text) => self.content.body = Some(text),
            FieldValue::Bullets(input) => self.content.bullets = Some(input.to_list()),
            FieldValue::TwoColumn { left, right } => {
                self.content.left_column = Some(left);
                self.content.right_column = Some(right);
            }
            FieldValue::Image(image) => self.content.image = Some(image),
        }
        Ok(())
    }

    pub fn clear_field(&mut self, field: Field) {
        self.content.clear(field);
    }

    /// Set or clear the style overrides. Colors are stored as `#RRGGBB`.
    pub fn set_style(
        &mut self,
        background_color: Option<&str>,
        font_color: Option<&str>,
    ) -> Result<()> {
        let background_color = background_color.map(normalize_color).transpose()?;
        let font_color = font_color.map(normalize_color).transpose()?;
        self.background_color = background_color;
        self.font_color = font_color;
        Ok(())
    }

    /// Plain text of the slide, for search and logging.
    pub fn summary(&self) -> String {
        self.content
            .title
            .clone()
            .or_else(|| self.content.image.as_ref().map(|i| i.alt.clone()))
            .unwrap_or_default()
    }
}

/// Give every slide whose id repeats an earlier one a fresh id. Returns how
/// many ids were re-issued.
pub fn reissue_duplicate_ids(slides: &mut [Slide]) -> usize {
    let mut seen = HashSet::new();
    let mut reissued = 0;
    for slide in slides.iter_mut() {
        if seen.insert(slide.id.clone()) {
            continue;
        }
        let fresh = SlideId::generate();
        log::warn!("Duplicate slide id '{}' re-issued as '{}'", slide.id, fresh);
        slide.id = fresh;
        seen.insert(slide.id.clone());
        reissued += 1;
    }
    reissued
}

/// Deserialize a slide list with unique ids.
pub(crate) fn deserialize_unique<'de, D>(deserializer: D) -> std::result::Result<Vec<Slide>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut slides = Vec::<Slide>::deserialize(deserializer)?;
    reissue_duplicate_ids(&mut slides);
    Ok(slides)
}

/// Normalize `#abc` / `aabbcc` style colors into `#AABBCC`.
pub fn normalize_color(raw: &str) -> Result<String> {
    let caps = COLOR_REGEX
        .captures(raw.trim())
        .ok_or_else(|| Error::InvalidColor(raw.to_string()))?;
    let hex = &caps[1];
    let full: String = if hex.len() == 3 {
        hex.chars().flat_map(|c| [c, c]).collect()
    } else {
        hex.to_string()
    };
    Ok(format!("#{}", full.to_ascii_uppercase()))
}
