//! Layout catalog.
//!
//! The set of slide layouts is closed. Each layout carries a fixed capability
//! set naming the content fields it displays. Layouts have two spellings: the
//! current hyphenated ids (`title-bullets`) and the legacy uppercase ids
//! (`TITLE_BULLETS`) still produced by older generation responses and saved
//! files. Lookups that accept outside input coerce unknown names to
//! [`Layout::DEFAULT`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{Error, Result};

/// A slide layout from the closed layout set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    TitleOnly,
    TitleSubtitle,
    TitleBody,
    TitleBullets,
    TitleBulletsImage,
    TitleBodyImage,
    TitleImage,
    TwoColumn,
    ImageOnly,
}

/// A content field kind that a layout may or may not display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Title,
    Subtitle,
    Body,
    Bullets,
    TwoColumn,
    Image,
}

impl Field {
    /// Every field kind, in display order.
    pub const ALL: [Field; 6] = [
        Field::Title,
        Field::Subtitle,
        Field::Body,
        Field::Bullets,
        Field::TwoColumn,
        Field::Image,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Subtitle => "subtitle",
            Field::Body => "body",
            Field::Bullets => "bullets",
            Field::TwoColumn => "two-column",
            Field::Image => "image",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The content fields a layout supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub supports_title: bool,
    pub supports_subtitle: bool,
    pub supports_body: bool,
    pub supports_bullets: bool,
    pub supports_two_column: bool,
    pub supports_image: bool,
}

impl Capabilities {
    /// Whether the given field is displayed by this capability set.
    pub fn supports(&self, field: Field) -> bool {
        match field {
            Field::Title => self.supports_title,
            Field::Subtitle => self.supports_subtitle,
            Field::Body => self.supports_body,
            Field::Bullets => self.supports_bullets,
            Field::TwoColumn => self.supports_two_column,
            Field::Image => self.supports_image,
        }
    }

    /// Supported fields, in display order.
    pub fn fields(&self) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|f| self.supports(*f))
            .collect()
    }
}

/// Catalog entry: a layout id together with its capabilities.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDescriptor {
    pub id: &'static str,
    pub legacy_id: &'static str,
    #[serde(flatten)]
    pub capabilities: Capabilities,
}

impl Layout {
    /// Layout used whenever an identifier cannot be resolved.
    pub const DEFAULT: Layout = Layout::TitleOnly;

    const ALL: [Layout; 9] = [
        Layout::TitleOnly,
        Layout::TitleSubtitle,
        Layout::TitleBody,
        Layout::TitleBullets,
        Layout::TitleBulletsImage,
        Layout::TitleBodyImage,
        Layout::TitleImage,
        Layout::TwoColumn,
        Layout::ImageOnly,
    ];

    /// All layouts in catalog order.
    pub fn all() -> &'static [Layout] {
        &Self::ALL
    }

    /// Current (hyphenated) identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Layout::TitleOnly => "title-only",
            Layout::TitleSubtitle => "title-subtitle",
            Layout::TitleBody => "title-body",
            Layout::TitleBullets => "title-bullets",
            Layout::TitleBulletsImage => "title-bullets-image",
            Layout::TitleBodyImage => "title-body-image",
            Layout::TitleImage => "title-image",
            Layout::TwoColumn => "two-column",
            Layout::ImageOnly => "image-only",
        }
    }

    /// Legacy (uppercase, underscore) identifier.
    pub fn legacy_id(&self) -> &'static str {
        match self {
            Layout::TitleOnly => "TITLE",
            Layout::TitleSubtitle => "TITLE_SUBTITLE",
            Layout::TitleBody => "TITLE_BODY",
            Layout::TitleBullets => "TITLE_BULLETS",
            Layout::TitleBulletsImage => "TITLE_BULLETS_IMAGE",
            Layout::TitleBodyImage => "TITLE_BODY_IMAGE",
            Layout::TitleImage => "TITLE_IMAGE",
            Layout::TwoColumn => "TWO_COLUMN",
            Layout::ImageOnly => "IMAGE_ONLY",
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities {
            supports_title: true,
            ..Capabilities::default()
        };
        match self {
            Layout::TitleOnly => {}
            Layout::TitleSubtitle => caps.supports_subtitle = true,
            Layout::TitleBody => caps.supports_body = true,
            Layout::TitleBullets => caps.supports_bullets = true,
            Layout::TitleBulletsImage => {
                caps.supports_bullets = true;
                caps.supports_image = true;
            }
            Layout::TitleBodyImage => {
                caps.supports_body = true;
                caps.supports_image = true;
            }
            Layout::TitleImage => caps.supports_image = true,
            Layout::TwoColumn => caps.supports_two_column = true,
            Layout::ImageOnly => {
                caps.supports_title = false;
                caps.supports_image = true;
            }
        }
        caps
    }

    pub fn supports(&self, field: Field) -> bool {
        self.capabilities().supports(field)
    }

    pub fn descriptor(&self) -> LayoutDescriptor {
        LayoutDescriptor {
            id: self.id(),
            legacy_id: self.legacy_id(),
            capabilities: self.capabilities(),
        }
    }

    /// Strict lookup by current id.
    pub fn parse(id: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|l| l.id() == id)
            .ok_or_else(|| Error::UnknownLayout(id.to_string()))
    }

    /// Resolve an identifier in either naming scheme, ignoring case and
    /// treating `_` and `-` alike. Returns `None` when nothing matches.
    pub fn lookup(id: &str) -> Option<Self> {
        let key = id.trim().to_ascii_lowercase().replace('_', "-");
        if key == "title" {
            return Some(Layout::TitleOnly);
        }
        Self::ALL.iter().copied().find(|l| {
            l.id() == key || l.legacy_id().to_ascii_lowercase().replace('_', "-") == key
        })
    }

    /// Coercing lookup: unknown identifiers resolve to [`Layout::DEFAULT`].
    pub fn from_id(id: &str) -> Self {
        Self::lookup(id).unwrap_or_else(|| {
            log::warn!(
                "Unknown layout '{}', falling back to '{}'",
                id,
                Self::DEFAULT.id()
            );
            Self::DEFAULT
        })
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for Layout {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for Layout {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Layout::from_id(&raw))
    }
}

/// Capability set for a current layout id.
pub fn get_capabilities(layout_id: &str) -> Capabilities {
    Layout::from_id(layout_id).capabilities()
}

/// Translate a legacy layout name into the current layout.
pub fn legacy_to_current(legacy: &str) -> Layout {
    Layout::from_id(legacy)
}

/// Translate a current layout id into its legacy name.
pub fn current_to_legacy(id: &str) -> &'static str {
    Layout::from_id(id).legacy_id()
}

/// Every catalog entry, for UI layout pickers.
pub fn catalog() -> Vec<LayoutDescriptor> {
    Layout::all().iter().map(Layout::descriptor).collect()
}
