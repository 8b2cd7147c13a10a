//! Editor configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::outline::ProjectionOptions;

/// How outline subtopics are turned into slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtopicPolicy {
    /// Subtopic titles become extra bullets on the parent slide.
    #[default]
    Merge,
    /// Every subtopic gets its own slide, depth-first after its parent.
    Separate,
}

impl SubtopicPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "merge" => Some(Self::Merge),
            "separate" => Some(Self::Separate),
            _ => None,
        }
    }
}

/// Settings shared by projection, validation, and remote error handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Layout for newly projected and newly added slides.
    pub default_layout: Layout,
    pub subtopic_policy: SubtopicPolicy,
    /// Upper bound for the requested slide count.
    pub max_slides: u32,
    /// Cooldown used when a rate-limit error carries no `retryAfter`.
    pub default_retry_after_secs: u64,
    /// Give topics with an image prompt `image_layout` instead of the default.
    pub promote_image_topics: bool,
    pub image_layout: Layout,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_layout: Layout::TitleBullets,
            subtopic_policy: SubtopicPolicy::Merge,
            max_slides: 20,
            default_retry_after_secs: 30,
            promote_image_topics: false,
            image_layout: Layout::TitleBulletsImage,
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        if config.max_slides == 0 {
            return Err(Error::Config("maxSlides must be at least 1".to_string()));
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn with_default_layout(mut self, layout: Layout) -> Self {
        self.default_layout = layout;
        self
    }

    pub fn with_subtopic_policy(mut self, policy: SubtopicPolicy) -> Self {
        self.subtopic_policy = policy;
        self
    }

    pub fn with_max_slides(mut self, max: u32) -> Self {
        self.max_slides = max.max(1);
        self
    }

    pub fn with_image_layout(mut self, layout: Option<Layout>) -> Self {
        match layout {
            Some(layout) => {
                self.promote_image_topics = true;
                self.image_layout = layout;
            }
            None => self.promote_image_topics = false,
        }
        self
    }

    pub fn default_retry_after(&self) -> Duration {
        Duration::from_secs(self.default_retry_after_secs)
    }

    pub fn projection_options(&self) -> ProjectionOptions {
        ProjectionOptions {
            layout: self.default_layout,
            subtopic_policy: self.subtopic_policy,
            image_layout: self.promote_image_topics.then_some(self.image_layout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::new();
        assert_eq!(config.default_layout, Layout::TitleBullets);
        assert_eq!(config.max_slides, 20);
        assert_eq!(config.default_retry_after(), Duration::from_secs(30));
        assert!(config.projection_options().image_layout.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            EditorConfig::from_json_str(r#"{"defaultLayout": "TWO_COLUMN", "subtopicPolicy": "separate"}"#)
                .unwrap();
        assert_eq!(config.default_layout, Layout::TwoColumn);
        assert_eq!(config.subtopic_policy, SubtopicPolicy::Separate);
        assert_eq!(config.max_slides, 20);
    }

    #[test]
    fn test_rejects_zero_max_slides() {
        assert!(matches!(
            EditorConfig::from_json_str(r#"{"maxSlides": 0}"#),
            Err(Error::Config(_))
        ));
        assert!(EditorConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_builder() {
        let config = EditorConfig::new()
            .with_default_layout(Layout::TitleBody)
            .with_max_slides(0)
            .with_image_layout(Some(Layout::TitleImage));
        assert_eq!(config.max_slides, 1);
        let options = config.projection_options();
        assert_eq!(options.layout, Layout::TitleBody);
        assert_eq!(options.image_layout, Some(Layout::TitleImage));
    }

    #[test]
    fn test_subtopic_policy_names() {
        assert_eq!(SubtopicPolicy::from_name("Merge"), Some(SubtopicPolicy::Merge));
        assert_eq!(SubtopicPolicy::from_name("separate"), Some(SubtopicPolicy::Separate));
        assert_eq!(SubtopicPolicy::from_name("nested"), None);
    }
}
