//! Request and response contracts for the generation backend.
//!
//! The core never performs I/O. These types describe what the UI layer
//! sends and receives, validate requests before they leave, and classify
//! failures so the UI can react (cooldown, messages).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use crate::bullets::BulletInput;
use crate::config::EditorConfig;
use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::outline::OutlineTopic;
use crate::slide::{ImageService, Slide, SlideContent, SlideImage};

/// Audience level for generated content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionalLevel {
    #[default]
    Introduction,
    Intermediate,
    Advanced,
}

impl fmt::Display for InstructionalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InstructionalLevel::Introduction => "introduction",
            InstructionalLevel::Intermediate => "intermediate",
            InstructionalLevel::Advanced => "advanced",
        })
    }
}

/// A request field that failed validation, with a message to show next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Outline generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineRequest {
    pub topic: String,
    pub num_slides: u32,
    #[serde(default)]
    pub instructional_level: InstructionalLevel,
}

impl OutlineRequest {
    /// Per-field validation problems; empty when the request may be sent.
    pub fn validation_errors(&self, config: &EditorConfig) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.topic.trim().is_empty() {
            errors.push(ValidationError::new("topic", "Please enter a topic"));
        }
        if self.num_slides < 1 || self.num_slides > config.max_slides {
            errors.push(ValidationError::new(
                "numSlides",
                format!("Number of slides must be between 1 and {}", config.max_slides),
            ));
        }
        errors
    }

    pub fn validate(&self, config: &EditorConfig) -> Result<()> {
        let errors = self.validation_errors(config);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}

/// Discriminator of a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteErrorKind {
    RateLimit,
    QuotaExceeded,
    SafetyViolation,
    InvalidRequest,
    ApiError,
    NetworkError,
}

/// Error payload returned by the generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteError {
    #[serde(rename = "type")]
    pub kind: RemoteErrorKind,
    #[serde(default)]
    pub message: String,
    /// Seconds to wait before retrying.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<RemoteErrorContext>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteErrorContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl RemoteError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::NetworkError,
            message: message.into(),
            retry_after: None,
            context: None,
        }
    }

    /// Message to surface to the user.
    pub fn user_message(&self) -> String {
        match self.kind {
            RemoteErrorKind::RateLimit => match self.retry_after {
                Some(secs) => format!(
                    "Too many requests. Please wait {} seconds before trying again.",
                    secs.min(MAX_COOLDOWN.as_secs())
                ),
                None => "Too many requests. Please wait a moment before trying again.".to_string(),
            },
            RemoteErrorKind::SafetyViolation => {
                match self.context.as_ref().and_then(|c| c.topic.as_deref()) {
                    Some(topic) => format!(
                        "The topic \"{}\" was flagged by the content safety filter. Please try a different topic.",
                        topic
                    ),
                    None => "The request was flagged by the content safety filter. Please try a different topic.".to_string(),
                }
            }
            _ => "Something went wrong while generating. Please try again.".to_string(),
        }
    }

    /// Cooldown to apply, if this error blocks resubmission.
    pub fn cooldown(&self, config: &EditorConfig, now: Instant) -> Option<Cooldown> {
        if self.kind != RemoteErrorKind::RateLimit {
            return None;
        }
        let wait = self
            .retry_after
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.default_retry_after());
        Some(Cooldown::starting_at(now, wait))
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Longest cooldown honored, whatever `retryAfter` asks for.
pub const MAX_COOLDOWN: Duration = Duration::from_secs(60 * 60);

/// Window during which resubmission is disabled after a rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldown {
    until: Instant,
}

impl Cooldown {
    /// A cooldown of `wait`, capped at [`MAX_COOLDOWN`].
    pub fn starting_at(now: Instant, wait: Duration) -> Self {
        let wait = wait.min(MAX_COOLDOWN);
        let until = now.checked_add(wait).unwrap_or(now);
        Self { until }
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.until.saturating_duration_since(now)
    }

    pub fn is_active(&self, now: Instant) -> bool {
        !self.remaining(now).is_zero()
    }

    /// Whole seconds left, rounded up, for a countdown label.
    pub fn remaining_secs(&self, now: Instant) -> u64 {
        let remaining = self.remaining(now);
        remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
    }
}

/// Outline generation response: either topics or an error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutlineResponse {
    Outline { topics: Vec<OutlineTopic> },
    Failure(RemoteError),
}

impl OutlineResponse {
    pub fn into_result(self) -> std::result::Result<Vec<OutlineTopic>, RemoteError> {
        match self {
            OutlineResponse::Outline { topics } => Ok(topics),
            OutlineResponse::Failure(error) => Err(error),
        }
    }
}

/// Slide generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideGenerationRequest {
    pub topics: Vec<OutlineTopic>,
    pub instructional_level: InstructionalLevel,
}

/// Slide content as produced by the generation backend. The layout may use
/// either naming scheme and bullets may take any accepted shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSlide {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullets: Option<BulletInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<SlideImage>,
}

impl GeneratedSlide {
    /// Build a conforming slide. Missing layouts use `default_layout`;
    /// unknown ones coerce to the base layout.
    pub fn into_slide(self, default_layout: Layout) -> Slide {
        let layout = self
            .layout
            .as_deref()
            .map(Layout::from_id)
            .unwrap_or(default_layout);
        let content = SlideContent {
            title: self.title,
            subtitle: self.subtitle,
            body: self.body,
            bullets: self.bullets.map(|b| b.to_list()),
            left_column: self.left_column,
            right_column: self.right_column,
            image: self.image,
        };
        Slide::with_content(layout, content)
    }
}

/// Slide generation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlideGenerationResponse {
    Slides { slides: Vec<GeneratedSlide> },
    Failure(RemoteError),
}

impl SlideGenerationResponse {
    pub fn into_result(self) -> std::result::Result<Vec<GeneratedSlide>, RemoteError> {
        match self {
            SlideGenerationResponse::Slides { slides } => Ok(slides),
            SlideGenerationResponse::Failure(error) => Err(error),
        }
    }
}

/// Result of an image generation or upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    pub url: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub prompt: Option<String>,
    pub service: ImageService,
}

impl From<ImageResult> for SlideImage {
    fn from(result: ImageResult) -> Self {
        SlideImage {
            url: result.url,
            alt: result.alt,
            prompt: result.prompt,
            service: Some(result.service),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(topic: &str, num_slides: u32) -> OutlineRequest {
        OutlineRequest {
            topic: topic.to_string(),
            num_slides,
            instructional_level: InstructionalLevel::Intermediate,
        }
    }

    #[test]
    fn test_validate_request() {
        let config = EditorConfig::default();
        assert!(request("Volcanoes", 5).validate(&config).is_ok());
        assert!(request("Volcanoes", 20).validate(&config).is_ok());

        let errors = request("  ", 0).validation_errors(&config);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["topic", "numSlides"]);

        assert!(matches!(
            request("Volcanoes", 21).validate(&config),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_parse_outline_response() {
        let json = r#"{"topics": [{"id": "1", "title": "Intro", "key_points": ["a"]}]}"#;
        let response: OutlineResponse = serde_json::from_str(json).unwrap();
        let topics = response.into_result().unwrap();
        assert_eq!(topics[0].title, "Intro");
    }

    #[test]
    fn test_parse_error_response() {
        let json = r#"{"type": "RATE_LIMIT", "message": "slow down", "retryAfter": 12}"#;
        let response: OutlineResponse = serde_json::from_str(json).unwrap();
        let error = response.into_result().unwrap_err();
        assert_eq!(error.kind, RemoteErrorKind::RateLimit);
        assert_eq!(error.retry_after, Some(12));
        assert!(error.user_message().contains("12 seconds"));
    }

    #[test]
    fn test_safety_message_names_topic() {
        let json = r#"{"type": "SAFETY_VIOLATION", "message": "blocked", "context": {"topic": "Bad idea"}}"#;
        let error: RemoteError = serde_json::from_str(json).unwrap();
        assert!(error.user_message().contains("\"Bad idea\""));
        assert!(error.cooldown(&EditorConfig::default(), Instant::now()).is_none());
    }

    #[test]
    fn test_generic_message() {
        let error = RemoteError::network("offline");
        assert_eq!(
            error.user_message(),
            "Something went wrong while generating. Please try again."
        );
    }

    #[test]
    fn test_cooldown_from_retry_after() {
        let now = Instant::now();
        let error = RemoteError {
            kind: RemoteErrorKind::RateLimit,
            message: String::new(),
            retry_after: Some(10),
            context: None,
        };
        let cooldown = error.cooldown(&EditorConfig::default(), now).unwrap();
        assert!(cooldown.is_active(now));
        assert_eq!(cooldown.remaining_secs(now), 10);
        assert_eq!(cooldown.remaining_secs(now + Duration::from_millis(9500)), 1);
        assert!(!cooldown.is_active(now + Duration::from_secs(10)));
    }

    #[test]
    fn test_huge_retry_after_is_capped() {
        let now = Instant::now();
        let error: RemoteError =
            serde_json::from_str(r#"{"type": "RATE_LIMIT", "retryAfter": 18446744073709551615}"#).unwrap();
        let cooldown = error.cooldown(&EditorConfig::default(), now).unwrap();
        assert!(cooldown.is_active(now));
        assert_eq!(cooldown.remaining(now), MAX_COOLDOWN);
        assert!(error.user_message().contains("3600 seconds"));
    }

    #[test]
    fn test_other_kinds_use_generic_message() {
        for kind in ["QUOTA_EXCEEDED", "INVALID_REQUEST", "API_ERROR"] {
            let json = format!(r#"{{"type": "{}", "message": "upstream detail"}}"#, kind);
            let error: RemoteError = serde_json::from_str(&json).unwrap();
            assert_eq!(
                error.user_message(),
                "Something went wrong while generating. Please try again."
            );
            assert!(error.cooldown(&EditorConfig::default(), Instant::now()).is_none());
        }
        let error: RemoteError = serde_json::from_str(r#"{"type": "QUOTA_EXCEEDED"}"#).unwrap();
        assert_eq!(error.kind, RemoteErrorKind::QuotaExceeded);
    }

    #[test]
    fn test_cooldown_default_wait() {
        let now = Instant::now();
        let error = RemoteError {
            kind: RemoteErrorKind::RateLimit,
            message: String::new(),
            retry_after: None,
            context: None,
        };
        let cooldown = error.cooldown(&EditorConfig::default(), now).unwrap();
        assert_eq!(cooldown.remaining(now), Duration::from_secs(30));
    }

    #[test]
    fn test_generated_slide_legacy_layout() {
        let json = r#"{"slides": [
            {"layout": "TITLE_BULLETS", "title": "One", "bullets": "<ul><li>a</li><li>b</li></ul>", "body": "dropped"},
            {"layout": "MYSTERY", "title": "Two", "body": "dropped too"},
            {"title": "Three", "bullets": ["x", {"text": "y"}]}
        ]}"#;
        let response: SlideGenerationResponse = serde_json::from_str(json).unwrap();
        let slides: Vec<Slide> = response
            .into_result()
            .unwrap()
            .into_iter()
            .map(|s| s.into_slide(Layout::TitleBullets))
            .collect();

        assert_eq!(slides[0].layout(), Layout::TitleBullets);
        assert_eq!(slides[0].content().bullets.as_ref().unwrap().len(), 2);
        assert!(slides[0].content().body.is_none());

        assert_eq!(slides[1].layout(), Layout::TitleOnly);
        assert!(slides[1].content().body.is_none());

        assert_eq!(slides[2].layout(), Layout::TitleBullets);
        assert_eq!(slides[2].content().bullets.as_ref().unwrap()[1].text, "y");
    }

    #[test]
    fn test_image_result_into_slide_image() {
        let json = r#"{"url": "https://x/y.png", "alt": "y", "prompt": "a y", "service": "stability"}"#;
        let result: ImageResult = serde_json::from_str(json).unwrap();
        let image = SlideImage::from(result);
        assert_eq!(image.service, Some(ImageService::Stability));
        assert!(!image.is_placeholder());
    }
}
