//! Error types for the presentation editor core.

use thiserror::Error;

use crate::remote::ValidationError;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing or exporting a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// A layout identifier is not part of the closed layout set.
    #[error("Unknown layout: {0}")]
    UnknownLayout(String),

    /// An index is outside `[0, len)`.
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// No slide with the given id exists in the presentation.
    #[error("Unknown slide: {0}")]
    UnknownSlide(String),

    /// No outline topic with the given id exists.
    #[error("Unknown outline topic: {0}")]
    UnknownTopic(String),

    /// A content field was written that the slide's layout does not display.
    #[error("Layout '{layout}' does not support the {field} field")]
    UnsupportedField { field: String, layout: String },

    /// A reorder permutation does not cover the slide list exactly once.
    #[error("Invalid slide ordering: {0}")]
    InvalidPermutation(String),

    /// A request failed client-side validation.
    #[error("Invalid request: {}", format_validation(.0))]
    Validation(Vec<ValidationError>),

    /// A style value could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// A snapshot could not be loaded.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// ZIP archive error (for PPTX export).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML generation error (for PPTX export).
    #[error("XML error: {0}")]
    XmlError(String),
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
