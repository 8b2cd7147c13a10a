//! Core slide model, layout catalog, bullet normalization, and outline
//! projection for the presentation editor.

pub mod bullets;
pub mod config;
pub mod error;
pub mod layout;
pub mod migrate;
pub mod outline;
pub mod presentation;
pub mod remote;
pub mod reorder;
pub mod slide;
pub mod snapshot;

pub use bullets::{Bullet, BulletInput, BulletPoint};
pub use config::{EditorConfig, SubtopicPolicy};
pub use error::{Error, Result};
pub use layout::{Capabilities, Field, Layout};
pub use migrate::migrate;
pub use outline::{project_outline, OutlineTopic, ProjectionOptions};
pub use presentation::{EditAction, Presentation};
pub use remote::{InstructionalLevel, OutlineRequest, OutlineResponse, RemoteError, RemoteErrorKind};
pub use reorder::{apply_order, reorder};
pub use slide::{FieldValue, ImageService, Slide, SlideContent, SlideId, SlideImage};
pub use snapshot::Snapshot;
