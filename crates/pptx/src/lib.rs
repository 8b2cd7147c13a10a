//! PPTX (Office Open XML) export backend.
//!
//! Writes slides as a ZIP package of PresentationML parts.

pub mod images;
mod parts;
mod shapes;
pub mod writer;

pub use images::{ImageData, ImageFormat, ImageResolver, LocalFileResolver, NoImages};
pub use writer::PptxWriter;
