//! Image resolution for export.
//!
//! Slides only carry an image URL. The writer asks an [`ImageResolver`] for
//! the bytes; anything it cannot resolve is drawn as a labelled placeholder.

use std::fs;
use std::path::{Path, PathBuf};

use deck_core::SlideImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Sniff the format from the leading magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(b"GIF8") {
            Some(ImageFormat::Gif)
        } else {
            None
        }
    }
}

/// Raw image bytes ready to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl ImageData {
    /// Wrap bytes whose format can be sniffed.
    pub fn sniff(bytes: Vec<u8>) -> Option<Self> {
        let format = ImageFormat::from_magic(&bytes)?;
        Some(Self { bytes, format })
    }
}

pub trait ImageResolver {
    /// Fetch the bytes behind `image`, or `None` to fall back to a placeholder.
    fn resolve(&self, image: &SlideImage) -> Option<ImageData>;
}

/// Resolver that never embeds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImages;

impl ImageResolver for NoImages {
    fn resolve(&self, _image: &SlideImage) -> Option<ImageData> {
        None
    }
}

/// Resolves `file://` URLs and plain paths against a base directory.
/// Remote URLs are left unresolved.
#[derive(Debug, Clone)]
pub struct LocalFileResolver {
    base_dir: PathBuf,
}

impl LocalFileResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn path_for(&self, url: &str) -> Option<PathBuf> {
        if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
            return None;
        }
        if url.starts_with("data:") {
            return None;
        }
        let raw = url.strip_prefix("file://").unwrap_or(url);
        let path = Path::new(raw);
        if path.is_absolute() {
            Some(path.to_path_buf())
        } else {
            Some(self.base_dir.join(path))
        }
    }
}

impl ImageResolver for LocalFileResolver {
    fn resolve(&self, image: &SlideImage) -> Option<ImageData> {
        let path = self.path_for(&image.url)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Could not read image {}: {}", path.display(), e);
                return None;
            }
        };
        let data = ImageData::sniff(bytes);
        if data.is_none() {
            log::warn!("Unrecognized image format: {}", path.display());
        }
        data
    }
}
