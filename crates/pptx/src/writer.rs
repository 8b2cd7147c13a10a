//! PPTX package assembly.

use std::collections::BTreeSet;
use std::io::{Cursor, Seek, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use deck_core::{Error, Result, Slide};

use crate::images::{ImageData, ImageFormat, ImageResolver, NoImages};
use crate::parts::{self, Relationship, REL_IMAGE, REL_SLIDE_LAYOUT};
use crate::shapes::{self, ImageSlot};

const IMAGE_REL_ID: &str = "rId2";

/// Writes an ordered slide list as a `.pptx` package.
pub struct PptxWriter {
    title: String,
    resolver: Box<dyn ImageResolver>,
}

impl PptxWriter {
    pub fn new() -> Self {
        Self {
            title: "Presentation".to_string(),
            resolver: Box::new(NoImages),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_resolver(mut self, resolver: impl ImageResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Serialize the package into an in-memory buffer.
    pub fn to_bytes(&self, slides: &[Slide]) -> Result<Vec<u8>> {
        Ok(self.write(slides, Cursor::new(Vec::new()))?.into_inner())
    }

    /// Write the package to `sink`, returning it once the archive is finished.
    pub fn write<W: Write + Seek>(&self, slides: &[Slide], sink: W) -> Result<W> {
        let images = self.resolve_images(slides);
        let formats: BTreeSet<ImageFormat> = images.iter().flatten().map(|i| i.format).collect();
        let formats: Vec<ImageFormat> = formats.into_iter().collect();

        let mut zip = ZipWriter::new(sink);
        let count = slides.len();

        put(&mut zip, "[Content_Types].xml", parts::content_types_xml(count, &formats)?.as_bytes())?;
        put(&mut zip, "_rels/.rels", parts::root_rels_xml()?.as_bytes())?;
        put(&mut zip, "docProps/core.xml", parts::core_props_xml(&self.title)?.as_bytes())?;
        put(&mut zip, "docProps/app.xml", parts::app_props_xml(count)?.as_bytes())?;
        put(&mut zip, "ppt/presentation.xml", parts::presentation_xml(count)?.as_bytes())?;
        put(&mut zip, "ppt/_rels/presentation.xml.rels", parts::presentation_rels_xml(count)?.as_bytes())?;
        put(&mut zip, "ppt/slideMasters/slideMaster1.xml", parts::slide_master_xml()?.as_bytes())?;
        put(&mut zip, "ppt/slideMasters/_rels/slideMaster1.xml.rels", parts::slide_master_rels_xml()?.as_bytes())?;
        put(&mut zip, "ppt/slideLayouts/slideLayout1.xml", parts::slide_layout_xml()?.as_bytes())?;
        put(&mut zip, "ppt/slideLayouts/_rels/slideLayout1.xml.rels", parts::slide_layout_rels_xml()?.as_bytes())?;
        put(&mut zip, "ppt/theme/theme1.xml", parts::theme_xml()?.as_bytes())?;

        for (index, (slide, image)) in slides.iter().zip(&images).enumerate() {
            let n = index + 1;
            let mut rels = vec![Relationship {
                id: "rId1".to_string(),
                rel_type: REL_SLIDE_LAYOUT,
                target: "../slideLayouts/slideLayout1.xml".to_string(),
            }];

            let slot = match image {
                Some(data) => {
                    let media = format!("image{}.{}", n, data.format.extension());
                    put(&mut zip, &format!("ppt/media/{}", media), &data.bytes)?;
                    rels.push(Relationship {
                        id: IMAGE_REL_ID.to_string(),
                        rel_type: REL_IMAGE,
                        target: format!("../media/{}", media),
                    });
                    Some(ImageSlot::Embedded { rel_id: IMAGE_REL_ID })
                }
                None => None,
            };

            let xml = shapes::slide_xml(slide, slot)?;
            put(&mut zip, &format!("ppt/slides/slide{}.xml", n), xml.as_bytes())?;
            put(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", n),
                parts::relationships_xml(&rels)?.as_bytes(),
            )?;
            log::debug!("Wrote slide {} ({}): {}", n, slide.layout().id(), slide.summary());
        }

        let sink = zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))?;
        log::info!("Exported {} slides to PPTX", count);
        Ok(sink)
    }

    /// Resolve each slide's image, if its layout shows one.
    fn resolve_images(&self, slides: &[Slide]) -> Vec<Option<ImageData>> {
        slides
            .iter()
            .map(|slide| {
                let image = slide.content().image.as_ref()?;
                if image.is_placeholder() {
                    return None;
                }
                let data = self.resolver.resolve(image);
                if data.is_none() {
                    log::debug!("Image '{}' not resolved, drawing placeholder", image.url);
                }
                data
            })
            .collect()
    }
}

impl Default for PptxWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn put<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str, bytes: &[u8]) -> Result<()> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(name, options)
        .map_err(|e| Error::ZipError(format!("Failed to start '{}': {}", name, e)))?;
    zip.write_all(bytes)?;
    Ok(())
}
