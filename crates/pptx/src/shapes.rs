//! Slide XML generation.
//!
//! Each layout maps to a fixed set of frames on a 16:9 slide. Only fields
//! present in the slide content produce shapes.

use std::fmt::Write;

use deck_core::{Layout, Result, Slide, SlideImage};

use crate::parts::{xml_err, xml_text, NS_A, NS_P, NS_R, SLIDE_HEIGHT, SLIDE_WIDTH, SP_TREE_HEADER, XML_HEADER};

const MARGIN: i64 = 457_200;
const GUTTER: i64 = 304_800;
const CONTENT_WIDTH: i64 = SLIDE_WIDTH - 2 * MARGIN;
const HALF_WIDTH: i64 = (CONTENT_WIDTH - GUTTER) / 2;
const TITLE_Y: i64 = 274_638;
const TITLE_HEIGHT: i64 = 1_143_000;
const CONTENT_Y: i64 = 1_600_200;
const CONTENT_HEIGHT: i64 = 4_525_963;

const TITLE_SIZE: u32 = 4000;
const SUBTITLE_SIZE: u32 = 2800;
const TEXT_SIZE: u32 = 2000;
const PLACEHOLDER_FILL: &str = "D9D9D9";
const PLACEHOLDER_TEXT: &str = "595959";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Rect {
    const fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }
}

/// Where each field lands for a layout.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Frames {
    pub title: Option<Rect>,
    pub subtitle: Option<Rect>,
    pub text: Option<Rect>,
    pub left: Option<Rect>,
    pub right: Option<Rect>,
    pub image: Option<Rect>,
}

pub(crate) fn frames(layout: Layout) -> Frames {
    let title = Some(Rect::new(MARGIN, TITLE_Y, CONTENT_WIDTH, TITLE_HEIGHT));
    let content = Rect::new(MARGIN, CONTENT_Y, CONTENT_WIDTH, CONTENT_HEIGHT);
    let left = Rect::new(MARGIN, CONTENT_Y, HALF_WIDTH, CONTENT_HEIGHT);
    let right = Rect::new(MARGIN + HALF_WIDTH + GUTTER, CONTENT_Y, HALF_WIDTH, CONTENT_HEIGHT);

    match layout {
        Layout::TitleOnly => Frames {
            title: Some(Rect::new(MARGIN, 2_743_200, CONTENT_WIDTH, 1_371_600)),
            ..Frames::default()
        },
        Layout::TitleSubtitle => Frames {
            title: Some(Rect::new(MARGIN, 1_828_800, CONTENT_WIDTH, 1_371_600)),
            subtitle: Some(Rect::new(MARGIN, 3_429_000, CONTENT_WIDTH, 1_143_000)),
            ..Frames::default()
        },
        Layout::TitleBody | Layout::TitleBullets => Frames {
            title,
            text: Some(content),
            ..Frames::default()
        },
        Layout::TitleBodyImage | Layout::TitleBulletsImage => Frames {
            title,
            text: Some(left),
            image: Some(right),
            ..Frames::default()
        },
        Layout::TitleImage => Frames {
            title,
            image: Some(content),
            ..Frames::default()
        },
        Layout::TwoColumn => Frames {
            title,
            left: Some(left),
            right: Some(right),
            ..Frames::default()
        },
        Layout::ImageOnly => Frames {
            image: Some(Rect::new(0, 0, SLIDE_WIDTH, SLIDE_HEIGHT)),
            ..Frames::default()
        },
    }
}

/// How the slide image is drawn.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ImageSlot<'a> {
    /// Embedded picture behind relationship `rel_id`.
    Embedded { rel_id: &'a str },
    /// Grey rectangle labelled with the image description.
    Placeholder,
}

#[derive(Debug, Clone, Copy)]
struct RunStyle<'a> {
    size: u32,
    bold: bool,
    color: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

struct SlideXml {
    xml: String,
    next_id: u32,
}

impl SlideXml {
    fn new() -> Self {
        Self {
            xml: String::with_capacity(4096),
            next_id: 2,
        }
    }

    fn shape_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn xfrm(&mut self, rect: Rect) -> Result<()> {
        write!(
            self.xml,
            r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
            rect.x, rect.y, rect.cx, rect.cy
        )
        .map_err(xml_err)
    }

    #[allow(clippy::too_many_arguments)]
    fn text_box(
        &mut self,
        name: &str,
        rect: Rect,
        paragraphs: &[&str],
        style: RunStyle<'_>,
        align: Align,
        bulleted: bool,
        fill: Option<&str>,
    ) -> Result<()> {
        let id = self.shape_id();
        self.xml.push_str("<p:sp><p:nvSpPr>");
        write!(self.xml, r#"<p:cNvPr id="{}" name="{} {}"/>"#, id, name, id).map_err(xml_err)?;
        self.xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>"#);
        self.xfrm(rect)?;
        self.xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
        if let Some(fill) = fill {
            write!(self.xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, fill)
                .map_err(xml_err)?;
        }
        self.xml.push_str("</p:spPr><p:txBody>");
        let anchor = if align == Align::Center { "ctr" } else { "t" };
        write!(self.xml, r#"<a:bodyPr wrap="square" rtlCol="0" anchor="{}"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#, anchor)
            .map_err(xml_err)?;
        for text in paragraphs {
            self.paragraph(text, style, align, bulleted)?;
        }
        self.xml.push_str("</p:txBody></p:sp>");
        Ok(())
    }

    fn paragraph(&mut self, text: &str, style: RunStyle<'_>, align: Align, bulleted: bool) -> Result<()> {
        self.xml.push_str("<a:p>");
        if bulleted {
            self.xml.push_str(r#"<a:pPr marL="342900" indent="-342900"><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/></a:pPr>"#);
        } else if align == Align::Center {
            self.xml.push_str(r#"<a:pPr algn="ctr"><a:buNone/></a:pPr>"#);
        } else {
            self.xml.push_str(r#"<a:pPr><a:buNone/></a:pPr>"#);
        }
        write!(self.xml, r#"<a:r><a:rPr lang="en-US" sz="{}" dirty="0""#, style.size).map_err(xml_err)?;
        if style.bold {
            self.xml.push_str(r#" b="1""#);
        }
        self.xml.push('>');
        if let Some(color) = style.color {
            write!(self.xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color)
                .map_err(xml_err)?;
        }
        write!(self.xml, "</a:rPr><a:t>{}</a:t></a:r></a:p>", xml_text(text)).map_err(xml_err)
    }

    fn picture(&mut self, rect: Rect, rel_id: &str, image: &SlideImage) -> Result<()> {
        let id = self.shape_id();
        self.xml.push_str("<p:pic><p:nvPicPr>");
        write!(
            self.xml,
            r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
            id,
            id,
            xml_text(&image.alt)
        )
        .map_err(xml_err)?;
        self.xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#);
        write!(
            self.xml,
            r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>"#,
            rel_id
        )
        .map_err(xml_err)?;
        self.xfrm(rect)?;
        self.xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
        Ok(())
    }
}

/// Label drawn inside an unresolved image frame.
pub(crate) fn placeholder_label(image: &SlideImage) -> String {
    let detail = if !image.alt.trim().is_empty() {
        Some(image.alt.trim())
    } else {
        image.prompt.as_deref().map(str::trim).filter(|p| !p.is_empty())
    };
    match detail {
        Some(detail) => format!("Image: {}", detail),
        None => "Image".to_string(),
    }
}

fn hex(color: Option<&str>) -> Option<&str> {
    color.map(|c| c.trim_start_matches('#'))
}

/// Render one slide part.
pub(crate) fn slide_xml(slide: &Slide, image: Option<ImageSlot<'_>>) -> Result<String> {
    let frames = frames(slide.layout());
    let content = slide.content();
    let color = hex(slide.font_color());
    let mut out = SlideXml::new();

    out.xml.push_str(XML_HEADER);
    write!(out.xml, r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld>"#, NS_A, NS_R, NS_P)
        .map_err(xml_err)?;
    if let Some(background) = hex(slide.background_color()) {
        write!(
            out.xml,
            r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
            background
        )
        .map_err(xml_err)?;
    }
    out.xml.push_str("<p:spTree>");
    out.xml.push_str(SP_TREE_HEADER);

    let centered = matches!(slide.layout(), Layout::TitleOnly | Layout::TitleSubtitle);
    let title_align = if centered { Align::Center } else { Align::Left };

    if let (Some(rect), Some(title)) = (frames.title, content.title.as_deref()) {
        let style = RunStyle { size: TITLE_SIZE, bold: true, color };
        out.text_box("Title", rect, &[title], style, title_align, false, None)?;
    }
    if let (Some(rect), Some(subtitle)) = (frames.subtitle, content.subtitle.as_deref()) {
        let style = RunStyle { size: SUBTITLE_SIZE, bold: false, color };
        out.text_box("Subtitle", rect, &[subtitle], style, Align::Center, false, None)?;
    }
    if let Some(rect) = frames.text {
        let style = RunStyle { size: TEXT_SIZE, bold: false, color };
        if let Some(bullets) = content.bullets.as_ref().filter(|b| !b.is_empty()) {
            let lines: Vec<&str> = bullets.iter().map(|b| b.text.as_str()).collect();
            out.text_box("Bullets", rect, &lines, style, Align::Left, true, None)?;
        } else if let Some(body) = content.body.as_deref() {
            let lines: Vec<&str> = body.lines().collect();
            out.text_box("Body", rect, &lines, style, Align::Left, false, None)?;
        }
    }
    for (rect, text, name) in [
        (frames.left, content.left_column.as_deref(), "Left Column"),
        (frames.right, content.right_column.as_deref(), "Right Column"),
    ] {
        if let (Some(rect), Some(text)) = (rect, text) {
            let style = RunStyle { size: TEXT_SIZE, bold: false, color };
            let lines: Vec<&str> = text.lines().collect();
            out.text_box(name, rect, &lines, style, Align::Left, false, None)?;
        }
    }
    if let (Some(rect), Some(picture)) = (frames.image, content.image.as_ref()) {
        match image.unwrap_or(ImageSlot::Placeholder) {
            ImageSlot::Embedded { rel_id } => out.picture(rect, rel_id, picture)?,
            ImageSlot::Placeholder => {
                let label = placeholder_label(picture);
                let style = RunStyle {
                    size: TEXT_SIZE,
                    bold: false,
                    color: Some(PLACEHOLDER_TEXT),
                };
                out.text_box("Image Placeholder", rect, &[label.as_str()], style, Align::Center, false, Some(PLACEHOLDER_FILL))?;
            }
        }
    }

    out.xml.push_str("</p:spTree></p:cSld>");
    out.xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
    Ok(out.xml)
}
