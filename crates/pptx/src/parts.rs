//! Fixed package parts: content types, relationships, master, layout, theme.
//!
//! Every exported deck shares one slide master, one blank layout, and one
//! theme. Slides position their own shapes, so the layout carries no
//! placeholders.

use quick_xml::escape::escape;
use std::fmt::Write;

use deck_core::{Error, Result};

use crate::images::ImageFormat;

pub(crate) const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub(crate) const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

pub(crate) const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub(crate) const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(crate) const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

/// 16:9 slide size in EMU.
pub(crate) const SLIDE_WIDTH: i64 = 12_192_000;
pub(crate) const SLIDE_HEIGHT: i64 = 6_858_000;

/// Empty group header every `p:spTree` starts with.
pub(crate) const SP_TREE_HEADER: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

pub(crate) fn xml_err(e: std::fmt::Error) -> Error {
    Error::XmlError(e.to_string())
}

/// Escape text for element content or attribute values, dropping characters
/// XML 1.0 does not allow.
pub(crate) fn xml_text(raw: &str) -> String {
    if raw.chars().all(is_xml_char) {
        return escape(raw).into_owned();
    }
    let allowed: String = raw.chars().filter(|&c| is_xml_char(c)).collect();
    escape(allowed.as_str()).into_owned()
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// A relationship entry in a `.rels` part.
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: &'static str,
    pub target: String,
}

pub(crate) fn relationships_xml(rels: &[Relationship]) -> Result<String> {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str(XML_HEADER);
    write!(xml, r#"<Relationships xmlns="{}">"#, NS_RELS).map_err(xml_err)?;
    for rel in rels {
        write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            rel.id,
            rel.rel_type,
            xml_text(&rel.target)
        )
        .map_err(xml_err)?;
    }
    xml.push_str("</Relationships>");
    Ok(xml)
}

pub(crate) fn content_types_xml(slide_count: usize, image_formats: &[ImageFormat]) -> Result<String> {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_HEADER);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    for format in image_formats {
        write!(
            xml,
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            format.extension(),
            format.content_type()
        )
        .map_err(xml_err)?;
    }
    xml.push_str(r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#);
    for n in 1..=slide_count {
        write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            n
        )
        .map_err(xml_err)?;
    }
    xml.push_str(r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#);
    xml.push_str(r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#);
    xml.push_str("</Types>");
    Ok(xml)
}

pub(crate) fn root_rels_xml() -> Result<String> {
    relationships_xml(&[
        Relationship {
            id: "rId1".to_string(),
            rel_type: "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
            target: "ppt/presentation.xml".to_string(),
        },
        Relationship {
            id: "rId2".to_string(),
            rel_type: "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
            target: "docProps/core.xml".to_string(),
        },
        Relationship {
            id: "rId3".to_string(),
            rel_type: "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties",
            target: "docProps/app.xml".to_string(),
        },
    ])
}

/// Relationship id of slide `n` (1-based) inside `presentation.xml.rels`.
/// `rId1` is the master and `rId2` the theme.
pub(crate) fn slide_rel_id(n: usize) -> String {
    format!("rId{}", n + 2)
}

pub(crate) fn presentation_xml(slide_count: usize) -> Result<String> {
    let mut xml = String::with_capacity(1024 + slide_count * 48);
    xml.push_str(XML_HEADER);
    write!(
        xml,
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
        NS_A, NS_R, NS_P
    )
    .map_err(xml_err)?;
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    if slide_count > 0 {
        xml.push_str("<p:sldIdLst>");
        for n in 1..=slide_count {
            write!(xml, r#"<p:sldId id="{}" r:id="{}"/>"#, 255 + n, slide_rel_id(n))
                .map_err(xml_err)?;
        }
        xml.push_str("</p:sldIdLst>");
    }
    write!(xml, r#"<p:sldSz cx="{}" cy="{}"/>"#, SLIDE_WIDTH, SLIDE_HEIGHT).map_err(xml_err)?;
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("</p:presentation>");
    Ok(xml)
}

pub(crate) fn presentation_rels_xml(slide_count: usize) -> Result<String> {
    let mut rels = vec![
        Relationship {
            id: "rId1".to_string(),
            rel_type: REL_SLIDE_MASTER,
            target: "slideMasters/slideMaster1.xml".to_string(),
        },
        Relationship {
            id: "rId2".to_string(),
            rel_type: REL_THEME,
            target: "theme/theme1.xml".to_string(),
        },
    ];
    for n in 1..=slide_count {
        rels.push(Relationship {
            id: slide_rel_id(n),
            rel_type: REL_SLIDE,
            target: format!("slides/slide{}.xml", n),
        });
    }
    relationships_xml(&rels)
}

pub(crate) fn slide_master_xml() -> Result<String> {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_HEADER);
    write!(xml, r#"<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#, NS_A, NS_R, NS_P)
        .map_err(xml_err)?;
    xml.push_str(r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>"#);
    xml.push_str(SP_TREE_HEADER);
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str(r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#);
    xml.push_str(r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#);
    xml.push_str("<p:txStyles>");
    xml.push_str(r#"<p:titleStyle><a:lvl1pPr algn="l"><a:defRPr sz="4000" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mj-lt"/></a:defRPr></a:lvl1pPr></p:titleStyle>"#);
    xml.push_str(r#"<p:bodyStyle><a:lvl1pPr marL="228600" indent="-228600"><a:defRPr sz="2400" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr></p:bodyStyle>"#);
    xml.push_str(r#"<p:otherStyle><a:lvl1pPr><a:defRPr sz="1800" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr></p:otherStyle>"#);
    xml.push_str("</p:txStyles></p:sldMaster>");
    Ok(xml)
}

pub(crate) fn slide_master_rels_xml() -> Result<String> {
    relationships_xml(&[
        Relationship {
            id: "rId1".to_string(),
            rel_type: REL_SLIDE_LAYOUT,
            target: "../slideLayouts/slideLayout1.xml".to_string(),
        },
        Relationship {
            id: "rId2".to_string(),
            rel_type: REL_THEME,
            target: "../theme/theme1.xml".to_string(),
        },
    ])
}

pub(crate) fn slide_layout_xml() -> Result<String> {
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_HEADER);
    write!(
        xml,
        r#"<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="blank" preserve="1">"#,
        NS_A, NS_R, NS_P
    )
    .map_err(xml_err)?;
    xml.push_str(r#"<p:cSld name="Blank"><p:spTree>"#);
    xml.push_str(SP_TREE_HEADER);
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>");
    Ok(xml)
}

pub(crate) fn slide_layout_rels_xml() -> Result<String> {
    relationships_xml(&[Relationship {
        id: "rId1".to_string(),
        rel_type: REL_SLIDE_MASTER,
        target: "../slideMasters/slideMaster1.xml".to_string(),
    }])
}

pub(crate) fn theme_xml() -> Result<String> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_HEADER);
    write!(xml, r#"<a:theme xmlns:a="{}" name="Deck Theme">"#, NS_A).map_err(xml_err)?;
    xml.push_str("<a:themeElements>");

    xml.push_str(r#"<a:clrScheme name="Deck">"#);
    xml.push_str(r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#);
    xml.push_str(r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#);
    let scheme = [
        ("dk2", "44546A"),
        ("lt2", "E7E6E6"),
        ("accent1", "4472C4"),
        ("accent2", "ED7D31"),
        ("accent3", "A5A5A5"),
        ("accent4", "FFC000"),
        ("accent5", "5B9BD5"),
        ("accent6", "70AD47"),
        ("hlink", "0563C1"),
        ("folHlink", "954F72"),
    ];
    for (name, color) in scheme {
        write!(xml, r#"<a:{0}><a:srgbClr val="{1}"/></a:{0}>"#, name, color).map_err(xml_err)?;
    }
    xml.push_str("</a:clrScheme>");

    xml.push_str(r#"<a:fontScheme name="Deck">"#);
    xml.push_str(r#"<a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#);
    xml.push_str(r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#);
    xml.push_str("</a:fontScheme>");

    let solid = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    xml.push_str(r#"<a:fmtScheme name="Deck"><a:fillStyleLst>"#);
    for _ in 0..3 {
        xml.push_str(solid);
    }
    xml.push_str("</a:fillStyleLst><a:lnStyleLst>");
    for width in [6350, 12700, 19050] {
        write!(
            xml,
            r#"<a:ln w="{}" cap="flat" cmpd="sng" algn="ctr">{}<a:prstDash val="solid"/></a:ln>"#,
            width, solid
        )
        .map_err(xml_err)?;
    }
    xml.push_str("</a:lnStyleLst><a:effectStyleLst>");
    for _ in 0..3 {
        xml.push_str("<a:effectStyle><a:effectLst/></a:effectStyle>");
    }
    xml.push_str("</a:effectStyleLst><a:bgFillStyleLst>");
    for _ in 0..3 {
        xml.push_str(solid);
    }
    xml.push_str("</a:bgFillStyleLst></a:fmtScheme>");

    xml.push_str("</a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>");
    Ok(xml)
}

pub(crate) fn core_props_xml(title: &str) -> Result<String> {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_HEADER);
    xml.push_str(r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#);
    write!(xml, "<dc:title>{}</dc:title>", xml_text(title)).map_err(xml_err)?;
    xml.push_str("</cp:coreProperties>");
    Ok(xml)
}

pub(crate) fn app_props_xml(slide_count: usize) -> Result<String> {
    let mut xml = String::with_capacity(256);
    xml.push_str(XML_HEADER);
    xml.push_str(r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#);
    write!(
        xml,
        "<Application>deck-export</Application><Slides>{}</Slides>",
        slide_count
    )
    .map_err(xml_err)?;
    xml.push_str("</Properties>");
    Ok(xml)
}
