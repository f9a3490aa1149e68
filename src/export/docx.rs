//! DOCX exporter.
//!
//! Emits semantic WordprocessingML instead of positioned output: headings,
//! styled runs, numbered bullet items, inline pictures. Line wrapping and
//! pagination are delegated to the target format.
//!
//! Each chapter becomes an independent document section with its own
//! chapter-title header and a footer holding a live `PAGE` field, so chapter
//! boundaries always start a fresh page. The parts are assembled as strings
//! and packaged into the OPC zip container.

use std::io::{Seek, Write};

use quick_xml::escape::escape;

use super::{Exporter, IMAGE_PLACEHOLDER, RenderChapter, prepare};
use crate::error::Result;
use crate::extract::Node;
use crate::fetch::ImageFetcher;
use crate::model::ContentDocument;

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// EMU per CSS pixel (914400 EMU/inch at 96 px/inch).
const EMU_PER_PX: u64 = 9525;
/// Fixed picture frame; the target format owns reflow.
const IMAGE_W_PX: u64 = 550;
const IMAGE_H_PX: u64 = 350;

/// Configuration for DOCX export.
#[derive(Debug, Clone, Default)]
pub struct DocxConfig {
    /// Document title, used for the leading title paragraph.
    pub title: String,
}

impl DocxConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// DOCX format exporter.
#[derive(Debug, Clone, Default)]
pub struct DocxExporter {
    config: DocxConfig,
}

impl DocxExporter {
    /// Create a new exporter with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: DocxConfig) -> Self {
        self.config = config;
        self
    }
}

impl Exporter for DocxExporter {
    fn export<W: Write + Seek>(&self, doc: &ContentDocument, writer: &mut W) -> Result<()> {
        let (_cover, chapters) = prepare(doc);
        let mut fetcher = ImageFetcher::new();

        let mut builder = DocxBuilder::new(&self.config.title);
        for chapter in &chapters {
            builder.add_chapter(chapter, &mut fetcher);
        }
        builder.write(writer)
    }
}

/// One image payload destined for `word/media/`.
struct MediaPart {
    filename: String,
    rel_id: String,
    bytes: Vec<u8>,
    content_type: &'static str,
}

/// Accumulates document.xml plus all companion parts, then zips them.
struct DocxBuilder {
    title: String,
    body: String,
    headers: Vec<String>,
    media: Vec<MediaPart>,
    chapter_count: usize,
}

impl DocxBuilder {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            body: String::new(),
            headers: Vec::new(),
            media: Vec::new(),
            chapter_count: 0,
        }
    }

    fn add_chapter(&mut self, chapter: &RenderChapter, fetcher: &mut ImageFetcher) {
        // Close the previous chapter's section before starting a new one.
        // The final chapter's properties go on the body instead (written in
        // `document_xml`), which is how OOXML chains sections.
        if self.chapter_count > 0 {
            let sect = section_properties(self.chapter_count);
            self.body
                .push_str(&format!("<w:p><w:pPr>{sect}</w:pPr></w:p>"));
        }
        self.chapter_count += 1;
        self.headers.push(header_xml(&chapter.title));

        self.body.push_str(&heading_paragraph(1, &chapter.title));
        for node in &chapter.nodes {
            match node {
                Node::Heading { level, text } => {
                    self.body.push_str(&heading_paragraph(*level, text));
                }
                Node::Paragraph { text, bold, italic } => {
                    self.body.push_str(&text_paragraph(text, *bold, *italic));
                }
                Node::ListBlock { ordered, items } => {
                    for item in items {
                        self.body.push_str(&list_paragraph(item, *ordered));
                    }
                }
                Node::Image { src } => self.add_image(src, fetcher),
            }
        }
    }

    /// Embed an image from a URL or data-URI. A single failure becomes a
    /// styled placeholder paragraph; it never aborts the document.
    fn add_image(&mut self, src: &str, fetcher: &mut ImageFetcher) {
        let image = match fetcher.fetch(src) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("docx: {e}");
                self.body.push_str(&placeholder_paragraph());
                return;
            }
        };

        let n = self.media.len() + 1;
        let part = MediaPart {
            filename: format!("media/image{n}.{}", image.format.extension()),
            rel_id: format!("rIdImg{n}"),
            content_type: image.format.content_type(),
            bytes: image.bytes,
        };
        self.body.push_str(&drawing_paragraph(&part.rel_id, n as u64));
        self.media.push(part);
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", deflated)?;
        zip.write_all(self.content_types_xml().as_bytes())?;

        zip.start_file("_rels/.rels", deflated)?;
        zip.write_all(ROOT_RELS.as_bytes())?;

        zip.start_file("word/document.xml", deflated)?;
        zip.write_all(self.document_xml().as_bytes())?;

        zip.start_file("word/_rels/document.xml.rels", deflated)?;
        zip.write_all(self.document_rels_xml().as_bytes())?;

        zip.start_file("word/styles.xml", deflated)?;
        zip.write_all(STYLES_XML.as_bytes())?;

        zip.start_file("word/numbering.xml", deflated)?;
        zip.write_all(NUMBERING_XML.as_bytes())?;

        zip.start_file("word/footer1.xml", deflated)?;
        zip.write_all(FOOTER_XML.as_bytes())?;

        for (i, header) in self.headers.iter().enumerate() {
            zip.start_file(format!("word/header{}.xml", i + 1), deflated)?;
            zip.write_all(header.as_bytes())?;
        }

        for part in &self.media {
            zip.start_file(format!("word/{}", part.filename), deflated)?;
            zip.write_all(&part.bytes)?;
        }

        zip.finish()?;
        Ok(())
    }

    fn document_xml(&self) -> String {
        let title = if self.title.is_empty() {
            String::new()
        } else {
            format!(
                "<w:p><w:pPr><w:pStyle w:val=\"Title\"/></w:pPr><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
                escape(self.title.as_str())
            )
        };
        // Body-level section properties close the last chapter's section.
        // An empty document still needs page geometry, just no header.
        let final_sect = if self.chapter_count == 0 {
            "<w:sectPr><w:pgSz w:w=\"12240\" w:h=\"15840\"/><w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" w:header=\"708\" w:footer=\"708\" w:gutter=\"0\"/></w:sectPr>".to_string()
        } else {
            section_properties(self.chapter_count)
        };
        format!(
            "{DOCUMENT_PREAMBLE}<w:body>{title}{}{final_sect}</w:body></w:document>",
            self.body
        )
    }

    fn content_types_xml(&self) -> String {
        let mut overrides = String::new();
        for i in 1..=self.headers.len() {
            overrides.push_str(&format!(
                "<Override PartName=\"/word/header{i}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml\"/>"
            ));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Default Extension="jpeg" ContentType="image/jpeg"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>
<Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/>
{overrides}</Types>"#
        )
    }

    fn document_rels_xml(&self) -> String {
        let mut rels = String::from(
            r#"<Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
<Relationship Id="rIdNumbering" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>
<Relationship Id="rIdFtr" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>
"#,
        );
        for i in 1..=self.headers.len() {
            rels.push_str(&format!(
                "<Relationship Id=\"rIdHdr{i}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/header\" Target=\"header{i}.xml\"/>\n"
            ));
        }
        for part in &self.media {
            rels.push_str(&format!(
                "<Relationship Id=\"{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/image\" Target=\"{}\"/>\n",
                part.rel_id, part.filename
            ));
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\n{rels}</Relationships>"
        )
    }
}

/// Section properties for the chapter at 1-based `ordinal`: its header, the
/// shared footer, US Letter geometry, 1-inch margins.
fn section_properties(ordinal: usize) -> String {
    format!(
        "<w:sectPr>\
<w:headerReference w:type=\"default\" r:id=\"rIdHdr{ordinal}\"/>\
<w:footerReference w:type=\"default\" r:id=\"rIdFtr\"/>\
<w:pgSz w:w=\"12240\" w:h=\"15840\"/>\
<w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" w:header=\"708\" w:footer=\"708\" w:gutter=\"0\"/>\
</w:sectPr>"
    )
}

fn heading_paragraph(level: u8, text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let style = format!("Heading{}", level.min(3));
    format!(
        "<w:p><w:pPr><w:pStyle w:val=\"{style}\"/></w:pPr><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        escape(text)
    )
}

fn text_paragraph(text: &str, bold: bool, italic: bool) -> String {
    let mut rpr = String::new();
    if bold {
        rpr.push_str("<w:b/>");
    }
    if italic {
        rpr.push_str("<w:i/>");
    }
    let rpr = if rpr.is_empty() {
        String::new()
    } else {
        format!("<w:rPr>{rpr}</w:rPr>")
    };
    format!(
        "<w:p><w:r>{rpr}<w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        escape(text)
    )
}

fn list_paragraph(text: &str, ordered: bool) -> String {
    // numId 1 is the bullet definition, numId 2 decimal (numbering.xml).
    let num_id = if ordered { 2 } else { 1 };
    format!(
        "<w:p><w:pPr><w:pStyle w:val=\"ListParagraph\"/><w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"{num_id}\"/></w:numPr></w:pPr><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        escape(text)
    )
}

fn placeholder_paragraph() -> String {
    format!(
        "<w:p><w:r><w:rPr><w:i/><w:color w:val=\"808080\"/></w:rPr><w:t>{}</w:t></w:r></w:p>",
        escape(IMAGE_PLACEHOLDER)
    )
}

/// An inline DrawingML picture referencing a media relationship.
fn drawing_paragraph(rel_id: &str, doc_pr_id: u64) -> String {
    let cx = IMAGE_W_PX * EMU_PER_PX;
    let cy = IMAGE_H_PX * EMU_PER_PX;
    format!(
        "<w:p><w:r><w:drawing>\
<wp:inline distT=\"0\" distB=\"0\" distL=\"0\" distR=\"0\">\
<wp:extent cx=\"{cx}\" cy=\"{cy}\"/>\
<wp:docPr id=\"{doc_pr_id}\" name=\"Picture {doc_pr_id}\"/>\
<a:graphic xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\">\
<a:graphicData uri=\"http://schemas.openxmlformats.org/drawingml/2006/picture\">\
<pic:pic xmlns:pic=\"http://schemas.openxmlformats.org/drawingml/2006/picture\">\
<pic:nvPicPr><pic:cNvPr id=\"{doc_pr_id}\" name=\"Picture {doc_pr_id}\"/><pic:cNvPicPr/></pic:nvPicPr>\
<pic:blipFill><a:blip r:embed=\"{rel_id}\"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>\
<pic:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>\
<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></pic:spPr>\
</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"
    )
}

/// Chapter header: the chapter title, right-aligned.
fn header_xml(title: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<w:hdr xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
<w:p><w:pPr><w:jc w:val=\"right\"/></w:pPr><w:r><w:rPr><w:i/></w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>\
</w:hdr>",
        escape(title)
    )
}

const DOCUMENT_PREAMBLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
 xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing"
 xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

/// Footer shared by every section: centered live page-number field.
const FOOTER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:ftr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:p><w:pPr><w:jc w:val="center"/></w:pPr>
<w:r><w:fldChar w:fldCharType="begin"/></w:r>
<w:r><w:instrText xml:space="preserve"> PAGE </w:instrText></w:r>
<w:r><w:fldChar w:fldCharType="separate"/></w:r>
<w:r><w:t>1</w:t></w:r>
<w:r><w:fldChar w:fldCharType="end"/></w:r>
</w:p>
</w:ftr>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:default="1" w:styleId="Normal">
<w:name w:val="Normal"/><w:qFormat/>
<w:rPr><w:sz w:val="24"/></w:rPr>
</w:style>
<w:style w:type="paragraph" w:styleId="Title">
<w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:qFormat/>
<w:pPr><w:jc w:val="center"/><w:spacing w:after="360"/></w:pPr>
<w:rPr><w:b/><w:sz w:val="56"/></w:rPr>
</w:style>
<w:style w:type="paragraph" w:styleId="Heading1">
<w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:qFormat/>
<w:pPr><w:spacing w:before="360" w:after="160"/><w:outlineLvl w:val="0"/></w:pPr>
<w:rPr><w:b/><w:sz w:val="40"/></w:rPr>
</w:style>
<w:style w:type="paragraph" w:styleId="Heading2">
<w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:qFormat/>
<w:pPr><w:spacing w:before="280" w:after="120"/><w:outlineLvl w:val="1"/></w:pPr>
<w:rPr><w:b/><w:sz w:val="32"/></w:rPr>
</w:style>
<w:style w:type="paragraph" w:styleId="Heading3">
<w:name w:val="heading 3"/><w:basedOn w:val="Normal"/><w:qFormat/>
<w:pPr><w:spacing w:before="240" w:after="100"/><w:outlineLvl w:val="2"/></w:pPr>
<w:rPr><w:b/><w:sz w:val="28"/></w:rPr>
</w:style>
<w:style w:type="paragraph" w:styleId="ListParagraph">
<w:name w:val="List Paragraph"/><w:basedOn w:val="Normal"/><w:qFormat/>
<w:pPr><w:ind w:left="720"/></w:pPr>
</w:style>
</w:styles>"#;

const NUMBERING_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:abstractNum w:abstractNumId="0">
<w:lvl w:ilvl="0">
<w:start w:val="1"/>
<w:numFmt w:val="bullet"/>
<w:lvlText w:val="&#8226;"/>
<w:lvlJc w:val="left"/>
<w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr>
</w:lvl>
</w:abstractNum>
<w:abstractNum w:abstractNumId="1">
<w:lvl w:ilvl="0">
<w:start w:val="1"/>
<w:numFmt w:val="decimal"/>
<w:lvlText w:val="%1."/>
<w:lvlJc w:val="left"/>
<w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr>
</w:lvl>
</w:abstractNum>
<w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
<w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num>
</w:numbering>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Chapter, ContentDocument};
    use std::io::Cursor;
    use std::io::Read;

    fn sample_doc() -> ContentDocument {
        let mut doc = ContentDocument::new();
        doc.push_chapter(Chapter::new(
            "Alpha",
            "<h1>Alpha</h1><p>First chapter.</p><ul><li>a</li><li>b</li></ul>",
        ));
        doc.push_chapter(Chapter::new("Beta", "<h1>Beta</h1><p><strong>bold</strong></p>"));
        doc
    }

    fn export_to_parts(doc: &ContentDocument) -> zip::ZipArchive<Cursor<Vec<u8>>> {
        let mut buf = Cursor::new(Vec::new());
        DocxExporter::new()
            .with_config(DocxConfig::new("Test Course"))
            .export(doc, &mut buf)
            .unwrap();
        buf.set_position(0);
        zip::ZipArchive::new(buf).unwrap()
    }

    fn read_part(archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut out = String::new();
        archive
            .by_name(name)
            .unwrap_or_else(|_| panic!("missing part {name}"))
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn archive_contains_required_parts() {
        let mut archive = export_to_parts(&sample_doc());
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "word/numbering.xml",
            "word/footer1.xml",
            "word/header1.xml",
            "word/header2.xml",
        ] {
            read_part(&mut archive, name);
        }
    }

    #[test]
    fn each_chapter_gets_its_own_section() {
        let mut archive = export_to_parts(&sample_doc());
        let document = read_part(&mut archive, "word/document.xml");
        assert_eq!(document.matches("<w:sectPr>").count(), 2);
        assert!(document.contains("rIdHdr1"));
        assert!(document.contains("rIdHdr2"));
        // Exactly one body-level sectPr closing the last section.
        assert!(document.trim_end().ends_with("</w:sectPr></w:body></w:document>"));
    }

    #[test]
    fn headers_carry_chapter_titles() {
        let mut archive = export_to_parts(&sample_doc());
        assert!(read_part(&mut archive, "word/header1.xml").contains("Alpha"));
        assert!(read_part(&mut archive, "word/header2.xml").contains("Beta"));
    }

    #[test]
    fn footer_has_live_page_field() {
        let mut archive = export_to_parts(&sample_doc());
        let footer = read_part(&mut archive, "word/footer1.xml");
        assert!(footer.contains("fldCharType=\"begin\""));
        assert!(footer.contains(" PAGE "));
    }

    #[test]
    fn bold_paragraph_gets_run_properties() {
        let mut archive = export_to_parts(&sample_doc());
        let document = read_part(&mut archive, "word/document.xml");
        assert!(document.contains("<w:rPr><w:b/></w:rPr>"));
    }

    #[test]
    fn ordered_items_use_decimal_numbering() {
        let mut doc = ContentDocument::new();
        doc.push_chapter(Chapter::new(
            "Steps",
            "<h1>Steps</h1><ol><li>first</li><li>second</li></ol>",
        ));
        let mut archive = export_to_parts(&doc);

        let document = read_part(&mut archive, "word/document.xml");
        assert!(document.contains("<w:numId w:val=\"2\"/>"));
        // No manual prefix; the numbering engine owns the "1." text.
        assert!(document.contains(">first</w:t>"));
        assert!(!document.contains("1. first"));

        let numbering = read_part(&mut archive, "word/numbering.xml");
        assert!(numbering.contains("w:val=\"decimal\""));
        assert!(numbering.contains("<w:num w:numId=\"2\">"));
    }

    #[test]
    fn data_uri_image_embeds_without_network() {
        const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";
        let mut doc = ContentDocument::new();
        doc.push_chapter(Chapter::new(
            "Pics",
            format!("<h1>Pics</h1><p>text</p><img src=\"data:image/png;base64,{PNG_B64}\">"),
        ));

        let mut archive = export_to_parts(&doc);
        let document = read_part(&mut archive, "word/document.xml");
        assert!(document.contains("<w:drawing>"));
        assert!(document.contains("rIdImg1"));

        let mut bytes = Vec::new();
        archive
            .by_name("word/media/image1.png")
            .unwrap()
            .read_to_end(&mut bytes)
            .unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn unreachable_image_becomes_placeholder() {
        let mut doc = ContentDocument::new();
        doc.push_chapter(Chapter::new(
            "Broken",
            "<h1>Broken</h1><img src=\"data:image/png,notbase64\"><p>after</p>",
        ));
        let mut archive = export_to_parts(&doc);
        let document = read_part(&mut archive, "word/document.xml");
        assert!(document.contains(IMAGE_PLACEHOLDER));
        assert!(document.contains("after"));
        assert!(!document.contains("<w:drawing>"));
    }

    #[test]
    fn xml_special_characters_are_escaped() {
        let mut doc = ContentDocument::new();
        doc.push_chapter(Chapter::new("A&B", "<h1>A&amp;B</h1><p>1 &lt; 2</p>"));
        let mut archive = export_to_parts(&doc);
        let document = read_part(&mut archive, "word/document.xml");
        assert!(document.contains("A&amp;B"));
        assert!(document.contains("1 &lt; 2"));
    }
}
