//! Minimal PresentationML writer.
//!
//! Produces a single-master, single-layout package that PowerPoint, Keynote
//! and LibreOffice open. Every slide lays its text out in explicit text boxes,
//! so the layout carries no placeholders.

use super::{DeckRenderer, SlideDeck};
use crate::error::Result;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const SLIDE_WIDTH: u64 = 9_144_000;
const SLIDE_HEIGHT: u64 = 6_858_000;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_BASE: &str = "application/vnd.openxmlformats-officedocument";

#[derive(Debug, Clone, Copy, Default)]
pub struct PptxRenderer;

impl DeckRenderer for PptxRenderer {
    fn render(&self, deck: &SlideDeck) -> Result<Vec<u8>> {
        let mut package = Package::new();

        package.add("[Content_Types].xml", content_types(deck.slide_count()))?;
        package.add("_rels/.rels", root_rels())?;
        package.add("ppt/presentation.xml", presentation(deck.slide_count()))?;
        package.add("ppt/_rels/presentation.xml.rels", presentation_rels(deck.slide_count()))?;
        package.add("ppt/slideMasters/slideMaster1.xml", slide_master())?;
        package.add(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            relationships(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("rId2", "theme", "../theme/theme1.xml"),
            ]),
        )?;
        package.add("ppt/slideLayouts/slideLayout1.xml", slide_layout())?;
        package.add(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            relationships(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
        )?;
        package.add("ppt/theme/theme1.xml", theme())?;

        let mut slides = vec![title_slide(&deck.title, &deck.subtitle)];
        slides.extend(
            deck.slides
                .iter()
                .map(|slide| content_slide(&slide.heading, &slide.body)),
        );

        for (index, xml) in slides.into_iter().enumerate() {
            let number = index + 1;
            package.add(&format!("ppt/slides/slide{}.xml", number), xml)?;
            package.add(
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                relationships(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")]),
            )?;
        }

        let bytes = package.finish()?;
        tracing::debug!(slides = deck.slide_count(), size = bytes.len(), "Rendered deck");
        Ok(bytes)
    }
}

struct Package {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
}

impl Package {
    fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: FileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    fn add(&mut self, name: &str, xml: String) -> Result<()> {
        self.writer.start_file(name, self.options)?;
        self.writer.write_all(xml.as_bytes())?;
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        Ok(self.writer.finish()?.into_inner())
    }
}

/// Escape text for XML element content and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            // Control characters other than tab and newline are not valid XML 1.0.
            c if c.is_control() && c != '\t' && c != '\n' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

fn xml_header() -> &'static str {
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n"
}

fn content_types(slide_count: usize) -> String {
    let slides: String = (1..=slide_count)
        .map(|n| {
            format!(
                "<Override PartName=\"/ppt/slides/slide{}.xml\" ContentType=\"{}.presentationml.slide+xml\"/>",
                n, CT_BASE
            )
        })
        .collect();

    format!(
        "{header}<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
<Default Extension=\"xml\" ContentType=\"application/xml\"/>\
<Override PartName=\"/ppt/presentation.xml\" ContentType=\"{ct}.presentationml.presentation.main+xml\"/>\
<Override PartName=\"/ppt/slideMasters/slideMaster1.xml\" ContentType=\"{ct}.presentationml.slideMaster+xml\"/>\
<Override PartName=\"/ppt/slideLayouts/slideLayout1.xml\" ContentType=\"{ct}.presentationml.slideLayout+xml\"/>\
<Override PartName=\"/ppt/theme/theme1.xml\" ContentType=\"{ct}.theme+xml\"/>\
{slides}</Types>",
        header = xml_header(),
        ct = CT_BASE,
        slides = slides,
    )
}

fn relationships(entries: &[(&str, &str, &str)]) -> String {
    let body: String = entries
        .iter()
        .map(|(id, kind, target)| {
            format!(
                "<Relationship Id=\"{}\" Type=\"{}/{}\" Target=\"{}\"/>",
                id, REL_BASE, kind, target
            )
        })
        .collect();
    format!(
        "{}<Relationships xmlns=\"{}\">{}</Relationships>",
        xml_header(),
        NS_REL,
        body
    )
}

fn root_rels() -> String {
    relationships(&[("rId1", "officeDocument", "ppt/presentation.xml")])
}

// rId1 is the master, rId2 the theme, slides follow from rId3.
fn presentation_rels(slide_count: usize) -> String {
    let slide_ids: Vec<(String, String)> = (1..=slide_count)
        .map(|n| (format!("rId{}", n + 2), format!("slides/slide{}.xml", n)))
        .collect();

    let mut entries = vec![
        ("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
        ("rId2", "theme", "theme/theme1.xml"),
    ];
    entries.extend(
        slide_ids
            .iter()
            .map(|(id, target)| (id.as_str(), "slide", target.as_str())),
    );
    relationships(&entries)
}

fn presentation(slide_count: usize) -> String {
    let slide_list: String = (1..=slide_count)
        .map(|n| format!("<p:sldId id=\"{}\" r:id=\"rId{}\"/>", 255 + n, n + 2))
        .collect();

    format!(
        "{header}<p:presentation xmlns:a=\"{a}\" xmlns:r=\"{r}\" xmlns:p=\"{p}\" saveSubsetFonts=\"1\">\
<p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst>\
<p:sldIdLst>{slides}</p:sldIdLst>\
<p:sldSz cx=\"{w}\" cy=\"{h}\" type=\"screen4x3\"/>\
<p:notesSz cx=\"{h}\" cy=\"{w}\"/>\
</p:presentation>",
        header = xml_header(),
        a = NS_A,
        r = NS_R,
        p = NS_P,
        slides = slide_list,
        w = SLIDE_WIDTH,
        h = SLIDE_HEIGHT,
    )
}

fn empty_tree() -> &'static str {
    "<p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
<p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/>\
<a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>"
}

fn slide_master() -> String {
    format!(
        "{header}<p:sldMaster xmlns:a=\"{a}\" xmlns:r=\"{r}\" xmlns:p=\"{p}\">\
<p:cSld><p:bg><p:bgRef idx=\"1001\"><a:schemeClr val=\"bg1\"/></p:bgRef></p:bg>\
<p:spTree>{tree}</p:spTree></p:cSld>\
<p:clrMap bg1=\"lt1\" tx1=\"dk1\" bg2=\"lt2\" tx2=\"dk2\" accent1=\"accent1\" accent2=\"accent2\" \
accent3=\"accent3\" accent4=\"accent4\" accent5=\"accent5\" accent6=\"accent6\" hlink=\"hlink\" folHlink=\"folHlink\"/>\
<p:sldLayoutIdLst><p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/></p:sldLayoutIdLst>\
<p:txStyles><p:titleStyle/><p:bodyStyle/><p:otherStyle/></p:txStyles>\
</p:sldMaster>",
        header = xml_header(),
        a = NS_A,
        r = NS_R,
        p = NS_P,
        tree = empty_tree(),
    )
}

fn slide_layout() -> String {
    format!(
        "{header}<p:sldLayout xmlns:a=\"{a}\" xmlns:r=\"{r}\" xmlns:p=\"{p}\" type=\"blank\" preserve=\"1\">\
<p:cSld name=\"Blank\"><p:spTree>{tree}</p:spTree></p:cSld>\
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>\
</p:sldLayout>",
        header = xml_header(),
        a = NS_A,
        r = NS_R,
        p = NS_P,
        tree = empty_tree(),
    )
}

fn theme() -> String {
    let solid = "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>";
    let line = "<a:ln w=\"9525\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>";
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";

    format!(
        "{header}<a:theme xmlns:a=\"{a}\" name=\"Deck\"><a:themeElements>\
<a:clrScheme name=\"Deck\">\
<a:dk1><a:srgbClr val=\"000000\"/></a:dk1><a:lt1><a:srgbClr val=\"FFFFFF\"/></a:lt1>\
<a:dk2><a:srgbClr val=\"1F497D\"/></a:dk2><a:lt2><a:srgbClr val=\"EEECE1\"/></a:lt2>\
<a:accent1><a:srgbClr val=\"4F81BD\"/></a:accent1><a:accent2><a:srgbClr val=\"C0504D\"/></a:accent2>\
<a:accent3><a:srgbClr val=\"9BBB59\"/></a:accent3><a:accent4><a:srgbClr val=\"8064A2\"/></a:accent4>\
<a:accent5><a:srgbClr val=\"4BACC6\"/></a:accent5><a:accent6><a:srgbClr val=\"F79646\"/></a:accent6>\
<a:hlink><a:srgbClr val=\"0000FF\"/></a:hlink><a:folHlink><a:srgbClr val=\"800080\"/></a:folHlink>\
</a:clrScheme>\
<a:fontScheme name=\"Deck\">\
<a:majorFont><a:latin typeface=\"Calibri\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:majorFont>\
<a:minorFont><a:latin typeface=\"Calibri\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:minorFont>\
</a:fontScheme>\
<a:fmtScheme name=\"Deck\">\
<a:fillStyleLst>{solid}{solid}{solid}</a:fillStyleLst>\
<a:lnStyleLst>{line}{line}{line}</a:lnStyleLst>\
<a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst>\
<a:bgFillStyleLst>{solid}{solid}{solid}</a:bgFillStyleLst>\
</a:fmtScheme>\
</a:themeElements></a:theme>",
        header = xml_header(),
        a = NS_A,
        solid = solid,
        line = line,
        effect = effect,
    )
}

struct TextBox<'a> {
    id: u32,
    name: &'a str,
    y: u64,
    height: u64,
    font_size: u32,
    bold: bool,
    lines: Vec<&'a str>,
}

impl TextBox<'_> {
    fn to_xml(&self) -> String {
        let margin = 457_200;
        let run_props = format!(
            "<a:rPr lang=\"en-US\" sz=\"{}\"{} dirty=\"0\"/>",
            self.font_size,
            if self.bold { " b=\"1\"" } else { "" }
        );
        let paragraphs: String = if self.lines.is_empty() {
            "<a:p><a:endParaRPr lang=\"en-US\"/></a:p>".to_string()
        } else {
            self.lines
                .iter()
                .map(|line| {
                    format!(
                        "<a:p><a:r>{}<a:t>{}</a:t></a:r></a:p>",
                        run_props,
                        escape_xml(line)
                    )
                })
                .collect()
        };

        format!(
            "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"{name}\"/><p:cNvSpPr txBox=\"1\"/><p:nvPr/></p:nvSpPr>\
<p:spPr><a:xfrm><a:off x=\"{x}\" y=\"{y}\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>\
<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>\
<p:txBody><a:bodyPr wrap=\"square\"><a:normAutofit/></a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody></p:sp>",
            id = self.id,
            name = self.name,
            x = margin,
            y = self.y,
            cx = SLIDE_WIDTH - 2 * margin,
            cy = self.height,
            paragraphs = paragraphs,
        )
    }
}

fn slide(shapes: &[TextBox<'_>]) -> String {
    let shapes: String = shapes.iter().map(TextBox::to_xml).collect();
    format!(
        "{header}<p:sld xmlns:a=\"{a}\" xmlns:r=\"{r}\" xmlns:p=\"{p}\">\
<p:cSld><p:spTree>{tree}{shapes}</p:spTree></p:cSld>\
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>",
        header = xml_header(),
        a = NS_A,
        r = NS_R,
        p = NS_P,
        tree = empty_tree(),
        shapes = shapes,
    )
}

fn title_slide(title: &str, subtitle: &str) -> String {
    slide(&[
        TextBox {
            id: 2,
            name: "Title",
            y: 2_130_425,
            height: 1_470_025,
            font_size: 4400,
            bold: true,
            lines: vec![title],
        },
        TextBox {
            id: 3,
            name: "Subtitle",
            y: 3_886_200,
            height: 1_752_600,
            font_size: 2400,
            bold: false,
            lines: vec![subtitle],
        },
    ])
}

fn content_slide(heading: &str, body: &[String]) -> String {
    slide(&[
        TextBox {
            id: 2,
            name: "Heading",
            y: 274_638,
            height: 1_143_000,
            font_size: 3600,
            bold: true,
            lines: vec![heading],
        },
        TextBox {
            id: 3,
            name: "Body",
            y: 1_600_200,
            height: 4_525_963,
            font_size: 2000,
            bold: false,
            lines: body.iter().map(String::as_str).collect(),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Read;
    use zip::ZipArchive;

    fn render(title: &str, content: &str) -> ZipArchive<Cursor<Vec<u8>>> {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let deck = SlideDeck::plan(title, content, date);
        let bytes = PptxRenderer.render(&deck).unwrap();
        ZipArchive::new(Cursor::new(bytes)).unwrap()
    }

    fn part(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut text = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        text
    }

    #[test]
    fn test_one_slide_part_per_slide() {
        let mut archive = render("Deck", "Heading1\nLine A\n\nHeading2\nLine B\nLine C");

        assert!(archive.by_name("ppt/slides/slide3.xml").is_ok());
        assert!(archive.by_name("ppt/slides/slide4.xml").is_err());

        let presentation = part(&mut archive, "ppt/presentation.xml");
        assert_eq!(presentation.matches("<p:sldId ").count(), 3);

        let types = part(&mut archive, "[Content_Types].xml");
        assert!(types.contains("/ppt/slides/slide3.xml"));
    }

    #[test]
    fn test_slide_text() {
        let mut archive = render("Deck", "Heading2\nLine B\nLine C");

        let title = part(&mut archive, "ppt/slides/slide1.xml");
        assert!(title.contains("<a:t>Deck</a:t>"));
        assert!(title.contains("<a:t>Created: 2026-01-02</a:t>"));

        let content = part(&mut archive, "ppt/slides/slide2.xml");
        assert!(content.contains("<a:t>Heading2</a:t>"));
        assert!(content.contains("<a:t>Line B</a:t>"));
        assert!(content.contains("<a:t>Line C</a:t>"));
    }

    #[test]
    fn test_title_only_deck() {
        let mut archive = render("Only title", "");
        assert!(archive.by_name("ppt/slides/slide1.xml").is_ok());
        assert!(archive.by_name("ppt/slides/slide2.xml").is_err());

        let rels = part(&mut archive, "ppt/_rels/presentation.xml.rels");
        assert!(rels.contains("Id=\"rId3\""));
        assert!(!rels.contains("Id=\"rId4\""));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut archive = render("R&D <2026>", "Q&A\n\"quoted\" 'text'");
        let title = part(&mut archive, "ppt/slides/slide1.xml");
        assert!(title.contains("R&amp;D &lt;2026&gt;"));

        let content = part(&mut archive, "ppt/slides/slide2.xml");
        assert!(content.contains("Q&amp;A"));
        assert!(content.contains("&quot;quoted&quot; &apos;text&apos;"));
    }

    #[test]
    fn test_escape_drops_invalid_control_chars() {
        assert_eq!(escape_xml("a\u{0}b\u{1b}c\td"), "abc\td");
        assert_eq!(escape_xml("資料"), "資料");
    }
}
