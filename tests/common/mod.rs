#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use hwpx_ir::xml::{HC_NS, HH_NS, HP_NS, HS_NS, OPF_NS};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn section_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?><hs:sec xmlns:hs="{HS_NS}" xmlns:hp="{HP_NS}" xmlns:hc="{HC_NS}">{body}</hs:sec>"#
    )
}

pub fn paragraph(id: u32, text: &str) -> String {
    paragraph_with(id, text, false)
}

pub fn paragraph_with(id: u32, text: &str, page_break: bool) -> String {
    format!(
        r#"<hp:p id="{id}" paraPrIDRef="0" styleIDRef="0" pageBreak="{}" columnBreak="0" merged="0"><hp:run charPrIDRef="0"><hp:t>{text}</hp:t></hp:run><hp:linesegarray><hp:lineseg textpos="0" vertpos="0" vertsize="1000" textheight="1000" baseline="850" spacing="600" horzpos="0" horzsize="42520" flags="393216"/></hp:linesegarray></hp:p>"#,
        if page_break { "1" } else { "0" }
    )
}

/// First paragraph of a section: page setup plus a column control.
pub fn anchor_paragraph(text: &str) -> String {
    format!(
        r#"<hp:p id="3121190098" paraPrIDRef="0" styleIDRef="0" pageBreak="0" columnBreak="0" merged="0"><hp:run charPrIDRef="0"><hp:secPr id="" textDirection="HORIZONTAL" spaceColumns="1134" tabStop="8000" tabStopVal="4000" tabStopUnit="HWPUNIT" outlineShapeIDRef="1" memoShapeIDRef="0" textVerticalWidthHead="0" masterPageCnt="0"><hp:grid lineGrid="0" charGrid="0" wonggojiFormat="0"/><hp:startNum pageStartsOn="BOTH" page="0" pic="0" tbl="0" equation="0"/><hp:visibility hideFirstHeader="0" hideFirstFooter="0" hideFirstMasterPage="0" border="SHOW_ALL" fill="SHOW_ALL" hideFirstPageNum="0" hideFirstEmptyLine="0" showLineNumber="0"/><hp:pagePr landscape="WIDELY" width="59528" height="84188" gutterType="LEFT_ONLY"><hp:margin header="4252" footer="4252" gutter="0" left="8504" right="8504" top="5668" bottom="4252"/></hp:pagePr></hp:secPr><hp:ctrl><hp:colPr id="" type="NEWSPAPER" layout="LEFT" colCount="1" sameSz="1" sameGap="0"/></hp:ctrl></hp:run><hp:run charPrIDRef="0"><hp:t>{text}</hp:t></hp:run><hp:linesegarray><hp:lineseg textpos="0" vertpos="0" vertsize="1000" textheight="1000" baseline="850" spacing="600" horzpos="0" horzsize="42520" flags="393216"/></hp:linesegarray></hp:p>"#
    )
}

pub fn table_paragraph(id: u32, cells: &[&str]) -> String {
    let tcs: String = cells
        .iter()
        .enumerate()
        .map(|(col, text)| {
            format!(
                r#"<hp:tc name="" header="0" hasMargin="0" protect="0" editable="0" dirty="0" borderFillIDRef="3"><hp:subList id="" textDirection="HORIZONTAL" lineWrap="BREAK" vertAlign="CENTER" linkListIDRef="0" linkListNextIDRef="0" textWidth="0" textHeight="0" hasTextRef="0" hasNumRef="0">{}</hp:subList><hp:cellAddr colAddr="{col}" rowAddr="0"/><hp:cellSpan colSpan="1" rowSpan="1"/><hp:cellSz width="10000" height="1000"/><hp:cellMargin left="141" right="141" top="141" bottom="141"/></hp:tc>"#,
                paragraph(100 + col as u32, text)
            )
        })
        .collect();
    format!(
        r#"<hp:p id="{id}" paraPrIDRef="0" styleIDRef="0" pageBreak="0" columnBreak="0" merged="0"><hp:run charPrIDRef="0"><hp:tbl id="1" zOrder="0" numberingType="TABLE" textWrap="TOP_AND_BOTTOM" textFlow="BOTH_SIDES" lock="0" dropcapstyle="None" pageBreak="CELL" repeatHeader="0" rowCnt="1" colCnt="{}" cellSpacing="0" borderFillIDRef="3" noAdjust="0"><hp:sz width="{}" widthRelTo="ABSOLUTE" height="1000" heightRelTo="ABSOLUTE" protect="0"/><hp:pos treatAsChar="1" affectLSpacing="0" flowWithText="1" allowOverlap="0" holdAnchorAndSO="0" vertRelTo="PARA" horzRelTo="COLUMN" vertAlign="TOP" horzAlign="LEFT" vertOffset="0" horzOffset="0"/><hp:outMargin left="283" right="283" top="283" bottom="283"/><hp:inMargin left="141" right="141" top="141" bottom="141"/><hp:tr>{tcs}</hp:tr></hp:tbl><hp:t/></hp:run><hp:linesegarray><hp:lineseg textpos="0" vertpos="0" vertsize="1000" textheight="1000" baseline="850" spacing="600" horzpos="0" horzsize="42520" flags="393216"/></hp:linesegarray></hp:p>"#,
        cells.len(),
        cells.len() * 10000,
    )
}

pub fn picture_paragraph(id: u32, binary_id: &str) -> String {
    format!(
        r#"<hp:p id="{id}" paraPrIDRef="0" styleIDRef="0" pageBreak="0" columnBreak="0" merged="0"><hp:run charPrIDRef="0"><hp:pic id="1234" zOrder="1" numberingType="PICTURE" textWrap="TOP_AND_BOTTOM" textFlow="BOTH_SIDES" lock="0" dropcapstyle="None" href="" groupLevel="0" instid="5678" reverse="0"><hp:offset x="0" y="0"/><hp:orgSz width="6000" height="4000"/><hp:curSz width="3000" height="2000"/><hp:flip horizontal="0" vertical="0"/><hp:rotationInfo angle="0" centerX="1500" centerY="1000" rotateimage="1"/><hc:img binaryItemIDRef="{binary_id}" bright="0" contrast="0" effect="REAL_PIC" alpha="0"/><hp:sz width="3000" widthRelTo="ABSOLUTE" height="2000" heightRelTo="ABSOLUTE" protect="0"/><hp:pos treatAsChar="1" affectLSpacing="0" flowWithText="1" allowOverlap="0" holdAnchorAndSO="0" vertRelTo="PARA" horzRelTo="COLUMN" vertAlign="TOP" horzAlign="LEFT" vertOffset="0" horzOffset="0"/><hp:outMargin left="0" right="0" top="0" bottom="0"/></hp:pic></hp:run><hp:linesegarray><hp:lineseg textpos="0" vertpos="0" vertsize="2000" textheight="2000" baseline="1700" spacing="600" horzpos="0" horzsize="3000" flags="393216"/></hp:linesegarray></hp:p>"#
    )
}

/// Catalog with one font, the default charPr 0, a bold charPr 1 and the
/// default paraPr 0.
pub fn header_xml() -> String {
    let fontfaces: String = ["HANGUL", "LATIN", "HANJA", "JAPANESE", "OTHER", "SYMBOL", "USER"]
        .iter()
        .map(|lang| {
            format!(
                r#"<hh:fontface lang="{lang}" fontCnt="1"><hh:font id="0" face="함초롬바탕" type="TTF" isEmbedded="0"/></hh:fontface>"#
            )
        })
        .collect();
    let char_pr = |id: u32, bold: bool| {
        format!(
            r##"<hh:charPr id="{id}" height="1000" textColor="#000000" shadeColor="none" useFontSpace="0" useKerning="0" symMark="NONE" borderFillIDRef="2"><hh:fontRef hangul="0" latin="0" hanja="0" japanese="0" other="0" symbol="0" user="0"/>{}<hh:underline type="NONE" shape="SOLID" color="#000000"/><hh:strikeout shape="NONE" color="#000000"/></hh:charPr>"##,
            if bold { "<hh:bold/>" } else { "" }
        )
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?><hh:head xmlns:hh="{HH_NS}" xmlns:hc="{HC_NS}" xmlns:hp="{HP_NS}" version="1.4" secCnt="1"><hh:beginNum page="1" footnote="1" endnote="1" pic="1" tbl="1" equation="1"/><hh:refList><hh:fontfaces itemCnt="7">{fontfaces}</hh:fontfaces><hh:charProperties itemCnt="2">{}{}</hh:charProperties><hh:paraProperties itemCnt="1"><hh:paraPr id="0" tabPrIDRef="0" condense="0" fontLineHeight="0" snapToGrid="1" suppressLineNumbers="0" checked="0"><hh:align horizontal="JUSTIFY" vertical="BASELINE"/><hh:margin><hc:intent value="0" unit="HWPUNIT"/><hc:left value="0" unit="HWPUNIT"/><hc:right value="0" unit="HWPUNIT"/><hc:prev value="0" unit="HWPUNIT"/><hc:next value="0" unit="HWPUNIT"/></hh:margin><hh:lineSpacing type="PERCENT" value="160" unit="HWPUNIT"/></hh:paraPr></hh:paraProperties></hh:refList></hh:head>"#,
        char_pr(0, false),
        char_pr(1, true),
    )
}

pub fn content_hpf(binary_ids: &[(&str, &str)]) -> String {
    let items: String = binary_ids
        .iter()
        .map(|(id, file)| {
            format!(r#"<opf:item id="{id}" href="BinData/{file}" media-type="image/png" isEmbeded="1"/>"#)
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?><opf:package xmlns:opf="{OPF_NS}" version="" unique-identifier="" id=""><opf:metadata><opf:title>fixture</opf:title></opf:metadata><opf:manifest><opf:item id="header" href="Contents/header.xml" media-type="application/xml"/><opf:item id="section0" href="Contents/section0.xml" media-type="application/xml"/>{items}</opf:manifest><opf:spine><opf:itemref idref="header" linear="yes"/><opf:itemref idref="section0" linear="yes"/></opf:spine></opf:package>"#
    )
}

/// In-memory HWPX package.
pub struct Fixture {
    pub mimetype: String,
    pub header: Option<String>,
    pub content_hpf: Option<String>,
    pub sections: Vec<String>,
    pub bin_data: Vec<(String, Vec<u8>)>,
    pub manifest_items: Vec<(String, String)>,
    pub extra: Vec<(String, String)>,
}

impl Fixture {
    pub fn new(section0_body: &str) -> Self {
        Self {
            mimetype: "application/hwp+zip".to_string(),
            header: Some(header_xml()),
            content_hpf: Some(content_hpf(&[])),
            sections: vec![section_xml(section0_body)],
            bin_data: Vec::new(),
            manifest_items: Vec::new(),
            extra: vec![
                (
                    "version.xml".to_string(),
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?><hv:HCFVersion xmlns:hv="http://www.hancom.co.kr/hwpml/2011/version" major="5" minor="1"/>"#.to_string(),
                ),
                (
                    "META-INF/container.xml".to_string(),
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?><ocf:container xmlns:ocf="urn:oasis:names:tc:opendocument:xmlns:container"/>"#.to_string(),
                ),
            ],
        }
    }

    /// Adds `BinData/{filename}` and lists it in the manifest as `id`.
    pub fn with_image(mut self, id: &str, filename: &str) -> Self {
        self.bin_data.push((filename.to_string(), PNG_BYTES.to_vec()));
        self.manifest_items.push((id.to_string(), filename.to_string()));
        let items: Vec<(&str, &str)> = self
            .manifest_items
            .iter()
            .map(|(id, file)| (id.as_str(), file.as_str()))
            .collect();
        self.content_hpf = Some(content_hpf(&items));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        zip.start_file("mimetype", stored).unwrap();
        zip.write_all(self.mimetype.as_bytes()).unwrap();
        for (name, content) in &self.extra {
            zip.start_file(name.as_str(), deflated).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        if let Some(header) = &self.header {
            zip.start_file("Contents/header.xml", deflated).unwrap();
            zip.write_all(header.as_bytes()).unwrap();
        }
        for (i, section) in self.sections.iter().enumerate() {
            zip.start_file(format!("Contents/section{i}.xml"), deflated).unwrap();
            zip.write_all(section.as_bytes()).unwrap();
        }
        if let Some(hpf) = &self.content_hpf {
            zip.start_file("Contents/content.hpf", deflated).unwrap();
            zip.write_all(hpf.as_bytes()).unwrap();
        }
        for (name, data) in &self.bin_data {
            zip.start_file(format!("BinData/{name}"), deflated).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }
}

/// `(name, compression, content)` for every entry, in archive order.
pub fn entries(package: &[u8]) -> Vec<(String, CompressionMethod, Vec<u8>)> {
    let mut zip = zip::ZipArchive::new(Cursor::new(package)).unwrap();
    (0..zip.len())
        .map(|i| {
            let mut file = zip.by_index(i).unwrap();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            (file.name().to_string(), file.compression(), data)
        })
        .collect()
}

pub fn entry_text(package: &[u8], name: &str) -> Option<String> {
    entries(package)
        .into_iter()
        .find(|(n, _, _)| n == name)
        .map(|(_, _, data)| String::from_utf8(data).unwrap())
}

/// Attribute values of every element with the given local name.
pub fn attr_values(xml: &str, element: &str, attr: &str) -> Vec<String> {
    let doc = roxmltree::Document::parse(xml).unwrap();
    doc.descendants()
        .filter(|n| n.tag_name().name() == element)
        .filter_map(|n| n.attribute(attr).map(str::to_string))
        .collect()
}
