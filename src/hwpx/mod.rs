mod section;
mod shapes;
pub(crate) mod styles;
mod table;
mod text;

use std::io::{Read, Seek};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{BinaryItem, BinaryItems, Block, Document};
use crate::xml::{HC_NS, HH_NS, HP_NS};

use styles::StyleTable;

pub const MIMETYPE: &str = "application/hwp+zip";
pub const MIMETYPE_PART: &str = "mimetype";
pub const HEADER_PART: &str = "Contents/header.xml";
pub const CONTENT_HPF_PART: &str = "Contents/content.hpf";
pub const BINDATA_DIR: &str = "BinData/";

pub fn section_part(index: usize) -> String {
    format!("Contents/section{index}.xml")
}

/// The raw parts of a package the codec understands.
#[derive(Clone, Debug)]
pub struct Package {
    pub header_xml: String,
    /// `(part name, xml)` for `section0`, `section1`, … up to the first gap.
    pub sections: Vec<(String, String)>,
    pub binary_items: BinaryItems,
}

pub(super) fn hp<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(HP_NS))
}

pub(super) fn hp_children<'a>(
    node: roxmltree::Node<'a, 'a>,
    name: &'a str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'a>> {
    node.children()
        .filter(move |n| n.tag_name().name() == name && n.tag_name().namespace() == Some(HP_NS))
}

pub(super) fn is_hp(node: roxmltree::Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(HP_NS)
}

pub(super) fn find_ns<'a>(
    node: roxmltree::Node<'a, 'a>,
    ns: &str,
    name: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    node.descendants()
        .skip(1)
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(ns))
}

pub(super) fn find_hp<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    find_ns(node, HP_NS, name)
}

pub(super) fn find_hc<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    find_ns(node, HC_NS, name)
}

pub(super) fn find_hh<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    find_ns(node, HH_NS, name)
}

pub(super) fn int_attr(node: roxmltree::Node, attr: &str) -> Option<i32> {
    node.attribute(attr).and_then(|v| v.trim().parse::<i32>().ok())
}

pub(super) fn uint_attr(node: roxmltree::Node, attr: &str) -> Option<u32> {
    node.attribute(attr).and_then(|v| v.trim().parse::<u32>().ok())
}

pub(super) fn flag_attr(node: roxmltree::Node, attr: &str) -> bool {
    node.attribute(attr) == Some("1")
}

/// Every text node below `node`, concatenated.
pub(super) fn deep_text(node: roxmltree::Node) -> String {
    node.descendants()
        .filter(|n| is_hp(*n, "t"))
        .flat_map(|t| t.descendants().filter(|n| n.is_text()))
        .filter_map(|n| n.text())
        .collect()
}

/// Verbatim source bytes of `node`.
pub(super) fn raw_fragment(node: roxmltree::Node) -> String {
    node.document().input_text()[node.range()].to_string()
}

/// Lookups shared by every component reader during one `read_document` call.
pub(super) struct ReadContext<'a> {
    pub(super) styles: &'a StyleTable,
    pub(super) binaries: &'a BinaryItems,
}

pub(crate) fn read_entry<R: Read + Seek>(zip: &mut zip::ZipArchive<R>, name: &str) -> Result<Option<Vec<u8>>> {
    let mut file = match zip.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(Some(buf))
}

pub(crate) fn read_entry_text<R: Read + Seek>(zip: &mut zip::ZipArchive<R>, name: &str) -> Result<Option<String>> {
    match read_entry(zip, name)? {
        Some(bytes) => String::from_utf8(bytes)
            .map(|s| Some(s.trim_start_matches('\u{feff}').to_string()))
            .map_err(|_| Error::format(format!("{name} is not valid UTF-8"))),
        None => Ok(None),
    }
}

pub(crate) fn open_archive<R: Read + Seek>(reader: R) -> Result<zip::ZipArchive<R>> {
    zip::ZipArchive::new(reader).map_err(|_| Error::format("file is not a ZIP archive"))
}

pub fn read_package(path: &Path) -> Result<Package> {
    let file = crate::error::open_file(path)?;
    read_package_from(file)
}

pub fn read_package_bytes(bytes: &[u8]) -> Result<Package> {
    read_package_from(std::io::Cursor::new(bytes))
}

pub fn read_package_from<R: Read + Seek>(reader: R) -> Result<Package> {
    let mut zip = open_archive(reader)?;

    let mimetype = read_entry_text(&mut zip, MIMETYPE_PART)?
        .ok_or_else(|| Error::format("missing mimetype entry"))?;
    if mimetype.trim() != MIMETYPE {
        return Err(Error::format(format!(
            "unexpected mimetype {:?}, expected {MIMETYPE:?}",
            mimetype.trim()
        )));
    }

    let header_xml = read_entry_text(&mut zip, HEADER_PART)?
        .ok_or_else(|| Error::format(format!("missing {HEADER_PART}")))?;

    let mut sections = Vec::new();
    for index in 0.. {
        let name = section_part(index);
        let Some(xml) = read_entry_text(&mut zip, &name)? else {
            break;
        };
        sections.push((name, xml));
    }

    let mut binary_items = BinaryItems::new();
    for i in 0..zip.len() {
        let mut file = zip.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let Some(filename) = name.strip_prefix(BINDATA_DIR) else {
            continue;
        };
        if filename.is_empty() {
            continue;
        }
        let id = filename
            .rsplit_once('.')
            .map_or(filename, |(stem, _)| stem)
            .to_string();
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        log::debug!("BinData: {filename} ({} bytes) as {id}", data.len());
        binary_items.insert(id.clone(), BinaryItem::new(id, filename, data));
    }

    Ok(Package {
        header_xml,
        sections,
        binary_items,
    })
}

/// Builds the IR for every section of an already read package.
pub fn parse_package(pkg: &Package) -> Result<Document> {
    let header = roxmltree::Document::parse(&pkg.header_xml)?;
    let styles = StyleTable::from_header(header.root_element());
    let ctx = ReadContext {
        styles: &styles,
        binaries: &pkg.binary_items,
    };

    let mut blocks = Vec::new();
    for (name, xml) in &pkg.sections {
        let doc = roxmltree::Document::parse(xml)?;
        let section_blocks = read_section_root(&ctx, doc.root_element());
        log::debug!("{name}: {} top-level blocks", section_blocks.len());
        blocks.extend(section_blocks);
    }
    Ok(Document { blocks })
}

pub fn read_document(path: &Path) -> Result<Document> {
    parse_package(&read_package(path)?)
}

pub fn read_document_bytes(bytes: &[u8]) -> Result<Document> {
    parse_package(&read_package_bytes(bytes)?)
}

/// The `hp:secPr` of a section part's first paragraph, verbatim.
pub(crate) fn first_sec_pr(section_xml: &str) -> Result<Option<String>> {
    let doc = roxmltree::Document::parse(section_xml)?;
    Ok(doc
        .root_element()
        .children()
        .find(|n| is_hp(*n, "p"))
        .and_then(|p| find_hp(p, "secPr"))
        .map(raw_fragment))
}

/// Whether a raw paragraph fragment contains an `hp:secPr`, whatever prefix
/// it is bound to.
pub(crate) fn fragment_has_sec_pr(raw: &str) -> Result<bool> {
    let wrapped = crate::xml::wrap_fragment(raw);
    let doc = roxmltree::Document::parse(&wrapped)?;
    Ok(doc.descendants().any(|n| is_hp(n, "secPr")))
}

/// Index `N` of a `Contents/sectionN.xml` part name.
pub(crate) fn section_index(part: &str) -> Option<usize> {
    part.strip_prefix("Contents/section")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Dispatches the direct children of an `hs:sec` root. A section whose first
/// paragraph carries `hp:secPr` is wrapped in a single Section block.
fn read_section_root(ctx: &ReadContext, root: roxmltree::Node) -> Vec<Block> {
    let blocks: Vec<Block> = root
        .children()
        .filter(|n| n.is_element())
        .filter_map(|n| read_block(ctx, n))
        .collect();

    let sec_pr = root
        .children()
        .find(|n| is_hp(*n, "p"))
        .and_then(|p| find_hp(p, "secPr"));
    match sec_pr {
        Some(sec_pr) => vec![section::read_section(root, sec_pr, blocks).into()],
        None => blocks,
    }
}

/// Reads one body element. Returns `None` for elements with no IR
/// counterpart and for pictures whose binary item is missing.
pub(super) fn read_block(ctx: &ReadContext, node: roxmltree::Node) -> Option<Block> {
    if node.tag_name().namespace() != Some(HP_NS) {
        return None;
    }
    let page_break = flag_attr(node, "pageBreak");
    let block = match node.tag_name().name() {
        "p" => match sole_control(node) {
            Some(control) => read_control(ctx, control)?,
            None => text::read_paragraph(ctx, node).into(),
        },
        "tbl" | "pic" | "equation" => read_control(ctx, node)?,
        other => {
            log::debug!("skipping body element hp:{other}");
            return None;
        }
    };
    Some(Block { page_break, ..block })
}

fn read_control(ctx: &ReadContext, node: roxmltree::Node) -> Option<Block> {
    match node.tag_name().name() {
        "tbl" => Some(table::read_table(ctx, node).into()),
        "pic" => shapes::read_image(ctx, node).map(Block::from),
        "equation" => Some(shapes::read_equation(node).into()),
        _ => None,
    }
}

/// The single table, picture or equation held by a paragraph that has no
/// text and no other controls.
fn sole_control<'a>(p: roxmltree::Node<'a, 'a>) -> Option<roxmltree::Node<'a, 'a>> {
    let mut found = None;
    for run in hp_children(p, "run") {
        for child in run.children().filter(|n| n.is_element()) {
            if child.tag_name().namespace() != Some(HP_NS) {
                return None;
            }
            match child.tag_name().name() {
                "tbl" | "pic" | "equation" => {
                    if found.is_some() {
                        return None;
                    }
                    found = Some(child);
                }
                "t" => {
                    if child.descendants().any(|n| n.is_text() && !n.text().unwrap_or("").is_empty()) {
                        return None;
                    }
                }
                _ => return None,
            }
        }
    }
    found
}
